//! Heuristic card-summary extraction from reader-service documents.
//!
//! A document is tried against [`SummaryStrategy::ORDER`]; the first strategy
//! that yields a candidate wins, and the candidate is cleaned with
//! [`clean_summary_text`].

use super::normalize::{MAX_SUMMARY_CHARS, clean_summary_text};
use super::types::SUMMARY_UNAVAILABLE;
use regex::Regex;
use std::sync::LazyLock;

/// Cleaned summaries at or below this many characters are replaced by
/// [`SUMMARY_UNAVAILABLE`].
const MIN_SUMMARY_CHARS: usize = 20;
/// A labeled section must be longer than this to be used.
const MIN_LABELED_SECTION_CHARS: usize = 50;
const MIN_LINE_CHARS: usize = 20;
const MIN_LINE_WORDS: usize = 4;
const MIN_SENTENCE_CHARS: usize = 30;
const MAX_FALLBACK_SENTENCES: usize = 2;

const METADATA_PREFIXES: &[&str] = &[
    "Title:",
    "URL Source:",
    "Published Time:",
    "Warning:",
    "Markdown Content:",
];
const BOILERPLATE_PREFIXES: &[&str] = &["Skip to content", "Toggle navigation", "Search"];

static LABELED_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Description|About|Overview|Summary):\s*([^\n]+(?:\n[^\n]+)*?)(?:\n\n|$)")
        .expect("labeled section pattern must compile")
});
static MARKDOWN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Markdown Content:\s*(.*?)(?:\n\n|\n---|\nURL Source:|$)")
        .expect("markdown block pattern must compile")
});
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence break pattern must compile"));
static SEPARATOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[=\-]+$").expect("separator pattern must compile"));
static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s").expect("heading pattern must compile"));
static LINK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.*\]\(.*\)$").expect("link line pattern must compile"));
static IMAGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[.*\]\(.*\)$").expect("image line pattern must compile"));

/// Candidate-selection strategies, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStrategy {
    /// `Description:` / `About:` / `Overview:` / `Summary:` section.
    LabeledSection,
    /// First body lines that look like prose.
    MeaningfulParagraph,
    /// First sentences of the `Markdown Content:` block.
    FallbackSentences,
}

impl SummaryStrategy {
    pub const ORDER: [Self; 3] = [
        Self::LabeledSection,
        Self::MeaningfulParagraph,
        Self::FallbackSentences,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::LabeledSection => "labeled_section",
            Self::MeaningfulParagraph => "meaningful_paragraph",
            Self::FallbackSentences => "fallback_sentences",
        }
    }

    /// Run this strategy alone; `None` means "fall through".
    pub fn apply(self, raw: &str) -> Option<String> {
        match self {
            Self::LabeledSection => labeled_section(raw),
            Self::MeaningfulParagraph => meaningful_paragraph(raw),
            Self::FallbackSentences => fallback_sentences(raw),
        }
    }
}

/// Pick the uncleaned candidate text and the strategy that produced it.
pub fn select_candidate(raw: &str) -> Option<(SummaryStrategy, String)> {
    SummaryStrategy::ORDER
        .into_iter()
        .find_map(|strategy| strategy.apply(raw).map(|text| (strategy, text)))
}

/// Derive a short plain-text summary from a reader-service document.
///
/// Always returns something displayable: either a cleaned candidate longer
/// than 20 characters or [`SUMMARY_UNAVAILABLE`].
pub fn extract_summary(raw: &str) -> String {
    let candidate = match select_candidate(raw) {
        Some((strategy, text)) => {
            tracing::debug!(strategy = strategy.name(), "summary candidate selected");
            text
        }
        None => {
            tracing::debug!("no summary strategy matched");
            String::new()
        }
    };

    let cleaned = clean_summary_text(&candidate);
    if cleaned.chars().count() > MIN_SUMMARY_CHARS {
        cleaned
    } else {
        SUMMARY_UNAVAILABLE.to_string()
    }
}

fn labeled_section(raw: &str) -> Option<String> {
    let section = LABELED_SECTION.captures(raw)?.get(1)?.as_str();
    (section.trim().chars().count() > MIN_LABELED_SECTION_CHARS).then(|| section.to_string())
}

fn meaningful_paragraph(raw: &str) -> Option<String> {
    let mut kept: Vec<&str> = Vec::new();
    let mut in_header = true;
    let mut joined_len = 0usize;

    for line in raw.split('\n').map(str::trim) {
        if in_header && (line.is_empty() || starts_with_any(line, METADATA_PREFIXES)) {
            continue;
        }
        in_header = false;

        if is_noise_line(line) {
            continue;
        }

        if !kept.is_empty() {
            joined_len += 1;
        }
        joined_len += line.chars().count();
        kept.push(line);

        if joined_len > MAX_SUMMARY_CHARS {
            break;
        }
    }

    (!kept.is_empty()).then(|| kept.join(" ").trim().to_string())
}

fn fallback_sentences(raw: &str) -> Option<String> {
    let block = MARKDOWN_BLOCK.captures(raw)?.get(1)?.as_str();
    let sentences: Vec<&str> = SENTENCE_BREAK
        .split(block)
        .filter(|s| s.trim().chars().count() > MIN_SENTENCE_CHARS)
        .take(MAX_FALLBACK_SENTENCES)
        .collect();

    let joined = sentences.join(" ");
    let joined = joined.trim();
    (!joined.is_empty()).then(|| joined.to_string())
}

fn is_noise_line(line: &str) -> bool {
    starts_with_any(line, BOILERPLATE_PREFIXES)
        || SEPARATOR_LINE.is_match(line)
        || HEADING_LINE.is_match(line)
        || LINK_LINE.is_match(line)
        || IMAGE_LINE.is_match(line)
        || line.chars().count() < MIN_LINE_CHARS
        || line.split(' ').count() < MIN_LINE_WORDS
}

fn starts_with_any(line: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| line.starts_with(prefix))
}
