//! Markdown and UI-noise stripping for card summaries.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum summary length in characters, before the ellipsis.
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Rewrite passes, applied top to bottom.
const REWRITE_RULES: &[(&str, &str)] = &[
    // markdown emphasis
    (r"\*\*", ""),
    (r"\*", ""),
    // [text](url) -> text
    (r"\[([^\]]+)\]\([^)]+\)", "${1}"),
    // heading markers
    (r"#{1,6}\s*", ""),
    // `code` -> code
    (r"`([^`]+)`", "${1}"),
    // whitespace
    (r"\n{2,}", " "),
    (r"\s{2,}", " "),
    (r"[\r\n]", " "),
    // navigation chrome
    (r"(?i)Skip to content", ""),
    (r"(?i)Toggle navigation", ""),
    (r"(?i)Search [A-Z]", ""),
    (r"(?i)Navigation Menu", ""),
    (r"(?i)Main Navigation", ""),
    // reader image placeholders
    (r"!Image [0-9]+:?\s*", ""),
    (r"\[Image [0-9]+[^\]]*\]", ""),
    // punctuation runs
    (r"\.{2,}", "."),
    (r"-{3,}", ""),
    (r"={3,}", ""),
];

static REWRITES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    REWRITE_RULES
        .iter()
        .map(|(pattern, replacement)| {
            let re = Regex::new(pattern).expect("summary rewrite pattern must compile");
            (re, *replacement)
        })
        .collect()
});

/// Strip markdown syntax, navigation boilerplate and image placeholders,
/// then cap the result at [`MAX_SUMMARY_CHARS`].
///
/// The ellipsis is decided by the length of the *raw* input, not of the
/// cleaned text, so a long but noisy input can end in `...` even when its
/// cleaned form is short.
pub fn clean_summary_text(text: &str) -> String {
    let mut cleaned = text.to_string();
    for (re, replacement) in REWRITES.iter() {
        cleaned = re.replace_all(&cleaned, *replacement).into_owned();
    }

    let capped: String = cleaned.trim().chars().take(MAX_SUMMARY_CHARS).collect();
    let mut result = capped.trim_end().to_string();
    if text.chars().count() > MAX_SUMMARY_CHARS {
        result.push_str("...");
    }
    result
}
