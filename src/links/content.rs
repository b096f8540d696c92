//! Long-form cleanup of reader-service documents for the detail view.
//!
//! Unlike the summary path this keeps headings and paragraph breaks, and
//! turns image placeholders into [`IMAGE_MARKER`] instead of deleting them.

use regex::Regex;
use std::sync::LazyLock;

/// Visual stand-in for reader image placeholders.
pub const IMAGE_MARKER: &str = "📷";

static HEADER_LINES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"Title: .*\n",
        r"URL Source: .*\n",
        r"Published Time: .*\n",
        r"Warning: .*\n",
        r"Markdown Content:\s*",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("header pattern must compile"))
    .collect()
});
static IMAGE_CAPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!Image [0-9]+:?\s*").expect("image caption pattern must compile"));
static IMAGE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[Image [0-9]+[^\]]*\]").expect("image placeholder pattern must compile")
});

/// Strip the reader header and mark images, keeping the body's formatting.
///
/// Only the first occurrence of each header line is removed.
pub fn clean_full_content(raw: &str) -> String {
    let mut content = raw.to_string();
    for re in HEADER_LINES.iter() {
        content = re.replace(&content, "").into_owned();
    }

    let content = IMAGE_CAPTION.replace_all(&content, format!("{IMAGE_MARKER} ").as_str());
    let content = IMAGE_PLACEHOLDER.replace_all(&content, IMAGE_MARKER);
    content.trim().to_string()
}
