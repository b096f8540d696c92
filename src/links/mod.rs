//! Page understanding for submitted links: HTML metadata, reader-service
//! summaries and the text cleanup both views share.

pub mod content;
pub mod guard;
pub mod metadata;
pub mod normalize;
pub mod reader;
pub mod summary;
pub mod types;

pub use content::{IMAGE_MARKER, clean_full_content};
pub use metadata::{MetadataFetcher, extract_metadata, fallback_metadata};
pub use normalize::clean_summary_text;
pub use reader::{ReaderClient, normalize_target_url, summarize_document};
pub use summary::{SummaryStrategy, extract_summary};
pub use types::{FetchOptions, PageMetadata, PageSummary, SUMMARY_UNAVAILABLE};
