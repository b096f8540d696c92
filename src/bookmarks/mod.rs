pub mod service;

pub use service::{BookmarkService, normalize_tags, validate_bookmark_url};
