use serde::{Deserialize, Serialize};

/// Literal returned whenever no usable summary could be derived.
pub const SUMMARY_UNAVAILABLE: &str = "Summary temporarily unavailable.";

/// Title, favicon and description parsed from a page's own HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub favicon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Short card summary plus the cleaned long-form text, both derived from one
/// reader-service document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    pub summary: String,
    pub full_content: String,
}

impl PageSummary {
    pub fn unavailable() -> Self {
        Self {
            summary: SUMMARY_UNAVAILABLE.to_string(),
            full_content: String::new(),
        }
    }
}

/// Outbound fetch settings shared by the metadata fetcher and reader client.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub max_redirects: usize,
    pub block_private_hosts: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: crate::config::schema::default_user_agent(),
            max_redirects: 5,
            block_private_hosts: true,
        }
    }
}
