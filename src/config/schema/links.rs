use crate::links::FetchOptions;
use serde::{Deserialize, Serialize};

pub fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}

fn default_reader_base_url() -> String {
    "https://r.jina.ai".into()
}

fn default_max_redirects() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// Remote URL-to-text reader service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    #[serde(default = "default_reader_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            base_url: default_reader_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Direct page fetches for metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Refuse to fetch pages on private or loopback addresses (default: true)
    #[serde(default = "default_true")]
    pub block_private_hosts: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            block_private_hosts: true,
        }
    }
}

impl FetchConfig {
    pub fn options(&self) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            max_redirects: self.max_redirects,
            block_private_hosts: self.block_private_hosts,
        }
    }
}

impl ReaderConfig {
    /// Reader requests reuse the page-fetch redirect limit but never apply
    /// the private-host guard: the reader itself is the one fetching.
    pub fn options(&self, fetch: &FetchConfig) -> FetchOptions {
        FetchOptions {
            user_agent: self.user_agent.clone(),
            max_redirects: fetch.max_redirects,
            block_private_hosts: false,
        }
    }
}
