use serde::{Deserialize, Serialize};

/// Seven days, matching the session cookie lifetime.
const DEFAULT_TOKEN_TTL_SECS: u64 = 60 * 60 * 24 * 7;

fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session token lifetime in seconds
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    /// Mark the session cookie `Secure` (default: false for local use)
    #[serde(default)]
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            secure_cookie: false,
        }
    }
}
