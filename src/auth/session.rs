//! Login sessions backed by opaque bearer tokens.
//!
//! Tokens are handed to the client once and persisted only as SHA-256
//! hashes, so a leaked database cannot be replayed against the gateway.

use super::password::{hash_password, verify_password};
use crate::error::AuthError;
use crate::store::{BookmarkStore, User};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const TOKEN_PREFIX: &str = "ls_";
/// Upper bound on configured lifetimes, keeps `expires_at` representable.
const MAX_TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 365 * 10;

/// SHA-256 hash a token for storage (never store plaintext).
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn generate_session_token() -> String {
    use rand::RngCore;
    let mut buf = [0u8; 32];
    rand::rng().fill_bytes(&mut buf);
    format!("{TOKEN_PREFIX}{}", hex::encode(buf))
}

/// Minimal shape check: something before and after a single `@`, dotted domain.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let invalid = || AuthError::Validation("Invalid email format".into());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;

    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

/// A freshly issued session. `token` is the only copy of the plaintext.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionManager {
    store: Arc<dyn BookmarkStore>,
    ttl_secs: i64,
}

impl SessionManager {
    pub fn new(store: Arc<dyn BookmarkStore>, token_ttl_secs: u64) -> Self {
        let ttl_secs = i64::try_from(token_ttl_secs)
            .unwrap_or(MAX_TOKEN_TTL_SECS)
            .min(MAX_TOKEN_TTL_SECS);
        Self { store, ttl_secs }
    }

    /// Session lifetime in seconds, used for the cookie `Max-Age`.
    pub fn token_ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Create an account. Duplicate emails surface as a store conflict.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        validate_email(email)?;
        let password_hash = hash_password(password)?;
        let user = self.store.create_user(email, &password_hash).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, AuthError> {
        let email = email.trim();
        validate_email(email)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".into()));
        }

        let Some(record) = self.store.find_user_by_email(email).await? else {
            tracing::debug!("login for unknown email");
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &record.password_hash) {
            tracing::debug!(user_id = %record.user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_session_token();
        let expires_at = Utc::now() + Duration::seconds(self.ttl_secs);
        self.store
            .insert_session(&hash_token(&token), &record.user.id, expires_at)
            .await?;

        tracing::info!(user_id = %record.user.id, "session issued");
        Ok(IssuedSession {
            token,
            user: record.user,
            expires_at,
        })
    }

    /// Resolve a presented token to its user.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<User, AuthError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Err(AuthError::MissingToken);
        };
        if !token.starts_with(TOKEN_PREFIX) {
            return Err(AuthError::InvalidToken);
        }

        self.store
            .find_session_user(&hash_token(token), Utc::now())
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Revoke a token. Returns whether a live session was removed.
    pub async fn logout(&self, token: &str) -> Result<bool, AuthError> {
        let removed = self.store.delete_session(&hash_token(token.trim())).await?;
        if removed {
            tracing::info!("session revoked");
        }
        Ok(removed)
    }
}
