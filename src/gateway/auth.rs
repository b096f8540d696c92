use crate::store::User;
use axum::http::{HeaderMap, HeaderValue, header};

use super::AppState;
use crate::error::AuthError;

/// Name of the session cookie set on login.
pub const SESSION_COOKIE: &str = "auth-token";

/// Token from `Authorization: Bearer ...`, else from the session cookie.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Option<HeaderValue> {
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("auth-token=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

/// Resolve the caller, or the reason they are not signed in.
pub(super) async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<User, AuthError> {
    let token = request_token(headers);
    state.sessions.authenticate(token.as_deref()).await
}
