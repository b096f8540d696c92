//! Axum-based HTTP gateway with proper HTTP/1.1 compliance, body limits, and timeouts.
//!
//! Serves the bookmark API:
//! - Session login/logout with bearer token or `auth-token` cookie
//! - Bookmark create/list/get/delete scoped to the signed-in user
//! - Request body size limits (64KB max)
//! - Request timeouts (30s) to prevent slow-loris attacks

mod auth;
mod handlers;

pub use auth::{SESSION_COOKIE, request_token};

use handlers::{
    handle_auth_status, handle_create_bookmark, handle_delete_bookmark, handle_get_bookmark,
    handle_health, handle_list_bookmarks, handle_list_tags, handle_login, handle_logout,
};

use crate::auth::SessionManager;
use crate::bookmarks::BookmarkService;
use crate::config::Config;
use crate::store::{BookmarkStore, SqliteBookmarkStore};
use anyhow::Result;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (64KB), bounds memory per request
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s), bounds slow clients
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub bookmarks: Arc<BookmarkService>,
    pub secure_cookie: bool,
}

impl AppState {
    /// Wire the store, session manager and bookmark service from config.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn BookmarkStore> =
            Arc::new(SqliteBookmarkStore::open(&config.database_path()).await?);
        Ok(Self {
            sessions: Arc::new(SessionManager::new(
                Arc::clone(&store),
                config.auth.token_ttl_secs,
            )),
            bookmarks: Arc::new(BookmarkService::from_config(store, config)?),
            secure_cookie: config.auth.secure_cookie,
        })
    }
}

/// Login request body
#[derive(serde::Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// Bookmark creation request body
#[derive(serde::Deserialize)]
pub struct CreateBookmarkBody {
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// `?tag=` filter on the bookmark list
#[derive(serde::Deserialize)]
pub struct TagQuery {
    pub tag: Option<String>,
}

fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Build the API router around prepared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/api/auth/login", post(handle_login))
        .route("/api/auth/logout", post(handle_logout))
        .route("/api/auth/status", get(handle_auth_status))
        .route(
            "/api/bookmarks",
            get(handle_list_bookmarks).post(handle_create_bookmark),
        )
        .route(
            "/api/bookmarks/{id}",
            get(handle_get_bookmark).delete(handle_delete_bookmark),
        )
        .route("/api/tags", get(handle_list_tags))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

/// Run the HTTP gateway using axum with proper HTTP/1.1 compliance.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    // ── Security: refuse public bind without explicit opt-in ──
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the bookmark API would be exposed to the network.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let listener = bind_listener(host, port).await?;

    run_gateway_with_listener(host, listener, config).await
}

/// Bind `host:port`, resolving hostnames and accepting bracketed IPv6.
async fn bind_listener(host: &str, port: u16) -> Result<tokio::net::TcpListener> {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    tokio::net::TcpListener::bind((bare, port))
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {host}:{port}: {e}"))
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let actual_port = listener.local_addr()?.port();
    let state = AppState::from_config(&config).await?;

    tracing::info!(
        addr = %format!("{host}:{actual_port}"),
        database = %config.database_path().display(),
        reader = %config.reader.base_url,
        "gateway listening"
    );

    axum::serve(listener, router(state)).await?;

    Ok(())
}
