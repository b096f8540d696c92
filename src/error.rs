use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `linkshelf`.
///
/// Returned by config loading and the command-line entry points. Store and
/// bookmark failures reach callers through [`AuthError`] and [`BookmarkError`]
/// instead; internal code continues to use `anyhow::Result` for ad-hoc
/// context chains.
#[derive(Debug, Error)]
pub enum ShelfError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Outbound fetches (page metadata, reader service) ────────────────
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    // ── Authentication ──────────────────────────────────────────────────
    #[error("auth: {0}")]
    Auth(#[from] AuthError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Fetch errors ───────────────────────────────────────────────────────────

/// Failure reaching a page or the reader service.
///
/// Never surfaced past the `links` boundary: the public fetch helpers collapse
/// these into fallback values.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("blocked outbound fetch to {host}")]
    Blocked { host: String },
}

// ─── Store errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.is_unique_violation()
        {
            return Self::Conflict(db.message().to_string());
        }
        Self::Query(err.to_string())
    }
}

// ─── Auth errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("authentication required")]
    MissingToken,

    #[error("invalid or expired session token")]
    InvalidToken,

    #[error("{0}")]
    Validation(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ─── Bookmark errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BookmarkError {
    #[error("Please enter a valid URL")]
    InvalidUrl,

    #[error("Bookmark already exists")]
    AlreadyExists,

    #[error("Bookmark not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ShelfError>;
