use super::types::{Bookmark, NewBookmark, User, UserRecord};
use crate::error::StoreError;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use uuid::Uuid;

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Async persistence contract for users, login sessions and bookmarks.
pub trait BookmarkStore: Send + Sync {
    fn create_user<'a>(
        &'a self,
        email: &'a str,
        password_hash: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<User>> + Send + 'a>>;

    fn find_user_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<UserRecord>>> + Send + 'a>>;

    fn find_user<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<User>>> + Send + 'a>>;

    fn insert_session<'a>(
        &'a self,
        token_hash: &'a str,
        user_id: &'a str,
        expires_at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + 'a>>;

    /// User owning an unexpired session, if any.
    fn find_session_user<'a>(
        &'a self,
        token_hash: &'a str,
        now: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<User>>> + Send + 'a>>;

    fn delete_session<'a>(
        &'a self,
        token_hash: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<bool>> + Send + 'a>>;

    fn insert_bookmark<'a>(
        &'a self,
        bookmark: NewBookmark,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Bookmark>> + Send + 'a>>;

    fn find_bookmark_by_url<'a>(
        &'a self,
        user_id: &'a str,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Bookmark>>> + Send + 'a>>;

    /// Newest first. `tag` must equal one of the bookmark's tags exactly.
    fn list_bookmarks<'a>(
        &'a self,
        user_id: &'a str,
        tag: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Bookmark>>> + Send + 'a>>;

    fn get_bookmark<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Bookmark>>> + Send + 'a>>;

    fn delete_bookmark<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<bool>> + Send + 'a>>;

    /// Distinct tags across the user's bookmarks, sorted.
    fn list_tags<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<String>>> + Send + 'a>>;
}

/// SQLite-backed store using sqlx async pool.
pub struct SqliteBookmarkStore {
    pool: SqlitePool,
}

const SHELF_SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS shelf_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const SHELF_SCHEMA_VERSION_KEY: &str = "shelf_schema_version";
const SHELF_SCHEMA_VERSION: u32 = 1;

const BOOKMARK_COLUMNS: &str = "id, user_id, url, title, favicon, description, summary, \
full_content, tags, created_at";

async fn ensure_shelf_schema_version(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SHELF_SCHEMA_META_TABLE)
        .execute(pool)
        .await
        .context("create shelf_schema_meta table")?;

    let stored_version: Option<(String,)> =
        sqlx::query_as("SELECT value FROM shelf_schema_meta WHERE key = $1")
            .bind(SHELF_SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await
            .context("load shelf schema version")?;

    if let Some((value,)) = stored_version {
        let parsed = value
            .parse::<u32>()
            .with_context(|| format!("invalid shelf schema version value: {value}"))?;
        anyhow::ensure!(
            parsed == SHELF_SCHEMA_VERSION,
            "incompatible shelf schema version: stored={parsed}, expected={SHELF_SCHEMA_VERSION}"
        );
        return Ok(());
    }

    sqlx::query("INSERT INTO shelf_schema_meta (key, value) VALUES ($1, $2)")
        .bind(SHELF_SCHEMA_VERSION_KEY)
        .bind(SHELF_SCHEMA_VERSION.to_string())
        .execute(pool)
        .await
        .context("persist shelf schema version")?;

    Ok(())
}

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed-width UTC so TEXT comparison orders chronologically.
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl SqliteBookmarkStore {
    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database directory {}", parent.display()))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("open database {}", path.display()))?;

        Self::new(pool).await
    }

    /// Create a new store with an existing pool and run migrations.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query("PRAGMA foreign_keys = ON;")
            .execute(&pool)
            .await?;

        ensure_shelf_schema_version(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                 id TEXT PRIMARY KEY,
                 email TEXT NOT NULL UNIQUE,
                 password_hash TEXT NOT NULL,
                 created_at TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .context("create users table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS auth_sessions (
                 token_hash TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                 created_at TEXT NOT NULL,
                 expires_at TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await
        .context("create auth_sessions table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS bookmarks (
                 id TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                 url TEXT NOT NULL,
                 title TEXT NOT NULL,
                 favicon TEXT NOT NULL,
                 description TEXT,
                 summary TEXT NOT NULL,
                 full_content TEXT NOT NULL,
                 tags TEXT NOT NULL DEFAULT '[]',
                 created_at TEXT NOT NULL,
                 UNIQUE(user_id, url)
             )",
        )
        .execute(&pool)
        .await
        .context("create bookmarks table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_bookmarks_user_created
                 ON bookmarks(user_id, created_at)",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_bookmark(&self, id: &str) -> StoreResult<Option<Bookmark>> {
        let row = sqlx::query(&format!("SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| map_bookmark_row(&r)).transpose()
    }
}

fn map_user_row(row: &SqliteRow) -> StoreResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_bookmark_row(row: &SqliteRow) -> StoreResult<Bookmark> {
    let tags_raw: String = row.try_get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_raw)
        .map_err(|e| StoreError::Corrupt(format!("bookmark tags {tags_raw:?}: {e}")))?;

    Ok(Bookmark {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        url: row.try_get("url")?,
        title: row.try_get("title")?,
        favicon: row.try_get("favicon")?,
        description: row.try_get("description")?,
        summary: row.try_get("summary")?,
        full_content: row.try_get("full_content")?,
        tags,
        created_at: row.try_get("created_at")?,
    })
}

impl BookmarkStore for SqliteBookmarkStore {
    fn create_user<'a>(
        &'a self,
        email: &'a str,
        password_hash: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<User>> + Send + 'a>> {
        Box::pin(async move {
            let user = User {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                created_at: timestamp(Utc::now()),
            };

            let inserted = sqlx::query(
                "INSERT INTO users (id, email, password_hash, created_at)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(&user.id)
            .bind(&user.email)
            .bind(password_hash)
            .bind(&user.created_at)
            .execute(&self.pool)
            .await;

            match inserted.map_err(StoreError::from) {
                Ok(_) => Ok(user),
                Err(StoreError::Conflict(_)) => Err(StoreError::Conflict(format!("user {email}"))),
                Err(e) => Err(e),
            }
        })
    }

    fn find_user_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<UserRecord>>> + Send + 'a>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

            row.map(|r| -> StoreResult<UserRecord> {
                Ok(UserRecord {
                    user: map_user_row(&r)?,
                    password_hash: r.try_get("password_hash")?,
                })
            })
            .transpose()
        })
    }

    fn find_user<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<User>>> + Send + 'a>> {
        Box::pin(async move {
            let row = sqlx::query("SELECT id, email, created_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            row.map(|r| map_user_row(&r)).transpose()
        })
    }

    fn insert_session<'a>(
        &'a self,
        token_hash: &'a str,
        user_id: &'a str,
        expires_at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<()>> + Send + 'a>> {
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO auth_sessions (token_hash, user_id, created_at, expires_at)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(token_hash)
            .bind(user_id)
            .bind(timestamp(Utc::now()))
            .bind(timestamp(expires_at))
            .execute(&self.pool)
            .await?;
            Ok(())
        })
    }

    fn find_session_user<'a>(
        &'a self,
        token_hash: &'a str,
        now: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<User>>> + Send + 'a>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT u.id, u.email, u.created_at
                 FROM auth_sessions s
                 JOIN users u ON u.id = s.user_id
                 WHERE s.token_hash = $1 AND s.expires_at > $2",
            )
            .bind(token_hash)
            .bind(timestamp(now))
            .fetch_optional(&self.pool)
            .await?;
            row.map(|r| map_user_row(&r)).transpose()
        })
    }

    fn delete_session<'a>(
        &'a self,
        token_hash: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<bool>> + Send + 'a>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM auth_sessions WHERE token_hash = $1")
                .bind(token_hash)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn insert_bookmark<'a>(
        &'a self,
        bookmark: NewBookmark,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Bookmark>> + Send + 'a>> {
        Box::pin(async move {
            let tags_json = serde_json::to_string(&bookmark.tags)
                .map_err(|e| StoreError::Query(format!("encode tags: {e}")))?;
            let stored = Bookmark {
                id: Uuid::new_v4().to_string(),
                user_id: bookmark.user_id,
                url: bookmark.url,
                title: bookmark.title,
                favicon: bookmark.favicon,
                description: bookmark.description,
                summary: bookmark.summary,
                full_content: bookmark.full_content,
                tags: bookmark.tags,
                created_at: timestamp(Utc::now()),
            };

            sqlx::query(
                "INSERT INTO bookmarks
                     (id, user_id, url, title, favicon, description, summary, full_content, tags, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(&stored.id)
            .bind(&stored.user_id)
            .bind(&stored.url)
            .bind(&stored.title)
            .bind(&stored.favicon)
            .bind(stored.description.as_deref())
            .bind(&stored.summary)
            .bind(&stored.full_content)
            .bind(&tags_json)
            .bind(&stored.created_at)
            .execute(&self.pool)
            .await?;

            Ok(stored)
        })
    }

    fn find_bookmark_by_url<'a>(
        &'a self,
        user_id: &'a str,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Bookmark>>> + Send + 'a>> {
        Box::pin(async move {
            let row = sqlx::query(&format!(
                "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE user_id = $1 AND url = $2"
            ))
            .bind(user_id)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
            row.map(|r| map_bookmark_row(&r)).transpose()
        })
    }

    fn list_bookmarks<'a>(
        &'a self,
        user_id: &'a str,
        tag: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Bookmark>>> + Send + 'a>> {
        Box::pin(async move {
            let rows = if let Some(tag) = tag {
                sqlx::query(&format!(
                    "SELECT {BOOKMARK_COLUMNS}
                     FROM bookmarks
                     WHERE user_id = $1
                       AND EXISTS (SELECT 1 FROM json_each(bookmarks.tags) WHERE json_each.value = $2)
                     ORDER BY created_at DESC, rowid DESC"
                ))
                .bind(user_id)
                .bind(tag)
                .fetch_all(&self.pool)
                .await?
            } else {
                sqlx::query(&format!(
                    "SELECT {BOOKMARK_COLUMNS}
                     FROM bookmarks
                     WHERE user_id = $1
                     ORDER BY created_at DESC, rowid DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            };

            rows.iter().map(map_bookmark_row).collect()
        })
    }

    fn get_bookmark<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Bookmark>>> + Send + 'a>> {
        Box::pin(async move {
            Ok(self
                .fetch_bookmark(id)
                .await?
                .filter(|bookmark| bookmark.user_id == user_id))
        })
    }

    fn delete_bookmark<'a>(
        &'a self,
        user_id: &'a str,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<bool>> + Send + 'a>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM bookmarks WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn list_tags<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<String>>> + Send + 'a>> {
        Box::pin(async move {
            let rows: Vec<(String,)> = sqlx::query_as(
                "SELECT DISTINCT tag.value
                 FROM bookmarks, json_each(bookmarks.tags) AS tag
                 WHERE bookmarks.user_id = $1
                 ORDER BY tag.value",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows.into_iter().map(|(tag,)| tag).collect())
        })
    }
}
