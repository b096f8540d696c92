use serde::{Deserialize, Serialize};

/// Account identity as exposed to handlers and API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

/// A user row together with its stored password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

/// A saved link with everything derived from the page at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub title: String,
    pub favicon: String,
    pub description: Option<String>,
    pub summary: String,
    pub full_content: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

/// Insert payload; ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub user_id: String,
    pub url: String,
    pub title: String,
    pub favicon: String,
    pub description: Option<String>,
    pub summary: String,
    pub full_content: String,
    pub tags: Vec<String>,
}
