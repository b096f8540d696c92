pub mod sqlite;
pub mod types;

pub use sqlite::{BookmarkStore, SqliteBookmarkStore};
pub use types::{Bookmark, NewBookmark, User, UserRecord};
