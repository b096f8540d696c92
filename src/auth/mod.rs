//! Accounts, password hashing and bearer-token sessions.

pub mod password;
pub mod session;

pub use password::{MIN_PASSWORD_CHARS, hash_password, verify_password};
pub use session::{
    IssuedSession, SessionManager, generate_session_token, hash_token, validate_email,
};
