//! Login accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A login account. Employees link to users through `Employee::user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique identifier; this is the caller identity carried in tokens.
    pub id: u64,
    /// Unique login name.
    pub username: String,
    /// Unique e-mail address.
    pub email: String,
    /// Argon2 PHC hash of the password.
    #[serde(skip)]
    pub password_hash: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an account; the password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// Unique e-mail address.
    pub email: String,
    /// Argon2 PHC hash.
    pub password_hash: String,
}
