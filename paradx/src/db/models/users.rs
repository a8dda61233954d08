//! Database models for users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered identity as held by the user repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDBRecord {
    pub username: String,
    /// Argon2id PHC string - the plaintext password is never stored
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserDBRecord {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}
