//! API models for users.

use serde::{Deserialize, Serialize};

/// The logged-in identity, extracted from the session cookie.
///
/// See [`crate::auth::current_user`] for the extractor implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
}
