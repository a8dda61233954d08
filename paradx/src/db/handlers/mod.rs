//! Repository implementations.

pub mod repository;
pub mod users;

pub use repository::Repository;
pub use users::Users;

use crate::db::models::users::UserDBRecord;
use std::sync::Arc;

/// The user repository as injected into application state.
pub type UserRepository = Arc<dyn Repository<Id = String, Record = UserDBRecord>>;
