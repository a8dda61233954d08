//! Base repository trait for identity storage.

use crate::db::errors::Result;

/// Base repository trait providing keyed get/put access.
///
/// Implementations must be safe to share between request handlers; the in-memory default
/// is the only shared mutable state in the application.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The stored record type
    type Record: Send + Sync;

    /// Get a record by its identifier
    async fn get(&self, id: &Self::Id) -> Result<Option<Self::Record>>;

    /// Insert or replace a record
    async fn put(&self, record: Self::Record) -> Result<()>;

    /// Insert a record, failing with [`crate::db::errors::DbError::UniqueViolation`] if one
    /// already exists under the same identifier
    async fn create(&self, record: Self::Record) -> Result<Self::Record>;
}
