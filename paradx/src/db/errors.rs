use thiserror::Error;

/// Unified error type for repository operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// A record with the same key already exists
    #[error("Unique constraint violation on key {key}")]
    UniqueViolation { key: String },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;
