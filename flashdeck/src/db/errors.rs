//! Storage error types.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the storage layer.
///
/// These are infrastructure failures. Domain outcomes such as "deck not found"
/// are expressed as `Option` / `bool` return values by the repositories.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Operation did not complete in time
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// A unique constraint rejected the write
    #[error("Unique constraint violated")]
    UniqueViolation,
}

impl StorageError {
    /// Classify a raw sqlx error, lifting unique-constraint failures.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::UniqueViolation
            }
            _ => StorageError::Database(err),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
