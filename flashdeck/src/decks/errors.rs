//! Deck and card error types.

use thiserror::Error;

use crate::auth::AuthError;
use crate::db::StorageError;
use crate::scheduler::SchedulerError;

/// Deck and card errors
#[derive(Debug, Error)]
pub enum DeckError {
    /// Caller could not be authenticated
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Resource is absent or owned by someone else. The two cases are not
    /// distinguished.
    #[error("Not found")]
    NotFound,

    /// Unrecognised review signal
    #[error("Invalid performance: {0}")]
    InvalidPerformance(String),

    /// Rejected deck or card contents
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Concurrent reviews kept overwriting the card
    #[error("Card was modified concurrently, please retry")]
    ReviewConflict,

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<SchedulerError> for DeckError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::InvalidPerformance(value) => DeckError::InvalidPerformance(value),
        }
    }
}

impl DeckError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            DeckError::Auth(e) => e.client_message(),
            DeckError::Storage(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for deck operations
pub type DeckResult<T> = Result<T, DeckError>;
