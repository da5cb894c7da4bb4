//! Storage error types.

use thiserror::Error;

/// Result type alias using StorageError.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by the feature store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row could not be turned into a feature.
    #[error("Failed to decode row: {0}")]
    Decode(String),

    /// A configured table or column name is not a plain SQL identifier.
    #[error("Invalid SQL identifier: '{0}'")]
    InvalidIdentifier(String),
}
