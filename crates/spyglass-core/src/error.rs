//! Core error types for Spyglass.

use thiserror::Error;

/// Errors from the durable key-value storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error reading or writing the backing file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored data could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
