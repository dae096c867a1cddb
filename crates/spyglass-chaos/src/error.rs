//! Error types for chaos configuration.

use std::time::Duration;

use thiserror::Error;

use spyglass_core::StorageError;

/// Errors from chaos configuration updates.
#[derive(Debug, Error)]
pub enum ChaosError {
    /// The requested latency range has `min > max`.
    #[error("Invalid latency range: min {min:?} exceeds max {max:?}")]
    InvalidLatencyRange {
        /// Requested lower bound.
        min: Duration,
        /// Requested upper bound.
        max: Duration,
    },

    /// The configuration could not be persisted.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for chaos operations.
pub type ChaosResult<T> = std::result::Result<T, ChaosError>;
