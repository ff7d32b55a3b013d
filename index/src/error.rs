//! Error types for the index store.

use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors that can occur in the index store.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Persisted index artifacts are missing or inconsistent.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// Vector dimension disagrees with the rest of the store.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
