//! Error types for the retrieval engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval engine.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] loupe_embeddings::EmbeddingError),

    /// Index store error.
    #[error("index error: {0}")]
    Index(#[from] loupe_index::IndexError),

    /// Directory watcher error.
    #[error("watcher error: {0}")]
    Watcher(#[from] loupe_directory_watcher::WatcherError),

    /// Completion request failed.
    #[error("completion request failed: {0}")]
    Completion(String),

    /// Path does not live under the project root.
    #[error("path outside the project root: {0}")]
    OutsideRoot(PathBuf),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RetrievalError {
    /// Check whether this error is a corrupt saved index.
    ///
    /// Callers use this to fall back to building a fresh index instead of
    /// failing startup.
    pub fn is_corrupt_index(&self) -> bool {
        matches!(
            self,
            Self::Index(loupe_index::IndexError::CorruptIndex(_))
        )
    }
}
