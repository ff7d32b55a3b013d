//! Configuration for the retrieval engine.

use std::path::PathBuf;
use std::time::Duration;

use loupe_directory_watcher::{DEFAULT_DEBOUNCE, FileFilter};
use serde::{Deserialize, Serialize};

/// Default maximum words per chunk, matching typical embedding-model
/// input limits.
pub const DEFAULT_MAX_CHUNK_WORDS: usize = 512;

/// Default characters of chunk text retained for result previews.
pub const DEFAULT_PREVIEW_CHARS: usize = 240;

/// Default per-file character budget for Q&A context assembly.
pub const DEFAULT_CONTEXT_CHARS: usize = 2000;

/// Configuration for the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Project root to index and watch.
    pub root: PathBuf,

    /// Maximum words per chunk.
    pub max_chunk_words: usize,

    /// Characters of chunk text retained for previews.
    pub preview_chars: usize,

    /// File eligibility rules shared by indexer and watcher.
    pub filter: FileFilter,

    /// Debounce window for watch-triggered re-indexing, in seconds.
    pub debounce_secs: u64,

    /// Per-file character budget for Q&A context assembly.
    pub context_chars_per_file: usize,

    /// Index name prefix; watch-triggered re-indexes save here when set.
    pub index_prefix: Option<PathBuf>,
}

impl RetrievalConfig {
    /// Create a configuration with default values for a project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_chunk_words: DEFAULT_MAX_CHUNK_WORDS,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            filter: FileFilter::new(),
            debounce_secs: DEFAULT_DEBOUNCE.as_secs(),
            context_chars_per_file: DEFAULT_CONTEXT_CHARS,
            index_prefix: None,
        }
    }

    /// Set the maximum words per chunk.
    pub fn with_max_chunk_words(mut self, max_words: usize) -> Self {
        self.max_chunk_words = max_words;
        self
    }

    /// Set the preview length in characters.
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Set the file eligibility filter.
    pub fn with_filter(mut self, filter: FileFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the debounce window in seconds.
    pub fn with_debounce_secs(mut self, secs: u64) -> Self {
        self.debounce_secs = secs;
        self
    }

    /// Set the per-file character budget for Q&A context.
    pub fn with_context_chars_per_file(mut self, chars: usize) -> Self {
        self.context_chars_per_file = chars;
        self
    }

    /// Set the index prefix used for watch-triggered saves.
    pub fn with_index_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.index_prefix = Some(prefix.into());
        self
    }

    /// The debounce window as a [`Duration`].
    pub fn debounce_window(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }
}
