//! Tree-walking indexer.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use loupe_embeddings::{EmbeddingProvider, similarity};
use loupe_index::{ChunkRecord, FileMeta, FileRecord, IndexStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::chunker::{chunk_words, truncate_chars};
use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};

/// Result of an indexing operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Number of files successfully indexed.
    pub files_indexed: usize,

    /// Number of files skipped because reading or embedding them failed.
    pub files_failed: usize,

    /// Number of chunks embedded across all indexed files.
    pub chunks_indexed: usize,

    /// Time taken in milliseconds.
    pub duration_ms: u64,
}

/// Walks the project tree and populates the index store.
///
/// The indexer never holds the store; callers pass a mutable reference
/// under whatever write exclusion they use (the engine serializes writers
/// behind one lock).
pub struct Indexer {
    provider: Arc<dyn EmbeddingProvider>,
    config: RetrievalConfig,
}

impl Indexer {
    /// Create an indexer.
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: RetrievalConfig) -> Self {
        Self { provider, config }
    }

    /// Index the whole project tree.
    ///
    /// Excluded directories are pruned from the walk entirely; files are
    /// indexed only if their extension is on the allow-list. A single
    /// file's failure is logged and counted, never aborting the walk.
    /// Paths indexed previously but no longer present are removed.
    pub async fn index_project(&self, store: &mut IndexStore) -> Result<IndexSummary> {
        let start = Instant::now();
        let mut summary = IndexSummary::default();
        let mut seen: HashSet<String> = HashSet::new();

        let files: Vec<_> = WalkDir::new(&self.config.root)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir()
                        && entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| self.config.filter.is_excluded_dir(name)))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("walk error: {e}");
                    None
                }
            })
            .filter(|entry| {
                entry.file_type().is_file() && self.config.filter.matches_extension(entry.path())
            })
            .collect();

        for entry in files {
            match self.index_file(store, entry.path()).await {
                Ok((relative, chunks)) => {
                    seen.insert(relative);
                    summary.files_indexed += 1;
                    summary.chunks_indexed += chunks;
                }
                Err(e) => {
                    warn!("Failed to index {}: {e}", entry.path().display());
                    summary.files_failed += 1;
                }
            }
        }

        // Drop records of files that disappeared since the previous run.
        for path in store.paths() {
            if !seen.contains(&path) {
                store.remove(&path);
            }
        }

        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Indexed {} files ({} chunks) in {}ms, {} failed",
            summary.files_indexed, summary.chunks_indexed, summary.duration_ms, summary.files_failed
        );
        Ok(summary)
    }

    /// Bring the records of one path up to date after a change event.
    ///
    /// A deleted or no-longer-eligible path is removed from the store; an
    /// existing eligible file is re-read and re-embedded. Nothing else in
    /// the store is touched.
    pub async fn update_path(&self, store: &mut IndexStore, absolute: &Path) -> Result<()> {
        let relative = self.relative_key(absolute)?;

        if !absolute.exists() {
            if store.remove(&relative) {
                info!("Removed deleted file from index: {relative}");
            }
            return Ok(());
        }
        if absolute.is_dir() {
            return Ok(());
        }
        if !self.config.filter.is_eligible(Path::new(&relative)) {
            store.remove(&relative);
            return Ok(());
        }

        self.index_file(store, absolute).await?;
        Ok(())
    }

    /// Index a single file; returns its relative key and chunk count.
    async fn index_file(&self, store: &mut IndexStore, absolute: &Path) -> Result<(String, usize)> {
        let relative = self.relative_key(absolute)?;

        let bytes = tokio::fs::read(absolute).await?;
        // Invalid bytes are replaced rather than failing the whole file.
        let content = String::from_utf8_lossy(&bytes);

        let chunks = chunk_words(&content, self.config.max_chunk_words);
        let vectors = self.provider.embed_batch(&chunks).await?;
        let file_vector = similarity::mean(&vectors)?;

        let extension = absolute
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_string();
        let size_bytes = bytes.len() as u64;

        let chunk_records: Vec<ChunkRecord> = chunks
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (text, vector))| ChunkRecord {
                path: relative.clone(),
                chunk_index: i as u32,
                text_preview: truncate_chars(text, self.config.preview_chars).to_string(),
                vector,
            })
            .collect();
        let chunk_count = chunk_records.len();

        let meta = FileMeta {
            absolute_path: absolute.to_path_buf(),
            extension: extension.clone(),
            size_bytes,
            chunk_count: chunk_count as u32,
        };
        let file = FileRecord {
            path: relative.clone(),
            extension,
            size_bytes,
            vector: file_vector,
        };
        store.upsert(file, chunk_records, meta)?;

        debug!("Indexed {relative} ({chunk_count} chunks)");
        Ok((relative, chunk_count))
    }

    /// Project-relative key for an absolute path, with `/` separators.
    fn relative_key(&self, absolute: &Path) -> Result<String> {
        let relative = absolute
            .strip_prefix(&self.config.root)
            .map_err(|_| RetrievalError::OutsideRoot(absolute.to_path_buf()))?;

        let parts: Vec<&str> = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        Ok(parts.join("/"))
    }
}
