//! The search engine service object.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use loupe_directory_watcher::{ProjectWatcher, Reindexer};
use loupe_embeddings::EmbeddingProvider;
use loupe_index::IndexStore;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::indexer::{IndexSummary, Indexer};
use crate::search::{self, ChunkHit, FileHit};

/// How the startup index was obtained.
#[derive(Debug, Clone)]
pub enum IndexSource {
    /// Restored from a saved artifact pair.
    Loaded {
        /// Number of files in the restored index.
        files: usize,
    },

    /// Built fresh by walking the project tree.
    Built(IndexSummary),
}

/// Statistics about the search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Number of indexed files.
    pub indexed_files: usize,

    /// Number of indexed chunks.
    pub indexed_chunks: usize,

    /// Embedding dimension of the index, if populated.
    pub dimension: Option<usize>,
}

/// The semantic search service.
///
/// Constructed once at startup and passed around by handle; there is no
/// module-level state. The index store is the only shared mutable
/// resource: indexing, single-path updates, and load take the write lock,
/// while searches and save take read locks and may run concurrently with
/// each other.
pub struct SearchEngine {
    /// Engine configuration.
    config: RetrievalConfig,

    /// Embedding provider shared with the indexer.
    provider: Arc<dyn EmbeddingProvider>,

    /// Tree walker and per-file embedder.
    indexer: Indexer,

    /// The index store behind the write-exclusion lock.
    store: Arc<RwLock<IndexStore>>,
}

impl SearchEngine {
    /// Create an engine for a project root.
    pub fn new(config: RetrievalConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let indexer = Indexer::new(provider.clone(), config.clone());
        Self {
            config,
            provider,
            indexer,
            store: Arc::new(RwLock::new(IndexStore::new())),
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Walk the whole project tree and rebuild the index.
    pub async fn index_project(&self) -> Result<IndexSummary> {
        let mut store = self.store.write().await;
        self.indexer.index_project(&mut store).await
    }

    /// Re-index a single created or changed path, or drop a deleted one.
    pub async fn update_path(&self, absolute: &Path) -> Result<()> {
        let mut store = self.store.write().await;
        self.indexer.update_path(&mut store, absolute).await
    }

    /// Drop a single project-relative path from the index.
    pub async fn remove_path(&self, relative: &str) -> bool {
        self.store.write().await.remove(relative)
    }

    /// Persist the index under `prefix`.
    pub async fn save(&self, prefix: &Path) -> Result<()> {
        // The read lock is enough to exclude writers while the snapshot
        // is taken.
        let store = self.store.read().await;
        store.save(prefix).await?;
        Ok(())
    }

    /// Replace the index with one previously saved under `prefix`.
    pub async fn load(&self, prefix: &Path) -> Result<()> {
        let loaded = IndexStore::load(prefix).await?;
        *self.store.write().await = loaded;
        Ok(())
    }

    /// Load a saved index if one exists, otherwise build and save one.
    ///
    /// A corrupt saved index is reported and falls back to a fresh build
    /// rather than failing startup.
    pub async fn load_or_build(&self, prefix: &Path) -> Result<IndexSource> {
        if IndexStore::saved_at(prefix) {
            match self.load(prefix).await {
                Ok(()) => {
                    let files = self.store.read().await.file_count();
                    info!("Loaded existing index ({files} files)");
                    return Ok(IndexSource::Loaded { files });
                }
                Err(e) if e.is_corrupt_index() => {
                    warn!("Saved index is unusable, rebuilding: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        let summary = self.index_project().await?;
        self.save(prefix).await?;
        Ok(IndexSource::Built(summary))
    }

    /// Rank whole files against a natural-language query.
    pub async fn search_files(&self, query: &str, top_k: usize) -> Result<Vec<FileHit>> {
        let query_vector = self.provider.embed(query).await?;
        let store = self.store.read().await;
        Ok(search::search_files(&store, &query_vector, top_k))
    }

    /// Rank individual chunks against a natural-language query.
    pub async fn search_chunks(&self, query: &str, top_k: usize) -> Result<Vec<ChunkHit>> {
        let query_vector = self.provider.embed(query).await?;
        let store = self.store.read().await;
        Ok(search::search_chunks(&store, &query_vector, top_k))
    }

    /// Two-stage search: best files first, then chunks within each.
    pub async fn search_hierarchical(
        &self,
        query: &str,
        file_top_k: usize,
        chunks_per_file: usize,
    ) -> Result<Vec<ChunkHit>> {
        let query_vector = self.provider.embed(query).await?;
        let store = self.store.read().await;
        Ok(search::search_hierarchical(
            &store,
            &query_vector,
            file_top_k,
            chunks_per_file,
        ))
    }

    /// Current index statistics.
    pub async fn stats(&self) -> EngineStats {
        let store = self.store.read().await;
        EngineStats {
            indexed_files: store.file_count(),
            indexed_chunks: store.chunk_count(),
            dimension: store.dimension(),
        }
    }

    /// Create a watcher wired to this engine's root, filter, and window.
    ///
    /// Start it with a clone of the engine handle:
    ///
    /// ```rust,ignore
    /// let engine = Arc::new(SearchEngine::new(config, provider));
    /// let mut watcher = engine.watcher()?;
    /// watcher.start(engine.clone()).await?;
    /// ```
    pub fn watcher(&self) -> Result<ProjectWatcher> {
        Ok(ProjectWatcher::new(
            self.config.root.as_path(),
            self.config.filter.clone(),
            self.config.debounce_window(),
        )?)
    }
}

#[async_trait]
impl Reindexer for SearchEngine {
    async fn reindex(&self) -> anyhow::Result<()> {
        let summary = self.index_project().await?;
        if let Some(ref prefix) = self.config.index_prefix {
            self.save(prefix).await?;
        }
        info!(
            "Watch-triggered re-index complete: {} files, {} failed",
            summary.files_indexed, summary.files_failed
        );
        Ok(())
    }
}
