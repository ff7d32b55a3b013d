//! # Retrieval Engine
//!
//! This crate is the heart of loupe: semantic file and content search over
//! a project tree. It combines:
//!
//! - **Chunking**: word-bounded splitting of file content
//! - **Indexing**: tree walking, per-chunk embedding, mean-pooled file
//!   vectors, incremental single-path updates
//! - **Search**: file-level, chunk-level, and hierarchical strategies
//! - **Q&A**: context assembly over retrieved files for a completion
//!   backend
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Search Engine                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │  Embeddings  │  │ Index Store  │  │  Directory   │           │
//! │  │   Provider   │  │              │  │   Watcher    │           │
//! │  └──────────────┘  └──────────────┘  └──────────────┘           │
//! │         │                │                  │                   │
//! │         └────────────────┼──────────────────┘                   │
//! │                          ▼                                      │
//! │                  ┌──────────────┐                               │
//! │                  │ SearchEngine │                               │
//! │                  └──────────────┘                               │
//! │                          │                                      │
//! │                          ▼                                      │
//! │            search_files / search_chunks /                       │
//! │                 search_hierarchical                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use loupe_embeddings::HttpProvider;
//! use loupe_retrieval::{RetrievalConfig, SearchEngine};
//!
//! let provider = Arc::new(HttpProvider::local("bge-small", 384));
//! let engine = Arc::new(SearchEngine::new(
//!     RetrievalConfig::new("./my-project"),
//!     provider,
//! ));
//!
//! engine.load_or_build(std::path::Path::new("project_index")).await?;
//! let hits = engine.search_files("gateway architecture", 5).await?;
//!
//! let mut watcher = engine.watcher()?;
//! watcher.start(engine.clone()).await?;
//! ```

pub mod chunker;
pub mod config;
pub mod engine;
pub mod error;
pub mod indexer;
pub mod qa;
pub mod search;

pub use chunker::chunk_words;
pub use config::RetrievalConfig;
pub use engine::{EngineStats, IndexSource, SearchEngine};
pub use error::{Result, RetrievalError};
pub use indexer::{IndexSummary, Indexer};
pub use qa::{Answer, Assistant, ChatHttpClient, CompletionClient};
pub use search::{ChunkHit, FileHit};

// Re-export from dependencies for convenience
pub use loupe_directory_watcher::{FileFilter, ProjectWatcher, Reindexer};
pub use loupe_embeddings::{EmbeddingProvider, HashProvider, HttpProvider};
pub use loupe_index::{ChunkRecord, FileMeta, FileRecord, IndexStore};
