//! # Index Store
//!
//! This crate owns the records of the loupe semantic search index: one
//! mean-pooled vector per file, the per-chunk vectors beneath it, and the
//! metadata document that describes every indexed file. It also implements
//! persistence of the whole index as a pair of companion JSON artifacts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Index Store                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  FileRecord ──┐                                                 │
//! │  ChunkRecord ─┼──► IndexStore ──► save/load                     │
//! │  FileMeta ────┘        │                                        │
//! │                        ▼                                        │
//! │        <prefix>_vectors.json + <prefix>_metadata.json           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The two persisted artifacts must be loaded together; a missing or
//! mismatched companion surfaces as [`IndexError::CorruptIndex`].

pub mod error;
pub mod persist;
pub mod record;
pub mod store;

pub use error::{IndexError, Result};
pub use record::{ChunkRecord, FileMeta, FileRecord, chunk_key};
pub use store::IndexStore;
