//! Record types stored in the index.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One indexed file with its mean-pooled embedding.
///
/// `path` is the project-root-relative path with `/` separators and is the
/// unique key of the file across the whole index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Project-relative path.
    pub path: String,

    /// File extension (without the leading dot).
    pub extension: String,

    /// Size of the file content in bytes.
    pub size_bytes: u64,

    /// Mean of the file's chunk embeddings.
    pub vector: Vec<f32>,
}

/// One embedded chunk of a file.
///
/// Chunk indices for a path are contiguous from 0 with no gaps;
/// re-indexing a file replaces all of its chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Project-relative path of the owning file.
    pub path: String,

    /// 0-based position of this chunk within the file.
    pub chunk_index: u32,

    /// Leading characters of the chunk text, for result display.
    pub text_preview: String,

    /// The chunk embedding.
    pub vector: Vec<f32>,
}

/// Metadata document entry for an indexed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// Absolute path on disk.
    pub absolute_path: PathBuf,

    /// File extension (without the leading dot).
    pub extension: String,

    /// Size of the file content in bytes.
    pub size_bytes: u64,

    /// Number of chunks the file was split into.
    pub chunk_count: u32,
}

/// Composite identity of a chunk within the persisted vector container.
pub fn chunk_key(path: &str, chunk_index: u32) -> String {
    format!("{path}#{chunk_index}")
}

/// Split a composite chunk key back into its path and chunk index.
pub fn split_chunk_key(key: &str) -> Option<(&str, u32)> {
    let (path, index) = key.rsplit_once('#')?;
    let index = index.parse().ok()?;
    Some((path, index))
}
