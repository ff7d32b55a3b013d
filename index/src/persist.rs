//! Persistence of the index store as a companion artifact pair.
//!
//! An index name prefix maps to two files: `<prefix>_vectors.json` (the
//! vector container, keyed by file path or composite `path#chunk_index`)
//! and `<prefix>_metadata.json` (the metadata document, keyed by file
//! path). The pair is written together and must be loaded together.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::{IndexError, Result};
use crate::record::{ChunkRecord, FileMeta, FileRecord, chunk_key, split_chunk_key};
use crate::store::IndexStore;

/// On-disk form of the vector container.
#[derive(Debug, Serialize, Deserialize)]
struct VectorDoc {
    /// Embedding dimension shared by every vector in the container.
    dimension: Option<usize>,

    /// File vectors keyed by project-relative path.
    files: IndexMap<String, Vec<f32>>,

    /// Chunk entries keyed by `path#chunk_index`.
    chunks: IndexMap<String, ChunkEntry>,
}

/// On-disk form of one chunk.
#[derive(Debug, Serialize, Deserialize)]
struct ChunkEntry {
    vector: Vec<f32>,
    preview: String,
}

fn vectors_path(prefix: &Path) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push("_vectors.json");
    PathBuf::from(name)
}

fn metadata_path(prefix: &Path) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push("_metadata.json");
    PathBuf::from(name)
}

impl IndexStore {
    /// Check whether both companion artifacts exist for `prefix`.
    pub fn saved_at(prefix: &Path) -> bool {
        vectors_path(prefix).exists() && metadata_path(prefix).exists()
    }

    /// Write the complete index to the artifact pair addressed by `prefix`.
    pub async fn save(&self, prefix: &Path) -> Result<()> {
        let doc = VectorDoc {
            dimension: self.dimension(),
            files: self
                .files()
                .map(|f| (f.path.clone(), f.vector.clone()))
                .collect(),
            chunks: self
                .chunks()
                .map(|c| {
                    (
                        chunk_key(&c.path, c.chunk_index),
                        ChunkEntry {
                            vector: c.vector.clone(),
                            preview: c.text_preview.clone(),
                        },
                    )
                })
                .collect(),
        };
        let metadata: IndexMap<&String, &FileMeta> = self.metadata_entries().collect();

        let vectors_path = vectors_path(prefix);
        if let Some(parent) = vectors_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&vectors_path, serde_json::to_string(&doc)?).await?;
        fs::write(metadata_path(prefix), serde_json::to_string(&metadata)?).await?;

        info!(
            "Saved {} file vectors and {} chunk vectors to {}",
            doc.files.len(),
            doc.chunks.len(),
            prefix.display()
        );
        Ok(())
    }

    /// Load an index previously written by [`IndexStore::save`].
    ///
    /// The restored store is behaviorally indistinguishable from the one
    /// that was saved: same keys in the same order, same vectors, same
    /// metadata. Any missing artifact or disagreement between the two
    /// documents fails with [`IndexError::CorruptIndex`]; the caller is
    /// expected to fall back to building a fresh index.
    pub async fn load(prefix: &Path) -> Result<Self> {
        let vectors_path = vectors_path(prefix);
        let metadata_path = metadata_path(prefix);

        if !vectors_path.exists() || !metadata_path.exists() {
            return Err(IndexError::CorruptIndex(format!(
                "missing companion artifact for index prefix {}",
                prefix.display()
            )));
        }

        let doc: VectorDoc = serde_json::from_str(&fs::read_to_string(&vectors_path).await?)
            .map_err(|e| IndexError::CorruptIndex(format!("unreadable vector container: {e}")))?;
        let metadata: IndexMap<String, FileMeta> =
            serde_json::from_str(&fs::read_to_string(&metadata_path).await?)
                .map_err(|e| {
                    IndexError::CorruptIndex(format!("unreadable metadata document: {e}"))
                })?;

        if doc.files.len() != metadata.len() {
            return Err(IndexError::CorruptIndex(format!(
                "vector container holds {} file vectors but metadata describes {} files",
                doc.files.len(),
                metadata.len()
            )));
        }

        let mut store = IndexStore::new();
        for (path, meta) in &metadata {
            let vector = doc.files.get(path).ok_or_else(|| {
                IndexError::CorruptIndex(format!("metadata entry {path} has no file vector"))
            })?;

            let mut chunks = Vec::with_capacity(meta.chunk_count as usize);
            for i in 0..meta.chunk_count {
                let key = chunk_key(path, i);
                let entry = doc.chunks.get(&key).ok_or_else(|| {
                    IndexError::CorruptIndex(format!("missing chunk vector: {key}"))
                })?;
                chunks.push(ChunkRecord {
                    path: path.clone(),
                    chunk_index: i,
                    text_preview: entry.preview.clone(),
                    vector: entry.vector.clone(),
                });
            }

            let file = FileRecord {
                path: path.clone(),
                extension: meta.extension.clone(),
                size_bytes: meta.size_bytes,
                vector: vector.clone(),
            };
            store.upsert(file, chunks, meta.clone()).map_err(|e| match e {
                IndexError::DimensionMismatch { expected, actual } => IndexError::CorruptIndex(
                    format!("inconsistent vector dimensions for {path}: expected {expected}, got {actual}"),
                ),
                other => other,
            })?;
        }

        let expected_chunks: usize = metadata.values().map(|m| m.chunk_count as usize).sum();
        if doc.chunks.len() != expected_chunks {
            let orphan = doc
                .chunks
                .keys()
                .find(|k| {
                    split_chunk_key(k)
                        .and_then(|(p, i)| metadata.get(p).map(|m| i >= m.chunk_count))
                        .unwrap_or(true)
                })
                .cloned()
                .unwrap_or_default();
            return Err(IndexError::CorruptIndex(format!(
                "vector container holds chunks unknown to the metadata document (e.g. {orphan})"
            )));
        }

        if let Some(dim) = doc.dimension {
            if store.dimension().is_some_and(|d| d != dim) {
                return Err(IndexError::CorruptIndex(format!(
                    "vector container declares dimension {dim} but holds vectors of another size"
                )));
            }
        }

        info!(
            "Loaded {} files and {} chunks from {}",
            store.file_count(),
            store.chunk_count(),
            prefix.display()
        );
        Ok(store)
    }
}
