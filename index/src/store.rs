//! In-memory index store.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{IndexError, Result};
use crate::record::{ChunkRecord, FileMeta, FileRecord, chunk_key};

/// The in-memory store of all index records.
///
/// The store exclusively owns every [`FileRecord`], [`ChunkRecord`], and
/// [`FileMeta`]; indexing and search reach them only through the operations
/// here. File records and metadata entries always share the same key set,
/// and the chunks of a path are always contiguous from index 0 — `upsert`
/// and `remove` maintain both invariants.
///
/// Iteration order is insertion order (the maps are [`IndexMap`]s), which
/// is what makes score ties in search results stable.
#[derive(Debug, Default)]
pub struct IndexStore {
    /// File records by project-relative path.
    files: IndexMap<String, FileRecord>,

    /// Chunk records by composite `path#chunk_index` key.
    chunks: IndexMap<String, ChunkRecord>,

    /// Metadata entries by project-relative path.
    metadata: IndexMap<String, FileMeta>,

    /// Vector dimension, fixed by the first inserted record.
    dimension: Option<usize>,
}

impl IndexStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn check_dimension(&mut self, len: usize) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != len => Err(IndexError::DimensionMismatch {
                expected,
                actual: len,
            }),
            Some(_) => Ok(()),
            None => {
                self.dimension = Some(len);
                Ok(())
            }
        }
    }

    /// Insert or replace everything known about one file.
    ///
    /// Any previous records for the path are removed first, so no chunk of
    /// an older version of the file can survive a re-index. Chunk records
    /// must belong to `file.path` and be ordered contiguously from 0.
    pub fn upsert(
        &mut self,
        file: FileRecord,
        chunks: Vec<ChunkRecord>,
        meta: FileMeta,
    ) -> Result<()> {
        self.check_dimension(file.vector.len())?;
        for chunk in &chunks {
            self.check_dimension(chunk.vector.len())?;
            debug_assert_eq!(chunk.path, file.path);
        }
        debug_assert_eq!(meta.chunk_count as usize, chunks.len());

        let path = file.path.clone();
        self.remove(&path);

        self.files.insert(path.clone(), file);
        self.metadata.insert(path.clone(), meta);
        for chunk in chunks {
            self.chunks
                .insert(chunk_key(&chunk.path, chunk.chunk_index), chunk);
        }

        debug!("Upserted index records for: {path}");
        Ok(())
    }

    /// Remove a file and all of its chunks and metadata.
    ///
    /// Returns whether the path was present.
    pub fn remove(&mut self, path: &str) -> bool {
        let existed = self.files.shift_remove(path).is_some();
        self.metadata.shift_remove(path);
        self.chunks.retain(|_, chunk| chunk.path != path);

        if existed {
            debug!("Removed index records for: {path}");
        }
        existed
    }

    /// Check if a path is indexed.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Get the file record for a path.
    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    /// Get the metadata entry for a path.
    pub fn meta(&self, path: &str) -> Option<&FileMeta> {
        self.metadata.get(path)
    }

    /// Iterate all file records in insertion order.
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }

    /// Iterate all chunk records in insertion order.
    pub fn chunks(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.chunks.values()
    }

    /// Iterate the chunk records of one path, in chunk-index order.
    pub fn chunks_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ChunkRecord> {
        self.chunks.values().filter(move |c| c.path == path)
    }

    /// All indexed paths, in insertion order.
    pub fn paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    /// Number of indexed files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of indexed chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Vector dimension of the store, if any record was ever inserted.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.files.clear();
        self.chunks.clear();
        self.metadata.clear();
        debug!("Cleared index store");
    }

    pub(crate) fn metadata_entries(&self) -> impl Iterator<Item = (&String, &FileMeta)> {
        self.metadata.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::entry;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_upsert_and_lookup() {
        let mut store = IndexStore::new();
        let (file, chunks, meta) = entry("src/a.rs", vec![1.0, 0.0], vec![vec![1.0, 0.0]]);
        store.upsert(file, chunks, meta).unwrap();

        assert!(store.contains("src/a.rs"));
        assert_eq!(store.file_count(), 1);
        assert_eq!(store.chunk_count(), 1);
        assert_eq!(store.meta("src/a.rs").unwrap().chunk_count, 1);
        assert_eq!(store.dimension(), Some(2));
    }

    #[test]
    fn test_upsert_replaces_all_prior_chunks() {
        let mut store = IndexStore::new();
        let (file, chunks, meta) = entry(
            "doc.md",
            vec![0.5, 0.5],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
        );
        store.upsert(file, chunks, meta).unwrap();
        assert_eq!(store.chunk_count(), 3);

        // Re-index with fewer chunks: no index-2 residue may remain.
        let (file, chunks, meta) = entry("doc.md", vec![1.0, 0.0], vec![vec![1.0, 0.0]]);
        store.upsert(file, chunks, meta).unwrap();

        assert_eq!(store.chunk_count(), 1);
        let indices: Vec<u32> = store.chunks_for("doc.md").map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0]);
        assert_eq!(store.meta("doc.md").unwrap().chunk_count, 1);
    }

    #[test]
    fn test_remove_clears_everything() {
        let mut store = IndexStore::new();
        let (file, chunks, meta) = entry("a.txt", vec![1.0], vec![vec![1.0], vec![0.5]]);
        store.upsert(file, chunks, meta).unwrap();
        let (file, chunks, meta) = entry("b.txt", vec![0.5], vec![vec![0.5]]);
        store.upsert(file, chunks, meta).unwrap();

        assert!(store.remove("a.txt"));

        assert!(!store.contains("a.txt"));
        assert!(store.meta("a.txt").is_none());
        assert_eq!(store.chunks_for("a.txt").count(), 0);
        // The other file is untouched.
        assert!(store.contains("b.txt"));
        assert_eq!(store.chunk_count(), 1);
    }

    #[test]
    fn test_remove_missing_path() {
        let mut store = IndexStore::new();
        assert!(!store.remove("never/indexed.rs"));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut store = IndexStore::new();
        let (file, chunks, meta) = entry("a.txt", vec![1.0, 0.0], vec![vec![1.0, 0.0]]);
        store.upsert(file, chunks, meta).unwrap();

        let (file, chunks, meta) = entry("b.txt", vec![1.0, 0.0, 0.0], vec![]);
        let result = store.upsert(file, chunks, meta);
        assert!(matches!(
            result,
            Err(IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
        // The failed upsert must not leave a partial entry behind.
        assert!(!store.contains("b.txt"));
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let mut store = IndexStore::new();
        for name in ["z.txt", "a.txt", "m.txt"] {
            let (file, chunks, meta) = entry(name, vec![1.0], vec![vec![1.0]]);
            store.upsert(file, chunks, meta).unwrap();
        }

        let order: Vec<&str> = store.files().map(|f| f.path.as_str()).collect();
        assert_eq!(order, vec!["z.txt", "a.txt", "m.txt"]);
    }
}
