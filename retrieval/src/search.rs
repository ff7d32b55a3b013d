//! Search strategies over the index store.
//!
//! All three strategies are pure read-only functions over the current
//! store snapshot: cosine similarity against every candidate, a stable
//! descending sort (score ties keep insertion order), and truncation to
//! the requested result count. The engine embeds the query and takes the
//! read lock before calling in here.

use loupe_embeddings::similarity::cosine_similarity;
use loupe_index::{FileMeta, IndexStore};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// A file-level search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileHit {
    /// Project-relative path of the file.
    pub path: String,

    /// Cosine similarity to the query, in `[-1, 1]`.
    pub score: f32,

    /// Metadata of the file.
    pub meta: FileMeta,
}

/// A chunk-level search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkHit {
    /// Project-relative path of the owning file.
    pub path: String,

    /// 0-based chunk position within the file.
    pub chunk_index: u32,

    /// Leading characters of the chunk text.
    pub preview: String,

    /// Cosine similarity to the query, in `[-1, 1]`.
    pub score: f32,
}

/// Rank whole files against a query vector.
///
/// Returns at most `top_k` hits in descending score order. An empty store
/// or `top_k == 0` yields an empty vector.
pub fn search_files(store: &IndexStore, query: &[f32], top_k: usize) -> Vec<FileHit> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut hits: Vec<FileHit> = store
        .files()
        .filter_map(|record| {
            let score = cosine_similarity(query, &record.vector).ok()?;
            let meta = store.meta(&record.path)?.clone();
            Some(FileHit {
                path: record.path.clone(),
                score,
                meta,
            })
        })
        .collect();

    hits.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
    hits.truncate(top_k);
    hits
}

/// Rank individual chunks against a query vector.
///
/// Operates over the full chunk set, so `top_k` may legitimately exceed
/// the number of distinct files.
pub fn search_chunks(store: &IndexStore, query: &[f32], top_k: usize) -> Vec<ChunkHit> {
    if top_k == 0 {
        return Vec::new();
    }

    let mut hits: Vec<ChunkHit> = store
        .chunks()
        .filter_map(|record| {
            let score = cosine_similarity(query, &record.vector).ok()?;
            Some(ChunkHit {
                path: record.path.clone(),
                chunk_index: record.chunk_index,
                preview: record.text_preview.clone(),
                score,
            })
        })
        .collect();

    hits.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
    hits.truncate(top_k);
    hits
}

/// Two-stage search: best files first, then the best chunks within each.
///
/// Stage 1 ranks files and keeps `file_top_k` candidates; stage 2 ranks
/// each candidate's own chunks and keeps `chunks_per_file` of them. The
/// output concatenates the per-file groups in stage-1 rank order — it is
/// deliberately not re-sorted globally, so chunks stay grouped with the
/// files that earned their place.
pub fn search_hierarchical(
    store: &IndexStore,
    query: &[f32],
    file_top_k: usize,
    chunks_per_file: usize,
) -> Vec<ChunkHit> {
    if file_top_k == 0 || chunks_per_file == 0 {
        return Vec::new();
    }

    let mut results = Vec::new();
    for file_hit in search_files(store, query, file_top_k) {
        let mut hits: Vec<ChunkHit> = store
            .chunks_for(&file_hit.path)
            .filter_map(|record| {
                let score = cosine_similarity(query, &record.vector).ok()?;
                Some(ChunkHit {
                    path: record.path.clone(),
                    chunk_index: record.chunk_index,
                    preview: record.text_preview.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
        hits.truncate(chunks_per_file);
        results.extend(hits);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_index::{ChunkRecord, FileRecord};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn add(store: &mut IndexStore, path: &str, file_vector: Vec<f32>, chunk_vectors: Vec<Vec<f32>>) {
        let chunks: Vec<ChunkRecord> = chunk_vectors
            .into_iter()
            .enumerate()
            .map(|(i, vector)| ChunkRecord {
                path: path.to_string(),
                chunk_index: i as u32,
                text_preview: format!("{path} chunk {i}"),
                vector,
            })
            .collect();
        let meta = FileMeta {
            absolute_path: PathBuf::from("/project").join(path),
            extension: "txt".to_string(),
            size_bytes: 1,
            chunk_count: chunks.len() as u32,
        };
        let file = FileRecord {
            path: path.to_string(),
            extension: "txt".to_string(),
            size_bytes: 1,
            vector: file_vector,
        };
        store.upsert(file, chunks, meta).unwrap();
    }

    fn sample_store() -> IndexStore {
        let mut store = IndexStore::new();
        // "far" points away from the query axis, "near" along it,
        // "middle" in between.
        add(&mut store, "far.txt", vec![0.0, 1.0], vec![vec![0.0, 1.0]]);
        add(
            &mut store,
            "near.txt",
            vec![1.0, 0.0],
            vec![vec![1.0, 0.0], vec![0.9, 0.1]],
        );
        add(
            &mut store,
            "middle.txt",
            vec![0.7, 0.7],
            vec![vec![0.7, 0.7]],
        );
        store
    }

    #[test]
    fn test_search_files_orders_by_score() {
        let store = sample_store();
        let hits = search_files(&store, &[1.0, 0.0], 10);

        let order: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(order, vec!["near.txt", "middle.txt", "far.txt"]);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_search_files_truncates_to_top_k() {
        let store = sample_store();
        assert_eq!(search_files(&store, &[1.0, 0.0], 2).len(), 2);
        assert_eq!(search_files(&store, &[1.0, 0.0], 100).len(), 3);
    }

    #[test]
    fn test_search_files_top_k_zero() {
        let store = sample_store();
        assert!(search_files(&store, &[1.0, 0.0], 0).is_empty());
    }

    #[test]
    fn test_search_empty_store() {
        let store = IndexStore::new();
        assert!(search_files(&store, &[1.0, 0.0], 5).is_empty());
        assert!(search_chunks(&store, &[1.0, 0.0], 5).is_empty());
        assert!(search_hierarchical(&store, &[1.0, 0.0], 5, 5).is_empty());
    }

    #[test]
    fn test_score_ties_keep_insertion_order() {
        let mut store = IndexStore::new();
        add(&mut store, "second.txt", vec![1.0, 0.0], vec![vec![1.0, 0.0]]);
        add(&mut store, "first.txt", vec![2.0, 0.0], vec![vec![2.0, 0.0]]);

        // Cosine is scale-invariant: both score exactly 1.0.
        let hits = search_files(&store, &[1.0, 0.0], 2);
        let order: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(order, vec!["second.txt", "first.txt"]);
    }

    #[test]
    fn test_search_chunks_can_return_several_per_file() {
        let store = sample_store();
        let hits = search_chunks(&store, &[1.0, 0.0], 3);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].path, "near.txt");
        assert_eq!(hits[1].path, "near.txt");
        assert_eq!((hits[0].chunk_index, hits[1].chunk_index), (0, 1));
    }

    #[test]
    fn test_hierarchical_keeps_file_rank_order() {
        let mut store = IndexStore::new();
        // best.txt wins at file level, but worse.txt holds the single
        // highest-scoring chunk. The locality bias must keep best.txt's
        // chunks first anyway.
        add(
            &mut store,
            "best.txt",
            vec![1.0, 0.0],
            vec![vec![0.8, 0.2], vec![0.7, 0.3]],
        );
        add(
            &mut store,
            "worse.txt",
            vec![0.5, 0.5],
            vec![vec![1.0, 0.0]],
        );

        let hits = search_hierarchical(&store, &[1.0, 0.0], 2, 1);
        let order: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(order, vec!["best.txt", "worse.txt"]);
        // Within best.txt the higher-scoring chunk was selected.
        assert_eq!(hits[0].chunk_index, 0);
    }

    #[test]
    fn test_hierarchical_zero_parameters() {
        let store = sample_store();
        assert!(search_hierarchical(&store, &[1.0, 0.0], 0, 5).is_empty());
        assert!(search_hierarchical(&store, &[1.0, 0.0], 5, 0).is_empty());
    }

    #[test]
    fn test_hierarchical_bounds() {
        let store = sample_store();
        let hits = search_hierarchical(&store, &[1.0, 0.0], 2, 2);

        // At most chunks_per_file chunks from each of the top files.
        assert!(hits.len() <= 4);
        let near_chunks = hits.iter().filter(|h| h.path == "near.txt").count();
        assert!(near_chunks <= 2);
    }

    #[test]
    fn test_dimension_mismatch_yields_no_hits() {
        let store = sample_store();
        // A query of the wrong dimension cannot be scored against any
        // record; degrade to zero results rather than failing.
        assert!(search_files(&store, &[1.0, 0.0, 0.0], 5).is_empty());
    }
}
