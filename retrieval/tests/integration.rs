//! End-to-end tests for the retrieval engine: index, search, persist,
//! update, and degrade paths, using the deterministic hashing provider.

use std::path::Path;
use std::sync::Arc;

use loupe_embeddings::HashProvider;
use loupe_index::IndexStore;
use loupe_retrieval::{IndexSource, RetrievalConfig, RetrievalError, SearchEngine};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn engine_for(root: &Path) -> Arc<SearchEngine> {
    Arc::new(SearchEngine::new(
        RetrievalConfig::new(root),
        Arc::new(HashProvider::new(128)),
    ))
}

/// Repeat a sentence until the text reaches `words` words.
fn repeat_to_words(sentence: &str, words: usize) -> String {
    let tokens: Vec<&str> = sentence.split_whitespace().collect();
    let mut out = Vec::with_capacity(words);
    while out.len() < words {
        out.extend_from_slice(&tokens);
    }
    out.truncate(words);
    out.join(" ")
}

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "a.py",
        &repeat_to_words("gateway interface pattern routing operations", 300),
    );
    write(
        dir.path(),
        "docs/b.md",
        &repeat_to_words("database storage engine compaction tuning", 1000),
    );
    write(dir.path(), ".git/HEAD.txt", "ref: refs/heads/main");
    write(dir.path(), "node_modules/pkg/index.json", "{}");
    write(dir.path(), "image.png", "binary-ish");
    dir
}

#[tokio::test]
async fn full_index_covers_eligible_files_only() {
    let dir = sample_project();
    let engine = engine_for(dir.path());

    let summary = engine.index_project().await.unwrap();

    assert_eq!(summary.files_indexed, 2);
    assert_eq!(summary.files_failed, 0);
    // 300 words -> 1 chunk; 1000 words -> 2 chunks at the 512-word default.
    assert_eq!(summary.chunks_indexed, 3);

    let stats = engine.stats().await;
    assert_eq!(stats.indexed_files, 2);
    assert_eq!(stats.indexed_chunks, 3);
    assert_eq!(stats.dimension, Some(128));
}

#[tokio::test]
async fn file_search_ranks_by_semantic_alignment() {
    let dir = sample_project();
    let engine = engine_for(dir.path());
    engine.index_project().await.unwrap();

    let hits = engine
        .search_files("gateway routing operations", 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "a.py");
    assert!(hits[0].score > 0.0);
    assert_eq!(hits[0].meta.chunk_count, 1);

    let hits = engine
        .search_files("database compaction tuning", 1)
        .await
        .unwrap();
    assert_eq!(hits[0].path, "docs/b.md");
}

#[tokio::test]
async fn chunk_and_hierarchical_searches() {
    let dir = sample_project();
    let engine = engine_for(dir.path());
    engine.index_project().await.unwrap();

    // Chunk search may return several chunks of the same file.
    let chunks = engine
        .search_chunks("database storage engine", 10)
        .await
        .unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].path, "docs/b.md");
    assert!(!chunks[0].preview.is_empty());

    // Hierarchical output is grouped by file in file-rank order.
    let hits = engine
        .search_hierarchical("database storage engine", 2, 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].path, "docs/b.md");
    assert_eq!(hits[1].path, "a.py");

    // Degenerate parameters yield empty results, not errors.
    assert!(
        engine
            .search_hierarchical("anything", 0, 5)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(engine.search_files("anything", 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn save_and_load_round_trip_preserves_behavior() {
    let dir = sample_project();
    let engine = engine_for(dir.path());
    engine.index_project().await.unwrap();

    let prefix = dir.path().join(".index/project");
    engine.save(&prefix).await.unwrap();

    let restored = engine_for(dir.path());
    restored.load(&prefix).await.unwrap();

    let stats = engine.stats().await;
    let restored_stats = restored.stats().await;
    assert_eq!(stats.indexed_files, restored_stats.indexed_files);
    assert_eq!(stats.indexed_chunks, restored_stats.indexed_chunks);

    // Identical queries produce identical rankings and near-identical
    // scores.
    let before = engine.search_files("gateway routing", 5).await.unwrap();
    let after = restored.search_files("gateway routing", 5).await.unwrap();
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.path, a.path);
        assert!((b.score - a.score).abs() < 1e-6);
    }
}

#[tokio::test]
async fn load_fails_cleanly_on_missing_artifacts() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(dir.path());

    let result = engine.load(&dir.path().join("no_such_prefix")).await;
    match result {
        Err(e) => assert!(e.is_corrupt_index()),
        Ok(()) => panic!("load of a missing index must fail"),
    }
}

#[tokio::test]
async fn load_or_build_recovers_from_corrupt_index() {
    let dir = sample_project();
    let engine = engine_for(dir.path());

    let prefix = dir.path().join("project_index");
    engine.index_project().await.unwrap();
    engine.save(&prefix).await.unwrap();

    // Corrupt the pair by deleting the metadata document.
    let mut metadata = prefix.as_os_str().to_os_string();
    metadata.push("_metadata.json");
    std::fs::remove_file(metadata).unwrap();
    assert!(!IndexStore::saved_at(&prefix));

    let fresh = engine_for(dir.path());
    let source = fresh.load_or_build(&prefix).await.unwrap();
    assert!(matches!(source, IndexSource::Built(_)));
    assert_eq!(fresh.stats().await.indexed_files, 2);
    // The rebuild re-saved a usable pair.
    assert!(IndexStore::saved_at(&prefix));
}

#[tokio::test]
async fn incremental_update_replaces_and_removes() {
    let dir = sample_project();
    let engine = engine_for(dir.path());
    engine.index_project().await.unwrap();

    // Grow a.py past one chunk and update just that path.
    write(
        dir.path(),
        "a.py",
        &repeat_to_words("gateway interface pattern routing operations", 700),
    );
    engine.update_path(&dir.path().join("a.py")).await.unwrap();

    let chunks = engine.search_chunks("gateway routing", 10).await.unwrap();
    let a_py_chunks = chunks.iter().filter(|c| c.path == "a.py").count();
    assert_eq!(a_py_chunks, 2);

    // Delete it and update again: every trace disappears.
    std::fs::remove_file(dir.path().join("a.py")).unwrap();
    engine.update_path(&dir.path().join("a.py")).await.unwrap();

    let stats = engine.stats().await;
    assert_eq!(stats.indexed_files, 1);
    let hits = engine.search_files("gateway routing", 10).await.unwrap();
    assert!(hits.iter().all(|h| h.path != "a.py"));
    let chunks = engine.search_chunks("gateway routing", 10).await.unwrap();
    assert!(chunks.iter().all(|c| c.path != "a.py"));
}

#[tokio::test]
async fn remove_path_drops_records_directly() {
    let dir = sample_project();
    let engine = engine_for(dir.path());
    engine.index_project().await.unwrap();

    assert!(engine.remove_path("docs/b.md").await);
    assert!(!engine.remove_path("docs/b.md").await);
    assert_eq!(engine.stats().await.indexed_files, 1);
}

#[tokio::test]
async fn unreadable_file_does_not_abort_indexing() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    write(dir.path(), "fine.md", "perfectly readable");
    write(dir.path(), "locked.md", "no access");
    std::fs::set_permissions(
        dir.path().join("locked.md"),
        std::fs::Permissions::from_mode(0o000),
    )
    .unwrap();

    let engine = engine_for(dir.path());
    let summary = engine.index_project().await.unwrap();

    // Root runs bypass permission checks; only assert no abort and that
    // the readable file is always present.
    assert!(summary.files_indexed >= 1);
    let hits = engine.search_files("perfectly readable", 5).await.unwrap();
    assert!(hits.iter().any(|h| h.path == "fine.md"));
}

#[tokio::test]
async fn concurrent_searches_share_the_store() {
    let dir = sample_project();
    let engine = engine_for(dir.path());
    engine.index_project().await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine.search_files("gateway routing", 3).await
        }));
    }

    for handle in handles {
        let hits = handle.await.unwrap().unwrap();
        assert_eq!(hits[0].path, "a.py");
    }
}

#[tokio::test]
async fn update_path_outside_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let engine = engine_for(dir.path());

    let result = engine.update_path(Path::new("/etc/hosts.txt")).await;
    assert!(matches!(result, Err(RetrievalError::OutsideRoot(_))));
}
