//! Integration tests for the index manager lifecycle.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

use librarian_core::{CoreError, IndexManager, LibrarianConfig, ManagerState};
use librarian_indexer::IndexerError;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn paths(records: &[librarian_indexer::FileRecord]) -> Vec<&str> {
    records.iter().map(|r| r.relative_path.as_str()).collect()
}

#[tokio::test]
async fn test_end_to_end_python_repo() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write(root, "src/app.py", "def main(): pass\n");
    write(root, "src/app.test.py", "def test_main(): pass\n");
    write(root, "README.md", "# App\n");
    write(root, ".gitignore", "*.test.py\n");

    let manager = IndexManager::new(root, LibrarianConfig::default());

    let python = manager.search_by_type("python", None, 100).await.unwrap();
    assert_eq!(paths(&python), vec!["src/app.py"]);

    let app = manager.search_files("app", false, 100).await.unwrap();
    assert_eq!(paths(&app), vec!["src/app.py"]);

    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.total_files, 2);

    // The persisted document is the one the next process would load.
    let text = std::fs::read_to_string(manager.store().path()).unwrap();
    assert!(text.contains("src/app.py"));
    assert!(!text.contains("app.test.py"));
}

#[tokio::test]
async fn test_refresh_is_atomic_for_readers() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path().to_path_buf();
    for i in 0..20 {
        write(&root, &format!("old/file_{}.rs", i), "old");
    }

    let manager = Arc::new(IndexManager::new(&root, LibrarianConfig::default()));
    let old: BTreeSet<String> = manager.index().await.unwrap().records.keys().cloned().collect();

    std::fs::remove_dir_all(root.join("old")).unwrap();
    for i in 0..200 {
        write(&root, &format!("new/file_{}.rs", i), "new");
    }

    let reader = {
        let manager = manager.clone();
        tokio::spawn(async move {
            let mut seen = Vec::new();
            for _ in 0..200 {
                let records = manager.search_files("file_", false, 0).await.unwrap();
                let keys: BTreeSet<String> =
                    records.into_iter().map(|r| r.relative_path).collect();
                seen.push(keys);
                tokio::task::yield_now().await;
            }
            seen
        })
    };

    manager.refresh().await.unwrap();
    let new: BTreeSet<String> = manager.index().await.unwrap().records.keys().cloned().collect();
    assert_eq!(new.len(), 200);

    for keys in reader.await.unwrap() {
        assert!(keys == old || keys == new, "reader saw a mixed snapshot");
    }
}

#[tokio::test]
async fn test_concurrent_refreshes_both_complete() {
    let temp_dir = tempdir().unwrap();
    write(temp_dir.path(), "a.rs", "fn a() {}");

    let manager = Arc::new(IndexManager::new(temp_dir.path(), LibrarianConfig::default()));
    manager.index().await.unwrap();

    let (first, second) = tokio::join!(manager.refresh(), manager.refresh());
    assert_eq!(first.unwrap().files_indexed, 1);
    assert_eq!(second.unwrap().files_indexed, 1);
    assert_eq!(manager.state(), ManagerState::Ready);
}

fn corrupt_schema(path: &Path) {
    let text = std::fs::read_to_string(path).unwrap();
    std::fs::write(path, text.replace("schema_version: 1", "schema_version: 7")).unwrap();
}

#[tokio::test]
async fn test_schema_mismatch_rebuilds_by_default() {
    let temp_dir = tempdir().unwrap();
    write(temp_dir.path(), "a.rs", "fn a() {}");

    let first = IndexManager::new(temp_dir.path(), LibrarianConfig::default());
    first.index().await.unwrap();
    corrupt_schema(first.store().path());

    let second = IndexManager::new(temp_dir.path(), LibrarianConfig::default());
    let index = second.index().await.unwrap();
    assert_eq!(index.len(), 1);

    // The rebuilt document is current again.
    let text = std::fs::read_to_string(second.store().path()).unwrap();
    assert!(text.contains("schema_version: 1"));
}

#[tokio::test]
async fn test_schema_mismatch_surfaced_when_rebuild_disabled() {
    let temp_dir = tempdir().unwrap();
    write(temp_dir.path(), "a.rs", "fn a() {}");

    let first = IndexManager::new(temp_dir.path(), LibrarianConfig::default());
    first.index().await.unwrap();
    corrupt_schema(first.store().path());

    let config = LibrarianConfig {
        rebuild_on_invalid_index: false,
        ..Default::default()
    };
    let second = IndexManager::new(temp_dir.path(), config);
    let err = second.index().await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Indexer(IndexerError::SchemaMismatch {
            found: Some(7),
            ..
        })
    ));
    assert_eq!(second.state(), ManagerState::Unloaded);
}

#[tokio::test]
async fn test_garbage_index_rebuilt() {
    let temp_dir = tempdir().unwrap();
    write(temp_dir.path(), "a.rs", "fn a() {}");
    write(temp_dir.path(), ".claude/workspace/workspace.yml", ": : not yaml [");

    let manager = IndexManager::new(temp_dir.path(), LibrarianConfig::default());
    assert_eq!(manager.index().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_independent_managers_do_not_share_state() {
    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    write(dir_a.path(), "only_a.rs", "a");
    write(dir_b.path(), "only_b.rs", "b");

    let a = IndexManager::new(dir_a.path(), LibrarianConfig::default());
    let b = IndexManager::new(dir_b.path(), LibrarianConfig::default());

    assert_eq!(paths(&a.search_files("only", false, 0).await.unwrap()), vec!["only_a.rs"]);
    assert_eq!(paths(&b.search_files("only", false, 0).await.unwrap()), vec!["only_b.rs"]);
}

#[tokio::test]
async fn test_shared_index_path_across_repositories() {
    let temp_dir = tempdir().unwrap();
    let repo_a = temp_dir.path().join("repo_a");
    let repo_b = temp_dir.path().join("repo_b");
    write(&repo_a, "a.rs", "fn a() {}");
    write(&repo_b, "b.rs", "fn b() {}");

    let shared = LibrarianConfig {
        index_path: temp_dir.path().join("index.yml"),
        ..Default::default()
    };
    IndexManager::new(&repo_a, shared.clone())
        .index()
        .await
        .unwrap();

    let strict = LibrarianConfig {
        rebuild_on_invalid_index: false,
        ..shared.clone()
    };
    let err = IndexManager::new(&repo_b, strict).index().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Indexer(IndexerError::InvalidIndex { .. })
    ));

    let manager = IndexManager::new(&repo_b, shared);
    let index = manager.index().await.unwrap();
    assert_eq!(index.len(), 1);
    assert!(index.get("b.rs").is_some());
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_symlink_counted_in_stats() {
    let temp_dir = tempdir().unwrap();
    write(temp_dir.path(), "a.rs", "fn a() {}");
    std::os::unix::fs::symlink(
        temp_dir.path().join("deleted.rs"),
        temp_dir.path().join("dangling.rs"),
    )
    .unwrap();

    let manager = IndexManager::new(temp_dir.path(), LibrarianConfig::default());
    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.total_files, 1);
    assert_eq!(stats.skipped_files, 1);

    // The count survives a reload from disk.
    let reloaded = IndexManager::new(temp_dir.path(), LibrarianConfig::default());
    assert_eq!(reloaded.stats().await.unwrap().skipped_files, 1);
}
