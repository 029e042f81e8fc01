//! Index lifecycle management.
//!
//! The manager owns the current snapshot for one repository. Readers take a
//! cheap `Arc<Index>` clone and query it without holding any lock, so a
//! refresh never exposes a half-built index. Builds and refreshes are
//! serialized on an async mutex; a refresh that arrives while another is
//! running waits for it and then scans again.

use crate::{CoreError, LibrarianConfig};
use librarian_indexer::{
    FileRecord, FileType, IgnoreRuleSet, Index, IndexStats, IndexStore, IndexerError, Scanner,
    SearchEngine,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Lifecycle state of an [`IndexManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerState {
    /// No snapshot in memory
    Unloaded,
    /// First load or build in progress
    Loading,
    /// Snapshot available
    Ready,
    /// Snapshot available, replacement being built
    Refreshing,
}

/// Outcome of a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub files_indexed: usize,
    pub skipped_files: usize,
    pub duration_ms: u64,
}

/// Static facts about the managed repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub repository_root: PathBuf,
    pub supported_types: Vec<FileType>,
    pub index_path: PathBuf,
}

/// Owns the index of one repository.
pub struct IndexManager {
    /// Repository root
    root: PathBuf,
    config: LibrarianConfig,
    store: IndexStore,
    scanner: Scanner,
    /// Current snapshot, replaced whole on refresh
    snapshot: RwLock<Option<Arc<Index>>>,
    state: RwLock<ManagerState>,
    /// Serializes builds and refreshes
    build_lock: Mutex<()>,
}

impl IndexManager {
    /// Create a manager for `root`. Nothing is loaded until first use.
    pub fn new(root: impl Into<PathBuf>, config: LibrarianConfig) -> Self {
        let root = root.into();
        let store = IndexStore::new(config.resolve_index_path(&root));

        Self {
            root,
            config,
            store,
            scanner: Scanner::new(),
            snapshot: RwLock::new(None),
            state: RwLock::new(ManagerState::Unloaded),
            build_lock: Mutex::new(()),
        }
    }

    /// Replace the scanner (custom scan options).
    pub fn with_scanner(mut self, scanner: Scanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &LibrarianConfig {
        &self.config
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn state(&self) -> ManagerState {
        *self.state.read()
    }

    /// The snapshot currently in memory, without loading.
    pub fn current(&self) -> Option<Arc<Index>> {
        self.snapshot.read().clone()
    }

    /// Get the current snapshot, loading or building it on first access.
    pub async fn index(&self) -> Result<Arc<Index>, CoreError> {
        if let Some(index) = self.current() {
            return Ok(index);
        }

        let _guard = self.build_lock.lock().await;

        // Another caller may have loaded it while we waited
        if let Some(index) = self.current() {
            return Ok(index);
        }

        self.set_state(ManagerState::Loading);

        match self.load_or_build().await {
            Ok(index) => {
                let index = Arc::new(index);
                *self.snapshot.write() = Some(index.clone());
                self.set_state(ManagerState::Ready);
                Ok(index)
            }
            Err(e) => {
                self.set_state(ManagerState::Unloaded);
                Err(e)
            }
        }
    }

    /// Re-scan the repository and atomically replace the snapshot.
    pub async fn refresh(&self) -> Result<RefreshSummary, CoreError> {
        let _guard = self.build_lock.lock().await;
        let start = Instant::now();

        let had_snapshot = self.current().is_some();
        self.set_state(if had_snapshot {
            ManagerState::Refreshing
        } else {
            ManagerState::Loading
        });

        let index = match self.scan_index().await {
            Ok(index) => Arc::new(index),
            Err(e) => {
                warn!(root = ?self.root, error = %e, "Refresh failed, keeping previous index");
                self.set_state(if had_snapshot {
                    ManagerState::Ready
                } else {
                    ManagerState::Unloaded
                });
                return Err(e);
            }
        };

        *self.snapshot.write() = Some(index.clone());
        self.set_state(ManagerState::Ready);

        self.persist(&index).await;

        let summary = RefreshSummary {
            files_indexed: index.len(),
            skipped_files: index.skipped_files,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            files = summary.files_indexed,
            skipped = summary.skipped_files,
            duration_ms = summary.duration_ms,
            "Index refreshed"
        );

        Ok(summary)
    }

    /// Aggregate statistics over the current snapshot.
    pub async fn stats(&self) -> Result<IndexStats, CoreError> {
        Ok(self.index().await?.stats())
    }

    /// Substring search over relative paths.
    pub async fn search_files(
        &self,
        query: &str,
        case_sensitive: bool,
        limit: usize,
    ) -> Result<Vec<FileRecord>, CoreError> {
        let index = self.index().await?;
        let results = SearchEngine::new(&index).search_by_name(query, case_sensitive, limit);
        debug!(query, results = results.len(), "search_files");
        Ok(results.into_iter().cloned().collect())
    }

    /// Regex search over relative paths.
    pub async fn search_files_regex(
        &self,
        pattern: &str,
        case_sensitive: bool,
        limit: usize,
    ) -> Result<Vec<FileRecord>, CoreError> {
        let index = self.index().await?;
        let results = SearchEngine::new(&index).search_by_regex(pattern, case_sensitive, limit)?;
        debug!(pattern, results = results.len(), "search_files_regex");
        Ok(results.into_iter().cloned().collect())
    }

    /// Records of one file type tag, optionally filtered by path substring.
    pub async fn search_by_type(
        &self,
        file_type: &str,
        name_pattern: Option<&str>,
        limit: usize,
    ) -> Result<Vec<FileRecord>, CoreError> {
        let index = self.index().await?;
        let results = SearchEngine::new(&index).search_by_type_tag(file_type, name_pattern, limit);
        debug!(file_type, results = results.len(), "search_by_type");
        Ok(results.into_iter().cloned().collect())
    }

    pub fn config_info(&self) -> ConfigInfo {
        ConfigInfo {
            repository_root: self.root.clone(),
            supported_types: FileType::ALL.to_vec(),
            index_path: self.store.path().to_path_buf(),
        }
    }

    fn set_state(&self, state: ManagerState) {
        *self.state.write() = state;
    }

    async fn load_or_build(&self) -> Result<Index, CoreError> {
        match self.store.load().await.and_then(|loaded| self.check_root(loaded)) {
            Ok(Some(index)) => {
                info!(path = ?self.store.path(), files = index.len(), "Loaded persisted index");
                Ok(index)
            }
            Ok(None) => {
                info!(root = ?self.root, "No persisted index, building");
                self.build().await
            }
            Err(
                e @ (IndexerError::SchemaMismatch { .. } | IndexerError::InvalidIndex { .. }),
            ) if self.config.rebuild_on_invalid_index => {
                warn!(error = %e, "Persisted index unusable, rebuilding");
                self.build().await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reject a persisted index that was built for another repository.
    fn check_root(&self, loaded: Option<Index>) -> Result<Option<Index>, IndexerError> {
        let Some(index) = loaded else {
            return Ok(None);
        };

        let root = self.root.canonicalize().unwrap_or_else(|_| self.root.clone());
        if index.root_path != root {
            return Err(IndexerError::InvalidIndex {
                path: self.store.path().to_path_buf(),
                message: format!(
                    "index belongs to {}, not {}",
                    index.root_path.display(),
                    root.display()
                ),
            });
        }

        Ok(Some(index))
    }

    async fn build(&self) -> Result<Index, CoreError> {
        let index = self.scan_index().await?;
        self.persist(&index).await;
        Ok(index)
    }

    /// Save a fresh snapshot. A failed save leaves the in-memory index in use.
    async fn persist(&self, index: &Index) {
        if let Err(e) = self.store.save(index).await {
            warn!(path = ?self.store.path(), error = %e, "Failed to persist index");
        }
    }

    async fn scan_index(&self) -> Result<Index, CoreError> {
        let rules =
            IgnoreRuleSet::build_with_extra(&self.root, &self.config.extra_ignore_patterns)?;
        let scan = self.scanner.scan(&self.root, &rules).await?;
        Ok(Index::from_scan(scan))
    }
}
