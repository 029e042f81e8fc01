//! Persistence layer for index snapshots.
//!
//! One YAML document per repository. Loading distinguishes three outcomes:
//! no document (`Ok(None)`), a valid document, and a document that exists
//! but cannot be trusted (`SchemaMismatch` / `InvalidIndex`).

use crate::index::{Index, SCHEMA_VERSION};
use crate::IndexerError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the index document, relative to the repository root.
pub const DEFAULT_INDEX_PATH: &str = ".claude/workspace/workspace.yml";

/// Reads and writes the persisted index.
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    /// Store backed by an explicit document path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location under `root`.
    pub fn for_root(root: &Path) -> Self {
        Self::new(root.join(DEFAULT_INDEX_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted index, `Ok(None)` when no document exists.
    pub async fn load(&self) -> Result<Option<Index>, IndexerError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No persisted index");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let index = decode(&self.path, &text)?;

        debug!(path = ?self.path, files = index.len(), "Loaded index");

        Ok(Some(index))
    }

    /// Persist an index atomically.
    pub async fn save(&self, index: &Index) -> Result<(), IndexerError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let yaml = serde_yaml::to_string(index)?;

        // Atomic write: write to temp file, then rename
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &yaml).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        info!(path = ?self.path, files = index.len(), size = yaml.len(), "Saved index");

        Ok(())
    }

    /// Check if a persisted document exists.
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Delete the persisted document, if any.
    pub async fn delete(&self) -> Result<(), IndexerError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "index".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

/// Parse and validate a persisted document.
fn decode(path: &Path, text: &str) -> Result<Index, IndexerError> {
    let invalid = |message: String| IndexerError::InvalidIndex {
        path: path.to_path_buf(),
        message,
    };

    let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))?;
    if !value.is_mapping() {
        return Err(invalid("document is not a mapping".to_string()));
    }

    let found = value
        .get("schema_version")
        .and_then(serde_yaml::Value::as_u64)
        .and_then(|v| u32::try_from(v).ok());

    if found != Some(SCHEMA_VERSION) {
        return Err(IndexerError::SchemaMismatch {
            path: path.to_path_buf(),
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let index: Index = serde_yaml::from_value(value).map_err(|e| invalid(e.to_string()))?;
    index.validate().map_err(invalid)?;

    Ok(index)
}
