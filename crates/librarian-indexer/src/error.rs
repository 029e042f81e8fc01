//! Indexer error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during indexing, persistence and search.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Persisted index has a schema version this build does not understand
    #[error(
        "Schema mismatch in {path}: found {}, supported {supported}",
        version_label(.found)
    )]
    SchemaMismatch {
        path: PathBuf,
        found: Option<u32>,
        supported: u32,
    },

    /// Persisted index exists but fails validation
    #[error("Invalid index {path}: {message}")]
    InvalidIndex { path: PathBuf, message: String },

    /// Malformed regular expression
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn version_label(version: &Option<u32>) -> String {
    version.map_or_else(|| "none".to_string(), |v| v.to_string())
}

impl From<serde_yaml::Error> for IndexerError {
    fn from(e: serde_yaml::Error) -> Self {
        IndexerError::Serialization(e.to_string())
    }
}
