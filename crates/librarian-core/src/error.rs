//! Core error types for Librarian.

use librarian_indexer::IndexerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in core operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// Indexing, storage or search failure
    #[error(transparent)]
    Indexer(#[from] IndexerError),

    /// Config file could not be read or parsed
    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Indexer(IndexerError::Io(err))
    }
}
