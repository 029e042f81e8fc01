//! Librarian Indexer
//!
//! This crate provides the indexing engine for Librarian, including:
//! - Gitignore-aware file system scanning with subtree pruning
//! - File type classification by suffix
//! - Streaming SHA-256 content hashes for change detection
//! - YAML persistence of index snapshots with schema versioning
//! - Substring, regex and type queries over an in-memory snapshot

mod error;
pub mod index;
pub mod scanner;
pub mod search;
pub mod storage;

pub use error::IndexerError;
pub use index::{FileRecord, Index, IndexStats, SCHEMA_VERSION};
pub use scanner::{classify, FileType, IgnoreRuleSet, ScanOptions, ScanResult, Scanner};
pub use search::SearchEngine;
pub use storage::{IndexStore, DEFAULT_INDEX_PATH};
