//! File system scanner module.
//!
//! Walks a repository once, pruning ignored subtrees, and produces one
//! [`FileRecord`] per surviving file with its type and content hash.

mod file_type;
mod ignore_rules;
mod pattern;
mod walker;

pub use file_type::{classify, FileType};
pub use ignore_rules::{IgnoreRuleSet, BUILTIN_EXCLUDED_NAMES};
pub use pattern::{Pattern, Segment, Token};
pub use walker::{relative_path, FileEntry, WalkOutput, Walker};

use crate::index::FileRecord;
use crate::IndexerError;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Options for scanning a repository.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum number of files to record (0 = unlimited)
    pub max_files: usize,
    /// Whether to follow symlinked directories (loops are detected)
    pub follow_symlinks: bool,
    /// Read buffer size used while hashing
    pub hash_buffer_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_files: 0, // unlimited
            follow_symlinks: false,
            hash_buffer_size: 64 * 1024,
        }
    }
}

/// Result of scanning a repository.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Canonical root path that was scanned
    pub root: PathBuf,
    /// Records sorted by relative path
    pub records: Vec<FileRecord>,
    /// Number of files skipped (unreadable, vanished, etc.)
    pub skipped_count: usize,
    /// Paths of skipped files, where known
    pub skipped_paths: Vec<PathBuf>,
    /// Scan duration in milliseconds
    pub duration_ms: u64,
}

/// The main scanner that orchestrates file discovery and hashing.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Create a new scanner with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scanner with custom options.
    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Scan a directory on the blocking thread pool.
    pub async fn scan(
        &self,
        root: &Path,
        rules: &IgnoreRuleSet,
    ) -> Result<ScanResult, IndexerError> {
        let scanner = self.clone();
        let root = root.to_path_buf();
        let rules = Arc::new(rules.clone());

        tokio::task::spawn_blocking(move || scanner.scan_blocking(&root, rules))
            .await
            .map_err(|e| IndexerError::Io(std::io::Error::other(e)))?
    }

    /// Scan a directory on the current thread.
    pub fn scan_blocking(
        &self,
        root: &Path,
        rules: Arc<IgnoreRuleSet>,
    ) -> Result<ScanResult, IndexerError> {
        let start = Instant::now();

        let root = root
            .canonicalize()
            .map_err(|_| IndexerError::NotFound(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(IndexerError::NotFound(root));
        }

        info!(path = ?root, "Starting scan");

        // Step 1: Walk the file system
        let walker = Walker::new(&root, rules, self.options.follow_symlinks);
        let WalkOutput {
            entries,
            mut skipped_paths,
            mut skipped_count,
        } = walker.walk();

        debug!(count = entries.len(), "Files discovered");

        // Step 2: Hash and classify
        let mut records = Vec::with_capacity(entries.len());

        for entry in entries {
            if self.options.max_files > 0 && records.len() >= self.options.max_files {
                warn!(max_files = self.options.max_files, "File limit reached, truncating scan");
                break;
            }

            let content_hash = match hash_file(&entry.path, self.options.hash_buffer_size) {
                Ok(hash) => hash,
                Err(e) => {
                    warn!(path = ?entry.path, error = %e, "Failed to read file, skipping");
                    skipped_count += 1;
                    skipped_paths.push(entry.path);
                    continue;
                }
            };

            records.push(FileRecord {
                file_type: classify(&entry.relative_path),
                relative_path: entry.relative_path,
                size_bytes: entry.size,
                modified_time: DateTime::<Utc>::from_timestamp(entry.mtime as i64, 0)
                    .unwrap_or_default(),
                content_hash,
            });
        }

        let duration = start.elapsed();

        info!(
            files = records.len(),
            skipped = skipped_count,
            duration_ms = duration.as_millis(),
            "Scan complete"
        );

        Ok(ScanResult {
            root,
            records,
            skipped_count,
            skipped_paths,
            duration_ms: duration.as_millis() as u64,
        })
    }
}

/// Stream a file through SHA-256 without loading it whole.
pub fn hash_file(path: &Path, buffer_size: usize) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(buffer_size.max(1024), file);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; buffer_size.max(1024)];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
