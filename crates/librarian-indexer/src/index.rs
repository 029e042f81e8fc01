//! Index data model.

use crate::scanner::{FileType, ScanResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Version of the persisted index document.
pub const SCHEMA_VERSION: u32 = 1;

/// Metadata for one indexed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Root-relative, forward-slash path (unique key)
    pub relative_path: String,
    pub file_type: FileType,
    pub size_bytes: u64,
    /// Last modification time, whole seconds
    pub modified_time: DateTime<Utc>,
    /// SHA-256 hex digest of the content
    pub content_hash: String,
}

/// A full snapshot of a repository's file tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub schema_version: u32,
    /// Absolute repository root
    pub root_path: PathBuf,
    /// When the scan that produced this snapshot finished
    pub generated_at: DateTime<Utc>,
    /// Files skipped as soft failures during that scan
    #[serde(default)]
    pub skipped_files: usize,
    pub records: BTreeMap<String, FileRecord>,
}

impl Index {
    /// Create an empty index.
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            root_path,
            generated_at: Utc::now(),
            skipped_files: 0,
            records: BTreeMap::new(),
        }
    }

    /// Assemble a snapshot from a finished scan.
    pub fn from_scan(scan: ScanResult) -> Self {
        let records = scan
            .records
            .into_iter()
            .map(|r| (r.relative_path.clone(), r))
            .collect();

        Self {
            schema_version: SCHEMA_VERSION,
            root_path: scan.root,
            generated_at: Utc::now(),
            skipped_files: scan.skipped_count,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, relative_path: &str) -> Option<&FileRecord> {
        self.records.get(relative_path)
    }

    /// Records in path order.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    /// Aggregate counts and sizes. Pure, no I/O.
    pub fn stats(&self) -> IndexStats {
        let mut by_type = BTreeMap::new();
        let mut total_size_bytes = 0u64;

        for record in self.records.values() {
            *by_type.entry(record.file_type).or_insert(0) += 1;
            total_size_bytes += record.size_bytes;
        }

        IndexStats {
            root_path: self.root_path.clone(),
            total_files: self.records.len(),
            by_type,
            total_size_bytes,
            generated_at: self.generated_at,
            skipped_files: self.skipped_files,
        }
    }

    /// Check the record invariants. Returns a description of the first
    /// violation.
    pub fn validate(&self) -> Result<(), String> {
        if !self.root_path.is_absolute() {
            return Err(format!(
                "root_path is not absolute: {}",
                self.root_path.display()
            ));
        }

        for (key, record) in &self.records {
            if key != &record.relative_path {
                return Err(format!(
                    "record key '{}' does not match relative_path '{}'",
                    key, record.relative_path
                ));
            }
            check_relative_path(key)?;
            if record.content_hash.len() != 64
                || !record.content_hash.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(format!("record '{}' has a malformed content_hash", key));
            }
        }

        Ok(())
    }
}

/// Validate a stored relative path.
pub fn check_relative_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("empty relative_path".to_string());
    }
    let has_drive = path.len() > 1 && path.as_bytes()[1] == b':';
    if path.starts_with('/') || path.contains('\\') || has_drive {
        return Err(format!("relative_path is not relative: {}", path));
    }
    if path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(format!("relative_path has an invalid segment: {}", path));
    }
    let first = path.split('/').next().unwrap_or(path);
    if first == ".git" || first == ".claude" {
        return Err(format!("relative_path is inside a reserved directory: {}", path));
    }
    Ok(())
}

/// Summary statistics over one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub root_path: PathBuf,
    pub total_files: usize,
    pub by_type: BTreeMap<FileType, usize>,
    pub total_size_bytes: u64,
    pub generated_at: DateTime<Utc>,
    pub skipped_files: usize,
}
