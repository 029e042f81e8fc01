//! Tool protocol definitions.
//!
//! One JSON object per request and per response. Requests are tagged by
//! `tool`, responses by `status`.

use chrono::{DateTime, Utc};
use librarian_core::{ConfigInfo, CoreError, RefreshSummary};
use librarian_indexer::{FileRecord, FileType, IndexStats, IndexerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Resource URI for index statistics
pub const STATS_URI: &str = "index://stats";

/// Resource URI for repository configuration
pub const CONFIG_URI: &str = "index://config";

/// Tool invocation from a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum Request {
    /// Substring search over relative paths
    SearchFiles {
        query: String,
        #[serde(default)]
        case_sensitive: bool,
        /// Maximum results; zero or negative means unlimited
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<i64>,
    },

    /// Regex search over relative paths
    SearchFilesRegex {
        pattern: String,
        #[serde(default)]
        case_sensitive: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<i64>,
    },

    /// Files of one type, optionally filtered by a path substring
    SearchByType {
        file_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<i64>,
    },

    /// Full re-scan of the repository
    RefreshIndex,

    /// Aggregate statistics
    GetIndexStats,

    /// Read a named resource (`index://stats`, `index://config`)
    ReadResource { uri: String },
}

/// Response to a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { data: ResponseData },
    Error { kind: ErrorKind, message: String },
}

impl Response {
    pub fn ok(data: ResponseData) -> Self {
        Response::Ok { data }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error {
            kind,
            message: message.into(),
        }
    }
}

impl From<CoreError> for Response {
    fn from(err: CoreError) -> Self {
        Response::error(ErrorKind::from(&err), err.to_string())
    }
}

/// Response payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseData {
    /// Search results
    Files { files: Vec<FileMatch> },

    /// Refresh outcome
    Refresh {
        files_indexed: usize,
        skipped_files: usize,
        duration_ms: u64,
    },

    /// Index statistics
    Stats {
        total_files: usize,
        by_type: BTreeMap<FileType, usize>,
        total_size_bytes: u64,
        generated_at: DateTime<Utc>,
        skipped_files: usize,
    },

    /// Repository configuration
    Config {
        repository_root: PathBuf,
        supported_types: Vec<FileType>,
        index_path: PathBuf,
    },
}

impl From<Vec<FileRecord>> for ResponseData {
    fn from(records: Vec<FileRecord>) -> Self {
        ResponseData::Files {
            files: records.into_iter().map(FileMatch::from).collect(),
        }
    }
}

impl From<RefreshSummary> for ResponseData {
    fn from(summary: RefreshSummary) -> Self {
        ResponseData::Refresh {
            files_indexed: summary.files_indexed,
            skipped_files: summary.skipped_files,
            duration_ms: summary.duration_ms,
        }
    }
}

impl From<IndexStats> for ResponseData {
    fn from(stats: IndexStats) -> Self {
        ResponseData::Stats {
            total_files: stats.total_files,
            by_type: stats.by_type,
            total_size_bytes: stats.total_size_bytes,
            generated_at: stats.generated_at,
            skipped_files: stats.skipped_files,
        }
    }
}

impl From<ConfigInfo> for ResponseData {
    fn from(info: ConfigInfo) -> Self {
        ResponseData::Config {
            repository_root: info.repository_root,
            supported_types: info.supported_types,
            index_path: info.index_path,
        }
    }
}

/// One search hit as seen by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatch {
    pub path: String,
    pub file_type: FileType,
    pub size: u64,
    pub modified_time: DateTime<Utc>,
}

impl From<FileRecord> for FileMatch {
    fn from(record: FileRecord) -> Self {
        Self {
            path: record.relative_path,
            file_type: record.file_type,
            size: record.size_bytes,
            modified_time: record.modified_time,
        }
    }
}

/// Error kinds for error responses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Regex failed to compile
    InvalidPattern,
    /// Persisted index has an unsupported schema version
    SchemaMismatch,
    /// Persisted index is corrupt
    InvalidIndex,
    /// File system failure
    Io,
    /// Request line is not a valid request
    InvalidRequest,
    /// Resource URI is not known
    UnknownResource,
    /// Anything else
    Internal,
}

impl From<&CoreError> for ErrorKind {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::Indexer(IndexerError::InvalidPattern { .. }) => ErrorKind::InvalidPattern,
            CoreError::Indexer(IndexerError::SchemaMismatch { .. }) => ErrorKind::SchemaMismatch,
            CoreError::Indexer(IndexerError::InvalidIndex { .. }) => ErrorKind::InvalidIndex,
            CoreError::Indexer(IndexerError::Io(_) | IndexerError::NotFound(_)) => ErrorKind::Io,
            CoreError::Indexer(IndexerError::Serialization(_)) | CoreError::Config { .. } => {
                ErrorKind::Internal
            }
        }
    }
}

/// Resolve a request limit: absent uses `default`, zero or negative is
/// unlimited (0).
pub fn resolve_limit(limit: Option<i64>, default: usize) -> usize {
    match limit {
        None => default,
        Some(n) if n <= 0 => 0,
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    }
}
