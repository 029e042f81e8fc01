//! Configuration for Librarian.

use crate::CoreError;
use librarian_indexer::DEFAULT_INDEX_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-repository config file, relative to the repository root.
pub const REPO_CONFIG_PATH: &str = ".claude/librarian.yaml";

/// Librarian configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarianConfig {
    /// Repository root; detected from the working directory when unset
    #[serde(default)]
    pub repository_root: Option<PathBuf>,

    /// Index document location, relative to the root unless absolute
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Rebuild when the persisted index is unreadable or from another schema
    #[serde(default = "default_rebuild_on_invalid_index")]
    pub rebuild_on_invalid_index: bool,

    /// Patterns applied after the root `.gitignore`
    #[serde(default)]
    pub extra_ignore_patterns: Vec<String>,

    /// Result limit used when a request does not give one
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

fn default_index_path() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_PATH)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rebuild_on_invalid_index() -> bool {
    true
}

fn default_limit() -> usize {
    100
}

impl Default for LibrarianConfig {
    fn default() -> Self {
        Self {
            repository_root: None,
            index_path: default_index_path(),
            log_level: default_log_level(),
            rebuild_on_invalid_index: default_rebuild_on_invalid_index(),
            extra_ignore_patterns: Vec::new(),
            default_limit: default_limit(),
        }
    }
}

impl LibrarianConfig {
    /// Load configuration for a repository, falling back to defaults.
    ///
    /// Looks at `<root>/.claude/librarian.yaml`, then the user config
    /// directory. Files that fail to read or parse are logged and skipped.
    pub fn load(root: &Path) -> Self {
        let candidates = std::iter::once(root.join(REPO_CONFIG_PATH)).chain(user_config_path());

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    debug!(path = ?path, "Loaded config");
                    return config;
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "Failed to load config file");
                }
            }
        }

        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| CoreError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Absolute location of the index document for `root`.
    pub fn resolve_index_path(&self, root: &Path) -> PathBuf {
        if self.index_path.is_absolute() {
            self.index_path.clone()
        } else {
            root.join(&self.index_path)
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("librarian").join("config.yaml"))
}
