//! Ignore rule resolution.
//!
//! Combines the repository's root `.gitignore`, optional extra patterns and a
//! fixed deny-list into one matcher. The deny-list is checked first and
//! cannot be re-included by a negated pattern.

use super::pattern::Pattern;
use crate::IndexerError;
use std::path::Path;
use tracing::{debug, warn};

/// Directory names that are never indexed, at any depth.
pub const BUILTIN_EXCLUDED_NAMES: &[&str] = &[
    ".git",
    ".claude",
    "node_modules",
    "__pycache__",
    "venv",
    "env",
    "build",
    "dist",
    "target",
];

/// Compiled ignore rules for one scan.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    patterns: Vec<Pattern>,
}

impl IgnoreRuleSet {
    /// Build the rule set for a repository root.
    pub fn build(root: &Path) -> Result<Self, IndexerError> {
        Self::build_with_extra(root, &[])
    }

    /// Build the rule set, appending `extra` patterns after `.gitignore`.
    ///
    /// Fails only when the root itself cannot be read. A missing or
    /// unreadable `.gitignore` is treated as empty.
    pub fn build_with_extra(root: &Path, extra: &[String]) -> Result<Self, IndexerError> {
        let metadata = std::fs::metadata(root)?;
        if !metadata.is_dir() {
            return Err(IndexerError::NotFound(root.to_path_buf()));
        }
        // Surface permission problems on the root before any walking.
        std::fs::read_dir(root)?;

        let gitignore_path = root.join(".gitignore");
        let gitignore = match std::fs::read_to_string(&gitignore_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                warn!(path = ?gitignore_path, error = %e, "Failed to read .gitignore, ignoring it");
                String::new()
            }
        };

        let rules = Self::from_lines(
            gitignore
                .lines()
                .chain(extra.iter().map(String::as_str)),
        );

        debug!(root = ?root, patterns = rules.patterns.len(), "Compiled ignore rules");

        Ok(rules)
    }

    /// Compile rules from pattern lines, in priority order (last match wins).
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            patterns: lines.into_iter().filter_map(Pattern::compile).collect(),
        }
    }

    /// Number of compiled patterns (the deny-list is not counted).
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether a single path segment is on the deny-list.
    pub fn is_builtin_excluded(name: &str) -> bool {
        name.starts_with('.') || BUILTIN_EXCLUDED_NAMES.contains(&name)
    }

    /// Test one entry whose ancestors are already known to be included.
    pub fn matches_entry(&self, rel_path: &str, is_dir: bool) -> bool {
        let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
        if Self::is_builtin_excluded(name) {
            return true;
        }

        let mut ignored = false;
        for pattern in &self.patterns {
            if pattern.matches(rel_path, is_dir) {
                ignored = !pattern.is_negated();
            }
        }
        ignored
    }

    /// Test an arbitrary root-relative path, evaluating each ancestor
    /// directory from the root and stopping at the first excluded one.
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        let rel_path = rel_path.trim_matches('/');
        if rel_path.is_empty() {
            return false;
        }

        for (idx, _) in rel_path.match_indices('/') {
            if self.matches_entry(&rel_path[..idx], true) {
                return true;
            }
        }

        self.matches_entry(rel_path, is_dir)
    }
}
