//! File system walker with ignore-rule pruning.

use super::ignore_rules::IgnoreRuleSet;
use ignore::WalkBuilder;
use parking_lot::Mutex;
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// A discovered file entry.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Root-relative path, forward-slash separated
    pub relative_path: String,
    /// File size in bytes
    pub size: u64,
    /// Last modified time (Unix timestamp)
    pub mtime: u64,
}

/// Everything a walk produced, including entries it had to skip.
#[derive(Debug, Default)]
pub struct WalkOutput {
    pub entries: Vec<FileEntry>,
    /// Paths of skipped entries, where the error carried one
    pub skipped_paths: Vec<PathBuf>,
    /// Number of skipped entries, with or without a known path
    pub skipped_count: usize,
}

impl WalkOutput {
    fn skip(&mut self, path: Option<PathBuf>) {
        self.skipped_count += 1;
        self.skipped_paths.extend(path);
    }
}

/// File system walker that prunes ignored directories before descending.
pub struct Walker {
    root: PathBuf,
    rules: Arc<IgnoreRuleSet>,
    follow_symlinks: bool,
}

impl Walker {
    /// Create a new walker for the given root directory.
    pub fn new(root: &Path, rules: Arc<IgnoreRuleSet>, follow_symlinks: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            rules,
            follow_symlinks,
        }
    }

    /// Walk the directory tree and return all surviving files.
    pub fn walk(&self) -> WalkOutput {
        let root = self.root.clone();
        let rules = self.rules.clone();
        let unnamed = Arc::new(Mutex::new(Vec::new()));
        let unnamed_sink = unnamed.clone();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(self.follow_symlinks)
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                if let Some(rel) = relative_path(&root, entry.path()) {
                    return !rules.matches_entry(&rel, is_dir);
                }

                // Names that are not UTF-8 cannot be stored. Ignored ones are
                // pruned silently, the rest are pruned and counted.
                let lossy = lossy_relative_path(&root, entry.path());
                if !rules.matches_entry(&lossy, is_dir) {
                    warn!(path = ?entry.path(), "Skipping entry with non UTF-8 name");
                    unnamed_sink.lock().push(entry.path().to_path_buf());
                }
                false
            });

        let mut output = WalkOutput::default();

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Walk error, skipping entry");
                    output.skip(error_path(&e));
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                continue;
            }

            // Symlinks are indexed by target content; links to directories
            // are never descended.
            let metadata = if file_type.is_symlink() {
                match std::fs::metadata(entry.path()) {
                    Ok(m) if m.is_file() => m,
                    Ok(_) => {
                        debug!(path = ?entry.path(), "Skipping symlink to directory");
                        continue;
                    }
                    Err(e) => {
                        warn!(path = ?entry.path(), error = %e, "Dangling or unreadable symlink");
                        output.skip(Some(entry.path().to_path_buf()));
                        continue;
                    }
                }
            } else if file_type.is_file() {
                match entry.metadata() {
                    Ok(m) => m,
                    Err(e) => {
                        warn!(path = ?entry.path(), error = %e, "Failed to read metadata");
                        output.skip(Some(entry.path().to_path_buf()));
                        continue;
                    }
                }
            } else {
                // Sockets, FIFOs and devices.
                continue;
            };

            let Some(rel) = relative_path(&self.root, entry.path()) else {
                output.skip(Some(entry.path().to_path_buf()));
                continue;
            };

            output.entries.push(FileEntry {
                path: entry.path().to_path_buf(),
                relative_path: rel,
                size: metadata.len(),
                mtime: modified_secs(&metadata),
            });
        }

        for path in unnamed.lock().drain(..) {
            output.skip(Some(path));
        }

        // Sort by path for deterministic ordering
        output
            .entries
            .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        output
    }
}

/// Root-relative, forward-slash path. `None` for paths outside the root,
/// paths with `..`, or non UTF-8 names.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str()?),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Like [`relative_path`] but replaces invalid UTF-8 instead of failing.
fn lossy_relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn modified_secs(metadata: &Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn error_path(err: &ignore::Error) -> Option<PathBuf> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.clone()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child.clone()),
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
