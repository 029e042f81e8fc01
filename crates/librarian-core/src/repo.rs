//! Repository root detection.

use std::path::{Path, PathBuf};

/// Ascend from `start` to the first directory containing `.git`.
///
/// `.git` may be a directory or a file (worktrees, submodules). Falls back
/// to `start` itself when no ancestor qualifies.
pub fn find_repo_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .unwrap_or(start)
        .to_path_buf()
}
