//! Filesystem Scanner
//!
//! Walks the tools root recursively and yields candidate executables.
//! A candidate is any regular file with execute permission; everything
//! else is silently dropped. Dependency caches, version-control metadata
//! and virtual environments are never descended into.
//!
//! One unreadable directory never aborts the scan: the failure is logged
//! and that subtree is skipped.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory names that never contain tools
const SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "__pycache__",
    ".pytest_cache",
    "venv",
    ".venv",
];

/// Recursively collect executable files under `root`
///
/// Returns a flat list of absolute paths; order is not significant.
/// A missing or unreadable root yields an empty list rather than an error,
/// so the catalog simply comes up empty until the root appears.
pub fn scan_executables(root: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    walk(root, &mut candidates);
    debug!(
        "Scan of {} found {} candidate executables",
        root.display(),
        candidates.len()
    );
    candidates
}

fn walk(dir: &Path, candidates: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Skipping unreadable directory {}: {}", dir.display(), err);
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
        };

        let path = entry.path();
        if path.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            walk(&path, candidates);
        } else if path.is_file() && is_executable(&path) {
            candidates.push(path);
        }
    }
}

/// Check whether a directory is one of the fixed non-tool directories
fn should_skip_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| SKIP_DIRS.contains(&name))
        .unwrap_or(false)
}

/// Check whether a file has execute permission
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Non-Unix platforms have no execute bit; nothing qualifies as a tool.
#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}
