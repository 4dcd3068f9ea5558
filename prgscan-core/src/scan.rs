//! Parallel file discovery for `.prg` sources.
//!
//! - Optional directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel entry filtering via Rayon's `par_bridge`
//! - Any unreadable directory aborts discovery: a partial file list would
//!   silently under-report unused symbols

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ScanError, ScanResult};

/// Name suffix of the only supported source type, compared case-insensitively.
pub const PRG_SUFFIX: &str = ".prg";

/// Checks if a directory entry should be pruned (excluded from traversal).
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// Returns true when the file name ends in `.prg`, ignoring ASCII case.
///
/// A file named exactly `.prg` qualifies too.
#[inline]
pub fn is_prg_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|name| name.ends_with(PRG_SUFFIX))
}

/// Gathers all `.prg` files recursively starting from the root path.
///
/// Every subdirectory is followed. Symlinks are reported as entries but
/// never followed as directories, so link cycles cannot occur.
pub fn gather_prg_files(root: &Path) -> ScanResult<Vec<PathBuf>> {
    gather_prg_files_with_excludes(root, &[])
}

/// Gathers all `.prg` files, pruning directories whose name is in `excludes`.
///
/// The scan root itself is never pruned. The result is sorted.
pub fn gather_prg_files_with_excludes(root: &Path, excludes: &[&str]) -> ScanResult<Vec<PathBuf>> {
    let excludes: HashSet<&str> = excludes.iter().copied().collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &excludes))
        .par_bridge()
        .filter_map(|entry| match entry {
            Ok(e) => {
                if !e.file_type().is_dir() && is_prg_file(e.path()) {
                    Some(Ok(e.into_path()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(ScanError::traversal(root, e))),
        })
        .collect::<ScanResult<Vec<_>>>()?;

    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "gathered .prg files");
    Ok(files)
}
