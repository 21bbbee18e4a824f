//! Discovery of resolved-program files.
//!
//! - Early directory pruning via `WalkDir::filter_entry` (whole subtrees skipped)
//! - Deterministic, sorted output

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories to exclude by default.
const EXCLUDED_DIRS: &[&str] = &["target", ".git", "node_modules", ".gradle", "build"];

/// Extension of resolved-program files.
pub const PROGRAM_EXTENSION: &str = "json";

#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// Gathers all program files below `root`. A file path is returned as-is.
pub fn gather_program_files(root: &Path) -> Result<Vec<PathBuf>> {
    gather_program_files_with_excludes(root, &[])
}

/// Gathers program files, pruning the default and the given directory names.
pub fn gather_program_files_with_excludes(root: &Path, excludes: &[&str]) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().copied())
        .collect();

    let mut files = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
        .filter_map(|entry| match entry {
            Ok(e) => {
                let path = e.path();
                if e.file_type().is_file()
                    && path.extension().is_some_and(|ext| ext == PROGRAM_EXTENSION)
                {
                    Some(Ok(path.to_path_buf()))
                } else {
                    None
                }
            }
            Err(e) => Some(Err(e.into())),
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to gather program files from {}", root.display()))?;

    files.sort();
    Ok(files)
}
