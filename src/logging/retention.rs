//! Diagnostic file retention
//!
//! Each run writes a new diagnostic file; only the most recent ones are kept.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::file_writer::LOG_FILE_PREFIX;

/// Number of diagnostic files kept by default
pub const DEFAULT_KEEP_LOG_FILES: usize = 10;

/// Delete all but the newest `keep` diagnostic files in `logs_dir`
///
/// File names embed a sortable timestamp, so name order is age order. Files
/// not produced by seclog are left alone. Returns the number deleted.
pub fn prune_log_files(logs_dir: &Path, keep: usize) -> Result<usize> {
    if !logs_dir.exists() {
        return Ok(0);
    }

    let mut files: Vec<PathBuf> = fs::read_dir(logs_dir)
        .context("Failed to read logs directory")?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_log_file(path))
        .collect();

    if files.len() <= keep {
        return Ok(0);
    }

    files.sort();
    let excess = files.len() - keep;
    let deleted = files
        .iter()
        .take(excess)
        .filter(|path| match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Could not remove {}: {}", path.display(), e);
                false
            }
        })
        .count();

    Ok(deleted)
}

fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log"))
}
