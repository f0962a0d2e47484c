//! On-demand export of the log collection

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use super::LogEntry;

/// File name for an export taken at `now`
///
/// The ISO-8601 timestamp has `:` replaced with `-` so the name is valid on
/// every filesystem.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("security_logs_{}.json", now.format("%Y-%m-%dT%H-%M-%S%.3fZ"))
}

/// Write `entries` as pretty-printed JSON into `dir`
///
/// Returns the path of the created file.
pub fn export_to(dir: &Path, entries: &[LogEntry], now: DateTime<Utc>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).context("Failed to create export directory")?;
    let path = dir.join(export_file_name(now));
    let content = serde_json::to_string_pretty(entries).context("Failed to serialize logs")?;
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write export file {}", path.display()))?;
    Ok(path)
}
