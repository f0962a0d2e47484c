//! Configuration management for seclog

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the durable record holding the persisted log collection
pub const STORE_FILE: &str = "security_logs.json";

/// Categories of disk errors for user-friendly messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    /// Get a user-friendly message for this error kind
    pub fn user_message(&self) -> &'static str {
        match self {
            DiskErrorKind::DiskFull => "disk full or quota exceeded",
            DiskErrorKind::PermissionDenied => "permission denied writing to ~/.seclog/",
            DiskErrorKind::NotFound => "file or directory not found",
            DiskErrorKind::Other => "unexpected I/O error",
        }
    }
}

/// Categorize an IO error into a user-friendly category
pub fn categorize_io_error(e: &std::io::Error) -> DiskErrorKind {
    use std::io::ErrorKind;

    match e.kind() {
        ErrorKind::StorageFull | ErrorKind::WriteZero => DiskErrorKind::DiskFull,
        ErrorKind::PermissionDenied => DiskErrorKind::PermissionDenied,
        ErrorKind::NotFound => DiskErrorKind::NotFound,
        _ => {
            #[cfg(unix)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ENOSPC = 28, EDQUOT = 122 (Linux) / 69 (macOS)
                    if os_error == 28 || os_error == 122 || os_error == 69 {
                        return DiskErrorKind::DiskFull;
                    }
                    // EACCES
                    if os_error == 13 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            DiskErrorKind::Other
        }
    }
}

/// Create a user-friendly error message from an IO error
pub fn friendly_io_error_message(e: &std::io::Error, context: &str) -> String {
    match categorize_io_error(e) {
        DiskErrorKind::Other => format!("{}: {}", context, e),
        kind => format!("{}: {}", context, kind.user_message()),
    }
}

/// Application configuration
///
/// Every field falls back to its default when missing from `config.toml`, so a
/// partial file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Maximum number of entries kept in the store (default: 100)
    pub max_logs: usize,

    /// Retention window in milliseconds; also the cleanup tick interval (default: 24h)
    pub auto_cleanup_interval_ms: u64,

    /// How long notifications stay visible in milliseconds (default: 3000)
    pub notification_duration_ms: u64,

    /// Refresh tick interval in milliseconds used when auto-refresh is enabled (default: 5000)
    pub default_refresh_interval_ms: u64,

    /// Start with auto-refresh enabled
    pub auto_refresh_on_start: bool,

    /// Run the local capture endpoint
    pub capture_enabled: bool,

    /// Port for the capture endpoint (0 lets the OS pick one)
    pub capture_port: u16,

    /// Look up the public IP and user agent for the session-start entry
    pub visitor_lookup_enabled: bool,

    /// Timeout for each visitor info request in milliseconds
    pub visitor_timeout_ms: u64,

    /// Endpoint returning `{"ip": "..."}`
    pub ip_lookup_url: String,

    /// Endpoint returning `{"ua": "..."}`
    pub user_agent_lookup_url: String,

    /// Directory receiving exported log files
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_logs: 100,
            auto_cleanup_interval_ms: 24 * 60 * 60 * 1000,
            notification_duration_ms: 3000,
            default_refresh_interval_ms: 5000,
            auto_refresh_on_start: false,
            capture_enabled: true,
            capture_port: 8787,
            visitor_lookup_enabled: true,
            visitor_timeout_ms: 5000,
            ip_lookup_url: "https://api.ipify.org?format=json".to_string(),
            user_agent_lookup_url: "https://api.useragent.app".to_string(),
            export_dir: config_dir().join("exports"),
        }
    }
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = config_file_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn retention(&self) -> Duration {
        Duration::from_millis(self.auto_cleanup_interval_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }

    pub fn default_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.default_refresh_interval_ms)
    }

    pub fn visitor_timeout(&self) -> Duration {
        Duration::from_millis(self.visitor_timeout_ms)
    }
}

/// Get the base configuration directory (~/.seclog)
/// Falls back to ./.seclog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".seclog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".seclog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the persisted log collection
pub fn store_file_path() -> PathBuf {
    config_dir().join(STORE_FILE)
}

/// Get the path to the diagnostics directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure all required directories exist
pub fn ensure_directories(config: &Config) -> Result<()> {
    std::fs::create_dir_all(config_dir()).context("Failed to create config directory")?;
    std::fs::create_dir_all(logs_dir()).context("Failed to create logs directory")?;
    std::fs::create_dir_all(&config.export_dir).context("Failed to create export directory")?;
    Ok(())
}
