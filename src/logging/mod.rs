//! Diagnostics for seclog itself
//!
//! Provides file-based tracing output and pruning of old diagnostic files.
//! These are the program's own logs, not the security log entries kept in
//! [`crate::store`].

mod file_writer;
mod retention;

pub use file_writer::{init_file_logging, LogFileInfo, LoggingGuard};
pub use retention::{prune_log_files, DEFAULT_KEEP_LOG_FILES};
