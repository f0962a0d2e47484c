//! View rendering modules

mod entry;
mod logs;
mod notifications;

pub use entry::{entry_lines, render_entry};
pub use logs::{render_log_viewer, LogViewContext};
pub use notifications::render_notifications;
