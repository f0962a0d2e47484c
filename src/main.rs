use anyhow::Result;

use seclog::app::App;
use seclog::config::{self, Config};
use seclog::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Creates the logs and export directories too
    config::ensure_directories(&config)?;

    // Initialize file logging BEFORE any tracing calls
    let (log_file_info, _guard) = logging::init_file_logging(&config::logs_dir())?;

    match logging::prune_log_files(&config::logs_dir(), logging::DEFAULT_KEEP_LOG_FILES) {
        Ok(count) if count > 0 => tracing::info!("Removed {} old log files", count),
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to prune old log files: {:#}", e),
    }

    tracing::info!("Logging to: {}", log_file_info.path.display());

    let mut app = App::start(config).await?;
    app.run().await
}
