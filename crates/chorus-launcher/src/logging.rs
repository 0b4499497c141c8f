//! Logging setup for the launcher.
//!
//! Logs go to stderr and, when a data directory is available, to a
//! `chorus.log` file next to the instance lock. The file is truncated at
//! startup once it grows past 1 MiB, so a long-lived install never
//! accumulates an unbounded log.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Log file size beyond which the file is truncated at startup.
const MAX_LOG_BYTES: u64 = 1024 * 1024;

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level filter applied when no `RUST_LOG` override is present.
    pub level_filter: LevelFilter,
    /// Optional log file path.
    pub log_file: Option<PathBuf>,
}

/// Initialize the global subscriber.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level_filter.into())
        .from_env_lossy();

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = open_log_file(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("failed to set global subscriber")?;

    Ok(())
}

/// Open the log file for appending, truncating it first if it has grown
/// past [`MAX_LOG_BYTES`].
fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let oversized = std::fs::metadata(path)
        .map(|m| m.len() > MAX_LOG_BYTES)
        .unwrap_or(false);
    if oversized {
        std::fs::remove_file(path)?;
    }

    OpenOptions::new().create(true).append(true).open(path)
}
