//! Tracing setup. Output goes to a log file because the terminal belongs to the REPL.

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::utils::ensure_dir;

pub const LOG_FILE_NAME: &str = "admin-dashboard.log";

/// Install the global subscriber, appending to `<log_dir>/admin-dashboard.log`.
///
/// The level comes from `RUST_LOG` (default `info`), so `.env` must be loaded
/// before this is called.
pub fn init_tracing(log_dir: &str) -> Result<PathBuf> {
    let dir = Path::new(log_dir);
    ensure_dir(dir)?;
    let path = dir.join(LOG_FILE_NAME);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    Registry::default()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to set global subscriber: {}", e))?;

    Ok(path)
}
