// File-backed tracing; the terminal belongs to the UI
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Installs a subscriber writing to `config.log_file` when a filter is set.
/// Returns whether logging was enabled.
pub fn init(config: &Config) -> anyhow::Result<bool> {
    let Some(directives) = config.log_filter.as_deref() else {
        return Ok(false);
    };
    if let Some(dir) = config.log_file.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    let filter = EnvFilter::try_new(directives)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(true)
}
