// Settings from config.json in the project config dir, overridden by env vars
use std::{fs, io, path::{Path, PathBuf}};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::evaluator::PriorityOrder;

pub const ENV_PRIORITY: &str = "SOULCALC_PRIORITY";
pub const ENV_PERSIST: &str = "SOULCALC_PERSIST";
pub const ENV_HISTORY_FILE: &str = "SOULCALC_HISTORY_FILE";
pub const ENV_LOG: &str = "SOULCALC_LOG";
pub const ENV_LOG_FILE: &str = "SOULCALC_LOG_FILE";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    priority: Option<String>,
    persist_history: Option<bool>,
    history_file: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub priority: PriorityOrder,
    pub persist_history: bool,
    pub history_file: PathBuf,
    /// `tracing` filter directive; logging is off when unset.
    pub log_filter: Option<String>,
    pub log_file: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let (config_dir, data_dir) = match ProjectDirs::from("com", "soulcalc", "soulcalc") {
            Some(proj) => (proj.config_dir().to_path_buf(), proj.data_dir().to_path_buf()),
            None => (PathBuf::from("."), PathBuf::from(".")),
        };
        Self::from_sources(&config_dir.join("config.json"), &data_dir, |key| {
            std::env::var(key).ok()
        })
    }

    /// Builds the config from an optional file plus an env lookup. A missing
    /// file means defaults.
    pub fn from_sources(
        config_file: &Path,
        data_dir: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let file: FileConfig = match fs::read_to_string(config_file) {
            Ok(s) => serde_json::from_str(&s)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => return Err(e.into()),
        };

        let priority = match env(ENV_PRIORITY).or(file.priority) {
            Some(s) => s.trim().parse::<PriorityOrder>()?,
            None => PriorityOrder::default(),
        };
        let persist_history = env(ENV_PERSIST)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .or(file.persist_history)
            .unwrap_or(false);
        let history_file = env(ENV_HISTORY_FILE)
            .map(PathBuf::from)
            .or(file.history_file)
            .unwrap_or_else(|| data_dir.join("session.json"));
        let log_filter = env(ENV_LOG)
            .or_else(|| env("RUST_LOG"))
            .filter(|f| !f.trim().is_empty());
        let log_file = env(ENV_LOG_FILE)
            .map(PathBuf::from)
            .or(file.log_file)
            .unwrap_or_else(|| data_dir.join("soulcalc.log"));

        Ok(Self {
            priority,
            persist_history,
            history_file,
            log_filter,
            log_file,
        })
    }
}
