//! Configuration loading from `~/.ainon/config.toml` with defaults.

use ainon_recorder::{RecorderConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Settings for the recorder process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderSettings {
    /// Directory holding the SQLite database.
    pub data_dir: PathBuf,
    /// Which backends this deployment enables.
    pub backends: BackendSettings,
    /// Retry tuning, applied to each backend write independently.
    pub retry: RetrySettings,
    /// Bound on one side's total write latency (retries included), in ms.
    pub write_timeout_ms: u64,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backends: BackendSettings::default(),
            retry: RetrySettings::default(),
            write_timeout_ms: 10_000,
        }
    }
}

impl RecorderSettings {
    /// Path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("ainon.db")
    }

    /// Translate into the recorder's runtime tuning.
    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            retry: RetryConfig {
                max_attempts: self.retry.max_attempts,
                min_delay_ms: self.retry.min_delay_ms,
                max_delay_ms: self.retry.max_delay_ms,
                ..RetryConfig::default()
            },
            write_timeout: Duration::from_millis(self.write_timeout_ms),
        }
    }
}

/// Per-backend enablement flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Conversational memory timeline.
    pub memory: bool,
    /// Semantic knowledge index.
    pub knowledge: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            memory: true,
            knowledge: true,
        }
    }
}

/// Retry knobs exposed in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum attempts per backend write (including the first try).
    pub max_attempts: u32,
    /// Minimum backoff delay in milliseconds.
    pub min_delay_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            min_delay_ms: defaults.min_delay_ms,
            max_delay_ms: defaults.max_delay_ms,
        }
    }
}

/// Default data directory: `~/.ainon`, falling back to the working directory.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".ainon"))
        .unwrap_or_else(|| PathBuf::from(".ainon"))
}

/// Load settings from a TOML file, with defaults on any failure.
pub fn load_settings(path: Option<&Path>) -> RecorderSettings {
    let config_path = path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| default_data_dir().join("config.toml"));

    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<RecorderSettings>(&contents) {
                Ok(settings) => {
                    info!(path = %config_path.display(), "Loaded configuration");
                    return settings;
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        path = %config_path.display(),
                        "Failed to parse config, using defaults"
                    );
                }
            },
            Err(e) => {
                warn!(
                    error = %e,
                    path = %config_path.display(),
                    "Failed to read config file, using defaults"
                );
            }
        }
    } else {
        info!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
    }

    RecorderSettings::default()
}
