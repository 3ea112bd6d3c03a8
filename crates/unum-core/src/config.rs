//! Engine configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full configuration for the enrollment engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Ledger anchoring settings.
    #[serde(default)]
    pub anchor: AnchorConfig,

    /// Duplicate-index reservation settings.
    #[serde(default)]
    pub reservation: ReservationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Maximum submission attempts before a reservation is released.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Per-attempt submission timeout in milliseconds.
    #[serde(default = "default_submit_timeout_ms")]
    pub submit_timeout_ms: u64,
    /// Base backoff between attempts in milliseconds; doubles per retry.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConfig {
    /// Age in seconds after which a Pending reservation is eligible for
    /// garbage collection back to Released.
    #[serde(default = "default_max_pending_secs")]
    pub max_pending_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_max_attempts() -> u32 {
    3
}
fn default_submit_timeout_ms() -> u64 {
    5_000
}
fn default_backoff_base_ms() -> u64 {
    250
}
fn default_max_pending_secs() -> i64 {
    300
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            submit_timeout_ms: default_submit_timeout_ms(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            max_pending_secs: default_max_pending_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl EngineConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: EngineConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
