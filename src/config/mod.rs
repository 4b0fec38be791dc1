//! Configuration module for BandVis
//!
//! Handles application configuration and the locations of persisted state:
//! - `config.toml` - collection, chart, and logging settings
//! - `view_state.json` - persisted visibility/orientation/stack-order blob
//!   (written through the store module)
//!
//! # App Data Location
//!
//! Application data lives in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.bandvis.bandvis-rs/`
//! - **macOS**: `~/Library/Application Support/dev.bandvis.bandvis-rs/`
//! - **Windows**: `%APPDATA%\dev.bandvis.bandvis-rs\`
//!
//! Every field carries a serde default so a partial or missing config file
//! degrades to sensible behavior instead of failing to parse.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BandVisError, Result};
use crate::pipeline::Resolution;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.bandvis.bandvis-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// View-state filename (backing file for the key-value store)
pub const VIEW_STATE_FILE: &str = "view_state.json";

/// Default polling interval in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Default lookback window in hours
pub const DEFAULT_LOOKBACK_HOURS: i64 = 2;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        BandVisError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            BandVisError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Path of the view-state file inside the app data directory
pub fn view_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(VIEW_STATE_FILE))
}

// ==================== App Config ====================

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Telemetry collection settings
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Chart defaults applied before any persisted view state
    #[serde(default)]
    pub chart: ChartConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telemetry collection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Seconds between polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Hours of history requested from the source each poll
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: i64,
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_lookback_hours() -> i64 {
    DEFAULT_LOOKBACK_HOURS
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            lookback_hours: DEFAULT_LOOKBACK_HOURS,
        }
    }
}

impl CollectionConfig {
    /// Polling interval as a std duration
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// Lookback window as a chrono duration
    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lookback_hours.max(1))
    }
}

/// Chart defaults applied before any persisted view state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Default bucketing resolution
    #[serde(default)]
    pub resolution: Resolution,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::Raw,
        }
    }
}

/// Logging settings for the hosting binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default EnvFilter directive when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Also write a daily-rolling log file in the app data directory
    #[serde(default)]
    pub file_logging: bool,
}

fn default_log_filter() -> String {
    "info,bandvis_rs=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file_logging: false,
        }
    }
}

impl AppConfig {
    /// Load the config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| BandVisError::Config(format!("Failed to read config: {}", e)))?;
        toml::from_str(&content)
            .map_err(|e| BandVisError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load the config from the default location, falling back to defaults
    pub fn load_or_default() -> Self {
        let path = match app_data_dir() {
            Some(dir) => dir.join(CONFIG_FILE),
            None => return Self::default(),
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BandVisError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path.as_ref(), content)
            .map_err(|e| BandVisError::Config(format!("Failed to write config: {}", e)))
    }
}
