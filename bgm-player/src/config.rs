//! Configuration management for bgm-player
//!
//! Bootstrap configuration comes from an optional TOML file; command-line
//! arguments (with environment fallbacks) override it. Everything the user
//! changes at runtime (volume, shuffle, repeat, source, favorites) lives in
//! the settings table instead, see [`crate::db::settings`].
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments / environment variables
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)

use bgm_common::config::{default_data_dir, load_toml};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5750;

/// Default TOML file name looked up in the platform config folder
pub const CONFIG_FILE_NAME: &str = "bgm-player.toml";

/// Bootstrap configuration
///
/// Cannot change while running; restart to pick up edits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server port
    pub port: u16,

    /// Path to SQLite settings database (defaults to the platform data folder)
    pub database_path: Option<PathBuf>,

    pub catalog: CatalogConfig,
    pub playback: PlaybackConfig,
    pub driver: DriverConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: None,
            catalog: CatalogConfig::default(),
            playback: PlaybackConfig::default(),
            driver: DriverConfig::default(),
            events: EventsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file, or built-in defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Ok(load_toml(path)?),
            None => Ok(Self::default()),
        }
    }

    /// Effective database path
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| default_data_dir().join("bgm.db"))
    }
}

/// Where track lists come from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the catalog feed
    pub base_url: String,
    /// Identifier of the trending playlist
    pub trending_playlist_id: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5751".to_string(),
            trending_playlist_id: "07653cdf-8f72-430e-847f-9ab8ac05af40".to_string(),
            user_agent: format!("bgm-player/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Playback navigation timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Delay before skipping after the driver rejected a play command
    pub play_retry_delay_ms: u64,
    /// Delay before skipping after the driver reported a playback error
    pub error_retry_delay_ms: u64,
    /// Past this position, "previous" restarts the current track
    pub restart_threshold_secs: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            play_retry_delay_ms: 1500,
            error_retry_delay_ms: 1000,
            restart_threshold_secs: 3.0,
        }
    }
}

impl PlaybackConfig {
    pub fn play_retry_delay(&self) -> Duration {
        Duration::from_millis(self.play_retry_delay_ms)
    }

    pub fn error_retry_delay(&self) -> Duration {
        Duration::from_millis(self.error_retry_delay_ms)
    }
}

/// Remote playback driver settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// How long to wait for the driver to acknowledge a command
    pub ack_timeout_ms: u64,
    /// Buffered commands per connected driver
    pub command_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            ack_timeout_ms: 5000,
            command_capacity: 32,
        }
    }
}

impl DriverConfig {
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

/// State broadcast settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Number of state updates buffered per listener
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
