//! Configuration module
//!
//! Reads a TOML file (default `~/.config/parkeoya/config.toml`, overridable
//! via the `PARKEOYA_CONFIG` environment variable). Every section falls
//! back to sensible defaults so a missing or partial file still yields a
//! runnable configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub device_gateway: DeviceGatewayConfig,
    pub push: PushConfig,
    pub reservations: ReservationsConfig,
    /// Seconds to wait for background tasks during shutdown
    pub shutdown_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            device_gateway: DeviceGatewayConfig::default(),
            push: PushConfig::default(),
            reservations: ReservationsConfig::default(),
            shutdown_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter (overridden by RUST_LOG)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceGatewayConfig {
    /// Base URL of the edge-server routing endpoint
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for DeviceGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8085".to_string(),
            request_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Push delivery endpoint (FCM legacy HTTP API shape)
    pub endpoint: String,
    pub server_key: String,
    pub request_timeout_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://fcm.googleapis.com/fcm/send".to_string(),
            server_key: String::new(),
            request_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationsConfig {
    /// How often the expiry task looks for overdue reservations
    pub expiry_check_interval_secs: u64,
}

impl Default for ReservationsConfig {
    fn default() -> Self {
        Self {
            expiry_check_interval_secs: 60,
        }
    }
}

/// Default configuration file location
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parkeoya")
        .join("config.toml")
}
