use crate::error::config::ConfigError;
use crate::{INSPECTOR_DISCOVERY_PATH, INSPECTOR_HOSTNAME, INSPECTOR_PORT, INTERNAL_SCRIPT_PREFIX};

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

/// Where to find the inspector's target listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InspectorConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_discovery_path")]
    pub discovery_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            discovery_path: default_discovery_path(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl InspectorConfig {
    /// Full URL of the target listing, e.g. `http://127.0.0.1:9229/json`.
    pub fn discovery_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "http://{}:{}/{}",
            self.host,
            self.port,
            self.discovery_path.trim_start_matches('/')
        ))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    /// Script URLs starting with this prefix are hidden from `sources`
    /// unless `--all` is given.
    #[serde(default = "default_internal_prefix")]
    pub internal_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            internal_prefix: default_internal_prefix(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Option<LevelFilter> {
        LevelFilter::from_str(&self.level).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NdbConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub inspector: InspectorConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for NdbConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            inspector: InspectorConfig::default(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    INSPECTOR_HOSTNAME.to_string()
}
fn default_port() -> u16 {
    INSPECTOR_PORT
}
fn default_discovery_path() -> String {
    INSPECTOR_DISCOVERY_PATH.to_string()
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_internal_prefix() -> String {
    INTERNAL_SCRIPT_PREFIX.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

// ============================================
// IMPLEMENTATION
// ============================================

impl NdbConfig {
    /// Load config from {config_dir}/config.json.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// read, parsed or validated is an error.
    #[track_caller]
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: NdbConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/config.json using atomic write.
    ///
    /// Writes a temp file next to the target and renames it over.
    #[track_caller]
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation_error(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.inspector.host.trim().is_empty() {
            return Err(validation_error("inspector.host cannot be empty"));
        }

        if self.inspector.port == 0 {
            return Err(validation_error("inspector.port must be non-zero"));
        }

        if self.inspector.request_timeout_secs == 0 {
            return Err(validation_error(
                "inspector.request_timeout_secs must be non-zero",
            ));
        }

        if let Err(e) = self.inspector.discovery_url() {
            return Err(validation_error(format!(
                "Invalid discovery URL for {}:{}: {}",
                self.inspector.host, self.inspector.port, e
            )));
        }

        if self.session.internal_prefix.is_empty() {
            return Err(validation_error("session.internal_prefix cannot be empty"));
        }

        if self.logging.level_filter().is_none() {
            return Err(validation_error(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }
}

#[track_caller]
fn validation_error(reason: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason: reason.into(),
    }
}
