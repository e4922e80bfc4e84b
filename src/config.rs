//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! logging settings plus one section per external system (ERP and
//! eCommerce). Both systems are described by the same `SystemConfig`, so a
//! single client implementation serves either.
//!
//! Configuration is stored at `~/.config/inventory-sync/config.json`; the
//! `INVENTORY_SYNC_CONFIG` environment variable points elsewhere.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{CredentialShape, CredentialSource};

/// Application name used for the config directory path
const APP_NAME: &str = "inventory-sync";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "INVENTORY_SYNC_CONFIG";

/// Default per-request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not find config directory")]
    NoConfigDir,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Endpoint paths relative to a system's base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPaths {
    pub auth: String,
    pub send: String,
    pub fetch: String,
    /// Path template containing `{id}`. The identifier is percent-encoded
    /// as part of its segment.
    pub update_status: String,
}

/// Everything needed to talk to one external system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Name used in logs and error messages
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub base_url: String,
    pub credential_shape: CredentialShape,
    pub credentials: CredentialSource,
    pub endpoints: EndpointPaths,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl SystemConfig {
    /// ERP system: username/password credentials, inventory read endpoint
    pub fn erp() -> Self {
        Self {
            name: "ERP".to_string(),
            enabled: true,
            base_url: "https://api.erp-system.com".to_string(),
            credential_shape: CredentialShape::UserPassword,
            credentials: CredentialSource::file("integration/erp_credentials.json"),
            endpoints: EndpointPaths {
                auth: "/auth".to_string(),
                send: "/inventory/update".to_string(),
                fetch: "/inventory/fetch".to_string(),
                update_status: "/orders/{id}/status".to_string(),
            },
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// eCommerce platform: API key credentials, orders read endpoint
    pub fn ecommerce() -> Self {
        Self {
            name: "eCommerce".to_string(),
            enabled: true,
            base_url: "https://api.ecommerce-platform.com".to_string(),
            credential_shape: CredentialShape::ApiKey,
            credentials: CredentialSource::file("integration/ecommerce_credentials.json"),
            endpoints: EndpointPaths {
                auth: "/auth".to_string(),
                send: "/inventory/update".to_string(),
                fetch: "/orders".to_string(),
                update_status: "/orders/{id}/status".to_string(),
            },
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Same system pointed at another base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialSource) -> Self {
        self.credentials = credentials;
        self
    }

    /// Join the base URL and an endpoint path with exactly one slash
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write log lines to `file` instead of stderr
    pub enabled: bool,
    pub file: PathBuf,
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: PathBuf::from("logs/app_log.log"),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub erp: SystemConfig,
    pub ecommerce: SystemConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            erp: SystemConfig::erp(),
            ecommerce: SystemConfig::ecommerce(),
        }
    }
}

impl Config {
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(write_err)
    }

    /// The override path from the environment, or the default location.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
