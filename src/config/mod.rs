//! Configuration management.
//!
//! Settings come from an optional TOML file, overridden by environment
//! variables prefixed with `METAFETCH_` (nested keys separated by `__`):
//!
//! ```toml
//! [catalog]
//! base_url = "https://www.goodreads.com"
//! user_agent = "goodreads-metafetch/0.1.0"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [retry]
//! enabled = false
//! max_retries = 5
//! interval_ms = 500
//! multiplier = 2.0
//! ```
//!
//! `METAFETCH_RETRY__ENABLED=true` turns retries on without a file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::{CatalogError, DEFAULT_BASE_URL};
use crate::utils::RetryConfiguration;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "metafetch.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Catalog endpoint and HTTP client settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Retry policy for page fetches
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Catalog endpoint and HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total request timeout, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout, in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Retry policy settings, validated into a [`RetryConfiguration`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Whether fetches are retried at all
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of attempts, first one included
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Factor applied to the delay after each retry
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_retries: default_max_retries(),
            interval_ms: default_interval_ms(),
            multiplier: default_multiplier(),
        }
    }
}

fn default_max_retries() -> u32 {
    RetryConfiguration::EXPONENTIAL.max_retries()
}

fn default_interval_ms() -> u64 {
    RetryConfiguration::EXPONENTIAL.interval().as_millis() as u64
}

fn default_multiplier() -> f64 {
    RetryConfiguration::EXPONENTIAL.multiplier()
}

impl RetrySettings {
    /// Validate the settings.
    pub fn to_configuration(&self) -> Result<RetryConfiguration, CatalogError> {
        RetryConfiguration::new(
            self.max_retries,
            Duration::from_millis(self.interval_ms),
            self.multiplier,
        )
    }
}

impl Config {
    /// Save the configuration as TOML
    pub fn save(&self, path: &Path) -> Result<(), config::ConfigError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| config::ConfigError::Foreign(Box::new(e)))
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, config::ConfigError> {
        toml::to_string_pretty(self).map_err(|e| config::ConfigError::Message(e.to_string()))
    }
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    load_with_environment(Some(path), environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("METAFETCH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with_environment(
    path: Option<&Path>,
    environment: config::Environment,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder.add_source(environment).build()?;
    settings.try_deserialize()
}

/// Look for a configuration file in the working directory, then in the
/// platform configuration directory (`<config_dir>/metafetch/config.toml`).
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("metafetch").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Get the configuration from the first file found, or from environment
/// variables and defaults when there is none.
pub fn get_config() -> Config {
    let loaded = match find_config_file() {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            load_config(&path)
        }
        None => load_with_environment(None, environment()),
    };

    loaded.unwrap_or_else(|e| {
        tracing::warn!("Invalid configuration, using defaults: {}", e);
        Config::default()
    })
}
