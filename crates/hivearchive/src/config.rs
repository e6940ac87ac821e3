//! Configuration management for hivearchive.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. The
//! store connection itself comes from a separate JSON blob in the environment
//! (see [`crate::store::StoreConnection`]).

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::store::DEFAULT_COLLECTION_PATH;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "hivearchive";

/// Default environment variable holding the store connection JSON.
pub const DEFAULT_CONNECTION_ENV: &str = "HIVE_FIREBASE_CONFIG";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HIVEARCHIVE_`)
/// 2. TOML config file at `~/.config/hivearchive/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration.
    pub store: StoreConfig,
    /// Speech configuration.
    pub speech: SpeechConfig,
    /// Export configuration.
    pub export: ExportConfig,
}

/// Remote store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Collection path inside the database.
    pub path: String,
    /// Environment variable holding the Firebase web config JSON.
    pub connection_env: String,
    /// How many of the newest records to load.
    pub recent_limit: usize,
    /// Timeout for each request in seconds.
    pub request_timeout_secs: u64,
    /// Retries after a transient failure. 0 disables retrying.
    pub max_retries: usize,
    /// Base delay between retries in milliseconds.
    pub retry_delay_ms: u64,
}

/// Speech configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Allow reading records aloud.
    pub enabled: bool,
    /// BCP 47 language tag passed to the speech engine.
    pub language: String,
}

/// Export configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported files are written to.
    /// Defaults to the user's download directory.
    pub directory: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_COLLECTION_PATH.to_string(),
            connection_env: DEFAULT_CONNECTION_ENV.to_string(),
            recent_limit: 10,
            request_timeout_secs: 10,
            max_retries: 2,
            retry_delay_ms: 200,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "pt-BR".to_string(),
        }
    }
}

impl StoreConfig {
    /// Get the request timeout as a Duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("HIVEARCHIVE_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.store.recent_limit == 0 {
            return Err(Error::ConfigValidation {
                message: "store.recent_limit must be greater than 0".to_string(),
            });
        }

        if self.store.request_timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "store.request_timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.store.path.trim_matches('/').is_empty() {
            return Err(Error::ConfigValidation {
                message: "store.path must name a collection".to_string(),
            });
        }

        if self.store.connection_env.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "store.connection_env must name an environment variable".to_string(),
            });
        }

        if self.speech.language.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "speech.language must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the export directory, resolving defaults if not set.
    #[must_use]
    pub fn export_directory(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
