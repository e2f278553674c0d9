//! Application configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::error::located_error;

/// Configuration for the stores and the match engine's timing knobs.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the local SQLite database file.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Base URL of the remote document store.
    #[serde(default = "default_remote_url")]
    remote_url: String,

    /// Per-request timeout for remote mirroring calls, in milliseconds.
    #[serde(default = "default_remote_timeout_ms")]
    remote_timeout_ms: u64,
}

fn default_db_path() -> String {
    "matchbook.db".to_string()
}

fn default_remote_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_remote_timeout_ms() -> u64 {
    5000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            remote_url: default_remote_url(),
            remote_timeout_ms: default_remote_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Creates a configuration with explicit values.
    #[instrument(skip(db_path, remote_url), fields(db_path = %db_path))]
    pub fn new(db_path: String, remote_url: String, remote_timeout_ms: u64) -> Self {
        Self {
            db_path,
            remote_url,
            remote_timeout_ms,
        }
    }

    /// Loads configuration from a TOML file. Missing keys fall back to
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(db_path = %config.db_path, "Config loaded successfully");
        Ok(config)
    }

    /// Builds configuration from environment variables (`MATCHBOOK_DB`,
    /// `MATCHBOOK_REMOTE_URL`, `MATCHBOOK_REMOTE_TIMEOUT_MS`), falling
    /// back to the defaults. Call after `dotenvy::dotenv()`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the timeout variable is not an integer.
    #[instrument]
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(db_path) = std::env::var("MATCHBOOK_DB") {
            config.db_path = db_path;
        }
        if let Ok(remote_url) = std::env::var("MATCHBOOK_REMOTE_URL") {
            config.remote_url = remote_url;
        }
        if let Ok(timeout) = std::env::var("MATCHBOOK_REMOTE_TIMEOUT_MS") {
            config.remote_timeout_ms = timeout.parse().map_err(|_| {
                ConfigError::new(format!(
                    "MATCHBOOK_REMOTE_TIMEOUT_MS must be an integer, got '{}'",
                    timeout
                ))
            })?;
        }

        info!(db_path = %config.db_path, remote_url = %config.remote_url, "Config built from environment");
        Ok(config)
    }
}

located_error!(
    /// Configuration error.
    ConfigError,
    "Config error"
);
