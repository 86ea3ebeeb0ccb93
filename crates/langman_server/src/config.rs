//! Server configuration loaded from a per-environment TOML file.
//!
//! ```toml
//! [development]
//! usage_db = "data/usage.db"
//! games_db = "data/games.db"
//! miss_limit = 6
//! ```

use std::collections::HashMap;
use std::path::Path;

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use langman_core::{DEFAULT_MISS_LIMIT, Rules};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Configuration for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct AppConfig {
    /// Path of the usage corpus database.
    usage_db: String,

    /// Path of the users and games database.
    games_db: String,

    /// Bad guesses allowed before a game is lost.
    #[serde(default = "default_miss_limit")]
    miss_limit: u32,

    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,
}

fn default_miss_limit() -> u32 {
    DEFAULT_MISS_LIMIT
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl AppConfig {
    /// Creates a configuration with default rules and bind address.
    #[instrument(skip(usage_db, games_db))]
    pub fn new(usage_db: impl Into<String>, games_db: impl Into<String>) -> Self {
        Self {
            usage_db: usage_db.into(),
            games_db: games_db.into(),
            miss_limit: default_miss_limit(),
            host: default_host(),
            port: default_port(),
        }
    }

    /// Loads the `environment` table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, does not parse,
    /// or has no table for `environment`.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>, environment: &str) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content, environment)
    }

    /// Parses the `environment` table out of TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text does not parse or has no table
    /// for `environment`.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str, environment: &str) -> Result<Self, ConfigError> {
        let mut environments: HashMap<String, Self> = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        let config = environments.remove(environment).ok_or_else(|| {
            ConfigError::new(format!("No configuration for environment '{}'", environment))
        })?;

        info!(
            environment,
            usage_db = %config.usage_db,
            games_db = %config.games_db,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Game rules derived from this configuration.
    pub fn rules(&self) -> Rules {
        Rules::new(self.miss_limit)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
