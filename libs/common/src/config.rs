//! Application configuration
//!
//! Settings are layered: built-in defaults, then an optional `soundwave.toml`
//! in the working directory, then environment variables (after a `.env` file
//! has been loaded, if present). Environment variable names are the upper-case
//! form of the keys below, e.g. `SECRET_KEY` or `STORAGE_ROOT`.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::database::DatabaseConfig;

/// Signing secret used when none is configured. Only acceptable for local use.
pub const DEFAULT_SECRET_KEY: &str = "mysecret";

/// Keys that may be overridden from the environment
const KEYS: &[&str] = &[
    "secret_key",
    "database_url",
    "database_max_connections",
    "database_connection_timeout",
    "storage_root",
    "upload_folder",
    "bind_address",
    "token_ttl_hours",
    "downloader_program",
    "downloader_script",
    "downloader_timeout_secs",
    "max_upload_bytes",
];

/// Configuration shared by every component, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HS256 secret for session tokens
    pub secret_key: String,
    /// SQLite connection URL
    pub database_url: String,
    /// Maximum number of pooled connections
    pub database_max_connections: u32,
    /// Pool acquire timeout in seconds
    pub database_connection_timeout: u64,
    /// Directory holding one sub-directory per user
    pub storage_root: PathBuf,
    /// Directory receiving uploaded cover images
    pub upload_folder: PathBuf,
    /// Listen address of the HTTP server
    pub bind_address: String,
    /// Session token lifetime in hours
    pub token_ttl_hours: u64,
    /// Interpreter or executable used for downloads
    pub downloader_program: String,
    /// Script passed as first argument to the downloader program
    pub downloader_script: String,
    /// Downloader timeout in seconds; 0 disables the timeout
    pub downloader_timeout_secs: u64,
    /// Maximum accepted request body size for uploads
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            database_url: "sqlite://users.db".to_string(),
            database_max_connections: 5,
            database_connection_timeout: 30,
            storage_root: PathBuf::from("database"),
            upload_folder: PathBuf::from("image"),
            bind_address: "0.0.0.0:5000".to_string(),
            token_ttl_hours: 24,
            downloader_program: "/usr/local/bin/python3".to_string(),
            downloader_script: "main.py".to_string(),
            downloader_timeout_secs: 300,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load the configuration from defaults, `soundwave.toml` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let vars = std::env::vars()
            .filter(|(key, _)| KEYS.contains(&key.to_ascii_lowercase().as_str()))
            .collect();

        Self::from_sources(Some("soundwave"), vars)
    }

    /// Build a configuration from an optional file stem and explicit variables
    pub fn from_sources(
        file: Option<&str>,
        vars: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        let config: Self = builder
            .add_source(Environment::default().source(Some(vars)).try_parsing(true))
            .build()?
            .try_deserialize()?;

        if config.uses_default_secret() {
            warn!("SECRET_KEY is not set; signing tokens with the built-in default secret");
        }

        Ok(config)
    }

    /// Whether tokens are signed with the built-in secret
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    /// Database settings for the connection pool
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            database_url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            connection_timeout: self.database_connection_timeout,
        }
    }

    /// Session token lifetime
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_hours * 3600)
    }

    /// Downloader timeout, `None` when disabled
    pub fn downloader_timeout(&self) -> Option<Duration> {
        (self.downloader_timeout_secs > 0).then(|| Duration::from_secs(self.downloader_timeout_secs))
    }
}
