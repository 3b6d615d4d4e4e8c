//! Configuration types for Calltrail.
//!
//! A single YAML file (`calltrail.yaml` by default) is deserialized into
//! [`AppConfig`]. Every section carries serde defaults, so an empty file is a
//! valid configuration.
//!
//! # Sections
//!
//! - **server**: bind address for the HTTP server
//! - **database**: Postgres connection used by the audit sink and the student example
//! - **audit**: audit sink selection and the table of audited methods
//! - **blog**: externalized string properties served by the config endpoint

pub mod audit;
pub mod blog;
pub mod database;
pub mod server;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use audit::{AuditConfig, SinkBackend};
pub use blog::BlogProperties;
pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Configuration file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "calltrail.yaml";

/// Complete Calltrail configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Postgres connection.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Externalized blog properties.
    #[serde(default)]
    pub blog: BlogProperties,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects a completely empty document for a struct
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Load the configuration named on the command line.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_PATH`] is
    /// read if present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load_or_default(DEFAULT_CONFIG_PATH),
        }
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit.enabled
            && self.audit.sink == SinkBackend::File
            && self.audit.file_path.trim().is_empty()
        {
            return Err(ConfigError::Config(
                "audit.file_path must be set when audit.sink is 'file'".to_string(),
            ));
        }
        if self.audit.requires_database() && !self.database.enabled {
            return Err(ConfigError::Config(
                "audit.sink 'database' requires database.enabled".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
