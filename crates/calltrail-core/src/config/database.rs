//! Database connection configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Postgres connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Whether a Postgres connection is opened at startup.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Full connection URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Maximum pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Environment variable containing the full DATABASE_URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_env: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            url: default_url(),
            max_connections: default_max_connections(),
            credentials_env: Some("DATABASE_URL".to_string()),
        }
    }
}

impl DatabaseConfig {
    /// Resolve the connection string, preferring `credentials_env` when it is set.
    pub fn connection_string(&self) -> String {
        if let Some(env_var) = &self.credentials_env {
            if let Ok(url) = std::env::var(env_var) {
                return url;
            }
        }
        self.url.clone()
    }
}

fn default_enabled() -> bool {
    true
}

fn default_url() -> String {
    "postgresql://postgres@localhost:5432/calltrail".to_string()
}

fn default_max_connections() -> u32 {
    5
}
