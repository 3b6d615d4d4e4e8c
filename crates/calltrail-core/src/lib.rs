//! # calltrail-core
//!
//! Configuration types shared across all Calltrail crates.

// Configuration types shared across all Calltrail crates
pub mod config;

// Re-export commonly used config types for convenience
pub use config::{
    AppConfig, AuditConfig, BlogProperties, ConfigError, DatabaseConfig, ServerConfig, SinkBackend,
    DEFAULT_CONFIG_PATH,
};
