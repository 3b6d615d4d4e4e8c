//! Audit logging configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Whether audit logging is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Where audit records are written.
    #[serde(default)]
    pub sink: SinkBackend,

    /// File path (for the file sink).
    #[serde(default = "default_file_path")]
    pub file_path: String,

    /// Database table (for the database sink).
    #[serde(default = "default_table")]
    pub table: String,

    /// Audited methods: qualified method name -> operation label.
    #[serde(default)]
    pub methods: BTreeMap<String, String>,
}

/// Audit sink backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkBackend {
    /// Insert rows into a Postgres table.
    #[default]
    Database,
    /// Append JSON lines to a file.
    File,
    /// Print to stdout.
    Console,
    /// Discard records.
    None,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            sink: SinkBackend::default(),
            file_path: default_file_path(),
            table: default_table(),
            methods: BTreeMap::new(),
        }
    }
}

impl AuditConfig {
    /// Whether the configured sink needs a database pool.
    pub fn requires_database(&self) -> bool {
        self.enabled && self.sink == SinkBackend::Database
    }
}

fn default_enabled() -> bool {
    true
}

fn default_file_path() -> String {
    "audit.log".to_string()
}

fn default_table() -> String {
    "sys_log".to_string()
}
