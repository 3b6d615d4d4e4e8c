//! Audit sinks.
//!
//! A sink appends records; it never reads, updates or deletes them.

use async_trait::async_trait;
use calltrail_core::{AuditConfig, SinkBackend};
use sqlx::PgPool;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::AuditError;
use crate::record::AuditRecord;

/// Trait for audit storage backends.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one record.
    async fn save(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Create a sink based on configuration.
///
/// `pool` is required only for the database backend.
pub fn create_sink(
    config: &AuditConfig,
    pool: Option<PgPool>,
) -> Result<Arc<dyn AuditSink>, AuditError> {
    if !config.enabled {
        return Ok(Arc::new(NullSink));
    }

    match config.sink {
        SinkBackend::Database => {
            let pool = pool.ok_or_else(|| {
                AuditError::Configuration("database sink requires a connection pool".to_string())
            })?;
            Ok(Arc::new(PostgresSink::new(pool, &config.table)?))
        }
        SinkBackend::File => Ok(Arc::new(FileSink::new(&config.file_path))),
        SinkBackend::Console => Ok(Arc::new(ConsoleSink)),
        SinkBackend::None => Ok(Arc::new(NullSink)),
    }
}

/// Postgres sink: one `INSERT` per record.
pub struct PostgresSink {
    pool: PgPool,
    insert_sql: String,
}

impl PostgresSink {
    /// Create a sink writing into `table` (optionally schema-qualified).
    pub fn new(pool: PgPool, table: &str) -> Result<Self, AuditError> {
        if !is_valid_table_name(table) {
            return Err(AuditError::Configuration(format!(
                "invalid audit table name '{}'",
                table
            )));
        }

        let insert_sql = format!(
            "INSERT INTO {} (id, username, operation, time, method, params, ip, createtime) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            table
        );

        Ok(Self { pool, insert_sql })
    }
}

#[async_trait]
impl AuditSink for PostgresSink {
    async fn save(&self, record: &AuditRecord) -> Result<(), AuditError> {
        sqlx::query(&self.insert_sql)
            .bind(record.id())
            .bind(record.username())
            .bind(record.operation())
            .bind(record.elapsed_time())
            .bind(record.method())
            .bind(record.params())
            .bind(record.ip())
            .bind(record.created_at())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return false;
    }
    parts.iter().all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

/// File sink (appends JSON lines).
pub struct FileSink {
    path: PathBuf,
    // Serializes appends from concurrent interceptions
    write_lock: Mutex<()>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for FileSink {
    async fn save(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let json = serde_json::to_string(record)?;

        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| AuditError::Persistence(format!("file sink lock poisoned: {}", e)))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

/// Console sink (logs to stdout).
pub struct ConsoleSink;

#[async_trait]
impl AuditSink for ConsoleSink {
    async fn save(&self, record: &AuditRecord) -> Result<(), AuditError> {
        println!("{}", record.to_log_line());
        Ok(())
    }
}

/// In-memory sink. Records are kept in arrival order.
///
/// Unbounded, so it is not selectable from configuration; build it directly
/// and read it back with [`MemorySink::records`].
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<AuditRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.records.lock() {
            Ok(records) => records.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn save(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| AuditError::Persistence(format!("memory sink lock poisoned: {}", e)))?;
        records.push(record.clone());
        Ok(())
    }
}

/// Sink that discards everything.
pub struct NullSink;

#[async_trait]
impl AuditSink for NullSink {
    async fn save(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        Ok(())
    }
}
