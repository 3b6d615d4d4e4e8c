//! Audit record type.
//!
//! One record describes one intercepted call. Records are built once through
//! [`AuditRecordBuilder`], which refuses to produce a record with a required
//! field missing, and are read-only afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuditError;

/// A single audited invocation.
///
/// Serialized field names follow the `sys_log` column layout
/// (`time`, `createtime`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    username: Option<String>,
    operation: String,
    #[serde(rename = "time")]
    elapsed_time: i64,
    method: String,
    params: String,
    ip: String,
    #[serde(rename = "createtime")]
    created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Start building a record. The id and creation time are assigned here.
    pub fn builder() -> AuditRecordBuilder {
        AuditRecordBuilder::new()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Caller identity; `None` for anonymous callers.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Elapsed milliseconds of the intercepted call.
    pub fn elapsed_time(&self) -> i64 {
        self.elapsed_time
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &str {
        &self.params
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Format the record as a human-readable log line.
    ///
    /// Format: `[timestamp] operation="..." method=... time=...ms ip=... user=... params=...`
    pub fn to_log_line(&self) -> String {
        let params_preview = if self.params.chars().count() > 100 {
            let cut: String = self.params.chars().take(100).collect();
            format!("{}...", cut)
        } else {
            self.params.clone()
        };

        format!(
            "[{}] operation=\"{}\" method={} time={}ms ip={} user={} params={}",
            self.created_at.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            self.operation.replace('"', "'"),
            self.method,
            self.elapsed_time,
            self.ip,
            self.username.as_deref().unwrap_or("-"),
            params_preview.replace('\n', " "),
        )
    }
}

/// Builder for [`AuditRecord`].
#[derive(Debug)]
pub struct AuditRecordBuilder {
    id: String,
    created_at: DateTime<Utc>,
    username: Option<String>,
    operation: Option<String>,
    elapsed_time: Option<i64>,
    method: Option<String>,
    params: Option<String>,
    ip: Option<String>,
}

impl AuditRecordBuilder {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            username: None,
            operation: None,
            elapsed_time: None,
            method: None,
            params: None,
            ip: None,
        }
    }

    /// Set the caller identity.
    pub fn username(mut self, username: Option<impl Into<String>>) -> Self {
        self.username = username.map(Into::into);
        self
    }

    /// Set the operation label.
    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Set the elapsed time in milliseconds.
    pub fn elapsed_time(mut self, millis: i64) -> Self {
        self.elapsed_time = Some(millis);
        self
    }

    /// Set the qualified method name.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the serialized arguments.
    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Set the caller address.
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// Build the record.
    pub fn build(self) -> Result<AuditRecord, AuditError> {
        let elapsed_time = self
            .elapsed_time
            .ok_or(AuditError::IncompleteRecord("elapsed_time"))?;
        if elapsed_time < 0 {
            return Err(AuditError::InvalidRecord(format!(
                "elapsed_time must not be negative, got {}",
                elapsed_time
            )));
        }

        let method = self.method.ok_or(AuditError::IncompleteRecord("method"))?;
        if method.trim().is_empty() {
            return Err(AuditError::InvalidRecord("method must not be empty".to_string()));
        }

        Ok(AuditRecord {
            id: self.id,
            username: self.username,
            operation: self.operation.ok_or(AuditError::IncompleteRecord("operation"))?,
            elapsed_time,
            method,
            params: self.params.ok_or(AuditError::IncompleteRecord("params"))?,
            ip: self.ip.ok_or(AuditError::IncompleteRecord("ip"))?,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AuditRecordBuilder {
        AuditRecord::builder()
            .username(Some("alice"))
            .operation("query student")
            .elapsed_time(12)
            .method("StudentService::query_by_sno")
            .params(r#"{"sno":"1"}"#)
            .ip("203.0.113.1")
    }

    #[test]
    fn test_record_builder() {
        let record = complete().build().unwrap();

        assert_eq!(record.username(), Some("alice"));
        assert_eq!(record.operation(), "query student");
        assert_eq!(record.elapsed_time(), 12);
        assert_eq!(record.method(), "StudentService::query_by_sno");
        assert_eq!(record.ip(), "203.0.113.1");
        assert!(Uuid::parse_str(record.id()).is_ok());
    }

    #[test]
    fn test_username_is_optional() {
        let record = complete().username(None::<String>).build().unwrap();
        assert_eq!(record.username(), None);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let err = AuditRecord::builder()
            .operation("")
            .elapsed_time(0)
            .method("m")
            .params("{}")
            .build()
            .unwrap_err();
        assert!(matches!(err, AuditError::IncompleteRecord("ip")));
    }

    #[test]
    fn test_negative_elapsed_time_is_rejected() {
        let err = complete().elapsed_time(-1).build().unwrap_err();
        assert!(matches!(err, AuditError::InvalidRecord(_)));
    }

    #[test]
    fn test_serialized_column_names() {
        let record = complete().build().unwrap();
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["time"], 12);
        assert!(value.get("createtime").is_some());
        assert!(value.get("elapsed_time").is_none());
    }

    #[test]
    fn test_to_log_line() {
        let line = complete().build().unwrap().to_log_line();
        assert!(line.contains("operation=\"query student\""));
        assert!(line.contains("time=12ms"));
        assert!(line.contains("user=alice"));
        assert!(line.contains("ip=203.0.113.1"));
    }
}
