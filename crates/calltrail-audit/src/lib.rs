//! # calltrail-audit
//!
//! Call interception and audit records.
//!
//! This crate provides functionality for:
//! - Selecting audited methods through an [`AuditPolicy`] (tagged methods)
//! - Wrapping calls with an [`Interceptor`] that times them and records the caller
//! - Persisting one [`AuditRecord`] per intercepted call through an [`AuditSink`]
//!
//! ## Record Layout
//!
//! | Field | Column | Description |
//! |-------|--------|-------------|
//! | `id` | `id` | UUID assigned at creation |
//! | `username` | `username` | Caller identity, nullable |
//! | `operation` | `operation` | Label from the policy |
//! | `elapsed_time` | `time` | Milliseconds spent in the call |
//! | `method` | `method` | Qualified method name |
//! | `params` | `params` | Arguments as a JSON object |
//! | `ip` | `ip` | Caller address |
//! | `created_at` | `createtime` | Creation timestamp |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use calltrail_audit::{CallerContext, Interceptor, Invocation, MemorySink, TaggedMethods};
//!
//! # async fn example() {
//! let sink = Arc::new(MemorySink::new());
//! let policy = TaggedMethods::new().tag_with("StudentService::query_by_sno", "query");
//! let interceptor = Interceptor::new(Arc::new(policy), sink.clone());
//!
//! let caller = CallerContext::new("alice", "203.0.113.9");
//! let found: Result<Option<String>, std::io::Error> = interceptor
//!     .intercept(
//!         Invocation::new("StudentService::query_by_sno").param("sno", "1"),
//!         &caller,
//!         || async { Ok(Some("Tom".to_string())) },
//!     )
//!     .await;
//!
//! assert!(found.is_ok());
//! assert_eq!(sink.len(), 1);
//! # }
//! ```

pub mod context;
pub mod error;
pub mod interceptor;
pub mod invocation;
pub mod policy;
pub mod record;
pub mod storage;

pub use context::CallerContext;
pub use error::AuditError;
pub use interceptor::Interceptor;
pub use invocation::Invocation;
pub use policy::{AuditPolicy, TaggedMethods};
pub use record::{AuditRecord, AuditRecordBuilder};
pub use storage::{
    AuditSink, ConsoleSink, FileSink, MemorySink, NullSink, PostgresSink, create_sink,
};
