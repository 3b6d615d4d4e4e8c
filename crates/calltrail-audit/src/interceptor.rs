//! The call interceptor.
//!
//! Wraps a call selected by the [`AuditPolicy`], times it, and writes exactly
//! one [`AuditRecord`] to the [`AuditSink`] once the call has finished. The
//! caller always gets the wrapped call's own outcome back: sink failures are
//! logged and dropped, and a panic in the wrapped call is re-raised after the
//! audit attempt.
//!
//! An invocation with a blank method name is never selected, whatever the
//! policy says, since no valid record could be built for it.

use calltrail_core::AuditConfig;
use futures::FutureExt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::context::CallerContext;
use crate::invocation::Invocation;
use crate::policy::{AuditPolicy, TaggedMethods};
use crate::record::AuditRecord;
use crate::storage::{AuditSink, NullSink};

/// Wraps audited calls.
#[derive(Clone)]
pub struct Interceptor {
    policy: Arc<dyn AuditPolicy>,
    sink: Arc<dyn AuditSink>,
    enabled: bool,
}

impl Interceptor {
    /// Create an interceptor with a custom policy and sink.
    pub fn new(policy: Arc<dyn AuditPolicy>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            policy,
            sink,
            enabled: true,
        }
    }

    /// Create an interceptor whose policy is the `audit.methods` table.
    pub fn from_config(config: &AuditConfig, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            policy: Arc::new(TaggedMethods::from_config(config)),
            sink,
            enabled: config.enabled,
        }
    }

    /// Create a pass-through interceptor.
    pub fn disabled() -> Self {
        Self {
            policy: Arc::new(TaggedMethods::new()),
            sink: Arc::new(NullSink),
            enabled: false,
        }
    }

    /// Replace the policy, keeping sink and enabled flag.
    pub fn with_policy(mut self, policy: Arc<dyn AuditPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Check if auditing is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Run `call` exactly once and return its output unchanged.
    ///
    /// When the policy selects `invocation`, one audit record is written after
    /// the call finishes, whether it returned or panicked.
    pub async fn intercept<F, Fut, R>(
        &self,
        invocation: Invocation,
        caller: &CallerContext,
        call: F,
    ) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        let method = invocation.method();
        let operation = if self.enabled && !method.trim().is_empty() {
            self.policy.select(method)
        } else {
            None
        };
        let Some(operation) = operation else {
            return call().await;
        };

        let started = Instant::now();
        let outcome = AssertUnwindSafe(async move { call().await })
            .catch_unwind()
            .await;
        let elapsed = started.elapsed();

        self.record(&invocation, caller, operation, elapsed).await;

        match outcome {
            Ok(output) => output,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Build and persist the record. Never fails.
    async fn record(
        &self,
        invocation: &Invocation,
        caller: &CallerContext,
        operation: String,
        elapsed: Duration,
    ) {
        let elapsed_ms = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);

        let record = match AuditRecord::builder()
            .username(caller.username())
            .operation(operation)
            .elapsed_time(elapsed_ms)
            .method(invocation.method())
            .params(invocation.serialized_params())
            .ip(caller.ip())
            .build()
        {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    method = %invocation.method(),
                    "Failed to build audit record"
                );
                return;
            }
        };

        match self.sink.save(&record).await {
            Ok(()) => tracing::debug!(
                record_id = %record.id(),
                method = %record.method(),
                operation = %record.operation(),
                elapsed_ms = record.elapsed_time(),
                "Audit record saved"
            ),
            Err(err) => tracing::warn!(
                error = %err,
                record_id = %record.id(),
                method = %record.method(),
                "Failed to save audit record"
            ),
        }
    }
}
