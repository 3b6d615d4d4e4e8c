//! End-to-end behavior of the interceptor against in-process sinks.

use async_trait::async_trait;
use calltrail_audit::{
    AuditError, AuditPolicy, AuditRecord, AuditSink, CallerContext, Interceptor, Invocation,
    MemorySink, TaggedMethods,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Sink that always fails and counts attempts.
#[derive(Default)]
struct FailingSink {
    attempts: AtomicUsize,
}

#[async_trait]
impl AuditSink for FailingSink {
    async fn save(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditError::Persistence("storage unavailable".to_string()))
    }
}

#[derive(Debug, PartialEq)]
struct NotFound(String);

fn policy() -> Arc<TaggedMethods> {
    Arc::new(
        TaggedMethods::new()
            .tag_with("StudentService::query_by_sno", "query")
            .tag_with("StudentService::delete", "delete student")
            .tag("StudentService::list_all"),
    )
}

fn caller() -> CallerContext {
    CallerContext::new("alice", "203.0.113.7")
}

#[tokio::test]
async fn slow_query_produces_one_timed_record() {
    let sink = Arc::new(MemorySink::new());
    let interceptor = Interceptor::new(policy(), sink.clone());

    let result: Result<String, NotFound> = interceptor
        .intercept(
            Invocation::new("StudentService::query_by_sno").param("sno", "1"),
            &caller(),
            || async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok("Tom".to_string())
            },
        )
        .await;

    assert_eq!(result, Ok("Tom".to_string()));

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.operation(), "query");
    assert_eq!(record.method(), "StudentService::query_by_sno");
    assert_eq!(record.username(), Some("alice"));
    assert_eq!(record.ip(), "203.0.113.7");
    assert!(record.elapsed_time() >= 50, "elapsed {}", record.elapsed_time());
    assert!(record.elapsed_time() < 1000, "elapsed {}", record.elapsed_time());
}

#[tokio::test]
async fn failing_call_is_audited_and_error_propagates() {
    let sink = Arc::new(MemorySink::new());
    let interceptor = Interceptor::new(policy(), sink.clone());

    let result: Result<(), NotFound> = interceptor
        .intercept(
            Invocation::new("StudentService::delete").param("sno", "42"),
            &caller(),
            || async { Err(NotFound("42".to_string())) },
        )
        .await;

    assert_eq!(result, Err(NotFound("42".to_string())));
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation(), "delete student");
    assert_eq!(records[0].params(), r#"{"sno":"42"}"#);
}

#[tokio::test]
async fn sink_failure_does_not_change_outcome() {
    let sink = Arc::new(FailingSink::default());
    let interceptor = Interceptor::new(policy(), sink.clone());

    let ok: Result<u32, NotFound> = interceptor
        .intercept(Invocation::new("StudentService::list_all"), &caller(), || async {
            Ok(3)
        })
        .await;
    assert_eq!(ok, Ok(3));

    let err: Result<u32, NotFound> = interceptor
        .intercept(Invocation::new("StudentService::delete"), &caller(), || async {
            Err(NotFound("x".to_string()))
        })
        .await;
    assert_eq!(err, Err(NotFound("x".to_string())));

    // Exactly one attempt per call, no retries
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn untagged_method_produces_no_record() {
    let sink = Arc::new(MemorySink::new());
    let interceptor = Interceptor::new(policy(), sink.clone());

    let value = interceptor
        .intercept(Invocation::new("StudentService::count"), &caller(), || async { 5 })
        .await;

    assert_eq!(value, 5);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn empty_label_is_recorded_as_empty_operation() {
    let sink = Arc::new(MemorySink::new());
    let interceptor = Interceptor::new(policy(), sink.clone());

    interceptor
        .intercept(
            Invocation::new("StudentService::list_all"),
            &CallerContext::anonymous("10.1.1.1"),
            || async {},
        )
        .await;

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].operation(), "");
    assert_eq!(records[0].username(), None);
    assert_eq!(records[0].params(), "{}");
}

#[tokio::test]
async fn wrapped_call_runs_exactly_once() {
    let sink = Arc::new(FailingSink::default());
    let interceptor = Interceptor::new(policy(), sink);
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    interceptor
        .intercept(Invocation::new("StudentService::list_all"), &caller(), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn panicking_call_is_audited_and_panic_propagates() {
    let sink = Arc::new(MemorySink::new());
    let interceptor = Interceptor::new(policy(), sink.clone());

    let handle = tokio::spawn(async move {
        interceptor
            .intercept(Invocation::new("StudentService::delete"), &caller(), || async {
                panic!("boom");
            })
            .await
    });

    let err = handle.await.unwrap_err();
    assert!(err.is_panic());
    let payload = err.into_panic();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));

    assert_eq!(sink.len(), 1);
    assert_eq!(sink.records()[0].operation(), "delete student");
}

#[tokio::test]
async fn concurrent_calls_produce_independent_records() {
    let sink = Arc::new(MemorySink::new());
    let interceptor = Interceptor::new(policy(), sink.clone());

    let mut handles = Vec::new();
    for i in 0..10 {
        let interceptor = interceptor.clone();
        handles.push(tokio::spawn(async move {
            let caller = CallerContext::new(format!("user{}", i), "127.0.0.1");
            interceptor
                .intercept(
                    Invocation::new("StudentService::query_by_sno").param("sno", &i),
                    &caller,
                    || async move { i * 2 },
                )
                .await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i * 2);
    }

    let records = sink.records();
    assert_eq!(records.len(), 10);
    let ids: HashSet<&str> = records.iter().map(|r| r.id()).collect();
    assert_eq!(ids.len(), 10);
    let users: HashSet<Option<&str>> = records.iter().map(|r| r.username()).collect();
    assert_eq!(users.len(), 10);
}

/// Policy that audits every method under one label.
struct AuditEverything;

impl AuditPolicy for AuditEverything {
    fn select(&self, _method: &str) -> Option<String> {
        Some("any".to_string())
    }
}

#[tokio::test]
async fn every_selected_call_gets_one_write_attempt() {
    let sink = Arc::new(FailingSink::default());
    let interceptor = Interceptor::new(Arc::new(AuditEverything), sink.clone());

    for method in ["StudentService::add", "StudentService::delete"] {
        interceptor
            .intercept(Invocation::new(method), &caller(), || async {})
            .await;
    }
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn blank_method_is_never_selected() {
    let sink = Arc::new(FailingSink::default());
    let interceptor = Interceptor::new(Arc::new(AuditEverything), sink.clone());
    let calls = AtomicUsize::new(0);

    let out = interceptor
        .intercept(Invocation::new(" "), &caller(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            "done"
        })
        .await;

    assert_eq!(out, "done");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 0);
}
