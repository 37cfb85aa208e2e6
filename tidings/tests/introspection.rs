//! Listener summaries and execution statistics.

use std::time::{Duration, SystemTime};
use tidings::{
    Emitter, ListenerOptions,
    testing::{CountingHandler, FailingHandler},
};

#[tokio::test]
async fn test_listeners_snapshot() {
    let before = SystemTime::now();
    let emitter = Emitter::<()>::new();
    let login = emitter.on_with(
        "user:login",
        CountingHandler::new(),
        ListenerOptions::new().with_priority(4).once(),
    );
    emitter.on("user:*", CountingHandler::new());
    emitter.on("admin:*", CountingHandler::new());

    let all = emitter.listeners(None);
    assert_eq!(all.len(), 3);

    let summary = &all["user:login"][0];
    assert_eq!(summary.id, login.id());
    assert_eq!(summary.priority, 4);
    assert!(summary.once);
    assert_eq!(summary.pattern, "user:login");
    assert!(summary.added_at >= before);
    assert_eq!(summary.execution_count, 0);
    assert_eq!(summary.avg_duration, Duration::ZERO);
}

#[test]
fn test_listeners_filter_applies_matching() {
    let emitter = Emitter::<()>::new();
    emitter.on("user:login", CountingHandler::new());
    emitter.on("user:*", CountingHandler::new());
    emitter.on("*", CountingHandler::new());
    emitter.on("admin:*", CountingHandler::new());

    let filtered = emitter.listeners(Some("user:login"));
    let patterns: Vec<_> = filtered.keys().map(String::as_str).collect();

    assert_eq!(patterns, vec!["*", "user:*", "user:login"]);
}

#[tokio::test]
async fn test_stats_count_successful_executions_only() {
    let flaky = FailingHandler::new("down");
    let emitter = Emitter::<()>::new();
    let ok = emitter.on("e", CountingHandler::new());
    emitter.on("e", flaky.clone());

    for _ in 0..3 {
        emitter.emit("e", ()).await;
    }
    flaky.disarm();
    emitter.emit("e", ()).await;

    let summaries = &emitter.listeners(Some("e"))["e"];
    let ok_summary = summaries.iter().find(|s| s.id == ok.id());
    let flaky_summary = summaries.iter().find(|s| s.id != ok.id());

    assert_eq!(ok_summary.map(|s| s.execution_count), Some(4));
    assert_eq!(flaky_summary.map(|s| s.execution_count), Some(1));
}

#[test]
fn test_listener_count() {
    let emitter = Emitter::<()>::new();
    assert_eq!(emitter.listener_count(), 0);

    let sub = emitter.on("a", CountingHandler::new());
    emitter.on("a*", CountingHandler::new());
    assert_eq!(emitter.listener_count(), 2);

    sub.unsubscribe();
    assert_eq!(emitter.listener_count(), 1);
}
