//! Handlers calling back into the emitter, and multi-threaded use.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tidings::{
    Emitter, RemovalMode, from_async,
    testing::{CountingHandler, OrderLog},
};

#[tokio::test]
async fn test_handler_can_emit() {
    let log = OrderLog::new();
    let emitter = Emitter::<u8>::new();

    let inner = emitter.clone();
    let chain_log = log.clone();
    emitter.on(
        "tick",
        from_async(move |n: u8| {
            let emitter = inner.clone();
            let log = chain_log.clone();
            async move {
                log.push(format!("tick {n}"));
                if n < 3 {
                    emitter.emit("tick", n + 1).await;
                }
            }
        }),
    );

    emitter.emit("tick", 1).await;

    assert_eq!(log.entries(), vec!["tick 1", "tick 2", "tick 3"]);
}

#[tokio::test]
async fn test_handler_can_subscribe_without_affecting_current_emission() {
    let late = CountingHandler::new();
    let emitter = Emitter::<()>::new();

    let inner = emitter.clone();
    let registered = late.clone();
    emitter.once("boot", move |_: &()| {
        inner.on("boot", registered.clone());
    });

    emitter.emit("boot", ()).await;
    assert_eq!(late.count(), 0);
    assert_eq!(emitter.listener_count(), 1);

    emitter.emit("boot", ()).await;
    assert_eq!(late.count(), 1);
}

#[tokio::test]
async fn test_handler_can_unsubscribe_a_later_listener() {
    let victim = CountingHandler::new();
    let emitter = Emitter::<()>::new();

    let inner = emitter.clone();
    let removals = Arc::new(AtomicUsize::new(0));
    let removed = removals.clone();
    emitter.on("e", move |_: &()| {
        if inner.off_all(Some("victim")) > 0 {
            removed.fetch_add(1, Ordering::SeqCst);
        }
    });
    let subscription = emitter.on("victim", victim.clone());

    emitter.emit("e", ()).await;
    emitter.emit("victim", ()).await;

    assert_eq!(removals.load(Ordering::SeqCst), 1);
    assert_eq!(victim.count(), 0);
    assert!(!subscription.is_active());
}

#[tokio::test]
async fn test_snapshot_runs_listener_removed_mid_emission() {
    let second = CountingHandler::new();
    let emitter = Emitter::<()>::new();

    let inner = emitter.clone();
    emitter.on("e", move |_: &()| {
        inner.off_all(Some("e"));
    });
    emitter.on("e", second.clone());

    emitter.emit("e", ()).await;
    assert_eq!(emitter.listener_count(), 0);

    emitter.emit("e", ()).await;
    assert_eq!(second.count(), 1);
}

#[tokio::test]
async fn test_once_removed_by_handler_before_retirement() {
    let emitter = Emitter::<()>::builder()
        .removal(RemovalMode::Batched)
        .build();

    let inner = emitter.clone();
    emitter.once("e", move |_: &()| {
        inner.off_all(None);
    });

    let report = emitter.emit_with_report("e", ()).await;

    assert_eq!(report.listeners_to_remove.len(), 1);
    assert_eq!(emitter.listener_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_emitters_across_tasks() {
    let counter = CountingHandler::new();
    let emitter = Emitter::<u64>::new();
    emitter.on("work:*", counter.clone());
    emitter.once("work:done", CountingHandler::new());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let emitter = emitter.clone();
            tokio::spawn(async move {
                let event = if i % 2 == 0 { "work:even" } else { "work:odd" };
                emitter.emit(event, i).await;
            })
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        assert!(result.is_ok());
    }

    assert_eq!(counter.count(), 16);
    assert_eq!(emitter.listener_count(), 2);
}
