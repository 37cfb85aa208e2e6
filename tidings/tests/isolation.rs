//! Failing and panicking handlers never disturb an emission.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tidings::{
    BoxError, Emitter, HandlerError, MaybeAsync, from_async,
    testing::{CountingHandler, FailingHandler, OrderLog},
};

mod common;
use common::PanickingHandler;

#[tokio::test]
async fn test_error_does_not_stop_later_handlers() {
    let log = OrderLog::new();
    let emitter = Emitter::<()>::new();
    emitter.on("e", log.handler("before"));
    emitter.on("e", FailingHandler::new("boom"));
    emitter.on("e", log.handler("after"));

    let report = emitter.emit_with_report("e", ()).await;

    assert_eq!(log.entries(), vec!["before", "after"]);
    assert_eq!(report.executed, 3);
    assert_eq!(report.succeeded(), 2);
    assert!(matches!(report.failures[0].error, HandlerError::Failed(_)));
    assert_eq!(report.failures[0].error.to_string(), "handler failed: boom");
}

#[tokio::test]
async fn test_sync_panic_is_isolated() {
    let counter = CountingHandler::new();
    let emitter = Emitter::<u32>::new();
    emitter.on("e", PanickingHandler);
    emitter.on("e", counter.clone());

    let report = emitter.emit_with_report("e", 7).await;

    assert_eq!(counter.count(), 1);
    assert!(report.failures[0].error.is_panic());
    assert_eq!(
        report.failures[0].error.to_string(),
        "handler panicked: handler exploded"
    );
}

#[tokio::test]
async fn test_async_error_and_panic_are_isolated() {
    let counter = CountingHandler::new();
    let emitter = Emitter::<u32>::new();
    emitter.on(
        "e",
        from_async(|_: u32| async { Err::<(), BoxError>("async boom".into()) }),
    );
    emitter.on(
        "e",
        from_async(|n: u32| async move {
            if n > 0 {
                panic!("async exploded");
            }
        }),
    );
    emitter.on("e", counter.clone());

    let report = emitter.emit_with_report("e", 1).await;

    assert_eq!(counter.count(), 1);
    assert_eq!(report.failures.len(), 2);
    assert!(!report.failures[0].error.is_panic());
    assert!(report.failures[1].error.is_panic());
}

#[tokio::test]
async fn test_closure_returning_result() {
    let emitter = Emitter::<i64>::new();
    emitter.on("n", |n: &i64| -> Result<(), BoxError> {
        if *n < 0 {
            return Err(format!("negative: {n}").into());
        }
        Ok(())
    });

    assert!(emitter.emit_with_report("n", 3).await.is_clean());

    let report = emitter.emit_with_report("n", -1).await;
    assert_eq!(report.failures[0].error.to_string(), "handler failed: negative: -1");
}

#[tokio::test]
async fn test_closure_returning_maybe_async() {
    let settled = Arc::new(AtomicBool::new(false));
    let flag = settled.clone();
    let emitter = Emitter::<u8>::new();
    emitter.on("e", move |_: &u8| {
        let flag = flag.clone();
        MaybeAsync::pending(async move {
            tokio::task::yield_now().await;
            flag.store(true, Ordering::SeqCst);
        })
    });

    assert!(emitter.emit_with_report("e", 1).await.is_clean());
    assert!(settled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_emit_never_fails() {
    let emitter = Emitter::<()>::new();
    emitter.on("*", PanickingHandler);
    emitter.on("*", FailingHandler::new("always"));

    // Resolves to `()` regardless of handler outcomes.
    emitter.emit("anything", ()).await;
    emitter.emit("anything", ()).await;

    assert_eq!(emitter.listener_count(), 2);
}
