use super::traits::{ExecutionReport, Executor, HandlerFailure};
use futures::FutureExt;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    time::Instant,
};
use tidings_core::{Handler, HandlerError, Listener, MaybeAsync, Message};

/// A sequential execution strategy.
///
/// Runs handlers one by one in the order supplied. A pending handler is
/// awaited before the next one starts, so every handler observes the effects
/// of all earlier handlers of the same emission. Errors and panics are caught
/// per handler and recorded; a failed one-shot listener is not retired.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    /// Create a sequential executor.
    pub fn new() -> Self {
        Self
    }
}

impl<P: Message> Executor<P> for SequentialExecutor {
    async fn execute(
        &self,
        event_name: &str,
        payload: &P,
        listeners: &[Arc<Listener<P>>],
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for listener in listeners {
            let started = Instant::now();
            let outcome = run_handler(listener.handler(), payload).await;
            report.executed += 1;

            match outcome {
                Ok(()) => {
                    listener.stats().record(started.elapsed());
                    if listener.is_once() {
                        report.listeners_to_remove.push(listener.id());
                    }
                }
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        event = event_name,
                        listener = %listener.id(),
                        pattern = listener.pattern(),
                        %error,
                        "handler failed"
                    );
                    report.failures.push(HandlerFailure {
                        listener: listener.id(),
                        pattern: listener.pattern().to_owned(),
                        error,
                    });
                }
            }
        }

        #[cfg(not(feature = "tracing"))]
        let _ = event_name;

        report
    }
}

async fn run_handler<P: Message>(handler: &dyn Handler<P>, payload: &P) -> Result<(), HandlerError> {
    let called = panic::catch_unwind(AssertUnwindSafe(|| handler.call(payload)))
        .map_err(HandlerError::from_panic)?;

    let settled = match called {
        MaybeAsync::Ready(result) => result,
        MaybeAsync::Pending(future) => AssertUnwindSafe(future)
            .catch_unwind()
            .await
            .map_err(HandlerError::from_panic)?,
    };
    settled.map_err(HandlerError::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ListenerStore;
    use std::{sync::Mutex, time::Duration};
    use tidings_core::{ListenerId, ListenerOptions};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(log: &Log, name: &'static str) -> impl Fn(&()) + Send + Sync + 'static {
        let log = log.clone();
        move |_: &()| log.lock().unwrap().push(name)
    }

    #[tokio::test]
    async fn test_runs_in_supplied_order() {
        let log: Log = Arc::default();
        let mut store = ListenerStore::new();
        store.add("e", recorder(&log, "low"), ListenerOptions::new().with_priority(1));
        store.add("e", recorder(&log, "high"), ListenerOptions::new().with_priority(10));
        store.add("e", recorder(&log, "mid"), ListenerOptions::new().with_priority(5));

        let listeners = store.get_matching("e");
        let report = SequentialExecutor.execute("e", &(), &listeners).await;

        assert_eq!(*log.lock().unwrap(), vec!["high", "mid", "low"]);
        assert_eq!(report.executed, 3);
        assert!(report.is_clean());
        assert!(report.listeners_to_remove.is_empty());
    }

    #[tokio::test]
    async fn test_does_not_resort() {
        let log: Log = Arc::default();
        let mut store = ListenerStore::new();
        store.add("e", recorder(&log, "a"), ListenerOptions::new().with_priority(1));
        store.add("e", recorder(&log, "b"), ListenerOptions::new().with_priority(2));

        let mut listeners = store.get_matching("e");
        listeners.reverse();
        SequentialExecutor.execute("e", &(), &listeners).await;

        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_pending_handler_completes_before_next_starts() {
        let log: Log = Arc::default();
        let mut store = ListenerStore::new();

        let slow_log = log.clone();
        store.add(
            "e",
            move |_: &()| {
                let log = slow_log.clone();
                MaybeAsync::pending(async move {
                    log.lock().unwrap().push("slow:start");
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    log.lock().unwrap().push("slow:end");
                })
            },
            ListenerOptions::new(),
        );
        store.add("e", recorder(&log, "fast"), ListenerOptions::new());

        let listeners = store.get_matching("e");
        SequentialExecutor.execute("e", &(), &listeners).await;

        assert_eq!(
            *log.lock().unwrap(),
            vec!["slow:start", "slow:end", "fast"]
        );
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let log: Log = Arc::default();
        let mut store = ListenerStore::new();
        let err_id = store.add(
            "e",
            |_: &()| -> Result<(), String> { Err("nope".into()) },
            ListenerOptions::new().with_priority(3),
        );
        let panic_id = store.add(
            "e",
            |_: &()| -> () { panic!("sync boom") },
            ListenerOptions::new().with_priority(2),
        );
        let async_panic_id = store.add(
            "e",
            |_: &()| {
                MaybeAsync::pending::<_, ()>(async {
                    tokio::task::yield_now().await;
                    panic!("async boom");
                })
            },
            ListenerOptions::new().with_priority(1),
        );
        store.add("e", recorder(&log, "survivor"), ListenerOptions::new());

        let listeners = store.get_matching("e");
        let report = SequentialExecutor.execute("e", &(), &listeners).await;

        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
        assert_eq!(report.executed, 4);
        assert_eq!(report.succeeded(), 1);

        let failed: Vec<_> = report.failures.iter().map(|f| f.listener).collect();
        assert_eq!(failed, vec![err_id, panic_id, async_panic_id]);
        assert!(!report.failures[0].error.is_panic());
        assert_eq!(report.failures[0].error.to_string(), "handler failed: nope");
        assert_eq!(report.failures[1].error.to_string(), "handler panicked: sync boom");
        assert_eq!(report.failures[2].error.to_string(), "handler panicked: async boom");
        assert_eq!(report.failures[2].pattern, "e");
    }

    #[tokio::test]
    async fn test_once_reported_only_on_success() {
        let mut store = ListenerStore::new();
        let ok_once = store.add("e", |_: &()| {}, ListenerOptions::new().once());
        let failing_once = store.add(
            "e",
            |_: &()| -> Result<(), &'static str> { Err("later") },
            ListenerOptions::new().once(),
        );
        let _persistent = store.add("e", |_: &()| {}, ListenerOptions::new());

        let listeners = store.get_matching("e");
        let report = SequentialExecutor.execute("e", &(), &listeners).await;

        assert_eq!(report.listeners_to_remove, vec![ok_once]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].listener, failing_once);
    }

    #[tokio::test]
    async fn test_stats_recorded_on_success_only() {
        let mut store = ListenerStore::new();
        let ok = store.add("e", |_: &()| {}, ListenerOptions::new());
        let bad = store.add(
            "e",
            |_: &()| -> Result<(), &'static str> { Err("x") },
            ListenerOptions::new(),
        );

        let listeners = store.get_matching("e");
        SequentialExecutor.execute("e", &(), &listeners).await;
        SequentialExecutor.execute("e", &(), &listeners).await;

        let all = store.get_all(Some("e"));
        let by_id = |id: ListenerId| all["e"].iter().find(|s| s.id == id).cloned().unwrap();
        assert_eq!(by_id(ok).execution_count, 2);
        assert_eq!(by_id(bad).execution_count, 0);
    }

    #[tokio::test]
    async fn test_empty_snapshot() {
        let report = Executor::<()>::execute(&SequentialExecutor, "e", &(), &[]).await;
        assert_eq!(report.executed, 0);
        assert!(report.is_clean());
    }
}
