use std::{future::Future, sync::Arc};
use tidings_core::{HandlerError, Listener, ListenerId, Message};

/// Strategy for running the listeners matched by one emission.
///
/// Implementations must run listeners in the order supplied and must not
/// let a handler failure escape `execute`.
pub trait Executor<P: Message>: Send + Sync + 'static {
    /// Run `listeners` against `payload`.
    fn execute(
        &self,
        event_name: &str,
        payload: &P,
        listeners: &[Arc<Listener<P>>],
    ) -> impl Future<Output = ExecutionReport> + Send;
}

/// A handler failure isolated during an emission.
#[derive(Debug)]
pub struct HandlerFailure {
    /// The listener whose handler failed.
    pub listener: ListenerId,
    /// The pattern it was registered under.
    pub pattern: String,
    /// What went wrong.
    pub error: HandlerError,
}

/// What happened during one emission.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// One-shot listeners that completed successfully and must be retired.
    pub listeners_to_remove: Vec<ListenerId>,
    /// Number of handlers invoked, failed ones included.
    pub executed: usize,
    /// Isolated failures, in execution order.
    pub failures: Vec<HandlerFailure>,
}

impl ExecutionReport {
    /// Number of handlers that completed successfully.
    pub fn succeeded(&self) -> usize {
        self.executed - self.failures.len()
    }

    /// Returns `true` if no handler failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
