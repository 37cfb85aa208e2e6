use super::traits::{ExecutionReport, Executor};
use std::sync::Arc;
use tidings_core::{Listener, Message};

#[cfg(feature = "tracing")]
use tracing::Instrument;

/// An executor wrapper that instruments each emission with a `tracing` span.
///
/// The span carries the event name and the number of matched listeners; the
/// outcome is logged when the inner executor finishes. Without the `tracing`
/// feature this is a transparent pass-through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Instrumented<X> {
    inner: X,
    name: &'static str,
}

impl<X> Instrumented<X> {
    /// Wrap `inner`; `name` identifies the emitter in span fields.
    pub const fn new(inner: X, name: &'static str) -> Self {
        Self { inner, name }
    }

    /// The wrapped executor.
    pub fn inner(&self) -> &X {
        &self.inner
    }

    /// The name used in span fields.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<P, X> Executor<P> for Instrumented<X>
where
    P: Message,
    X: Executor<P>,
{
    #[cfg(feature = "tracing")]
    async fn execute(
        &self,
        event_name: &str,
        payload: &P,
        listeners: &[Arc<Listener<P>>],
    ) -> ExecutionReport {
        let span = tracing::info_span!(
            "emit",
            emitter = %self.name,
            event = %event_name,
            listeners = listeners.len()
        );

        async move {
            let report = self.inner.execute(event_name, payload, listeners).await;
            tracing::debug!(
                executed = report.executed,
                failed = report.failures.len(),
                retired = report.listeners_to_remove.len(),
                "emission settled"
            );
            report
        }
        .instrument(span)
        .await
    }

    #[cfg(not(feature = "tracing"))]
    async fn execute(
        &self,
        event_name: &str,
        payload: &P,
        listeners: &[Arc<Listener<P>>],
    ) -> ExecutionReport {
        self.inner.execute(event_name, payload, listeners).await
    }
}
