//! Logging plugin - observability for subscriptions and emissions.

use super::plugin::{EmitContext, Plugin};
use crate::executor::{ExecutionReport, HandlerFailure};
use async_trait::async_trait;
use tidings_core::{BoxError, ListenerId};

/// A plugin that logs the emitter's lifecycle.
///
/// Uses `tracing` when the `tracing` feature is enabled; otherwise it is
/// silent. Handler failures are logged at `warn`, everything else at `debug`.
///
/// # Example
///
/// ```rust,ignore
/// let emitter = Emitter::<AppEvent>::builder()
///     .plugin(LoggingPlugin::named("app_events"))
///     .build();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggingPlugin {
    name: &'static str,
}

impl LoggingPlugin {
    /// Create a new `LoggingPlugin` with a default name.
    pub fn new() -> Self {
        Self { name: "tidings" }
    }

    /// Create a new `LoggingPlugin` with a custom name.
    ///
    /// The name is included in every log line to identify the emitter.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for LoggingPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn on_subscribe(&self, pattern: &str, id: ListenerId) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(emitter = %self.name, %id, pattern, "subscribed");
        #[cfg(not(feature = "tracing"))]
        let _ = (pattern, id);
        Ok(())
    }

    fn on_unsubscribe(&self, pattern: &str, id: ListenerId) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(emitter = %self.name, %id, pattern, "unsubscribed");
        #[cfg(not(feature = "tracing"))]
        let _ = (pattern, id);
        Ok(())
    }

    async fn before_emit(&self, ctx: &EmitContext<'_>) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(emitter = %self.name, event = ctx.event, matched = ctx.matched, "emitting");
        #[cfg(not(feature = "tracing"))]
        let _ = ctx;
        Ok(())
    }

    async fn after_emit(
        &self,
        ctx: &EmitContext<'_>,
        report: &ExecutionReport,
    ) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            emitter = %self.name,
            event = ctx.event,
            executed = report.executed,
            failed = report.failures.len(),
            "emitted"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (ctx, report);
        Ok(())
    }

    async fn on_handler_error(
        &self,
        ctx: &EmitContext<'_>,
        failure: &HandlerFailure,
    ) -> Result<(), BoxError> {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            emitter = %self.name,
            event = ctx.event,
            listener = %failure.listener,
            pattern = %failure.pattern,
            error = %failure.error,
            "handler failed"
        );
        #[cfg(not(feature = "tracing"))]
        let _ = (ctx, failure);
        Ok(())
    }
}
