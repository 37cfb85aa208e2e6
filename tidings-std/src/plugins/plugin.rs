use crate::executor::{ExecutionReport, HandlerFailure};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use tidings_core::{BoxError, ListenerId};

/// The emission a plugin is being notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitContext<'a> {
    /// The emitted event name.
    pub event: &'a str,
    /// Number of listeners in the emission's snapshot.
    pub matched: usize,
}

/// Lifecycle points at which plugins are called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// A listener was registered.
    Subscribe,
    /// A listener was removed.
    Unsubscribe,
    /// An emission is about to run its handlers.
    BeforeEmit,
    /// An emission finished running its handlers.
    AfterEmit,
    /// A handler failed during an emission.
    HandlerError,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Subscribe => "subscribe",
            Stage::Unsubscribe => "unsubscribe",
            Stage::BeforeEmit => "before_emit",
            Stage::AfterEmit => "after_emit",
            Stage::HandlerError => "handler_error",
        };
        f.write_str(name)
    }
}

/// Errors raised by plugins. Never propagated to the emitter's caller.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The plugin returned an error.
    #[error("plugin `{plugin}` failed during {stage}")]
    Failed {
        /// Plugin name.
        plugin: String,
        /// Where it failed.
        stage: Stage,
        /// The plugin's error.
        #[source]
        source: BoxError,
    },

    /// The plugin panicked.
    #[error("plugin `{plugin}` panicked during {stage}: {message}")]
    Panicked {
        /// Plugin name.
        plugin: String,
        /// Where it panicked.
        stage: Stage,
        /// Panic message.
        message: String,
    },
}

impl PluginError {
    /// The lifecycle stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            PluginError::Failed { stage, .. } | PluginError::Panicked { stage, .. } => *stage,
        }
    }

    /// The name of the failing plugin.
    pub fn plugin(&self) -> &str {
        match self {
            PluginError::Failed { plugin, .. } | PluginError::Panicked { plugin, .. } => plugin,
        }
    }
}

/// Lifecycle observer of an emitter.
///
/// Every method has a no-op default; implement only what you need.
/// Subscription notifications are synchronous because they fire from
/// `on`/`off`, which are not async. Emission notifications are async and run
/// concurrently across plugins.
///
/// # Example
///
/// ```rust,ignore
/// struct Audit;
///
/// #[async_trait]
/// impl Plugin for Audit {
///     fn name(&self) -> &str { "audit" }
///
///     async fn on_handler_error(&self, ctx: &EmitContext<'_>, failure: &HandlerFailure) -> Result<(), BoxError> {
///         audit_log::record(ctx.event, &failure.error).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Called after a listener was registered.
    fn on_subscribe(&self, _pattern: &str, _id: ListenerId) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after a listener was removed, whatever the reason.
    fn on_unsubscribe(&self, _pattern: &str, _id: ListenerId) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called before the handlers of an emission run.
    async fn before_emit(&self, _ctx: &EmitContext<'_>) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after all handlers of an emission settled and one-shot
    /// listeners were retired.
    async fn after_emit(
        &self,
        _ctx: &EmitContext<'_>,
        _report: &ExecutionReport,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called once per handler failure isolated during an emission.
    async fn on_handler_error(
        &self,
        _ctx: &EmitContext<'_>,
        _failure: &HandlerFailure,
    ) -> Result<(), BoxError> {
        Ok(())
    }
}
