use super::plugin::{EmitContext, Plugin, PluginError, Stage};
use crate::executor::{ExecutionReport, HandlerFailure};
use futures::{
    FutureExt,
    future::{BoxFuture, join_all},
};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tidings_core::{BoxError, ListenerId, panic_message};

/// Runs plugins at each lifecycle stage.
///
/// Async stages call every plugin concurrently and wait for all of them.
/// Failures and panics are collected per plugin; one misbehaving plugin
/// never prevents the others from being called.
#[derive(Default, Clone)]
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    /// Create a manager with no plugins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. Plugins are kept in registration order.
    pub fn register<T: Plugin>(&mut self, plugin: T) {
        self.plugins.push(Arc::new(plugin));
    }

    /// Register an already shared plugin.
    pub fn register_shared(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Names of the registered plugins, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` if no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Notify every plugin that a listener was registered.
    pub fn subscribed(&self, pattern: &str, id: ListenerId) -> Vec<PluginError> {
        self.run_sync(Stage::Subscribe, |p| p.on_subscribe(pattern, id))
    }

    /// Notify every plugin that a listener was removed.
    pub fn unsubscribed(&self, pattern: &str, id: ListenerId) -> Vec<PluginError> {
        self.run_sync(Stage::Unsubscribe, |p| p.on_unsubscribe(pattern, id))
    }

    /// Run every plugin's `before_emit`.
    pub async fn before_emit(&self, ctx: &EmitContext<'_>) -> Vec<PluginError> {
        settle_all(
            Stage::BeforeEmit,
            self.plugins.iter().map(|p| (p.name(), p.before_emit(ctx))),
        )
        .await
    }

    /// Run every plugin's `after_emit`.
    pub async fn after_emit(
        &self,
        ctx: &EmitContext<'_>,
        report: &ExecutionReport,
    ) -> Vec<PluginError> {
        settle_all(
            Stage::AfterEmit,
            self.plugins
                .iter()
                .map(|p| (p.name(), p.after_emit(ctx, report))),
        )
        .await
    }

    /// Run every plugin's `on_handler_error` for one failure.
    pub async fn handler_error(
        &self,
        ctx: &EmitContext<'_>,
        failure: &HandlerFailure,
    ) -> Vec<PluginError> {
        settle_all(
            Stage::HandlerError,
            self.plugins
                .iter()
                .map(|p| (p.name(), p.on_handler_error(ctx, failure))),
        )
        .await
    }

    fn run_sync<F>(&self, stage: Stage, call: F) -> Vec<PluginError>
    where
        F: Fn(&dyn Plugin) -> Result<(), BoxError>,
    {
        self.plugins
            .iter()
            .filter_map(|plugin| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(plugin.as_ref())));
                into_error(plugin.name(), stage, outcome)
            })
            .collect()
    }
}

async fn settle_all<'a, I>(stage: Stage, calls: I) -> Vec<PluginError>
where
    I: Iterator<Item = (&'a str, BoxFuture<'a, Result<(), BoxError>>)>,
{
    let settled = join_all(calls.map(|(name, future)| async move {
        (name, AssertUnwindSafe(future).catch_unwind().await)
    }))
    .await;

    settled
        .into_iter()
        .filter_map(|(name, outcome)| into_error(name, stage, outcome))
        .collect()
}

fn into_error(
    plugin: &str,
    stage: Stage,
    outcome: std::thread::Result<Result<(), BoxError>>,
) -> Option<PluginError> {
    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(source)) => Some(PluginError::Failed {
            plugin: plugin.to_owned(),
            stage,
            source,
        }),
        Err(panic) => Some(PluginError::Panicked {
            plugin: plugin.to_owned(),
            stage,
            message: panic_message(panic.as_ref()),
        }),
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("plugins", &self.names())
            .finish()
    }
}
