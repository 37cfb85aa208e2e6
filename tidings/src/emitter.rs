//! The emitter façade.
//!
//! [`Emitter`] ties the listener store, an executor and the plugin manager
//! together. It is cheap to clone (all clones share one registry) and may be
//! used from handlers themselves: the store lock is only held for the
//! duration of a store call, never while handlers or plugins run.

use crate::{
    builder::{EmitterBuilder, RemovalMode},
    subscription::{Subscription, Unsubscribe},
};
use parking_lot::Mutex;
use std::{collections::BTreeMap, fmt, sync::Arc};
use tidings_core::{Handler, ListenerId, ListenerOptions, ListenerSummary, Message};
use tidings_std::{
    executor::{ExecutionReport, Executor, SequentialExecutor},
    plugins::{EmitContext, PluginError, PluginManager},
    store::ListenerStore,
};

/// An in-process publish/subscribe dispatcher for payloads of type `P`.
///
/// # Example
///
/// ```rust,ignore
/// let emitter = Emitter::<Order>::new();
///
/// let audit = emitter.on("order:*", |order: &Order| println!("{order:?}"));
/// emitter.once("order:paid", from_async(|order: Order| async move {
///     send_receipt(order).await
/// }));
///
/// emitter.emit("order:paid", order).await;
/// audit.unsubscribe();
/// ```
pub struct Emitter<P: Message, X = SequentialExecutor> {
    inner: Arc<Inner<P, X>>,
}

pub(crate) struct Inner<P: Message, X> {
    store: Mutex<ListenerStore<P>>,
    executor: X,
    plugins: PluginManager,
    removal: RemovalMode,
}

impl<P: Message> Emitter<P> {
    /// Create an emitter with the sequential executor and no plugins.
    pub fn new() -> Self {
        EmitterBuilder::new().build()
    }

    /// Start configuring an emitter.
    pub fn builder() -> EmitterBuilder<P> {
        EmitterBuilder::new()
    }
}

impl<P: Message> Default for Emitter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Message, X> Clone for Emitter<P, X> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, X> Emitter<P, X>
where
    P: Message,
    X: Executor<P>,
{
    pub(crate) fn from_parts(executor: X, plugins: PluginManager, removal: RemovalMode) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(ListenerStore::new()),
                executor,
                plugins,
                removal,
            }),
        }
    }

    /// Subscribe `handler` to every event matching `pattern`.
    pub fn on<H: Handler<P>>(&self, pattern: &str, handler: H) -> Subscription {
        self.on_with(pattern, handler, ListenerOptions::new())
    }

    /// Subscribe `handler` for the first successful execution only.
    pub fn once<H: Handler<P>>(&self, pattern: &str, handler: H) -> Subscription {
        self.on_with(pattern, handler, ListenerOptions::new().once())
    }

    /// Subscribe with explicit priority and one-shot options.
    pub fn on_with<H: Handler<P>>(
        &self,
        pattern: &str,
        handler: H,
        options: ListenerOptions,
    ) -> Subscription {
        let id = self.inner.store.lock().add(pattern, handler, options);
        log_plugin_errors(self.inner.plugins.subscribed(pattern, id));

        let owner = Arc::downgrade(&self.inner);
        Subscription::new(id, pattern, owner)
    }

    /// Emit `payload` under `event`.
    ///
    /// Resolves once every matching handler has settled, in priority order.
    /// Handler errors and panics never surface here.
    pub async fn emit(&self, event: &str, payload: P) {
        self.emit_with_report(event, payload).await;
    }

    /// Emit and return what happened.
    pub async fn emit_with_report(&self, event: &str, payload: P) -> ExecutionReport {
        let listeners = self.inner.store.lock().get_matching(event);
        let ctx = EmitContext {
            event,
            matched: listeners.len(),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(event, matched = ctx.matched, "emit");

        if !self.inner.plugins.is_empty() {
            log_plugin_errors(self.inner.plugins.before_emit(&ctx).await);
        }

        let report = self
            .inner
            .executor
            .execute(event, &payload, &listeners)
            .await;

        self.inner.retire(&report.listeners_to_remove);

        if !self.inner.plugins.is_empty() {
            for failure in &report.failures {
                log_plugin_errors(self.inner.plugins.handler_error(&ctx, failure).await);
            }
            log_plugin_errors(self.inner.plugins.after_emit(&ctx, &report).await);
        }

        report
    }

    /// Remove a listener by id. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let removed = self.inner.store.lock().remove_by_id(id);
        match removed {
            Some(pattern) => {
                self.inner.unsubscribed(&pattern, id);
                true
            }
            None => false,
        }
    }

    /// Remove listeners in bulk; returns how many were removed.
    ///
    /// With `Some(name)` only listeners registered under exactly `name` are
    /// removed. Wildcard listeners that receive `name` are kept, unlike in
    /// [`listeners`](Self::listeners) where the filter applies matching.
    pub fn off_all(&self, event: Option<&str>) -> usize {
        let removed = self.inner.store.lock().remove_all(event);
        for (pattern, id) in &removed {
            self.inner.unsubscribed(pattern, *id);
        }
        removed.len()
    }

    /// Introspection: pattern to listener summaries, optionally restricted to
    /// patterns matching `event`.
    pub fn listeners(&self, event: Option<&str>) -> BTreeMap<String, Vec<ListenerSummary>> {
        self.inner.store.lock().get_all(event)
    }

    /// Total number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.store.lock().len()
    }

    /// Returns `true` if the listener is registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.inner.store.lock().contains(id)
    }

    /// The plugins attached to this emitter.
    pub fn plugins(&self) -> &PluginManager {
        &self.inner.plugins
    }

    /// The executor running handlers.
    pub fn executor(&self) -> &X {
        &self.inner.executor
    }
}

impl<P: Message, X> Inner<P, X> {
    fn retire(&self, ids: &[ListenerId]) {
        if ids.is_empty() {
            return;
        }

        let removed: Vec<(String, ListenerId)> = {
            let mut store = self.store.lock();
            match self.removal {
                RemovalMode::Immediate => ids
                    .iter()
                    .filter_map(|&id| store.remove_by_id(id).map(|pattern| (pattern, id)))
                    .collect(),
                RemovalMode::Batched => {
                    for &id in ids {
                        store.mark_for_removal(id);
                    }
                    store.remove_marked()
                }
            }
        };

        for (pattern, id) in &removed {
            self.unsubscribed(pattern, *id);
        }
    }

    fn unsubscribed(&self, pattern: &str, id: ListenerId) {
        log_plugin_errors(self.plugins.unsubscribed(pattern, id));
    }
}

impl<P, X> Unsubscribe for Inner<P, X>
where
    P: Message,
    X: Send + Sync + 'static,
{
    fn unsubscribe(&self, pattern: &str, id: ListenerId) -> bool {
        let removed = self.store.lock().remove(pattern, id);
        if removed {
            self.unsubscribed(pattern, id);
        }
        removed
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.store.lock().contains(id)
    }
}

fn log_plugin_errors(errors: Vec<PluginError>) {
    #[cfg(feature = "tracing")]
    for error in &errors {
        tracing::warn!(plugin = error.plugin(), stage = %error.stage(), %error, "plugin failed");
    }
    #[cfg(not(feature = "tracing"))]
    drop(errors);
}

impl<P: Message, X: fmt::Debug> fmt::Debug for Emitter<P, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("listeners", &self.inner.store.lock().len())
            .field("executor", &self.inner.executor)
            .field("plugins", &self.inner.plugins)
            .field("removal", &self.inner.removal)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_std::testing::{CountingHandler, OrderLog};

    #[tokio::test]
    async fn test_end_to_end_once_and_priority() {
        let log = OrderLog::new();
        let emitter = Emitter::<()>::new();
        emitter.on_with("x:y", log.handler("H1"), ListenerOptions::new().with_priority(10));
        emitter.on_with(
            "x:y",
            log.handler("H2"),
            ListenerOptions::new().with_priority(5).once(),
        );
        emitter.on_with("x:y", log.handler("H3"), ListenerOptions::new().with_priority(5));

        emitter.emit("x:y", ()).await;
        assert_eq!(log.entries(), vec!["H1", "H2", "H3"]);
        assert_eq!(emitter.listener_count(), 2);

        log.clear();
        emitter.emit("x:y", ()).await;
        assert_eq!(log.entries(), vec!["H1", "H3"]);
    }

    #[tokio::test]
    async fn test_batched_removal_mode() {
        let counter = CountingHandler::new();
        let emitter = Emitter::<u8>::builder()
            .removal(RemovalMode::Batched)
            .build();
        emitter.once("a", counter.clone());
        emitter.once("a*", counter.clone());
        emitter.on("a", counter.clone());

        let report = emitter.emit_with_report("a", 1).await;
        assert_eq!(report.listeners_to_remove.len(), 2);
        assert_eq!(emitter.listener_count(), 1);

        emitter.emit("a", 2).await;
        assert_eq!(counter.count(), 4);
    }

    #[tokio::test]
    async fn test_clones_share_registry() {
        let counter = CountingHandler::new();
        let emitter = Emitter::<u8>::new();
        let clone = emitter.clone();
        clone.on("tick", counter.clone());

        emitter.emit("tick", 0).await;
        assert_eq!(counter.count(), 1);
        assert_eq!(emitter.listener_count(), 1);
    }

    #[test]
    fn test_debug_output() {
        let emitter = Emitter::<u8>::new();
        let debug = format!("{emitter:?}");
        assert!(debug.contains("Emitter"));
        assert!(debug.contains("SequentialExecutor"));
    }
}
