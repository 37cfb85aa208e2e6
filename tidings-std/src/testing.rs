//! Testing utilities for Tidings.
//!
//! This module provides doubles that make it easy to assert on dispatch
//! behavior.
//!
//! # Features
//!
//! - [`RecordingHandler`]: A handler that records every payload it receives
//! - [`CountingHandler`]: A handler that counts invocations
//! - [`FailingHandler`]: A handler that fails on demand
//! - [`OrderLog`]: A shared log for asserting the execution order of handlers
//! - [`RecordingPlugin`]: A plugin that records every lifecycle notification

use crate::{
    executor::{ExecutionReport, HandlerFailure},
    plugins::{EmitContext, Plugin},
};
use async_trait::async_trait;
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use tidings_core::{BoxError, Handler, ListenerId, MaybeAsync, Message};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records all payloads it receives.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::<MyEvent>::new();
/// emitter.on("my:event", recorder.clone());
///
/// emitter.emit("my:event", event).await;
/// assert_eq!(recorder.count(), 1);
/// ```
pub struct RecordingHandler<P: Clone> {
    payloads: Arc<Mutex<Vec<P>>>,
}

impl<P: Clone> RecordingHandler<P> {
    /// Create a new recording handler.
    pub fn new() -> Self {
        Self {
            payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a clone of the recorded payloads.
    pub fn payloads(&self) -> Vec<P> {
        lock(&self.payloads).clone()
    }

    /// Get the number of recorded payloads.
    pub fn count(&self) -> usize {
        lock(&self.payloads).len()
    }

    /// Clear all recorded payloads.
    pub fn clear(&self) {
        lock(&self.payloads).clear();
    }
}

impl<P: Clone> Default for RecordingHandler<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> Clone for RecordingHandler<P> {
    fn clone(&self) -> Self {
        Self {
            payloads: self.payloads.clone(),
        }
    }
}

impl<P: Message + Clone> Handler<P> for RecordingHandler<P> {
    fn call<'a>(&'a self, payload: &'a P) -> MaybeAsync<'a> {
        lock(&self.payloads).push(payload.clone());
        MaybeAsync::done()
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations.
#[derive(Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<P: Message> Handler<P> for CountingHandler {
    fn call<'a>(&'a self, _payload: &'a P) -> MaybeAsync<'a> {
        self.count.fetch_add(1, Ordering::SeqCst);
        MaybeAsync::done()
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that returns an error while armed, and succeeds otherwise.
///
/// Every invocation is counted, failed or not.
///
/// # Example
///
/// ```rust,ignore
/// let flaky = FailingHandler::new("db down");
/// emitter.once("job:run", flaky.clone());
///
/// emitter.emit("job:run", job).await; // fails, listener stays registered
/// flaky.disarm();
/// emitter.emit("job:run", job).await; // succeeds, listener retired
/// ```
#[derive(Clone)]
pub struct FailingHandler {
    message: &'static str,
    armed: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl FailingHandler {
    /// Create an armed handler failing with `message`.
    pub fn new(message: &'static str) -> Self {
        Self {
            message,
            armed: Arc::new(AtomicBool::new(true)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Stop failing.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<P: Message> Handler<P> for FailingHandler {
    fn call<'a>(&'a self, _payload: &'a P) -> MaybeAsync<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.armed.load(Ordering::SeqCst) {
            MaybeAsync::Ready(Err(self.message.into()))
        } else {
            MaybeAsync::done()
        }
    }
}

// ============================================================================
// Order Log
// ============================================================================

/// A shared log for asserting the order in which handlers ran.
///
/// # Example
///
/// ```rust,ignore
/// let log = OrderLog::new();
/// emitter.on("e", log.handler("first"));
/// emitter.on("e", log.handler("second"));
///
/// emitter.emit("e", ()).await;
/// assert_eq!(log.entries(), vec!["first", "second"]);
/// ```
#[derive(Clone, Default)]
pub struct OrderLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl OrderLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        lock(&self.entries).push(entry.into());
    }

    /// Get a clone of the entries.
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    /// Clear the log.
    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    /// A synchronous handler that appends `name` when called.
    pub fn handler(&self, name: &str) -> OrderHandler {
        OrderHandler {
            log: self.clone(),
            name: name.to_owned(),
        }
    }
}

/// Handler created by [`OrderLog::handler`].
#[derive(Clone)]
pub struct OrderHandler {
    log: OrderLog,
    name: String,
}

impl<P: Message> Handler<P> for OrderHandler {
    fn call<'a>(&'a self, _payload: &'a P) -> MaybeAsync<'a> {
        self.log.push(self.name.as_str());
        MaybeAsync::done()
    }
}

// ============================================================================
// Recording Plugin
// ============================================================================

/// A plugin that records every lifecycle notification as a string.
///
/// Entries look like `subscribe <pattern> <id>`, `unsubscribe <pattern> <id>`,
/// `before_emit <event>`, `after_emit <event>` and
/// `handler_error <event> <id>`.
#[derive(Clone)]
pub struct RecordingPlugin {
    name: &'static str,
    entries: Arc<Mutex<Vec<String>>>,
}

impl RecordingPlugin {
    /// Create a recording plugin.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get a clone of the recorded entries.
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }

    fn record(&self, entry: String) {
        lock(&self.entries).push(entry);
    }
}

#[async_trait]
impl Plugin for RecordingPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn on_subscribe(&self, pattern: &str, id: ListenerId) -> Result<(), BoxError> {
        self.record(format!("subscribe {pattern} {id}"));
        Ok(())
    }

    fn on_unsubscribe(&self, pattern: &str, id: ListenerId) -> Result<(), BoxError> {
        self.record(format!("unsubscribe {pattern} {id}"));
        Ok(())
    }

    async fn before_emit(&self, ctx: &EmitContext<'_>) -> Result<(), BoxError> {
        self.record(format!("before_emit {}", ctx.event));
        Ok(())
    }

    async fn after_emit(
        &self,
        ctx: &EmitContext<'_>,
        _report: &ExecutionReport,
    ) -> Result<(), BoxError> {
        self.record(format!("after_emit {}", ctx.event));
        Ok(())
    }

    async fn on_handler_error(
        &self,
        ctx: &EmitContext<'_>,
        failure: &HandlerFailure,
    ) -> Result<(), BoxError> {
        self.record(format!("handler_error {} {}", ctx.event, failure.listener));
        Ok(())
    }
}
