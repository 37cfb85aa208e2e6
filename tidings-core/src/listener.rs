//! # Listeners
//!
//! A [`Listener`] is one active registration: a handler bound to a pattern
//! together with its priority, one-shot flag and execution statistics.
//!
//! Listeners are created and owned by the listener store. Emissions work on
//! `Arc<Listener<P>>` snapshots, so a handler may run after its listener was
//! removed from the store by a concurrent unsubscribe. Counters are atomics
//! and can be updated through a shared reference.

use crate::{handler::Handler, message::Message};
use std::{
    cmp::Reverse,
    fmt,
    num::NonZeroU64,
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, SystemTime},
};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-wide unique identity of a listener.
///
/// Identities are never reused while the process runs and cannot be built
/// from a pattern string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(NonZeroU64);

impl ListenerId {
    fn next() -> Self {
        let raw = NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 registrations to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// The raw numeric value, for logging.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Registration options for a listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Higher runs earlier. Default is 0; any value is legal.
    pub priority: i32,
    /// Retire the listener after its first successful execution.
    pub once: bool,
}

impl ListenerOptions {
    /// Default options: priority 0, persistent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Mark as one-shot.
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}

/// Execution statistics of a listener.
#[derive(Debug, Default)]
pub struct ListenerStats {
    executions: AtomicU64,
    total_nanos: AtomicU64,
}

impl ListenerStats {
    /// Record one successful execution.
    pub fn record(&self, duration: Duration) {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.executions.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    /// Number of successful executions.
    pub fn execution_count(&self) -> u64 {
        self.executions.load(Ordering::Relaxed)
    }

    /// Cumulative duration of all successful executions.
    pub fn total_duration(&self) -> Duration {
        Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed))
    }

    /// Mean duration, zero if never executed.
    pub fn average_duration(&self) -> Duration {
        match self.execution_count() {
            0 => Duration::ZERO,
            n => Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed) / n),
        }
    }
}

/// One registered subscription.
pub struct Listener<P: Message> {
    id: ListenerId,
    handler: Box<dyn Handler<P>>,
    pattern: String,
    options: ListenerOptions,
    sequence: u64,
    added_at: SystemTime,
    stats: ListenerStats,
}

impl<P: Message> Listener<P> {
    /// Create a listener with a fresh identity.
    ///
    /// `sequence` is the insertion counter of the owning store and breaks
    /// priority ties in FIFO order.
    pub fn new<H>(pattern: impl Into<String>, handler: H, options: ListenerOptions, sequence: u64) -> Self
    where
        H: Handler<P>,
    {
        Self {
            id: ListenerId::next(),
            handler: Box::new(handler),
            pattern: pattern.into(),
            options,
            sequence,
            added_at: SystemTime::now(),
            stats: ListenerStats::default(),
        }
    }

    /// The listener identity.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The handler.
    pub fn handler(&self) -> &dyn Handler<P> {
        &*self.handler
    }

    /// The exact pattern the listener was registered under.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Execution priority.
    pub fn priority(&self) -> i32 {
        self.options.priority
    }

    /// Whether the listener is one-shot.
    pub fn is_once(&self) -> bool {
        self.options.once
    }

    /// Insertion sequence within the owning store.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Registration time.
    pub fn added_at(&self) -> SystemTime {
        self.added_at
    }

    /// Execution statistics.
    pub fn stats(&self) -> &ListenerStats {
        &self.stats
    }

    /// Sort key: descending priority, then ascending insertion sequence.
    pub fn dispatch_key(&self) -> (Reverse<i32>, u64) {
        (Reverse(self.options.priority), self.sequence)
    }

    /// Owned public view of this listener.
    pub fn summary(&self) -> ListenerSummary {
        ListenerSummary {
            id: self.id,
            priority: self.options.priority,
            once: self.options.once,
            pattern: self.pattern.clone(),
            added_at: self.added_at,
            execution_count: self.stats.execution_count(),
            avg_duration: self.stats.average_duration(),
        }
    }
}

impl<P: Message> fmt::Debug for Listener<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("priority", &self.options.priority)
            .field("once", &self.options.once)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

/// Introspection record of a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerSummary {
    /// Listener identity.
    pub id: ListenerId,
    /// Execution priority.
    pub priority: i32,
    /// One-shot flag.
    pub once: bool,
    /// Registration pattern.
    pub pattern: String,
    /// Registration time.
    pub added_at: SystemTime,
    /// Successful executions so far.
    pub execution_count: u64,
    /// Mean duration of successful executions.
    pub avg_duration: Duration,
}
