//! Listener store: the indexed registry of subscriptions.
//!
//! Listeners are kept in two maps keyed by their registration pattern:
//! literal patterns in the exact map, patterns containing `*` in the wildcard
//! map. Each bucket is kept sorted in dispatch order (descending priority,
//! then insertion order) and a bucket is removed as soon as it becomes empty.
//!
//! The store is a plain single-owner structure (`&mut self` for mutation).
//! Callers sharing it between tasks wrap it in a mutex and must not hold the
//! lock while handlers run.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
    time::Duration,
};
use tidings_core::{
    Handler, Listener, ListenerId, ListenerOptions, ListenerSummary, Message, PatternMatcher,
    has_wildcard,
};

type Buckets<P> = HashMap<String, Vec<Arc<Listener<P>>>>;

/// Owner of every active listener.
pub struct ListenerStore<P: Message> {
    exact: Buckets<P>,
    wildcard: Buckets<P>,
    matcher: PatternMatcher,
    marked: HashSet<ListenerId>,
    next_sequence: u64,
}

impl<P: Message> Default for ListenerStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Message> ListenerStore<P> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            wildcard: HashMap::new(),
            matcher: PatternMatcher::new(),
            marked: HashSet::new(),
            next_sequence: 0,
        }
    }

    /// Register a handler under `pattern`.
    pub fn add<H: Handler<P>>(
        &mut self,
        pattern: &str,
        handler: H,
        options: ListenerOptions,
    ) -> ListenerId {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let listener = Arc::new(Listener::new(pattern, handler, options, sequence));
        let id = listener.id();

        let bucket = self
            .buckets_for_mut(pattern)
            .entry(pattern.to_owned())
            .or_default();
        bucket.push(listener);
        bucket.sort_by_key(|l| l.dispatch_key());

        #[cfg(feature = "tracing")]
        tracing::trace!(%id, pattern, priority = options.priority, once = options.once, "listener added");

        id
    }

    /// Remove the listener `id` from the bucket of `pattern`.
    ///
    /// Returns `false` if the pattern has no such listener.
    pub fn remove(&mut self, pattern: &str, id: ListenerId) -> bool {
        let removed = take(self.buckets_for_mut(pattern), pattern, id);
        if removed {
            self.marked.remove(&id);
            #[cfg(feature = "tracing")]
            tracing::trace!(%id, pattern, "listener removed");
        }
        removed
    }

    /// Remove the listener `id` wherever it is registered.
    ///
    /// Scans the exact map first, then the wildcard map. Returns the pattern
    /// the listener was registered under.
    pub fn remove_by_id(&mut self, id: ListenerId) -> Option<String> {
        let pattern = find_pattern(&self.exact, id).or_else(|| find_pattern(&self.wildcard, id))?;
        self.remove(&pattern, id).then_some(pattern)
    }

    /// Remove listeners in bulk.
    ///
    /// With `None` every listener is removed. With `Some(name)` only listeners
    /// registered under a pattern textually equal to `name` are removed; a
    /// wildcard listener that would receive `name` emissions stays registered.
    /// This is narrower than [`get_matching`](Self::get_matching) and
    /// [`get_all`](Self::get_all), which both apply wildcard matching.
    pub fn remove_all(&mut self, event_name: Option<&str>) -> Vec<(String, ListenerId)> {
        let removed: Vec<(String, ListenerId)> = match event_name {
            None => self
                .exact
                .drain()
                .chain(self.wildcard.drain())
                .flat_map(|(pattern, listeners)| {
                    listeners
                        .into_iter()
                        .map(move |l| (pattern.clone(), l.id()))
                })
                .collect(),
            Some(name) => self
                .buckets_for_mut(name)
                .remove(name)
                .map(|listeners| {
                    listeners
                        .iter()
                        .map(|l| (name.to_owned(), l.id()))
                        .collect()
                })
                .unwrap_or_default(),
        };

        for (_, id) in &removed {
            self.marked.remove(id);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(event = ?event_name, count = removed.len(), "listeners cleared");

        removed
    }

    /// Snapshot of every listener that should receive `event_name`, in
    /// dispatch order.
    ///
    /// The returned vector is independent of the store: later mutations do not
    /// affect it.
    pub fn get_matching(&self, event_name: &str) -> Vec<Arc<Listener<P>>> {
        let mut matched: Vec<Arc<Listener<P>>> =
            self.exact.get(event_name).cloned().unwrap_or_default();

        for (pattern, listeners) in &self.wildcard {
            if self.matcher.matches(pattern, event_name) {
                matched.extend(listeners.iter().cloned());
            }
        }

        matched.sort_by_key(|l| l.dispatch_key());
        matched
    }

    /// Introspection: pattern to listener summaries.
    ///
    /// With `Some(name)` only patterns matching `name` (wildcards included)
    /// are reported.
    pub fn get_all(&self, event_name: Option<&str>) -> BTreeMap<String, Vec<ListenerSummary>> {
        self.exact
            .iter()
            .chain(self.wildcard.iter())
            .filter(|(pattern, _)| event_name.is_none_or(|name| self.matcher.matches(pattern, name)))
            .map(|(pattern, listeners)| {
                (
                    pattern.clone(),
                    listeners.iter().map(|l| l.summary()).collect(),
                )
            })
            .collect()
    }

    /// Record one successful execution of `id`.
    ///
    /// Returns `false` if the listener is not registered.
    pub fn update_stats(&self, id: ListenerId, duration: Duration) -> bool {
        match self.get(id) {
            Some(listener) => {
                listener.stats().record(duration);
                true
            }
            None => false,
        }
    }

    /// Mark a listener for the next [`remove_marked`](Self::remove_marked).
    pub fn mark_for_removal(&mut self, id: ListenerId) {
        self.marked.insert(id);
    }

    /// Number of listeners currently marked.
    pub fn marked_len(&self) -> usize {
        self.marked.len()
    }

    /// Remove every marked listener from both maps in one pass.
    pub fn remove_marked(&mut self) -> Vec<(String, ListenerId)> {
        if self.marked.is_empty() {
            return Vec::new();
        }

        let marked = std::mem::take(&mut self.marked);
        let mut removed = Vec::new();
        for buckets in [&mut self.exact, &mut self.wildcard] {
            buckets.retain(|pattern, listeners| {
                listeners.retain(|l| {
                    let keep = !marked.contains(&l.id());
                    if !keep {
                        removed.push((pattern.clone(), l.id()));
                    }
                    keep
                });
                !listeners.is_empty()
            });
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(count = removed.len(), "marked listeners removed");

        removed
    }

    /// Look up a listener by id.
    pub fn get(&self, id: ListenerId) -> Option<&Arc<Listener<P>>> {
        self.exact
            .values()
            .chain(self.wildcard.values())
            .flatten()
            .find(|l| l.id() == id)
    }

    /// Returns `true` if the listener is registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.get(id).is_some()
    }

    /// Total number of listeners.
    pub fn len(&self) -> usize {
        self.exact
            .values()
            .chain(self.wildcard.values())
            .map(Vec::len)
            .sum()
    }

    /// Returns `true` if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.wildcard.is_empty()
    }

    /// The pattern matcher used for wildcard lookups.
    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    fn buckets_for_mut(&mut self, pattern: &str) -> &mut Buckets<P> {
        if has_wildcard(pattern) {
            &mut self.wildcard
        } else {
            &mut self.exact
        }
    }
}

fn find_pattern<P: Message>(buckets: &Buckets<P>, id: ListenerId) -> Option<String> {
    buckets
        .iter()
        .find(|(_, listeners)| listeners.iter().any(|l| l.id() == id))
        .map(|(pattern, _)| pattern.clone())
}

fn take<P: Message>(buckets: &mut Buckets<P>, pattern: &str, id: ListenerId) -> bool {
    let Some(listeners) = buckets.get_mut(pattern) else {
        return false;
    };
    let Some(position) = listeners.iter().position(|l| l.id() == id) else {
        return false;
    };
    listeners.remove(position);
    if listeners.is_empty() {
        buckets.remove(pattern);
    }
    true
}
