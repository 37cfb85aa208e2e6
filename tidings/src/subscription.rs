//! Subscription handles.

use std::{
    fmt,
    sync::{
        Weak,
        atomic::{AtomicBool, Ordering},
    },
};
use tidings_core::ListenerId;

/// Type-erased view of an emitter used by [`Subscription`].
pub(crate) trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, pattern: &str, id: ListenerId) -> bool;
    fn is_registered(&self, id: ListenerId) -> bool;
}

/// Handle returned when subscribing.
///
/// [`unsubscribe`](Self::unsubscribe) removes the listener. Dropping the
/// handle does not; listeners live until removed explicitly, retired after a
/// one-shot execution, or cleared in bulk.
///
/// The handle only holds a weak reference to the emitter, so it never keeps
/// an emitter alive.
pub struct Subscription {
    id: ListenerId,
    pattern: String,
    owner: Weak<dyn Unsubscribe>,
    pending: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(id: ListenerId, pattern: &str, owner: Weak<dyn Unsubscribe>) -> Self {
        Self {
            id,
            pattern: pattern.to_owned(),
            owner,
            pending: AtomicBool::new(true),
        }
    }

    /// The listener identity.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The pattern the listener was registered under.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Remove the listener.
    ///
    /// Idempotent: only the first call can remove anything, later calls
    /// return `false`. Also returns `false` if the listener was already
    /// removed by other means or the emitter is gone.
    pub fn unsubscribe(&self) -> bool {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.owner
            .upgrade()
            .is_some_and(|owner| owner.unsubscribe(&self.pattern, self.id))
    }

    /// Returns `true` while the listener is registered with a live emitter.
    pub fn is_active(&self) -> bool {
        self.owner
            .upgrade()
            .is_some_and(|owner| owner.is_registered(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}
