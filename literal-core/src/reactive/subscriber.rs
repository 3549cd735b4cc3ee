//! Subscriber types for the store graph.
//!
//! A Subscriber is a listener attached to a store. Every store keeps its
//! subscribers in subscription order and calls them with the current value.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscriber.
///
/// Each listener gets a unique ID when it subscribes. The ID is what an
/// unsubscribe removes, so the same closure may be subscribed twice and
/// removed independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a store.
///
/// Clones of a store handle share the ID. Used as the key when a host
/// collaborator needs to associate something with one particular store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(u64);

impl StoreId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A listener attached to a store holding values of type `T`.
///
/// The callback is reference counted so a notification pass can iterate a
/// snapshot of the listener list while listeners subscribe or unsubscribe.
pub struct Subscriber<T> {
    id: SubscriberId,
    notify: Rc<dyn Fn(&T)>,
}

impl<T> Subscriber<T> {
    /// Create a new subscriber with the given notification callback.
    pub fn new<F>(notify: F) -> Self
    where
        F: Fn(&T) + 'static,
    {
        Self {
            id: SubscriberId::new(),
            notify: Rc::new(notify),
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Deliver a value to the subscriber.
    pub fn notify(&self, value: &T) {
        (self.notify)(value);
    }
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            notify: Rc::clone(&self.notify),
        }
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber").field("id", &self.id).finish()
    }
}
