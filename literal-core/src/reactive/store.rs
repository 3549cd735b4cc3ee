//! Store Implementation
//!
//! A store is the fundamental reactive primitive. It holds a value and a
//! list of listeners that are called with that value.
//!
//! # How Stores Work
//!
//! 1. `subscribe` calls the new listener synchronously with the current
//!    value, then appends it to the listener list.
//!
//! 2. `set` replaces the value and calls every listener, in subscription
//!    order. There is no equality short-circuit: setting the same value
//!    again notifies again. Coalescing belongs to the render scheduler.
//!
//! 3. A store created with [`readable`] runs its start callback when the
//!    first listener attaches and the returned stop callback when the last
//!    one leaves, so expensive backing work only runs while observed.
//!
//! # Re-entrancy
//!
//! Notification iterates a snapshot of the listener list. A listener that
//! calls `set` on the store currently notifying starts a nested
//! notification pass; ordering of such cascades is the caller's problem.

use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug};
use std::ops::Deref;
use std::rc::{Rc, Weak};

use super::subscriber::{StoreId, Subscriber, SubscriberId};

/// Callback run when the last listener leaves a store.
pub type Stop = Box<dyn FnOnce()>;

type Start<T> = Box<dyn Fn(Setter<T>) -> Option<Stop>>;

/// Shared state behind every store handle.
pub(crate) struct StoreCore<T> {
    id: StoreId,
    value: RefCell<T>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
    start: Option<Start<T>>,
    stop: RefCell<Option<Stop>>,
    /// Subscriptions this store holds on other stores (derived stores).
    upstream: RefCell<Vec<Subscription>>,
}

impl<T: Clone + 'static> StoreCore<T> {
    pub(crate) fn new(value: T, start: Option<Start<T>>) -> Self {
        Self {
            id: StoreId::new(),
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
            start,
            stop: RefCell::new(None),
            upstream: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn set(&self, value: T) {
        *self.value.borrow_mut() = value;
        self.notify();
    }

    pub(crate) fn attach_upstream(&self, subscription: Subscription) {
        self.upstream.borrow_mut().push(subscription);
    }

    fn notify(&self) {
        let snapshot: Vec<Subscriber<T>> = self.subscribers.borrow().clone();
        if snapshot.is_empty() {
            return;
        }
        let value = self.value.borrow().clone();
        for subscriber in &snapshot {
            subscriber.notify(&value);
        }
    }

    fn remove(&self, id: SubscriberId) {
        let now_empty = {
            let mut subscribers = self.subscribers.borrow_mut();
            let before = subscribers.len();
            subscribers.retain(|s| s.id() != id);
            before != subscribers.len() && subscribers.is_empty()
        };
        if now_empty {
            let stop = self.stop.borrow_mut().take();
            if let Some(stop) = stop {
                stop();
            }
        }
    }
}

/// Handle to an active subscription.
///
/// Dropping the handle unsubscribes the listener. Use [`Subscription::forget`]
/// to keep a listener attached for the lifetime of the store.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Remove the listener now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Leave the listener attached and discard the handle.
    pub fn forget(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A read-only observable value.
///
/// Clones share the same underlying store.
pub struct Readable<T> {
    core: Rc<StoreCore<T>>,
}

impl<T: Clone + 'static> Readable<T> {
    pub(crate) fn from_core(core: Rc<StoreCore<T>>) -> Self {
        Self { core }
    }

    /// A store that never changes.
    pub fn constant(value: T) -> Self {
        Self::from_core(Rc::new(StoreCore::new(value, None)))
    }

    /// Get the store's unique ID.
    pub fn id(&self) -> StoreId {
        self.core.id
    }

    /// Get the current value without subscribing.
    pub fn get(&self) -> T {
        self.core.value.borrow().clone()
    }

    /// Attach a listener.
    ///
    /// The listener is called immediately with the current value and again
    /// on every later `set` or `update`.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let subscriber = Subscriber::new(listener);
        let id = subscriber.id();

        let current = self.get();
        subscriber.notify(&current);

        let first = {
            let mut subscribers = self.core.subscribers.borrow_mut();
            subscribers.push(subscriber);
            subscribers.len() == 1
        };

        if first {
            if let Some(start) = &self.core.start {
                let stop = start(Setter {
                    core: Rc::downgrade(&self.core),
                });
                *self.core.stop.borrow_mut() = stop;
            }
        }

        let core = Rc::clone(&self.core);
        Subscription::new(move || core.remove(id))
    }

    /// Attach a listener that skips the initial synchronous call and only
    /// sees later changes.
    pub fn subscribe_changes<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let primed = Cell::new(false);
        self.subscribe(move |value| {
            if primed.replace(true) {
                listener(value);
            }
        })
    }

    /// Number of attached listeners.
    pub fn subscriber_count(&self) -> usize {
        self.core.subscribers.borrow().len()
    }

    /// Whether two handles refer to the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl<T> Clone for Readable<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: Clone + Debug + 'static> Debug for Readable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Readable")
            .field("id", &self.id())
            .field("value", &self.get())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// A mutable observable value.
///
/// Dereferences to [`Readable`] for `get` and `subscribe`.
pub struct Writable<T> {
    readable: Readable<T>,
}

impl<T: Clone + 'static> Writable<T> {
    /// Replace the value and notify every listener.
    pub fn set(&self, value: T) {
        self.readable.core.set(value);
    }

    /// Replace the value with `f(current)` and notify every listener.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = {
            let current = self.readable.core.value.borrow();
            f(&current)
        };
        self.set(next);
    }

    /// A detached setter for this store.
    pub fn setter(&self) -> Setter<T> {
        Setter {
            core: Rc::downgrade(&self.readable.core),
        }
    }

    /// A read-only handle to the same store.
    pub fn readable(&self) -> Readable<T> {
        self.readable.clone()
    }
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            readable: self.readable.clone(),
        }
    }
}

impl<T> Deref for Writable<T> {
    type Target = Readable<T>;

    fn deref(&self) -> &Readable<T> {
        &self.readable
    }
}

impl<T> From<Writable<T>> for Readable<T> {
    fn from(store: Writable<T>) -> Self {
        store.readable
    }
}

impl<T: Clone + Debug + 'static> Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writable")
            .field("id", &self.id())
            .field("value", &self.get())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

/// Sets a store's value without keeping the store alive.
///
/// Calls after the store has been dropped are ignored.
pub struct Setter<T> {
    core: Weak<StoreCore<T>>,
}

impl<T: Clone + 'static> Setter<T> {
    /// Replace the value and notify every listener.
    pub fn set(&self, value: T) {
        if let Some(core) = self.core.upgrade() {
            core.set(value);
        }
    }

    /// Replace the value with `f(current)` and notify every listener.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        if let Some(core) = self.core.upgrade() {
            let next = {
                let current = core.value.borrow();
                f(&current)
            };
            core.set(next);
        }
    }

    /// Whether the store is still alive.
    pub fn is_live(&self) -> bool {
        self.core.strong_count() > 0
    }
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
        }
    }
}

impl<T> Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("live", &(self.core.strong_count() > 0))
            .finish()
    }
}

/// Create a mutable store with an initial value.
pub fn writable<T: Clone + 'static>(initial: T) -> Writable<T> {
    Writable {
        readable: Readable::from_core(Rc::new(StoreCore::new(initial, None))),
    }
}

/// Create a read-only store driven by a start callback.
///
/// `start` runs when the first listener subscribes and receives a setter
/// for the store. The stop callback it may return runs when the last
/// listener unsubscribes; the next subscriber starts it again.
pub fn readable<T, F>(initial: T, start: F) -> Readable<T>
where
    T: Clone + 'static,
    F: Fn(Setter<T>) -> Option<Stop> + 'static,
{
    Readable::from_core(Rc::new(StoreCore::new(initial, Some(Box::new(start)))))
}
