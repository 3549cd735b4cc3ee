//! Values that are either plain or reactive.
//!
//! Component inputs such as a child's size and position, and component
//! outputs such as text rows, may be given as a plain value or as a store.
//! `PropValue` keeps both cases behind one type so the engine can read the
//! current value uniformly and only subscribe when there is something to
//! observe.

use std::fmt::{self, Debug};

use super::derived::{derived, derived2};
use super::store::{Readable, Subscription, Writable};

/// A plain value or a store of that value.
pub enum PropValue<T> {
    /// Plain value, never changes.
    Static(T),
    /// Reactive value backed by a store.
    Reactive(Readable<T>),
}

impl<T: Clone + 'static> PropValue<T> {
    /// Get the current value.
    pub fn get(&self) -> T {
        match self {
            PropValue::Static(value) => value.clone(),
            PropValue::Reactive(store) => store.get(),
        }
    }

    /// Whether the value is backed by a store.
    pub fn is_reactive(&self) -> bool {
        matches!(self, PropValue::Reactive(_))
    }

    /// Call `listener` on every change after the current value.
    ///
    /// Plain values never change, so nothing is subscribed for them.
    pub fn watch<F>(&self, listener: F) -> Option<Subscription>
    where
        F: Fn(&T) + 'static,
    {
        match self {
            PropValue::Static(_) => None,
            PropValue::Reactive(store) => Some(store.subscribe_changes(listener)),
        }
    }

    /// Transform the value, staying plain when the input is plain.
    pub fn map<U, F>(&self, f: F) -> PropValue<U>
    where
        U: Clone + 'static,
        F: Fn(&T) -> U + 'static,
    {
        match self {
            PropValue::Static(value) => PropValue::Static(f(value)),
            PropValue::Reactive(store) => PropValue::Reactive(derived(store, f)),
        }
    }

    /// Combine with another value, reactive if either side is.
    pub fn zip_with<B, U, F>(&self, other: &PropValue<B>, f: F) -> PropValue<U>
    where
        B: Clone + 'static,
        U: Clone + 'static,
        F: Fn(&T, &B) -> U + 'static,
    {
        match (self, other) {
            (PropValue::Static(a), PropValue::Static(b)) => PropValue::Static(f(a, b)),
            (PropValue::Static(a), PropValue::Reactive(b)) => {
                let a = a.clone();
                PropValue::Reactive(derived(b, move |b| f(&a, b)))
            }
            (PropValue::Reactive(a), PropValue::Static(b)) => {
                let b = b.clone();
                PropValue::Reactive(derived(a, move |a| f(a, &b)))
            }
            (PropValue::Reactive(a), PropValue::Reactive(b)) => PropValue::Reactive(derived2(a, b, f)),
        }
    }

    /// A store view of the value; plain values become constant stores.
    pub fn to_readable(&self) -> Readable<T> {
        match self {
            PropValue::Static(value) => Readable::constant(value.clone()),
            PropValue::Reactive(store) => store.clone(),
        }
    }
}

impl<T: Clone> Clone for PropValue<T> {
    fn clone(&self) -> Self {
        match self {
            PropValue::Static(value) => PropValue::Static(value.clone()),
            PropValue::Reactive(store) => PropValue::Reactive(store.clone()),
        }
    }
}

impl<T: Default> Default for PropValue<T> {
    fn default() -> Self {
        PropValue::Static(T::default())
    }
}

impl<T> From<T> for PropValue<T> {
    fn from(value: T) -> Self {
        PropValue::Static(value)
    }
}

impl<T> From<Readable<T>> for PropValue<T> {
    fn from(store: Readable<T>) -> Self {
        PropValue::Reactive(store)
    }
}

impl<T> From<Writable<T>> for PropValue<T> {
    fn from(store: Writable<T>) -> Self {
        PropValue::Reactive(store.into())
    }
}

impl<T: Clone + Debug + 'static> Debug for PropValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            PropValue::Reactive(store) => f.debug_tuple("Reactive").field(&store.get()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::store::writable;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn static_values_stay_static() {
        let value: PropValue<i32> = 3.into();
        let mapped = value.map(|v| v + 1);
        assert!(!mapped.is_reactive());
        assert_eq!(mapped.get(), 4);
        assert!(mapped.watch(|_| {}).is_none());
    }

    #[test]
    fn map_over_store_tracks_changes() {
        let store = writable(2);
        let value: PropValue<i32> = store.clone().into();
        let squared = value.map(|v| v * v);
        assert!(squared.is_reactive());

        store.set(5);
        assert_eq!(squared.get(), 25);
    }

    #[test]
    fn zip_with_is_reactive_if_either_side_is() {
        let offset = writable(10);
        let base: PropValue<i32> = 1.into();
        let sum = base.zip_with(&offset.clone().into(), |a, b| a + b);
        assert!(sum.is_reactive());
        assert_eq!(sum.get(), 11);

        offset.set(20);
        assert_eq!(sum.get(), 21);

        let plain = base.zip_with(&PropValue::Static(2), |a, b| a * b);
        assert!(!plain.is_reactive());
        assert_eq!(plain.get(), 2);
    }

    #[test]
    fn watch_skips_current_value() {
        let store = writable(0);
        let value: PropValue<i32> = store.clone().into();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let _sub = value.watch(move |_| calls_clone.set(calls_clone.get() + 1));

        assert_eq!(calls.get(), 0);
        store.set(1);
        assert_eq!(calls.get(), 1);
    }
}
