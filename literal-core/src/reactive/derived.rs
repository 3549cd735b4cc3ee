//! Derived Stores
//!
//! A derived store is a read-only store whose value is computed from one or
//! more upstream stores by a pure combining function.
//!
//! # How Derived Stores Work
//!
//! 1. On creation the combiner runs once with the current upstream values,
//!    so the store holds a value before anyone subscribes.
//!
//! 2. Whenever any upstream fires, the combiner runs again synchronously
//!    with the latest value of every upstream and the result is pushed to
//!    the derived store's listeners.
//!
//! 3. For the list form, an upstream update is only combined once every
//!    upstream has delivered at least one value. Until an upstream fires
//!    for the first time nothing is combined; afterwards its last value is
//!    reused for updates coming from the others.
//!
//! # Lifetime
//!
//! The derived store owns its upstream subscriptions. Upstream listeners only
//! hold a weak reference back, so dropping the last handle to a derived store
//! unsubscribes it from everything it observed.

use std::cell::{Cell, OnceCell, RefCell};
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use super::store::{Readable, StoreCore, Subscription};

type Snapshot<T> = SmallVec<[Option<T>; 4]>;

/// Derive a store from a single upstream store.
pub fn derived<T, U, F>(dependency: &Readable<T>, f: F) -> Readable<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
    F: Fn(&T) -> U + 'static,
{
    let core = Rc::new(StoreCore::new(f(&dependency.get()), None));
    let weak = Rc::downgrade(&core);

    let subscription = dependency.subscribe_changes(move |value| {
        if let Some(core) = weak.upgrade() {
            core.set(f(value));
        }
    });
    core.attach_upstream(subscription);

    Readable::from_core(core)
}

/// Derive a store from two upstream stores of different types.
pub fn derived2<A, B, U, F>(a: &Readable<A>, b: &Readable<B>, f: F) -> Readable<U>
where
    A: Clone + 'static,
    B: Clone + 'static,
    U: Clone + 'static,
    F: Fn(&A, &B) -> U + 'static,
{
    let latest: Rc<RefCell<(Option<A>, Option<B>)>> = Rc::new(RefCell::new((None, None)));
    let target: Rc<OnceCell<Weak<StoreCore<U>>>> = Rc::new(OnceCell::new());
    let f = Rc::new(f);

    let recompute = {
        let latest = latest.clone();
        let target = target.clone();
        let f = f.clone();
        Rc::new(move || {
            let Some(core) = target.get().and_then(Weak::upgrade) else {
                return;
            };
            let next = {
                let latest = latest.borrow();
                match &*latest {
                    (Some(a), Some(b)) => Some(f(a, b)),
                    _ => None,
                }
            };
            if let Some(next) = next {
                core.set(next);
            }
        })
    };

    let sub_a = {
        let latest = latest.clone();
        let recompute = recompute.clone();
        a.subscribe(move |value| {
            latest.borrow_mut().0 = Some(value.clone());
            recompute();
        })
    };
    let sub_b = {
        let latest = latest.clone();
        let recompute = recompute.clone();
        b.subscribe(move |value| {
            latest.borrow_mut().1 = Some(value.clone());
            recompute();
        })
    };

    let initial = {
        let latest = latest.borrow();
        match &*latest {
            (Some(a), Some(b)) => f(a, b),
            _ => f(&a.get(), &b.get()),
        }
    };

    let core = Rc::new(StoreCore::new(initial, None));
    let _ = target.set(Rc::downgrade(&core));
    core.attach_upstream(sub_a);
    core.attach_upstream(sub_b);

    Readable::from_core(core)
}

/// Derive a store from an ordered list of upstream stores.
///
/// The combiner receives the latest value of every upstream, in the order
/// the upstreams were given.
pub fn derived_all<T, U, F>(dependencies: &[Readable<T>], f: F) -> Readable<U>
where
    T: Clone + 'static,
    U: Clone + 'static,
    F: Fn(&[T]) -> U + 'static,
{
    let latest: Rc<RefCell<Snapshot<T>>> =
        Rc::new(RefCell::new((0..dependencies.len()).map(|_| None).collect()));
    let initialized = Rc::new(Cell::new(false));
    let target: Rc<OnceCell<Weak<StoreCore<U>>>> = Rc::new(OnceCell::new());
    let f = Rc::new(f);

    let mut subscriptions = Vec::with_capacity(dependencies.len());
    for (index, dependency) in dependencies.iter().enumerate() {
        let latest = latest.clone();
        let initialized = initialized.clone();
        let target = target.clone();
        let f = f.clone();
        subscriptions.push(dependency.subscribe(move |value| {
            latest.borrow_mut()[index] = Some(value.clone());
            if !initialized.get() {
                return;
            }
            let Some(core) = target.get().and_then(Weak::upgrade) else {
                return;
            };
            let next = complete(&latest.borrow()).map(|values| f(&values));
            if let Some(next) = next {
                core.set(next);
            }
        }));
    }
    initialized.set(true);

    let initial = {
        let values = complete(&latest.borrow())
            .unwrap_or_else(|| dependencies.iter().map(Readable::get).collect());
        f(&values)
    };

    let core = Rc::new(StoreCore::new(initial, None));
    let _ = target.set(Rc::downgrade(&core));
    for subscription in subscriptions {
        core.attach_upstream(subscription);
    }

    Readable::from_core(core)
}

/// Subscribe to the latest values of several stores at once.
///
/// The listener is called immediately with the current values and then
/// whenever any of the stores fires.
pub fn subscribe_all<T, F>(dependencies: &[Readable<T>], f: F) -> Subscription
where
    T: Clone + 'static,
    F: Fn(&[T]) + 'static,
{
    let combined = derived_all(dependencies, |values: &[T]| values.to_vec());
    combined.subscribe(move |values: &Vec<T>| f(values))
}

fn complete<T: Clone>(snapshot: &Snapshot<T>) -> Option<Vec<T>> {
    snapshot.iter().cloned().collect()
}
