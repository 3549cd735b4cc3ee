//! Reactive Stores
//!
//! This module implements the store graph everything else is built on:
//! readable and writable stores, derived stores, and values that may be
//! either plain or reactive.
//!
//! # Concepts
//!
//! ## Readable and Writable
//!
//! A store holds one value and a list of listeners. Subscribing calls the
//! listener right away with the current value, so no subscriber ever misses
//! the initial state. A writable store adds `set` and `update`; every call
//! notifies, even when the value did not change.
//!
//! ## Derived
//!
//! A derived store recomputes from one or more upstream stores each time any
//! of them fires, always with the latest value of every upstream.
//!
//! # Implementation Notes
//!
//! Stores are single-threaded (`Rc` + `RefCell`). All notification chains run
//! synchronously to completion before control returns to the caller. The
//! only asynchronous boundary in the crate is the render scheduler's frame
//! request.

mod derived;
mod prop;
mod store;
mod subscriber;

pub use derived::{derived, derived2, derived_all, subscribe_all};
pub use prop::PropValue;
pub use store::{readable, writable, Readable, Setter, Stop, Subscription, Writable};
pub use subscriber::{StoreId, Subscriber, SubscriberId};
