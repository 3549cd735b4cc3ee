//! Component handles.
//!
//! A component is a render function wrapped in a comparison-stable handle.
//! The handle's [`ComponentId`] is what a parent's state node uses to find a
//! child's persistent state across renders, so identity never depends on
//! structural equality of the closure or of its properties.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::context::Context;
use super::output::Rendered;

/// Identity of a component handle. Clones share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// A component taking properties of type `P`.
///
/// # Example
///
/// ```rust
/// use literal_core::{Component, Rendered};
///
/// let label = Component::new("label", |ctx, text: &String| {
///     let mut row = text.clone();
///     row.truncate(ctx.width());
///     Rendered::text(vec![format!("{row:<width$}", width = ctx.width())])
/// });
/// assert_eq!(label.name(), "label");
/// ```
pub struct Component<P> {
    id: ComponentId,
    name: &'static str,
    render: Rc<dyn Fn(&Context, &P) -> Rendered>,
}

impl<P: 'static> Component<P> {
    /// Wrap a render function. Every call creates a new identity.
    pub fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&Context, &P) -> Rendered + 'static,
    {
        Self {
            id: ComponentId::new(),
            name,
            render: Rc::new(render),
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(&self, context: &Context, props: &P) -> Rendered {
        (self.render)(context, props)
    }
}

impl<P> Clone for Component<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            name: self.name,
            render: Rc::clone(&self.render),
        }
    }
}

impl<P> PartialEq for Component<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for Component<P> {}

impl<P> fmt::Debug for Component<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}
