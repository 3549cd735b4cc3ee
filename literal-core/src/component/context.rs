//! Composition Context
//!
//! A [`Context`] is built for every render of a component instance. It
//! exposes the instance's size and accumulated offset, the shared palette,
//! persistent value slots, and [`Context::child`] for nesting components.
//!
//! # Coordinates
//!
//! Child positions are relative to the parent's block. The context also
//! tracks the absolute offset of its block on the grid, which is what
//! [`Context::colorize`] and [`Context::set_color`] use to move color spans
//! into grid coordinates. Components never compute grid coordinates
//! themselves.
//!
//! # Slots
//!
//! [`Context::use_named_store`] addresses a slot by an explicit key and is
//! stable no matter how the render body branches. [`Context::use_store`] and
//! [`Context::use_state`] address slots by call order within one render:
//! the Nth call always gets the Nth slot, so skipping a call on some renders
//! shifts every later slot.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use super::component::Component;
use super::output::{Output, Placement, Rendered};
use crate::compositor::{ColorSpan, ColorStyle, Palette};
use crate::geometry::{Extent, Point, Size};
use crate::reactive::{writable, PropValue, Readable, Setter, StoreId, Subscription, Writable};
use crate::tree::{teardown, ChildKey, NodeRef, PassKind, Runtime, SlotKey};

/// Per-render view of one component instance.
///
/// Cheap to clone; clones refer to the same instance and may be kept in
/// closures that build reactive outputs.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

struct ContextInner {
    runtime: Rc<Runtime>,
    node: NodeRef,
    size: PropValue<Size>,
    offset: PropValue<Point>,
    emitted: RefCell<Vec<ColorSpan>>,
}

impl Context {
    pub(crate) fn new(
        runtime: Rc<Runtime>,
        node: NodeRef,
        size: PropValue<Size>,
        offset: PropValue<Point>,
    ) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                runtime,
                node,
                size,
                offset,
                emitted: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Current size of the block this component renders into.
    pub fn size(&self) -> Size {
        self.inner.size.get()
    }

    pub fn width(&self) -> usize {
        self.size().width
    }

    pub fn height(&self) -> usize {
        self.size().height
    }

    /// The size as given by the parent, plain or reactive.
    pub fn size_value(&self) -> &PropValue<Size> {
        &self.inner.size
    }

    /// The size as a store, for building reactive outputs.
    pub fn size_store(&self) -> Readable<Size> {
        self.inner.size.to_readable()
    }

    /// Absolute position of this block on the grid.
    pub fn offset(&self) -> Point {
        self.inner.offset.get()
    }

    /// The shared palette of the mounted root.
    pub fn palette(&self) -> Writable<Palette> {
        self.inner.runtime.palette().clone()
    }

    // ------------------------------------------------------------------------
    // Colors
    // ------------------------------------------------------------------------

    /// Translate a span from this block's coordinates into grid coordinates.
    pub fn colorize(&self, span: &ColorSpan) -> ColorSpan {
        span.translated(self.offset())
    }

    /// A detached translator for reactive color outputs.
    pub fn translator(&self) -> ColorTranslator {
        ColorTranslator {
            offset: self.inner.offset.clone(),
        }
    }

    /// Color `length` columns of row `y` starting at column `x`.
    ///
    /// The span is translated and kept with this render's output, next to
    /// whatever the component returns in [`Rendered::colors`].
    pub fn set_color(&self, x: i32, y: i32, style: ColorStyle, length: u32) {
        let span = self.colorize(&ColorSpan::new(y, x, length).styled(style));
        self.inner.emitted.borrow_mut().push(span);
    }

    /// Discard the spans emitted through [`Context::set_color`] so far.
    pub fn clear_colors(&self) {
        self.inner.emitted.borrow_mut().clear();
    }

    fn take_emitted(&self) -> Vec<ColorSpan> {
        std::mem::take(&mut *self.inner.emitted.borrow_mut())
    }

    // ------------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------------

    /// A persistent store addressed by `key`.
    ///
    /// The first call seeds the store with `initial`; later renders return
    /// the same store and ignore `initial`. Setting the store schedules a
    /// full render pass.
    pub fn use_named_store<T>(&self, key: impl Into<Cow<'static, str>>, initial: T) -> Writable<T>
    where
        T: Clone + 'static,
    {
        self.store_slot(SlotKey::Named(key.into()), initial)
    }

    /// A persistent store addressed by call order within this render.
    pub fn use_store<T>(&self, initial: T) -> Writable<T>
    where
        T: Clone + 'static,
    {
        let key = self.inner.node.borrow_mut().next_position();
        self.store_slot(key, initial)
    }

    /// Current value and setter of a positional slot.
    pub fn use_state<T>(&self, initial: T) -> (T, Setter<T>)
    where
        T: Clone + 'static,
    {
        let store = self.use_store(initial);
        (store.get(), store.setter())
    }

    fn store_slot<T>(&self, key: SlotKey, initial: T) -> Writable<T>
    where
        T: Clone + 'static,
    {
        let (existing, occupied) = {
            let node = self.inner.node.borrow();
            (node.slot::<Writable<T>>(&key).cloned(), node.has_slot(&key))
        };
        if let Some(store) = existing {
            return store;
        }
        if occupied {
            let node = self.inner.node.borrow();
            tracing::warn!(
                node = node.id().raw(),
                component = node.label(),
                slot = ?key,
                expected = std::any::type_name::<T>(),
                "slot holds another type; reseeding"
            );
        }

        let store = writable(initial);
        let request = self.inner.runtime.requester(PassKind::Full);
        let watch = store.subscribe_changes(move |_| request());
        let replaced = self
            .inner
            .node
            .borrow_mut()
            .insert_slot(key, Box::new(store.clone()), Some(watch));
        drop(replaced);
        store
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Bind a host input widget to `store`.
    ///
    /// The host keeps the widget and the store in sync. One widget exists
    /// per store for the lifetime of the mount. Without a host input
    /// collaborator the handle does nothing.
    pub fn use_input(&self, store: &Writable<String>) -> InputHandle {
        let bound = self.inner.runtime.ensure_input(store);
        InputHandle {
            runtime: Rc::downgrade(&self.inner.runtime),
            store: store.id(),
            bound,
        }
    }

    // ------------------------------------------------------------------------
    // Children
    // ------------------------------------------------------------------------

    /// Render a child component and place it inside this block.
    ///
    /// The child's persistent state is found by component identity (and the
    /// optional key), so it survives re-renders even when its position or
    /// properties change. A child not selected again by the next render of
    /// this component is torn down.
    pub fn child<P: 'static>(&self, spec: ChildSpec<'_, P>) -> Placement {
        let ChildSpec {
            component,
            props,
            size,
            position,
            key,
        } = spec;

        let node = self
            .inner
            .node
            .borrow_mut()
            .child(ChildKey::new(component.id(), key), component.name());

        let size = match size {
            Some(extent) => extent.map(|extent| Size::from(*extent)),
            None => self.inner.size.clone(),
        };
        let offset = self
            .inner
            .offset
            .zip_with(&position, |base, local| base.offset_by(*local));

        let mut watchers: SmallVec<[Subscription; 4]> = SmallVec::new();
        let runtime = &self.inner.runtime;
        for watch in [
            size.watch({
                let request = runtime.requester(PassKind::Full);
                move |_| request()
            }),
            position.watch({
                let request = runtime.requester(PassKind::Full);
                move |_| request()
            }),
        ]
        .into_iter()
        .flatten()
        {
            watchers.push(watch);
        }

        let output = render_node(runtime, &node, size, offset, watchers, |ctx| {
            component.invoke(ctx, &props)
        });
        Placement::new(position, output)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("node", &self.inner.node.borrow().id())
            .field("size", &self.size())
            .field("offset", &self.offset())
            .finish()
    }
}

/// Render one instance: invoke it with a fresh context, freeze its output,
/// and release children it no longer selects.
///
/// The hook from the instance's previous render is queued with the pruned
/// children's hooks and runs once the pass has presented.
pub(crate) fn render_node<F>(
    runtime: &Rc<Runtime>,
    node: &NodeRef,
    size: PropValue<Size>,
    offset: PropValue<Point>,
    mut watchers: SmallVec<[Subscription; 4]>,
    invoke: F,
) -> Rc<Output>
where
    F: FnOnce(&Context) -> Rendered,
{
    node.borrow_mut().begin_render();
    let context = Context::new(Rc::clone(runtime), Rc::clone(node), size, offset);
    let rendered = invoke(&context);
    let (output, hook) = rendered.into_output(context.take_emitted());

    for watch in [
        output.text_value().watch({
            let request = runtime.requester(PassKind::Recompose);
            move |_| request()
        }),
        output.colors_value().watch({
            let request = runtime.requester(PassKind::Recompose);
            move |_| request()
        }),
        output.children_value().watch({
            let request = runtime.requester(PassKind::Recompose);
            move |_| request()
        }),
    ]
    .into_iter()
    .flatten()
    {
        watchers.push(watch);
    }

    let (previous_hook, previous_watchers, removed) = {
        let mut node = node.borrow_mut();
        (
            node.set_destroy_hook(hook),
            node.set_watchers(watchers),
            node.prune_unseen(),
        )
    };
    drop(previous_watchers);
    runtime.bury(previous_hook.into_iter().collect());

    if !removed.is_empty() {
        let mut hooks = Vec::new();
        for child in &removed {
            tracing::trace!(child = child.borrow().label(), "pruning state node");
            teardown(child, &mut hooks);
        }
        runtime.bury(hooks);
    }

    Rc::new(output)
}

/// Description of a child to render.
///
/// Without [`ChildSpec::size`] the child gets its parent's size; without
/// [`ChildSpec::at`] it is placed at the parent's origin.
pub struct ChildSpec<'a, P> {
    component: &'a Component<P>,
    props: P,
    size: Option<PropValue<Extent>>,
    position: PropValue<Point>,
    key: Option<Cow<'static, str>>,
}

impl<'a, P: 'static> ChildSpec<'a, P> {
    pub fn new(component: &'a Component<P>, props: P) -> Self {
        Self {
            component,
            props,
            size: None,
            position: PropValue::Static(Point::ORIGIN),
            key: None,
        }
    }

    /// Requested size. Negative dimensions are clamped to zero.
    pub fn size(mut self, size: impl Into<PropValue<Extent>>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Position relative to the parent's block.
    pub fn at(mut self, position: impl Into<PropValue<Point>>) -> Self {
        self.position = position.into();
        self
    }

    /// Plain position and size in one call.
    pub fn bounds(self, x: i32, y: i32, width: i32, height: i32) -> Self {
        self.at(Point::new(x, y)).size(Extent::new(width, height))
    }

    /// Distinguish several instances of the same component in one parent.
    pub fn key(mut self, key: impl Into<Cow<'static, str>>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Translates spans into grid coordinates outside of a render.
#[derive(Debug, Clone)]
pub struct ColorTranslator {
    offset: PropValue<Point>,
}

impl ColorTranslator {
    pub fn translate(&self, span: &ColorSpan) -> ColorSpan {
        span.translated(self.offset.get())
    }
}

/// Handle to the host input widget bound to a store.
#[derive(Debug, Clone)]
pub struct InputHandle {
    runtime: Weak<Runtime>,
    store: StoreId,
    bound: bool,
}

impl InputHandle {
    /// Whether a host widget backs this handle.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn focus(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.focus_input(self.store);
        }
    }

    /// Remove the widget. A later `use_input` for the same store creates a
    /// new one.
    pub fn cleanup(&self) {
        if let Some(runtime) = self.runtime.upgrade() {
            runtime.release_input(self.store);
        }
    }
}
