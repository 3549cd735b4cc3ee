//! Persistent State Nodes
//!
//! A state node is the durable record behind one component instance. It
//! survives re-renders as long as the parent keeps selecting the same
//! component at that point of the tree, and is torn down as soon as a render
//! of the parent stops selecting it.
//!
//! Each node holds:
//!
//! - value slots, addressed by an explicit name or by allocation position
//!   within one render,
//! - a registry of child nodes keyed by component identity (plus an
//!   optional explicit key),
//! - the instance's current destroy hook and the subscriptions that tie its
//!   reactive output to the scheduler.

use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::component::{ComponentId, DestroyHook};
use crate::reactive::Subscription;

/// Unique identifier for a state node, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Address of a value slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// Stable, explicitly named slot.
    Named(Cow<'static, str>),
    /// Nth positional allocation within one render.
    Position(usize),
}

/// Identity of a child within its parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildKey {
    component: ComponentId,
    key: Option<Cow<'static, str>>,
}

impl ChildKey {
    pub fn new(component: ComponentId, key: Option<Cow<'static, str>>) -> Self {
        Self { component, key }
    }

    pub fn component(&self) -> ComponentId {
        self.component
    }
}

struct Slot {
    value: Box<dyn Any>,
    /// Ties the slot's store to the scheduler.
    _watch: Option<Subscription>,
}

/// Shared handle to a state node.
pub type NodeRef = Rc<RefCell<StateNode>>;

/// Persistent state for one component instance.
pub struct StateNode {
    id: NodeId,
    label: &'static str,
    slots: IndexMap<SlotKey, Slot>,
    cursor: usize,
    children: IndexMap<ChildKey, NodeRef>,
    /// Whether the parent's current render selected this node.
    seen: bool,
    on_destroy: Option<DestroyHook>,
    watchers: SmallVec<[Subscription; 4]>,
}

impl StateNode {
    pub fn new(label: &'static str) -> Self {
        Self {
            id: NodeId::new(),
            label,
            slots: IndexMap::new(),
            cursor: 0,
            children: IndexMap::new(),
            seen: true,
            on_destroy: None,
            watchers: SmallVec::new(),
        }
    }

    pub fn new_ref(label: &'static str) -> NodeRef {
        Rc::new(RefCell::new(Self::new(label)))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn has_destroy_hook(&self) -> bool {
        self.on_destroy.is_some()
    }

    /// Prepare for a render: rewind the slot cursor and mark every child as
    /// not yet selected.
    pub(crate) fn begin_render(&mut self) {
        self.cursor = 0;
        for child in self.children.values() {
            child.borrow_mut().seen = false;
        }
    }

    /// Key of the next positional slot.
    pub(crate) fn next_position(&mut self) -> SlotKey {
        let key = SlotKey::Position(self.cursor);
        self.cursor += 1;
        key
    }

    pub(crate) fn has_slot(&self, key: &SlotKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Typed view of a slot; `None` if missing or of another type.
    pub(crate) fn slot<T: 'static>(&self, key: &SlotKey) -> Option<&T> {
        self.slots.get(key).and_then(|slot| slot.value.downcast_ref::<T>())
    }

    /// Seed or reseed a slot. Returns the replaced value, if any, so the
    /// caller can drop it outside the borrow.
    pub(crate) fn insert_slot(
        &mut self,
        key: SlotKey,
        value: Box<dyn Any>,
        watch: Option<Subscription>,
    ) -> Option<Box<dyn Any>> {
        self.slots
            .insert(key, Slot { value, _watch: watch })
            .map(|old| old.value)
    }

    /// Look up or create the child for `key` and mark it selected.
    pub(crate) fn child(&mut self, key: ChildKey, label: &'static str) -> NodeRef {
        let node = self
            .children
            .entry(key)
            .or_insert_with(|| {
                tracing::trace!(parent = self.id.raw(), child = label, "creating state node");
                StateNode::new_ref(label)
            })
            .clone();
        node.borrow_mut().seen = true;
        node
    }

    /// Detach every child the current render did not select.
    pub(crate) fn prune_unseen(&mut self) -> Vec<NodeRef> {
        let mut removed = Vec::new();
        self.children.retain(|_, child| {
            let keep = child.borrow().seen;
            if !keep {
                removed.push(Rc::clone(child));
            }
            keep
        });
        removed
    }

    /// Keep the latest destroy hook and hand back the one it replaces. The
    /// caller owes that hook exactly one run.
    pub(crate) fn set_destroy_hook(&mut self, hook: Option<DestroyHook>) -> Option<DestroyHook> {
        std::mem::replace(&mut self.on_destroy, hook)
    }

    pub(crate) fn set_watchers(
        &mut self,
        watchers: SmallVec<[Subscription; 4]>,
    ) -> SmallVec<[Subscription; 4]> {
        std::mem::replace(&mut self.watchers, watchers)
    }
}

impl std::fmt::Debug for StateNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateNode")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("slots", &self.slots.len())
            .field("children", &self.children.len())
            .finish()
    }
}

/// Tear down `node` and its subtree, children before parents.
///
/// Destroy hooks are appended to `hooks` instead of run, so the caller
/// decides when they fire. Slots and subscriptions are released here.
pub(crate) fn teardown(node: &NodeRef, hooks: &mut Vec<DestroyHook>) {
    let (children, hook, slots, watchers) = {
        let mut node = node.borrow_mut();
        tracing::trace!(node = node.id.raw(), label = node.label, "tearing down state node");
        let children: Vec<NodeRef> = node.children.drain(..).map(|(_, child)| child).collect();
        (
            children,
            node.on_destroy.take(),
            std::mem::take(&mut node.slots),
            std::mem::take(&mut node.watchers),
        )
    };

    for child in &children {
        teardown(child, hooks);
    }
    if let Some(hook) = hook {
        hooks.push(hook);
    }
    drop(watchers);
    drop(slots);
}
