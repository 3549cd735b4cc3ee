//! Mount Runtime
//!
//! Shared state of one mounted root: the render scheduler, the palette
//! store, the destroy hooks waiting for the end of the current pass, and the
//! input widgets handed out by the host. Every context of the tree holds the
//! same runtime; store listeners only hold a weak reference so the tree can
//! be dropped without cycles.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::scheduler::{PassKind, RenderScheduler};
use crate::component::DestroyHook;
use crate::compositor::Palette;
use crate::mount::{InputCapture, InputWidget};
use crate::reactive::{StoreId, Writable};

pub(crate) struct Runtime {
    scheduler: RenderScheduler,
    palette: Writable<Palette>,
    graveyard: RefCell<Vec<DestroyHook>>,
    inputs: RefCell<IndexMap<StoreId, Box<dyn InputWidget>>>,
    input_capture: Option<Rc<dyn InputCapture>>,
}

impl Runtime {
    pub(crate) fn new(
        scheduler: RenderScheduler,
        palette: Writable<Palette>,
        input_capture: Option<Rc<dyn InputCapture>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            scheduler,
            palette,
            graveyard: RefCell::new(Vec::new()),
            inputs: RefCell::new(IndexMap::new()),
            input_capture,
        })
    }

    pub(crate) fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub(crate) fn palette(&self) -> &Writable<Palette> {
        &self.palette
    }

    /// A callback requesting `kind` that does not keep the runtime alive.
    pub(crate) fn requester(self: &Rc<Self>, kind: PassKind) -> impl Fn() + 'static {
        let runtime: Weak<Self> = Rc::downgrade(self);
        move || {
            if let Some(runtime) = runtime.upgrade() {
                runtime.scheduler.request(kind);
            }
        }
    }

    /// Queue destroy hooks to run once the current pass has presented.
    pub(crate) fn bury(&self, hooks: Vec<DestroyHook>) {
        if !hooks.is_empty() {
            self.graveyard.borrow_mut().extend(hooks);
        }
    }

    pub(crate) fn run_graveyard(&self) {
        let hooks = std::mem::take(&mut *self.graveyard.borrow_mut());
        if !hooks.is_empty() {
            tracing::trace!(count = hooks.len(), "running destroy hooks");
        }
        for hook in hooks {
            hook();
        }
    }

    /// Make sure a widget exists for `store`. Returns false without a host
    /// collaborator.
    pub(crate) fn ensure_input(&self, store: &Writable<String>) -> bool {
        let Some(capture) = &self.input_capture else {
            return false;
        };
        if self.inputs.borrow().contains_key(&store.id()) {
            return true;
        }
        let widget = capture.attach(store.clone());
        self.inputs.borrow_mut().insert(store.id(), widget);
        true
    }

    pub(crate) fn focus_input(&self, id: StoreId) {
        if let Some(widget) = self.inputs.borrow().get(&id) {
            widget.focus();
        }
    }

    pub(crate) fn release_input(&self, id: StoreId) {
        let widget = self.inputs.borrow_mut().shift_remove(&id);
        if let Some(widget) = widget {
            widget.cleanup();
        }
    }

    pub(crate) fn release_all_inputs(&self) {
        let widgets: Vec<_> = self.inputs.borrow_mut().drain(..).collect();
        for (_, widget) in widgets {
            widget.cleanup();
        }
    }

    pub(crate) fn input_count(&self) -> usize {
        self.inputs.borrow().len()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("scheduler", self.scheduler())
            .field("inputs", &self.input_count())
            .finish()
    }
}
