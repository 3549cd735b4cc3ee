//! Render Scheduler
//!
//! The scheduler collapses any number of store mutations that happen between
//! two host frames into a single render pass.
//!
//! # How Scheduling Works
//!
//! 1. The scheduler starts **Idle**. The first render request moves it to
//!    **Scheduled** and asks the host's [`FrameClock`] for one callback.
//!
//! 2. Further requests while Scheduled only upgrade the pending pass kind;
//!    no second frame is requested.
//!
//! 3. When the host frame fires, [`RenderLoop::run_frame`] takes the pending
//!    kind (back to Idle) and runs the pass:
//!    - zero grid width or height skips the pass entirely,
//!    - a [`PassKind::Full`] pass re-invokes the root component,
//!    - a [`PassKind::Recompose`] pass only re-reads the live output tree,
//!    - the grid is composited, colorized and presented,
//!    - destroy hooks of instances dropped by the pass run last.
//!
//! Requests made while a pass is running schedule the next frame.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;

use super::node::NodeRef;
use super::runtime::Runtime;
use crate::component::{render_node, Context, Output, Rendered};
use crate::compositor::{collect_colors, colorize, compose};
use crate::geometry::{Point, Size};
use crate::mount::Surface;
use crate::reactive::{PropValue, Readable};

/// What a render pass has to redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PassKind {
    /// Re-read reactive outputs of the live tree without invoking components.
    Recompose,
    /// Re-invoke the root component, and with it the whole tree.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Scheduled(PassKind),
    Stopped,
}

/// Host frame-timing primitive.
///
/// `request_frame` asks the host to call back (through
/// [`MountHandle::tick`](crate::MountHandle::tick)) on its next frame. It is
/// only called while no frame is pending and must not call back
/// synchronously.
pub trait FrameClock {
    fn request_frame(&self);

    /// Withdraw a pending request. Called at unmount.
    fn cancel_frame(&self) {}
}

/// A clock that only counts requests; the caller ticks by hand.
///
/// Clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    requests: Rc<Cell<usize>>,
    cancels: Rc<Cell<usize>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames requested so far.
    pub fn requests(&self) -> usize {
        self.requests.get()
    }

    /// Number of requests withdrawn so far.
    pub fn cancels(&self) -> usize {
        self.cancels.get()
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }

    fn cancel_frame(&self) {
        self.cancels.set(self.cancels.get() + 1);
    }
}

/// The Idle/Scheduled state machine.
pub struct RenderScheduler {
    state: Cell<State>,
    clock: Rc<dyn FrameClock>,
}

impl RenderScheduler {
    pub fn new(clock: Rc<dyn FrameClock>) -> Self {
        Self {
            state: Cell::new(State::Idle),
            clock,
        }
    }

    /// Ask for a pass of at least `kind`.
    pub fn request(&self, kind: PassKind) {
        match self.state.get() {
            State::Idle => {
                self.state.set(State::Scheduled(kind));
                self.clock.request_frame();
            }
            State::Scheduled(pending) => {
                tracing::trace!(?pending, requested = ?kind, "coalescing render request");
                self.state.set(State::Scheduled(pending.max(kind)));
            }
            State::Stopped => {}
        }
    }

    /// Take the pending pass, returning to Idle.
    pub fn take(&self) -> Option<PassKind> {
        match self.state.get() {
            State::Scheduled(kind) => {
                self.state.set(State::Idle);
                Some(kind)
            }
            State::Idle | State::Stopped => None,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self.state.get(), State::Scheduled(_))
    }

    pub fn is_stopped(&self) -> bool {
        self.state.get() == State::Stopped
    }

    /// Cancel any pending frame and ignore every later request.
    pub fn shutdown(&self) {
        if self.is_scheduled() {
            self.clock.cancel_frame();
        }
        self.state.set(State::Stopped);
    }
}

impl std::fmt::Debug for RenderScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderScheduler")
            .field("state", &self.state.get())
            .finish()
    }
}

/// Result of one host frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Nothing was pending.
    Idle,
    /// The grid had a zero dimension; nothing was rendered.
    Skipped,
    /// A pass ran and its rows reached the surface.
    Presented(PassKind),
}

/// Drives render passes for one mounted root.
pub(crate) struct RenderLoop {
    runtime: Rc<Runtime>,
    root: Box<dyn Fn(&Context) -> Rendered>,
    root_node: NodeRef,
    grid: Readable<Size>,
    output: RefCell<Option<Rc<Output>>>,
}

impl RenderLoop {
    pub(crate) fn new(
        runtime: Rc<Runtime>,
        root: Box<dyn Fn(&Context) -> Rendered>,
        root_node: NodeRef,
        grid: Readable<Size>,
    ) -> Self {
        Self {
            runtime,
            root,
            root_node,
            grid,
            output: RefCell::new(None),
        }
    }

    pub(crate) fn root_node(&self) -> &NodeRef {
        &self.root_node
    }

    /// Run the pending pass, if any.
    pub(crate) fn run_frame(&self, surface: &dyn Surface) -> FrameOutcome {
        match self.runtime.scheduler().take() {
            Some(kind) => self.run_pass(kind, surface),
            None => FrameOutcome::Idle,
        }
    }

    pub(crate) fn run_pass(&self, kind: PassKind, surface: &dyn Surface) -> FrameOutcome {
        let size = self.grid.get();
        if size.is_degenerate() {
            tracing::debug!(width = size.width, height = size.height, "skipping render pass");
            return FrameOutcome::Skipped;
        }

        let live = self.output.borrow().clone();
        let (kind, output) = match (kind, live) {
            (PassKind::Recompose, Some(output)) => (PassKind::Recompose, output),
            _ => {
                let output = render_node(
                    &self.runtime,
                    &self.root_node,
                    PropValue::Reactive(self.grid.clone()),
                    PropValue::Static(Point::ORIGIN),
                    SmallVec::new(),
                    |ctx| (self.root)(ctx),
                );
                *self.output.borrow_mut() = Some(Rc::clone(&output));
                (PassKind::Full, output)
            }
        };

        let rows = compose(&output);
        let spans = collect_colors(&output);
        let rows = colorize(&rows, &spans);
        tracing::debug!(
            ?kind,
            width = size.width,
            height = size.height,
            rows = rows.len(),
            spans = spans.len(),
            "render pass"
        );

        surface.present(&rows);
        self.runtime.run_graveyard();
        FrameOutcome::Presented(kind)
    }

    /// Drop the live output tree.
    pub(crate) fn clear(&self) {
        let output = self.output.borrow_mut().take();
        drop(output);
    }
}

// ============================================================================
// Tests
// ============================================================================
