//! Mount API
//!
//! Entry point for putting a component tree on a host surface.
//!
//! # Example
//!
//! ```rust
//! use literal_core::{BufferSurface, Component, Literal, MountOptions, Rendered};
//!
//! let surface = BufferSurface::with_grid(5, 1);
//! let hello = Component::new("hello", |_, _: &()| Rendered::text(vec!["hello".to_string()]));
//!
//! let handle = Literal::new(MountOptions::new(surface.clone()))?.mount(&hello, ());
//! assert_eq!(surface.last_frame(), Some(vec!["hello".to_string()]));
//!
//! handle.unmount();
//! assert!(!surface.is_attached());
//! # Ok::<(), literal_core::Error>(())
//! ```
//!
//! # Host Collaborators
//!
//! - [`Surface`]: measures cells, installs the palette stylesheet and shows
//!   finished rows.
//! - [`FrameClock`]: calls [`MountHandle::tick`] on the next host frame after
//!   each request.
//! - [`InputCapture`]: provides text-entry widgets bound to stores.

use std::cell::RefCell;
use std::rc::Rc;

use crate::component::Component;
use crate::compositor::Palette;
use crate::error::{Error, Result};
use crate::geometry::{PixelSize, Size};
use crate::reactive::{derived2, writable, Readable, Subscription, Writable};
use crate::tree::{teardown, PassKind, RenderLoop, RenderScheduler, Runtime, StateNode};

pub use crate::tree::{FrameClock, FrameOutcome, ManualClock};

/// Pixel measurements reported by a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    /// Size of one character cell.
    pub cell: PixelSize,
    /// Size of the container the grid fills.
    pub container: PixelSize,
}

impl Default for Measurements {
    fn default() -> Self {
        Self {
            cell: PixelSize::new(8.0, 16.0),
            container: PixelSize::new(0.0, 0.0),
        }
    }
}

/// The host element a tree is mounted into.
pub trait Surface {
    /// Prepare the surface. An error aborts the mount.
    fn attach(&self) -> Result<()> {
        Ok(())
    }

    /// Current cell and container sizes.
    fn measure(&self) -> Measurements {
        Measurements::default()
    }

    /// Install the stylesheet for `palette`. Called at mount and on every
    /// palette change.
    fn apply_palette(&self, palette: &Palette, stylesheet: &str);

    /// Show one finished frame.
    fn present(&self, rows: &[String]);

    /// Remove everything installed since `attach`.
    fn detach(&self) {}
}

/// Host provider of text-entry widgets.
///
/// The widget keeps its text and the store in sync in both directions.
pub trait InputCapture {
    fn attach(&self, store: Writable<String>) -> Box<dyn InputWidget>;
}

/// A text-entry widget created by an [`InputCapture`].
pub trait InputWidget {
    fn focus(&self);
    fn cleanup(&self);
}

/// Options for [`Literal::new`].
#[derive(Default)]
pub struct MountOptions {
    target: Option<Rc<dyn Surface>>,
    dev: bool,
    palette: Option<Palette>,
    clock: Option<Rc<dyn FrameClock>>,
    input: Option<Rc<dyn InputCapture>>,
}

impl MountOptions {
    pub fn new(target: impl Surface + 'static) -> Self {
        Self {
            target: Some(Rc::new(target)),
            ..Self::default()
        }
    }

    /// Options without a target; [`Literal::new`] rejects them.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Log cell, container and grid size changes.
    pub fn dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Frame clock to schedule renders on. Defaults to a [`ManualClock`].
    pub fn clock(mut self, clock: impl FrameClock + 'static) -> Self {
        self.clock = Some(Rc::new(clock));
        self
    }

    pub fn input_capture(mut self, input: impl InputCapture + 'static) -> Self {
        self.input = Some(Rc::new(input));
        self
    }
}

/// A validated, attached surface ready to mount a component.
pub struct Literal {
    surface: Rc<dyn Surface>,
    dev: bool,
    palette: Palette,
    clock: Rc<dyn FrameClock>,
    input: Option<Rc<dyn InputCapture>>,
}

impl Literal {
    /// Validate `options` and attach the surface.
    pub fn new(options: MountOptions) -> Result<Self> {
        let surface = options.target.ok_or(Error::MissingTarget)?;
        let palette = options.palette.unwrap_or_default();
        palette.validate()?;
        surface.attach()?;

        Ok(Self {
            surface,
            dev: options.dev,
            palette,
            clock: options
                .clock
                .unwrap_or_else(|| Rc::new(ManualClock::new())),
            input: options.input,
        })
    }

    /// Mount `component` with `props` and render the first frame.
    pub fn mount<P: 'static>(self, component: &Component<P>, props: P) -> MountHandle {
        let Literal {
            surface,
            dev,
            palette,
            clock,
            input,
        } = self;

        let measurements = surface.measure();
        let cell = writable(measurements.cell);
        let container = writable(measurements.container);
        let grid = derived2(&cell, &container, |cell, container| container.cells_of(*cell));

        let palette = writable(palette);
        let runtime = Runtime::new(RenderScheduler::new(clock), palette.clone(), input);

        let mut subscriptions = Vec::new();
        let request = runtime.requester(PassKind::Full);
        subscriptions.push(grid.subscribe_changes(move |_| request()));

        if dev {
            subscriptions.push(cell.subscribe(|cell| {
                tracing::info!(width = cell.width, height = cell.height, "cell size");
            }));
            subscriptions.push(container.subscribe(|container| {
                tracing::info!(width = container.width, height = container.height, "container size");
            }));
            subscriptions.push(grid.subscribe(|grid: &Size| {
                tracing::info!(columns = grid.width, rows = grid.height, "grid size");
            }));
        }

        let target = Rc::clone(&surface);
        subscriptions.push(palette.subscribe(move |palette: &Palette| {
            target.apply_palette(palette, &palette.stylesheet());
        }));

        let root = {
            let component = component.clone();
            Box::new(move |ctx: &crate::component::Context| component.invoke(ctx, &props))
        };
        let render_loop = RenderLoop::new(
            Rc::clone(&runtime),
            root,
            StateNode::new_ref(component.name()),
            grid.clone(),
        );

        tracing::debug!(component = component.name(), "mounting");
        render_loop.run_pass(PassKind::Full, &*surface);

        MountHandle {
            surface,
            runtime,
            render_loop,
            cell,
            container,
            grid,
            subscriptions: RefCell::new(subscriptions),
            unmounted: false,
        }
    }
}

/// Handle to a mounted tree. Dropping it unmounts.
pub struct MountHandle {
    surface: Rc<dyn Surface>,
    runtime: Rc<Runtime>,
    render_loop: RenderLoop,
    cell: Writable<PixelSize>,
    container: Writable<PixelSize>,
    grid: Readable<Size>,
    subscriptions: RefCell<Vec<Subscription>>,
    unmounted: bool,
}

impl MountHandle {
    /// Run the pending render pass. The host calls this from the frame it
    /// was asked for.
    pub fn tick(&self) -> FrameOutcome {
        self.render_loop.run_frame(&*self.surface)
    }

    /// Whether a pass is waiting for the next frame.
    pub fn is_scheduled(&self) -> bool {
        self.runtime.scheduler().is_scheduled()
    }

    /// Ask for a full pass on the next frame.
    pub fn invalidate(&self) {
        self.runtime.scheduler().request(PassKind::Full);
    }

    /// Report a new container size.
    pub fn resize_container(&self, size: PixelSize) {
        self.container.set(size);
    }

    /// Report a new character cell size.
    pub fn resize_cell(&self, size: PixelSize) {
        self.cell.set(size);
    }

    /// Current grid size in cells.
    pub fn grid_size(&self) -> Size {
        self.grid.get()
    }

    pub fn grid_store(&self) -> Readable<Size> {
        self.grid.clone()
    }

    /// The palette store; setting it re-applies the stylesheet.
    pub fn palette(&self) -> Writable<Palette> {
        self.runtime.palette().clone()
    }

    /// Tear the tree down and release the surface.
    pub fn unmount(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;

        self.runtime.scheduler().shutdown();
        self.subscriptions.borrow_mut().clear();
        self.render_loop.clear();

        let mut hooks = Vec::new();
        teardown(self.render_loop.root_node(), &mut hooks);
        self.runtime.bury(hooks);
        self.runtime.run_graveyard();
        self.runtime.release_all_inputs();

        self.surface.detach();
        tracing::debug!("unmounted");
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountHandle")
            .field("grid", &self.grid.get())
            .field("runtime", &self.runtime)
            .field("unmounted", &self.unmounted)
            .finish()
    }
}

// ============================================================================
// Headless surface
// ============================================================================

/// An in-memory surface that records every presented frame.
///
/// Clones share their state, so a test can keep one clone and mount with
/// another.
#[derive(Debug, Clone, Default)]
pub struct BufferSurface {
    state: Rc<RefCell<BufferState>>,
}

#[derive(Debug, Default)]
struct BufferState {
    measurements: Measurements,
    reject: Option<String>,
    attached: bool,
    stylesheet: String,
    frames: Vec<Vec<String>>,
}

impl BufferSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose container holds exactly `columns` x `rows` default
    /// cells.
    pub fn with_grid(columns: usize, rows: usize) -> Self {
        let surface = Self::default();
        {
            let mut state = surface.state.borrow_mut();
            let cell = state.measurements.cell;
            state.measurements.container =
                PixelSize::new(columns as f64 * cell.width, rows as f64 * cell.height);
        }
        surface
    }

    /// A surface that refuses to attach.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        let surface = Self::default();
        surface.state.borrow_mut().reject = Some(reason.into());
        surface
    }

    pub fn set_measurements(&self, measurements: Measurements) {
        self.state.borrow_mut().measurements = measurements;
    }

    pub fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    /// Stylesheet currently installed.
    pub fn stylesheet(&self) -> String {
        self.state.borrow().stylesheet.clone()
    }

    pub fn frame_count(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn last_frame(&self) -> Option<Vec<String>> {
        self.state.borrow().frames.last().cloned()
    }
}

impl Surface for BufferSurface {
    fn attach(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = &state.reject {
            return Err(Error::InvalidTarget(reason.clone()));
        }
        state.attached = true;
        Ok(())
    }

    fn measure(&self) -> Measurements {
        self.state.borrow().measurements
    }

    fn apply_palette(&self, _palette: &Palette, stylesheet: &str) {
        self.state.borrow_mut().stylesheet = stylesheet.to_string();
    }

    fn present(&self, rows: &[String]) {
        self.state.borrow_mut().frames.push(rows.to_vec());
    }

    fn detach(&self) {
        let mut state = self.state.borrow_mut();
        state.attached = false;
        state.stylesheet.clear();
    }
}
