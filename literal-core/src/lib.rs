//! Literal Core
//!
//! A reactive, component-based compositor for character grids.
//!
//! Components render rectangular blocks of text with color spans and nested
//! children. The engine keeps each component instance's state across
//! renders, composites every block into one grid, turns color spans into
//! markup markers and hands the rows to a host surface, re-rendering at
//! most once per host frame however many stores changed.
//!
//! # Architecture
//!
//! - `reactive`: readable, writable and derived stores
//! - `tree`: persistent state nodes and the render scheduler
//! - `component`: component handles, the render context, rendered output
//! - `compositor`: grid stamping, color spans, palette
//! - `mount`: mounting onto a host surface
//!
//! # Example
//!
//! ```rust
//! use literal_core::{
//!     writable, BufferSurface, ChildSpec, ColorSpan, Component, Literal, ManualClock,
//!     MountOptions, Point, Rendered,
//! };
//!
//! let status = writable(vec!["ok".to_string()]);
//! let label = Component::new("label", |ctx, text: &literal_core::Writable<Vec<String>>| {
//!     Rendered::text(text.clone())
//!         .with_colors(vec![ctx.colorize(&ColorSpan::new(0, 0, 2).fg("green"))])
//! });
//! let root = Component::new("root", move |ctx, _: &()| {
//!     let child = ctx.child(ChildSpec::new(&label, status.clone()).at(Point::new(1, 0)));
//!     Rendered::text(vec!["[    ]".to_string()]).with_children(vec![child])
//! });
//!
//! let surface = BufferSurface::with_grid(6, 1);
//! let clock = ManualClock::new();
//! let handle = Literal::new(MountOptions::new(surface.clone()).clock(clock.clone()))?
//!     .mount(&root, ());
//! assert_eq!(
//!     surface.last_frame(),
//!     Some(vec![r#"[<span class="literal-fg-green">ok</span>  ]"#.to_string()])
//! );
//! # Ok::<(), literal_core::Error>(())
//! ```

pub mod compositor;
pub mod component;
pub mod error;
pub mod geometry;
pub mod mount;
pub mod reactive;
pub mod tree;
pub mod util;

pub use component::{
    ChildSpec, ColorTranslator, Component, ComponentId, Context, DestroyHook, InputHandle, Output,
    Placement, Rendered,
};
pub use compositor::{colorize, ColorSpan, ColorStyle, Palette, SpanEnd};
pub use error::{Error, Result};
pub use geometry::{Extent, PixelSize, Point, Size};
pub use mount::{
    BufferSurface, FrameClock, FrameOutcome, InputCapture, InputWidget, Literal, Measurements,
    ManualClock, MountHandle, MountOptions, Surface,
};
pub use reactive::{
    derived, derived2, derived_all, readable, subscribe_all, writable, PropValue, Readable,
    Setter, Subscription, Writable,
};
pub use tree::PassKind;
