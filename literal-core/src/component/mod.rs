//! Components
//!
//! A [`Component`] is a render function behind a stable identity. Rendering
//! it with a [`Context`] yields a [`Rendered`] value: text rows, color spans,
//! child placements and an optional destroy hook.

mod component;
mod context;
mod output;

pub use component::{Component, ComponentId};
pub use context::{ChildSpec, ColorTranslator, Context, InputHandle};
pub use output::{DestroyHook, Output, Placement, Rendered};

pub(crate) use context::render_node;
