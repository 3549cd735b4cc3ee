//! Compositing
//!
//! Turns a live output tree into the rows handed to the host:
//!
//! - [`grid`]: stamps child blocks into parent blocks.
//! - [`color`]: consolidates color spans and inserts markup markers.
//! - [`palette`]: named colors and the stylesheet derived from them.

pub(crate) mod color;
pub(crate) mod grid;
mod palette;

pub use color::{bg_class, colorize, fg_class, ColorSpan, ColorStyle, SpanEnd};
pub use grid::{collect_colors, compose, splice, stamp};
pub use palette::{Palette, DEFAULT_BG, DEFAULT_FG};
