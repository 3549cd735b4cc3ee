//! Rendered output of a component.
//!
//! [`Rendered`] is what a component returns: text rows, color spans, child
//! placements and an optional destroy hook. Text, colors and children may
//! each be plain or reactive. Once the context has taken the destroy hook
//! the rest is frozen into an [`Output`], which the compositor reads on every
//! pass.

use std::fmt;
use std::rc::Rc;

use crate::compositor::color::ColorSpan;
use crate::geometry::Point;
use crate::reactive::PropValue;

/// Hook run once when a component instance leaves the tree.
pub type DestroyHook = Box<dyn FnOnce()>;

/// What a component returns from a render.
#[derive(Default)]
pub struct Rendered {
    /// Rows of equal length.
    pub text: PropValue<Vec<String>>,
    /// Spans already translated with [`Context::colorize`](super::Context::colorize).
    pub colors: PropValue<Vec<ColorSpan>>,
    /// Children in declaration order; later children stamp over earlier ones.
    pub children: PropValue<Vec<Placement>>,
    pub on_destroy: Option<DestroyHook>,
}

impl Rendered {
    /// Output consisting of text rows only.
    pub fn text(rows: impl Into<PropValue<Vec<String>>>) -> Self {
        Self {
            text: rows.into(),
            ..Self::default()
        }
    }

    pub fn with_colors(mut self, colors: impl Into<PropValue<Vec<ColorSpan>>>) -> Self {
        self.colors = colors.into();
        self
    }

    pub fn with_children(mut self, children: impl Into<PropValue<Vec<Placement>>>) -> Self {
        self.children = children.into();
        self
    }

    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_destroy = Some(Box::new(hook));
        self
    }

    pub(crate) fn into_output(self, emitted: Vec<ColorSpan>) -> (Output, Option<DestroyHook>) {
        let output = Output {
            text: self.text,
            colors: self.colors,
            emitted,
            children: self.children,
        };
        (output, self.on_destroy)
    }
}

impl fmt::Debug for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendered")
            .field("text", &self.text)
            .field("colors", &self.colors)
            .field("children", &self.children.get().len())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}

/// Frozen output of one component instance.
pub struct Output {
    text: PropValue<Vec<String>>,
    colors: PropValue<Vec<ColorSpan>>,
    /// Spans emitted through `Context::set_color` during the render.
    emitted: Vec<ColorSpan>,
    children: PropValue<Vec<Placement>>,
}

impl Output {
    /// A static block with no colors or children.
    pub fn from_rows(rows: Vec<String>) -> Self {
        Self {
            text: PropValue::Static(rows),
            colors: PropValue::default(),
            emitted: Vec::new(),
            children: PropValue::default(),
        }
    }

    /// Current text rows.
    pub fn rows(&self) -> Vec<String> {
        self.text.get()
    }

    /// Current spans of this instance only, returned then emitted.
    pub fn colors(&self) -> Vec<ColorSpan> {
        let mut spans = self.colors.get();
        spans.extend(self.emitted.iter().cloned());
        spans
    }

    /// Current child placements.
    pub fn children(&self) -> Vec<Placement> {
        self.children.get()
    }

    pub(crate) fn text_value(&self) -> &PropValue<Vec<String>> {
        &self.text
    }

    pub(crate) fn colors_value(&self) -> &PropValue<Vec<ColorSpan>> {
        &self.colors
    }

    pub(crate) fn children_value(&self) -> &PropValue<Vec<Placement>> {
        &self.children
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("rows", &self.rows())
            .field("colors", &self.colors().len())
            .field("children", &self.children().len())
            .finish()
    }
}

/// A child's output placed at a position relative to its parent's block.
#[derive(Clone)]
pub struct Placement {
    position: PropValue<Point>,
    output: Rc<Output>,
}

impl Placement {
    pub fn new(position: impl Into<PropValue<Point>>, output: Rc<Output>) -> Self {
        Self {
            position: position.into(),
            output,
        }
    }

    /// Current position relative to the parent.
    pub fn position(&self) -> Point {
        self.position.get()
    }

    pub fn output(&self) -> &Output {
        &self.output
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Placement")
            .field("position", &self.position())
            .field("output", &self.output)
            .finish()
    }
}
