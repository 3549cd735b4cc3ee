//! Grid geometry.
//!
//! Sizes are measured in character cells. Positions are signed so a child can
//! be placed partially outside its parent; the compositor clips it.

use serde::{Deserialize, Serialize};

/// Size of a block in character cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub const ZERO: Size = Size { width: 0, height: 0 };

    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// A grid with no cells in either direction cannot be rendered.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<Extent> for Size {
    /// Negative dimensions clamp to zero.
    fn from(extent: Extent) -> Self {
        Self {
            width: extent.width.max(0) as usize,
            height: extent.height.max(0) as usize,
        }
    }
}

/// A requested size that may come out negative, e.g. `parent.width - 2` on a
/// parent narrower than two cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Extent {
    pub width: i32,
    pub height: i32,
}

impl Extent {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl From<Size> for Extent {
    fn from(size: Size) -> Self {
        Self {
            width: i32::try_from(size.width).unwrap_or(i32::MAX),
            height: i32::try_from(size.height).unwrap_or(i32::MAX),
        }
    }
}

/// A cell position, relative to a parent or absolute on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// A size in host pixels, used by the sizing protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// How many whole cells of `cell` fit into this box.
    ///
    /// A non-positive cell dimension yields zero cells along that axis.
    pub fn cells_of(&self, cell: PixelSize) -> Size {
        fn fit(total: f64, unit: f64) -> usize {
            if unit <= 0.0 || total <= 0.0 || !total.is_finite() {
                return 0;
            }
            (total / unit).floor() as usize
        }
        Size {
            width: fit(self.width, cell.width),
            height: fit(self.height, cell.height),
        }
    }
}
