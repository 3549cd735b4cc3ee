//! Grid Compositor
//!
//! Flattens an output tree into one block of rows by stamping every child's
//! block into its parent's block, depth first, in declaration order. Later
//! children overwrite earlier ones where they overlap.
//!
//! Columns are counted in `char`s. Child rows that land above or below the
//! parent block are dropped. A child reaching past the right edge of a
//! parent row extends that row; parents size their rows to the width they
//! want. Child columns left of column 0 are dropped.

use crate::component::Output;
use crate::compositor::ColorSpan;
use crate::geometry::Point;

/// Replace the columns of `parent` starting at `x` with `child`.
pub fn splice(parent: &str, child: &str, x: i32) -> String {
    let (x, child): (usize, Vec<char>) = if x < 0 {
        (0, child.chars().skip(x.unsigned_abs() as usize).collect())
    } else {
        (x as usize, child.chars().collect())
    };

    let mut row: String = parent.chars().take(x).collect();
    row.extend(child.iter());
    row.extend(parent.chars().skip(x + child.len()));
    row
}

/// Stamp `block` into `rows` with its top-left corner at `at`.
pub fn stamp(rows: &mut [String], block: &[String], at: Point) {
    for (index, line) in block.iter().enumerate() {
        let Some(target) = at
            .y
            .checked_add(index as i32)
            .and_then(|y| usize::try_from(y).ok())
        else {
            continue;
        };
        if let Some(row) = rows.get_mut(target) {
            *row = splice(row, line, at.x);
        }
    }
}

/// Composite an output tree into its final rows.
pub fn compose(output: &Output) -> Vec<String> {
    let mut rows = output.rows();
    for placement in output.children() {
        let block = compose(placement.output());
        stamp(&mut rows, &block, placement.position());
    }
    rows
}

/// Every color span of an output tree, parents before children.
pub fn collect_colors(output: &Output) -> Vec<ColorSpan> {
    let mut spans = output.colors();
    for placement in output.children() {
        spans.extend(collect_colors(placement.output()));
    }
    spans
}
