//! Color Interval Engine
//!
//! Components emit color spans: a row, a start column, an inclusive end
//! column (or a length) and optional foreground/background color names.
//! Spans are translated into global coordinates by the emitting component's
//! context, collected from the whole tree, and finally turned into inline
//! markup around the composited rows.
//!
//! # Algorithm
//!
//! 1. Sort spans by row, then start column. Ties are broken by end column
//!    and colors, so the result depends only on span contents.
//! 2. Sweep once: a span merges into the previous one when row and colors
//!    match and it starts exactly one column after the previous span ends.
//!    Overlap does not merge, neither does a gap.
//! 3. For each surviving span, insert an opening marker before its first
//!    column and a closing marker after its last column.
//!
//! Columns are Unicode scalar values, so multi-byte glyphs such as box
//! drawing or block characters each count as one column and markers never
//! land inside a glyph.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::Point;

const FG_PREFIX: &str = "literal-fg-";
const BG_PREFIX: &str = "literal-bg-";
const CLOSE_MARKER: &str = "</span>";

/// Class token for a foreground color name.
pub fn fg_class(name: &str) -> String {
    format!("{FG_PREFIX}{name}")
}

/// Class token for a background color name.
pub fn bg_class(name: &str) -> String {
    format!("{BG_PREFIX}{name}")
}

/// Where a span stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanEnd {
    /// Inclusive last column.
    End(i32),
    /// Number of columns covered, starting at `start`.
    Length(u32),
}

/// Foreground and background color names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorStyle {
    pub fg: Option<String>,
    pub bg: Option<String>,
}

impl ColorStyle {
    pub fn fg(name: impl Into<String>) -> Self {
        Self {
            fg: Some(name.into()),
            bg: None,
        }
    }

    pub fn bg(name: impl Into<String>) -> Self {
        Self {
            fg: None,
            bg: Some(name.into()),
        }
    }

    pub fn with_bg(mut self, name: impl Into<String>) -> Self {
        self.bg = Some(name.into());
        self
    }

    pub fn with_fg(mut self, name: impl Into<String>) -> Self {
        self.fg = Some(name.into());
        self
    }

    fn is_plain(&self) -> bool {
        self.fg.is_none() && self.bg.is_none()
    }

    fn open_marker(&self) -> String {
        let classes: SmallVec<[String; 2]> = self
            .fg
            .iter()
            .map(|name| fg_class(name))
            .chain(self.bg.iter().map(|name| bg_class(name)))
            .collect();
        format!("<span class=\"{}\">", classes.join(" "))
    }
}

/// A colored region of one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSpan {
    pub row: i32,
    pub start: i32,
    pub end: SpanEnd,
    #[serde(flatten)]
    pub style: ColorStyle,
}

impl ColorSpan {
    /// A span covering `length` columns from `start`.
    pub fn new(row: i32, start: i32, length: u32) -> Self {
        Self {
            row,
            start,
            end: SpanEnd::Length(length),
            style: ColorStyle::default(),
        }
    }

    /// A span covering `start..=end`.
    pub fn between(row: i32, start: i32, end: i32) -> Self {
        Self {
            row,
            start,
            end: SpanEnd::End(end),
            style: ColorStyle::default(),
        }
    }

    pub fn fg(mut self, name: impl Into<String>) -> Self {
        self.style.fg = Some(name.into());
        self
    }

    pub fn bg(mut self, name: impl Into<String>) -> Self {
        self.style.bg = Some(name.into());
        self
    }

    pub fn styled(mut self, style: ColorStyle) -> Self {
        self.style = style;
        self
    }

    /// Inclusive last column. A zero length ends before it starts.
    pub fn last_column(&self) -> i32 {
        match self.end {
            SpanEnd::End(end) => end,
            SpanEnd::Length(length) => {
                self.start
                    .saturating_add(i32::try_from(length).unwrap_or(i32::MAX))
                    .saturating_sub(1)
            }
        }
    }

    /// The same span moved by `offset`. Lengths are unaffected.
    pub fn translated(&self, offset: Point) -> ColorSpan {
        ColorSpan {
            row: self.row + offset.y,
            start: self.start + offset.x,
            end: match self.end {
                SpanEnd::End(end) => SpanEnd::End(end + offset.x),
                SpanEnd::Length(length) => SpanEnd::Length(length),
            },
            style: self.style.clone(),
        }
    }
}

/// A consolidated span in normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Run<'a> {
    pub row: i32,
    pub start: i32,
    pub end: i32,
    pub style: &'a ColorStyle,
}

/// Sort and merge spans. Spans without any color or without any columns
/// are dropped.
pub(crate) fn consolidate(spans: &[ColorSpan]) -> Vec<Run<'_>> {
    let mut sorted: Vec<Run<'_>> = spans
        .iter()
        .filter(|span| !span.style.is_plain() && span.last_column() >= span.start)
        .map(|span| Run {
            row: span.row,
            start: span.start,
            end: span.last_column(),
            style: &span.style,
        })
        .collect();

    sorted.sort_by(|a, b| {
        (a.row, a.start, a.end, &a.style.fg, &a.style.bg)
            .cmp(&(b.row, b.start, b.end, &b.style.fg, &b.style.bg))
    });

    let mut runs: Vec<Run<'_>> = Vec::with_capacity(sorted.len());
    for run in sorted {
        match runs.last_mut() {
            Some(current)
                if current.row == run.row
                    && current.style == run.style
                    && current.end.checked_add(1) == Some(run.start) =>
            {
                current.end = run.end;
            }
            _ => runs.push(run),
        }
    }
    runs
}

/// Insert color markup into composited rows.
///
/// Rows without spans pass through unchanged; an empty span list returns the
/// input as-is.
///
/// Overlapping spans of different styles are not split. Each span opens its
/// own marker at its first column and contributes one bare `</span>` after
/// its last, so when the outer span ends first the closing markers pair up
/// with the innermost open span. Hosts that need exact nesting should keep
/// spans of different styles disjoint.
pub fn colorize(rows: &[String], spans: &[ColorSpan]) -> Vec<String> {
    if spans.is_empty() {
        return rows.to_vec();
    }

    let mut per_row: Vec<SmallVec<[Run<'_>; 4]>> = vec![SmallVec::new(); rows.len()];
    for run in consolidate(spans) {
        if let Some(slot) = usize::try_from(run.row).ok().and_then(|y| per_row.get_mut(y)) {
            slot.push(run);
        }
    }

    rows.iter()
        .zip(per_row)
        .map(|(row, runs)| {
            if runs.is_empty() {
                row.clone()
            } else {
                mark_row(row, &runs)
            }
        })
        .collect()
}

fn mark_row(row: &str, runs: &[Run<'_>]) -> String {
    let cells: Vec<char> = row.chars().collect();
    let Some(last) = cells.len().checked_sub(1) else {
        return row.to_string();
    };

    let mut opens: Vec<SmallVec<[String; 1]>> = vec![SmallVec::new(); cells.len()];
    let mut closes = vec![0usize; cells.len()];

    for run in runs {
        let start = run.start.max(0);
        let end = run.end;
        if end < start {
            continue;
        }
        let start = start as usize;
        if start > last {
            continue;
        }
        let end = (end as usize).min(last);
        opens[start].push(run.style.open_marker());
        closes[end] += 1;
    }

    let mut out = String::with_capacity(row.len() + runs.len() * 48);
    for (index, cell) in cells.iter().enumerate() {
        for marker in &opens[index] {
            out.push_str(marker);
        }
        out.push(*cell);
        for _ in 0..closes[index] {
            out.push_str(CLOSE_MARKER);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn contiguous_spans_merge() {
        let spans = vec![
            ColorSpan::between(0, 3, 5).fg("red"),
            ColorSpan::between(0, 0, 2).fg("red"),
        ];
        let runs = consolidate(&spans);
        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].start, runs[0].end), (0, 5));
    }

    #[test]
    fn empty_spans_do_not_split_a_merge() {
        let spans = vec![
            ColorSpan::between(0, 0, 2).fg("red"),
            ColorSpan::new(0, 3, 0).fg("blue"),
            ColorSpan::between(0, 4, 1).fg("blue"),
            ColorSpan::between(0, 3, 5).fg("red"),
        ];
        let runs = consolidate(&spans);
        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].start, runs[0].end), (0, 5));

        assert_eq!(
            colorize(&rows(&["abcdef"]), &spans),
            rows(&[r#"<span class="literal-fg-red">abcdef</span>"#])
        );
    }

    #[test]
    fn gap_keeps_spans_apart() {
        let spans = vec![
            ColorSpan::between(0, 0, 2).fg("red"),
            ColorSpan::between(0, 4, 5).fg("red"),
        ];
        let runs = consolidate(&spans);
        assert_eq!(runs.len(), 2);
    }

    #[test]
    fn different_colors_or_rows_do_not_merge() {
        let spans = vec![
            ColorSpan::between(0, 0, 2).fg("red"),
            ColorSpan::between(0, 3, 5).fg("blue"),
            ColorSpan::between(1, 6, 7).fg("blue"),
            ColorSpan::between(0, 6, 7).fg("blue").bg("black"),
        ];
        assert_eq!(consolidate(&spans).len(), 4);
    }

    #[test]
    fn length_spans_merge_like_end_spans() {
        let spans = vec![
            ColorSpan::new(2, 0, 1).fg("gray"),
            ColorSpan::new(2, 1, 1).fg("gray"),
            ColorSpan::new(2, 2, 3).fg("gray"),
        ];
        let runs = consolidate(&spans);
        assert_eq!(runs.len(), 1);
        assert_eq!((runs[0].start, runs[0].end), (0, 4));
    }

    #[test]
    fn consolidation_is_order_independent() {
        let a = vec![
            ColorSpan::new(0, 4, 2).fg("red"),
            ColorSpan::new(1, 0, 1).bg("blue"),
            ColorSpan::new(0, 0, 4).fg("red"),
            ColorSpan::new(0, 0, 4).fg("green"),
        ];
        let mut b = a.clone();
        b.reverse();
        let input = rows(&["abcdefgh", "abcdefgh"]);
        assert_eq!(colorize(&input, &a), colorize(&input, &b));
    }

    #[test]
    fn markers_wrap_span_columns() {
        let out = colorize(&rows(&["abcdef"]), &[ColorSpan::between(0, 1, 3).fg("red")]);
        assert_eq!(out, vec!["a<span class=\"literal-fg-red\">bcd</span>ef"]);
    }

    #[test]
    fn fg_and_bg_share_one_marker() {
        let out = colorize(&rows(&["ab"]), &[ColorSpan::new(0, 0, 1).fg("red").bg("black")]);
        assert_eq!(
            out,
            vec!["<span class=\"literal-fg-red literal-bg-black\">a</span>b"]
        );
    }

    #[test]
    fn rows_without_spans_are_unchanged() {
        let input = rows(&["one", "two"]);
        let out = colorize(&input, &[ColorSpan::new(1, 0, 1).fg("red")]);
        assert_eq!(out[0], "one");
        assert_ne!(out[1], "two");
    }

    #[test]
    fn empty_span_list_is_identity() {
        let first = colorize(&rows(&["abc"]), &[ColorSpan::new(0, 0, 2).fg("red")]);
        assert_eq!(colorize(&first, &[]), first);
    }

    #[test]
    fn out_of_range_spans_are_clipped_or_dropped() {
        let input = rows(&["abc"]);
        let spans = vec![
            ColorSpan::between(0, -2, 0).fg("red"),
            ColorSpan::between(0, 2, 10).fg("blue"),
            ColorSpan::new(0, 1, 0).fg("green"),
            ColorSpan::new(5, 0, 1).fg("red"),
            ColorSpan::new(-1, 0, 1).fg("red"),
            ColorSpan::new(0, 7, 1).fg("red"),
        ];
        let out = colorize(&input, &spans);
        assert_eq!(
            out,
            vec![
                "<span class=\"literal-fg-red\">a</span>b<span class=\"literal-fg-blue\">c</span>"
            ]
        );
    }

    #[test]
    fn wide_glyph_rows_mark_whole_glyphs() {
        let out = colorize(&rows(&["┏━━┓"]), &[ColorSpan::new(0, 1, 2).fg("gray")]);
        assert_eq!(out, vec!["┏<span class=\"literal-fg-gray\">━━</span>┓"]);
    }

    #[test]
    fn uncolored_spans_are_ignored() {
        let input = rows(&["abc"]);
        assert_eq!(colorize(&input, &[ColorSpan::new(0, 0, 3)]), input);
    }

    #[test]
    fn translation_moves_row_start_and_end() {
        let span = ColorSpan::between(1, 2, 4).fg("red");
        let moved = span.translated(Point::new(10, 5));
        assert_eq!(moved, ColorSpan::between(6, 12, 14).fg("red"));
        assert_eq!(span, ColorSpan::between(1, 2, 4).fg("red"));

        let by_length = ColorSpan::new(0, 1, 3).translated(Point::new(2, 0));
        assert_eq!(by_length.end, SpanEnd::Length(3));
        assert_eq!(by_length.last_column(), 5);
    }
}
