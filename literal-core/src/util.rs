//! Small helpers for building text blocks.

/// Build `count` items from their index.
///
/// ```
/// use literal_core::util::rows_with;
///
/// let rows = rows_with(2, |y| format!("row {y}"));
/// assert_eq!(rows, vec!["row 0", "row 1"]);
/// ```
pub fn rows_with<T, F>(count: usize, f: F) -> Vec<T>
where
    F: FnMut(usize) -> T,
{
    (0..count).map(f).collect()
}

/// Number of columns in a row. Columns are Unicode scalar values.
pub fn columns(row: &str) -> usize {
    row.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_with_passes_indices() {
        assert_eq!(rows_with(3, |i| i * 2), vec![0, 2, 4]);
        assert!(rows_with(0, |i| i).is_empty());
    }

    #[test]
    fn box_drawing_glyphs_are_one_column() {
        assert_eq!(columns("┏━━┓"), 4);
        assert_eq!("┏━━┓".len(), 12);
    }
}
