//! Grade coercion and row filtering.

use crate::dataset::{CellValue, Dataset};
use tracing::debug;

/// Coerces the grade column to numbers, dropping every row whose grade does
/// not parse. Returns the number of rows dropped.
///
/// Unparseable grades never count toward any class's statistics. The drop is
/// silent per row; the total is surfaced as a diagnostic so the caller can
/// report it.
pub fn normalize_grades(dataset: &mut Dataset, grade_col: usize) -> usize {
    let before = dataset.rows.len();

    dataset.rows.retain_mut(|row| {
        match row.get(grade_col).and_then(|cell| cell.as_number()) {
            Some(n) => {
                row[grade_col] = CellValue::Number(n);
                true
            }
            None => false,
        }
    });

    let dropped = before - dataset.rows.len();
    if dropped > 0 {
        debug!(dropped, "Dropped rows with non-numeric grades");
    }
    dropped
}
