//! Tabular record sets and the merged dataset.
//!
//! Every source file parses into a [`RecordSet`]; all surviving sets are
//! concatenated into one [`Dataset`] whose columns are the union of the
//! source schemas.

use crate::error::AnalysisError;
use std::collections::HashMap;

/// A single untyped cell.
///
/// `Empty` is a present-but-empty cell in the source file. `Absent` marks a
/// column the row's source file never had; it is introduced by [`merge`] and
/// is distinguishable from `Empty`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
    Absent,
}

impl CellValue {
    /// Numeric view of the cell. Text is trimmed and parsed; non-finite
    /// values, `Empty` and `Absent` have no numeric form.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Display form, used for class names in the report.
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Empty | CellValue::Absent => String::new(),
        }
    }

    /// Identity key with exact-equality semantics: text never collides with
    /// numbers, `Empty`/`Absent` cells carry no identity.
    pub(crate) fn value_key(&self) -> Option<ValueKey> {
        match self {
            CellValue::Text(s) => Some(ValueKey::Text(s.clone())),
            CellValue::Number(n) if !n.is_nan() => Some(ValueKey::Number(n.to_bits())),
            _ => None,
        }
    }
}

/// Hashable identity of a cell, for grouping and distinct counting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Text(String),
    Number(u64),
}

/// One parsed source file: header columns plus rows of untyped cells.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// All surviving record sets concatenated, in arrival order.
///
/// Columns are the union of the source schemas in first-seen order; cells
/// for columns a source never had are `Absent`. Grade normalization mutates
/// the rows in place; the dataset is read-only after that.
#[derive(Debug)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Concatenates record sets into one dataset.
///
/// Rows keep file arrival order, then within-file order. Fails with
/// [`AnalysisError::EmptyInput`] when no record set survived ingestion.
pub fn merge(sets: Vec<RecordSet>) -> Result<Dataset, AnalysisError> {
    if sets.is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let mut columns: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for set in &sets {
        for col in &set.columns {
            if !index.contains_key(col) {
                index.insert(col.clone(), columns.len());
                columns.push(col.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for set in sets {
        for row in set.rows {
            let mut merged = vec![CellValue::Absent; columns.len()];
            for (i, cell) in row.into_iter().enumerate() {
                if let Some(col) = set.columns.get(i) {
                    if let Some(&j) = index.get(col) {
                        merged[j] = cell;
                    }
                }
            }
            rows.push(merged);
        }
    }

    Ok(Dataset { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(columns: &[&str], rows: Vec<Vec<CellValue>>) -> RecordSet {
        RecordSet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_merge_empty_input_fails() {
        let result = merge(vec![]);
        assert_eq!(result.unwrap_err(), AnalysisError::EmptyInput);
    }

    #[test]
    fn test_merge_disjoint_columns_keeps_all_rows() {
        let a = set(&["class"], vec![vec![CellValue::Text("A".into())]]);
        let b = set(&["grade"], vec![vec![CellValue::Number(4.0)]]);

        let merged = merge(vec![a, b]).unwrap();

        assert_eq!(merged.columns, vec!["class", "grade"]);
        assert_eq!(merged.rows.len(), 2);
        // First row never had a grade column, second never had a class column
        assert_eq!(merged.rows[0][1], CellValue::Absent);
        assert_eq!(merged.rows[1][0], CellValue::Absent);
    }

    #[test]
    fn test_merge_preserves_arrival_order() {
        let a = set(
            &["class"],
            vec![
                vec![CellValue::Text("first".into())],
                vec![CellValue::Text("second".into())],
            ],
        );
        let b = set(&["class"], vec![vec![CellValue::Text("third".into())]]);

        let merged = merge(vec![a, b]).unwrap();

        let names: Vec<String> = merged.rows.iter().map(|r| r[0].display()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_absent_is_distinct_from_empty() {
        assert_ne!(CellValue::Absent, CellValue::Empty);
    }

    #[test]
    fn test_as_number_parses_trimmed_text() {
        assert_eq!(CellValue::Text(" 4.5 ".into()).as_number(), Some(4.5));
        assert_eq!(CellValue::Text("N/A".into()).as_number(), None);
        assert_eq!(CellValue::Text("NaN".into()).as_number(), None);
        assert_eq!(CellValue::Number(3.0).as_number(), Some(3.0));
        assert_eq!(CellValue::Empty.as_number(), None);
        assert_eq!(CellValue::Absent.as_number(), None);
    }

    #[test]
    fn test_value_key_separates_text_from_number() {
        let text = CellValue::Text("5".into()).value_key();
        let number = CellValue::Number(5.0).value_key();
        assert_ne!(text, number);
        assert_eq!(CellValue::Absent.value_key(), None);
        assert_eq!(CellValue::Empty.value_key(), None);
    }
}
