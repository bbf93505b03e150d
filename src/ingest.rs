//! Source file parsing.
//!
//! Dispatches on the filename extension: comma- or tab-delimited text goes
//! through the csv crate, spreadsheets through calamine. The first row of
//! every source is the header; headerless files are not supported.

use crate::dataset::{CellValue, RecordSet};
use crate::error::ParseError;
use anyhow::{Result, anyhow};
use calamine::{Data, Reader, Xls, Xlsx};
use std::io::Cursor;
use tracing::debug;

/// Parses one uploaded file into a [`RecordSet`].
///
/// Any failure, including an unrecognized extension, becomes a
/// [`ParseError`] naming the file; the batch continues without it.
pub fn ingest(filename: &str, bytes: &[u8]) -> std::result::Result<RecordSet, ParseError> {
    let lowered = filename.to_lowercase();

    let result = if lowered.ends_with(".csv") {
        read_delimited(bytes, b',')
    } else if lowered.ends_with(".txt") || lowered.ends_with(".tsv") {
        read_delimited(bytes, b'\t')
    } else if lowered.ends_with(".xlsx") {
        read_spreadsheet::<Xlsx<_>>(bytes)
    } else if lowered.ends_with(".xls") {
        read_spreadsheet::<Xls<_>>(bytes)
    } else {
        Err(anyhow!("unsupported file extension"))
    };

    match result {
        Ok(set) => {
            debug!(
                file = %filename,
                columns = set.columns.len(),
                rows = set.rows.len(),
                "File ingested"
            );
            Ok(set)
        }
        Err(e) => Err(ParseError {
            filename: filename.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<RecordSet> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if columns.is_empty() {
        return Err(anyhow!("file has no header row"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RecordSet { columns, rows })
}

/// Reads the first worksheet of an Excel workbook.
fn read_spreadsheet<R>(bytes: &[u8]) -> Result<RecordSet>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::error::Error + Send + Sync + 'static,
{
    let mut workbook = R::new(Cursor::new(bytes.to_vec()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no sheets"))??;

    let mut sheet_rows = range.rows();
    let header = sheet_rows
        .next()
        .ok_or_else(|| anyhow!("sheet has no header row"))?;
    let columns: Vec<String> = header.iter().map(header_name).collect();

    let rows = sheet_rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Ok(RecordSet { columns, rows })
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_csv() {
        let bytes = b"class,student,grade\nA,Ivanov,5\nA,Petrov,4\n";
        let set = ingest("marks.csv", bytes).unwrap();

        assert_eq!(set.columns, vec!["class", "student", "grade"]);
        assert_eq!(set.rows.len(), 2);
        assert_eq!(set.rows[0][2], CellValue::Text("5".into()));
    }

    #[test]
    fn test_ingest_tsv_and_txt_are_tab_delimited() {
        let bytes = b"class\tgrade\nB\t3\n";
        for name in ["marks.tsv", "marks.txt", "MARKS.TSV"] {
            let set = ingest(name, bytes).unwrap();
            assert_eq!(set.columns, vec!["class", "grade"]);
            assert_eq!(set.rows.len(), 1);
        }
    }

    #[test]
    fn test_ingest_empty_cell_is_empty_not_text() {
        let bytes = b"class,grade\nA,\n";
        let set = ingest("marks.csv", bytes).unwrap();
        assert_eq!(set.rows[0][1], CellValue::Empty);
    }

    #[test]
    fn test_ingest_unsupported_extension() {
        let err = ingest("marks.pdf", b"whatever").unwrap_err();
        assert_eq!(err.filename, "marks.pdf");
        assert!(err.reason.contains("unsupported"));
    }

    #[test]
    fn test_ingest_ragged_csv_fails() {
        let bytes = b"class,student,grade\nA,Ivanov\n";
        let err = ingest("marks.csv", bytes).unwrap_err();
        assert_eq!(err.filename, "marks.csv");
    }

    #[test]
    fn test_ingest_empty_file_fails() {
        let err = ingest("marks.csv", b"").unwrap_err();
        assert!(err.reason.contains("no header"));
    }

    #[test]
    fn test_ingest_corrupt_spreadsheet_fails() {
        let err = ingest("marks.xlsx", b"not a zip archive").unwrap_err();
        assert_eq!(err.filename, "marks.xlsx");
    }
}
