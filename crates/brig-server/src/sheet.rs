//! Spreadsheet uploads to import rows.
//!
//! The first non-empty row is the header. Header cells are trimmed and
//! lower-cased; every later non-empty row becomes one [`SheetRow`].

use std::io::Cursor;

use brig_db::import::SheetRow;
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("unreadable spreadsheet: {0}")]
    Unreadable(#[from] calamine::Error),

    #[error("spreadsheet has no worksheets")]
    NoWorksheet,

    #[error("spreadsheet has no header row")]
    NoHeader,
}

/// Parse the first worksheet of an uploaded workbook (xlsx, xls, ods).
///
/// # Errors
///
/// Returns `SheetError` if the bytes are not a workbook or the first sheet
/// is empty.
pub fn parse_workbook(bytes: Vec<u8>) -> Result<Vec<SheetRow>, SheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)??;
    rows_from_range(&range)
}

/// Turn a cell range into header-keyed rows.
///
/// # Errors
///
/// Returns `SheetError::NoHeader` if every row is empty.
pub fn rows_from_range(range: &Range<Data>) -> Result<Vec<SheetRow>, SheetError> {
    let mut rows = range.rows().filter(|row| !row.iter().all(is_blank));
    let header: Vec<String> = rows
        .next()
        .ok_or(SheetError::NoHeader)?
        .iter()
        .map(|cell| cell.to_string().trim().to_lowercase())
        .collect();

    Ok(rows
        .map(|row| {
            header
                .iter()
                .zip(row)
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, cell)| (name.clone(), cell_value(cell)))
                .collect()
        })
        .collect())
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => Value::from(*f),
        Data::Bool(b) => Value::from(*b),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Value::from(s.clone()),
        Data::DateTime(dt) => Value::from(dt.as_f64()),
        Data::Empty | Data::Error(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn range(cells: &[&[Data]]) -> Range<Data> {
        let height = u32::try_from(cells.len()).unwrap();
        let width = u32::try_from(cells[0].len()).unwrap();
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value(
                    (u32::try_from(r).unwrap(), u32::try_from(c).unwrap()),
                    cell.clone(),
                );
            }
        }
        range
    }

    #[test]
    fn header_is_normalized_and_rows_keyed_by_it() {
        let sheet = range(&[
            &[Data::String(" Name ".into()), Data::String("QUANTITY".into())],
            &[Data::String("Cement".into()), Data::Float(10.0)],
            &[Data::Empty, Data::Empty],
            &[Data::String("Sand".into()), Data::Int(4)],
        ]);
        let rows = rows_from_range(&sheet).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(Value::Object(rows[0].clone()), json!({"name": "Cement", "quantity": 10.0}));
        assert_eq!(rows[1]["quantity"], json!(4));
    }

    #[test]
    fn empty_sheet_has_no_header() {
        let sheet = range(&[&[Data::Empty]]);
        assert!(matches!(rows_from_range(&sheet), Err(SheetError::NoHeader)));
    }

    #[test]
    fn garbage_bytes_are_unreadable() {
        assert!(parse_workbook(b"not a workbook".to_vec()).is_err());
    }
}
