//! Spreadsheet import files (xlsx, xls, ods)
//!
//! Only the first sheet is read. Its first row is the header; the `id`, `name`
//! and `parent` columns are located by case-insensitive name.

use super::delimited::ColumnMap;
use super::row::{clean_field, RawRow};
use crate::services::error::CategoryServiceError;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Render a cell as the text the normalizer expects
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => clean_field(s),
        Data::Int(i) => i.to_string(),
        // Numeric ids are usually stored as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (*f as i64).to_string()
        }
        other => clean_field(&other.to_string()),
    }
}

/// Turn the rows of a sheet (header first) into raw rows
pub(crate) fn rows_from_cells<'a, I>(rows: I) -> Result<Vec<RawRow>, CategoryServiceError>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };

    let header_text: Vec<String> = header.iter().map(cell_text).collect();
    let columns = ColumnMap::from_headers(header_text.iter().map(String::as_str)).ok_or_else(
        || CategoryServiceError::parse_error("Spreadsheet header must contain 'id' and 'name' columns"),
    )?;

    let text_at = |row: &[Data], index: Option<usize>| -> String {
        index
            .and_then(|i| row.get(i))
            .map(cell_text)
            .unwrap_or_default()
    };

    let mut raw_rows = Vec::new();
    for (index, row) in rows.enumerate() {
        if row.iter().all(|c| cell_text(c).is_empty()) {
            continue;
        }
        raw_rows.push(RawRow {
            line: index + 2,
            id: text_at(row, Some(columns.id)),
            name: text_at(row, Some(columns.name)),
            parent: text_at(row, columns.parent),
        });
    }

    Ok(raw_rows)
}

/// Parse workbook bytes into raw rows from the first sheet
///
/// # Errors
///
/// `ParseError` if the bytes are not a readable workbook, the workbook has
/// no sheets, or the header lacks `id`/`name`.
pub fn parse_workbook(bytes: Vec<u8>) -> Result<Vec<RawRow>, CategoryServiceError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CategoryServiceError::parse_error(format!("Unreadable workbook: {}", e)))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CategoryServiceError::parse_error("Workbook has no sheets"))?;

    let range = workbook.worksheet_range(&sheet).map_err(|e| {
        CategoryServiceError::parse_error(format!("Unreadable sheet '{}': {}", sheet, e))
    })?;

    rows_from_cells(range.rows())
}
