//! Raw and normalized import rows
//!
//! Both file formats are first reduced to [`RawRow`]s of cleaned text, then
//! normalized into typed [`ImportRow`]s. Parent references stay tagged as
//! [`ParentRef`] until the resolution pass turns them into plain ids.

use std::fmt;

/// Text fields of one data row, as read from the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line (CSV) or row (workbook) number, header included
    pub line: usize,
    pub id: String,
    pub name: String,
    pub parent: String,
}

/// How a row refers to its parent before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// Numeric reference to another row's `id`
    ById(i64),
    /// Non-numeric reference, matched against other rows' `name`
    ByName(String),
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::ById(id) => write!(f, "id {}", id),
            ParentRef::ByName(name) => write!(f, "name '{}'", name),
        }
    }
}

/// A row with a valid id and name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub line: usize,
    pub id: i64,
    pub name: String,
    pub parent: Option<ParentRef>,
}

/// Why a row was skipped during normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    InvalidId { line: usize, value: String },
    EmptyName { line: usize, id: i64 },
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRejection::InvalidId { line, value } => {
                write!(f, "Row {}: id '{}' is not an integer", line, value)
            }
            RowRejection::EmptyName { line, id } => {
                write!(f, "Row {}: category {} has an empty name", line, id)
            }
        }
    }
}

/// Trim whitespace and strip wrapping double quotes
pub fn clean_field(value: &str) -> String {
    value.trim().trim_matches('"').trim().to_string()
}

/// Parse an integer cell, accepting integral decimals such as `"3.0"`
pub fn parse_integer(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    let f = value.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Interpret a parent cell: blank is a root, numeric is an id, anything else a name
pub fn parse_parent(value: &str) -> Option<ParentRef> {
    let cleaned = clean_field(value);
    if cleaned.is_empty() {
        return None;
    }
    match parse_integer(&cleaned) {
        Some(id) => Some(ParentRef::ById(id)),
        None => Some(ParentRef::ByName(cleaned)),
    }
}

impl RawRow {
    /// Validate and type this row
    pub fn normalize(&self) -> Result<ImportRow, RowRejection> {
        let raw_id = clean_field(&self.id);
        let id = parse_integer(&raw_id).ok_or_else(|| RowRejection::InvalidId {
            line: self.line,
            value: raw_id.clone(),
        })?;

        let name = clean_field(&self.name);
        if name.is_empty() {
            return Err(RowRejection::EmptyName {
                line: self.line,
                id,
            });
        }

        Ok(ImportRow {
            line: self.line,
            id,
            name,
            parent: parse_parent(&self.parent),
        })
    }
}
