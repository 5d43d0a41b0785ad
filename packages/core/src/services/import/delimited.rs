//! Comma-separated import files
//!
//! Fields may be wrapped in double quotes; a quoted field can contain commas,
//! and a literal quote inside it is written as `""`. Blanks between a comma
//! and an opening quote are ignored. The first line is the
//! header. Columns are found by name (`id`, `name`, `parent`, any case); when
//! the header doesn't name both `id` and `name`, the fixed layout
//! `id,name,image,parent` is assumed.

use super::row::{clean_field, RawRow};
use crate::services::error::CategoryServiceError;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::borrow::Cow;

/// Column positions inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub id: usize,
    pub name: usize,
    pub parent: Option<usize>,
}

impl ColumnMap {
    /// Layout used by exports that have no usable header
    pub const POSITIONAL: ColumnMap = ColumnMap {
        id: 0,
        name: 1,
        parent: Some(3),
    };

    /// Locate columns by case-insensitive header names
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut id = None;
        let mut name = None;
        let mut parent = None;

        for (index, header) in headers.into_iter().enumerate() {
            let header = clean_field(header.trim_start_matches('\u{feff}')).to_lowercase();
            match header.as_str() {
                "id" if id.is_none() => id = Some(index),
                "name" if name.is_none() => name = Some(index),
                "parent" if parent.is_none() => parent = Some(index),
                _ => {}
            }
        }

        Some(ColumnMap {
            id: id?,
            name: name?,
            parent,
        })
    }
}

fn field(record: &StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .map(clean_field)
        .unwrap_or_default()
}

/// Drop spaces and tabs that sit between a field start and its opening quote
///
/// The reader only recognizes a quote as the first byte of a field, so
/// `1, "a, b"` would otherwise split inside the quotes.
fn strip_blanks_before_quotes(bytes: &[u8]) -> Cow<'_, [u8]> {
    let is_blank = |b: u8| b == b' ' || b == b'\t';
    if !bytes.windows(2).any(|w| is_blank(w[0]) && w[1] == b'"') {
        return Cow::Borrowed(bytes);
    }

    let mut out = Vec::with_capacity(bytes.len());
    let mut in_quotes = false;
    let mut field_start = true;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            out.push(b);
            if b == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    out.push(b'"');
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
        } else if field_start && is_blank(b) {
            let run_end = bytes[i..]
                .iter()
                .position(|&c| !is_blank(c))
                .map_or(bytes.len(), |offset| i + offset);
            if bytes.get(run_end) != Some(&b'"') {
                out.extend_from_slice(&bytes[i..run_end]);
                field_start = false;
            }
            i = run_end;
            continue;
        } else {
            match b {
                b'"' if field_start => in_quotes = true,
                b',' | b'\n' | b'\r' => {
                    out.push(b);
                    field_start = true;
                    i += 1;
                    continue;
                }
                _ => {}
            }
            out.push(b);
            field_start = false;
        }
        i += 1;
    }
    Cow::Owned(out)
}

/// Parse comma-separated bytes into raw rows
///
/// # Errors
///
/// `ParseError` if the content is not valid UTF-8 or not readable as CSV.
pub fn parse_delimited(bytes: &[u8]) -> Result<Vec<RawRow>, CategoryServiceError> {
    let normalized = strip_blanks_before_quotes(bytes);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(normalized.as_ref());

    let headers = reader
        .headers()
        .map_err(|e| CategoryServiceError::parse_error(format!("Invalid CSV header: {}", e)))?
        .clone();

    let columns = ColumnMap::from_headers(headers.iter()).unwrap_or_else(|| {
        tracing::debug!("CSV header lacks id/name columns, using positional layout");
        ColumnMap::POSITIONAL
    });

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let line = index + 2; // 1-indexed plus header row
        let record = result.map_err(|e| {
            CategoryServiceError::parse_error(format!("CSV parse error at row {}: {}", line, e))
        })?;

        if record.iter().all(|f| clean_field(f).is_empty()) {
            continue;
        }

        rows.push(RawRow {
            line,
            id: field(&record, Some(columns.id)),
            name: field(&record, Some(columns.name)),
            parent: field(&record, columns.parent),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_driven_columns() {
        let csv = "Name,Parent,ID\nShoes,,1\nSneakers,1,2\n";
        let rows = parse_delimited(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, "2");
        assert_eq!(rows[1].name, "Sneakers");
        assert_eq!(rows[1].parent, "1");
    }

    #[test]
    fn test_quoted_field_with_comma() {
        let csv = "id,name,image,parent\n1,\"Shoes, Boots & More\",,\"\"\n";
        let rows = parse_delimited(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Shoes, Boots & More");
        assert_eq!(rows[0].parent, "");
    }

    #[test]
    fn test_blank_before_opening_quote() {
        let csv = "id,name,image,parent\n1,Shoes,,\n2, \"Sneakers, Running\",, 1\n3,\t\"Boots\" , ,\"1\"\n";
        let rows = parse_delimited(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].id, "2");
        assert_eq!(rows[1].name, "Sneakers, Running");
        assert_eq!(rows[1].parent, "1");
        assert_eq!(rows[2].name, "Boots");
        assert_eq!(rows[2].parent, "1");
    }

    #[test]
    fn test_quoted_text_keeps_inner_blanks() {
        let csv = "id,name,parent\n1,\"Big, \"\" Shoes\",\n2,Plain  Name,\n";
        let rows = parse_delimited(csv.as_bytes()).unwrap();

        assert_eq!(rows[0].name, "Big, \" Shoes");
        assert_eq!(rows[1].name, "Plain  Name");
    }

    #[test]
    fn test_doubled_quotes_are_unescaped() {
        let csv = "id,name,parent\n1,\"The \"\"Best\"\" Shoes\",\n";
        let rows = parse_delimited(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].name, "The \"Best\" Shoes");
    }

    #[test]
    fn test_positional_fallback_without_header_names() {
        let csv = "a,b,c,d\n5,Hats,,\n6,Caps,https://img/x.png,5\n";
        let rows = parse_delimited(csv.as_bytes()).unwrap();

        assert_eq!(rows[1].id, "6");
        assert_eq!(rows[1].name, "Caps");
        assert_eq!(rows[1].parent, "5");
    }

    #[test]
    fn test_blank_and_short_rows() {
        let csv = "id,name,image,parent\n1,Shoes\n , , , \n2,Boots,,1\n";
        let rows = parse_delimited(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].parent, "");
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let bytes = b"id,name\n1,\xff\xfe\n";
        let err = parse_delimited(bytes).unwrap_err();
        assert!(matches!(err, CategoryServiceError::ParseError { .. }));
    }
}
