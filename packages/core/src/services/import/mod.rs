//! Bulk Category Import
//!
//! - `upload` - uploaded temp files and format detection
//! - `row` - raw rows, normalization and tagged parent references
//! - `delimited` / `workbook` - CSV and spreadsheet readers
//! - `pipeline` - dedup, parent resolution and the store replace

mod delimited;
mod pipeline;
mod row;
mod upload;
mod workbook;

pub use delimited::parse_delimited;
pub use pipeline::{plan_from_bytes, BulkImporter, ImportPlan, ImportReport};
pub use row::{ImportRow, ParentRef, RawRow, RowRejection};
pub use upload::{ImportFormat, UploadedFile};
pub use workbook::parse_workbook;
