//! Uploaded import files
//!
//! The HTTP layer streams an upload into a temp file and hands it over as an
//! [`UploadedFile`]. The file is removed when the import finishes, on success
//! and on failure alike; dropping the value without calling
//! [`UploadedFile::discard`] removes it as well.

use crate::services::error::CategoryServiceError;
use std::path::Path;
use tempfile::TempPath;

/// Supported import file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Comma-separated text
    DelimitedText,
    /// Spreadsheet workbook (xlsx, xls, xlsm, ods)
    Workbook,
}

const WORKBOOK_EXTENSIONS: &[&str] = &[".xlsx", ".xlsm", ".xls", ".ods"];

impl ImportFormat {
    /// Pick a format from the original filename and declared media type
    pub fn detect(filename: &str, content_type: Option<&str>) -> Option<Self> {
        let filename = filename.to_ascii_lowercase();
        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

        if content_type.contains("csv") || filename.ends_with(".csv") {
            return Some(ImportFormat::DelimitedText);
        }

        let is_workbook_type = content_type.contains("spreadsheet")
            || content_type.contains("ms-excel")
            || content_type.contains("opendocument");
        if is_workbook_type || WORKBOOK_EXTENSIONS.iter().any(|ext| filename.ends_with(ext)) {
            return Some(ImportFormat::Workbook);
        }

        None
    }
}

/// A temp file holding an uploaded import, deleted when the import is done
#[derive(Debug)]
pub struct UploadedFile {
    path: TempPath,
    original_name: String,
    content_type: Option<String>,
}

impl UploadedFile {
    pub fn new(path: TempPath, original_name: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            path,
            original_name: original_name.into(),
            content_type,
        }
    }

    /// Create an empty temp file inside `dir` for an incoming upload
    pub fn create_in(
        dir: &Path,
        original_name: impl Into<String>,
        content_type: Option<String>,
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(dir)?
            .into_temp_path();
        Ok(Self::new(path, original_name, content_type))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Detect the import format, failing for unsupported files
    pub fn format(&self) -> Result<ImportFormat, CategoryServiceError> {
        ImportFormat::detect(&self.original_name, self.content_type()).ok_or_else(|| {
            CategoryServiceError::parse_error(format!(
                "Unsupported file type for '{}': expected .csv or a spreadsheet",
                self.original_name
            ))
        })
    }

    /// Delete the temp file now, logging instead of failing if that doesn't work
    pub fn discard(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => tracing::debug!("Removed uploaded file {}", shown),
            Err(e) => tracing::warn!("Failed to remove uploaded file {}: {}", shown, e),
        }
    }
}
