//! Bulk Import Pipeline
//!
//! Replaces the whole category collection from an uploaded file:
//!
//! 1. Detect the format (CSV or spreadsheet)
//! 2. Parse rows into cleaned text
//! 3. Normalize rows (integer id, non-empty name, tagged parent)
//! 4. Deduplicate by name (first occurrence wins), then by id
//! 5. Resolve parents; dangling references and cycles degrade to roots
//! 6. Delete every stored record, then insert the new set
//!
//! Steps 1-5 never touch the store, so a bad file leaves existing data alone.
//! Step 6 is not transactional: if the insert fails the collection is wiped
//! again as a compensating action and the previous data is gone.

use super::delimited::parse_delimited;
use super::row::{ImportRow, ParentRef};
use super::upload::{ImportFormat, UploadedFile};
use super::workbook::parse_workbook;
use crate::db::CategoryStore;
use crate::models::NewCategory;
use crate::services::cycle_guard::first_cycle_closing_edge;
use crate::services::error::{storage_error, CategoryServiceError};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Records ready to replace the collection, plus what was dropped on the way
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPlan {
    pub records: Vec<NewCategory>,
    pub rejected_rows: usize,
    pub duplicates_dropped: usize,
    pub warnings: Vec<String>,
}

/// Outcome of a completed import
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub inserted_count: usize,
    pub rejected_rows: usize,
    pub duplicates_dropped: usize,
    pub warnings: Vec<String>,
}

pub struct BulkImporter {
    store: Arc<dyn CategoryStore>,
}

impl BulkImporter {
    pub fn new(store: Arc<dyn CategoryStore>) -> Self {
        Self { store }
    }

    /// Parse and resolve an upload without touching the store
    ///
    /// The uploaded file is removed before returning.
    pub async fn plan(&self, upload: UploadedFile) -> Result<ImportPlan, CategoryServiceError> {
        let result = read_plan(&upload).await;
        upload.discard();
        result
    }

    /// Replace the whole collection with the contents of `upload`
    ///
    /// The uploaded file is removed before returning, whatever the outcome.
    ///
    /// # Errors
    ///
    /// - `ParseError` if the file is unsupported, unreadable, or has no valid
    ///   rows. The store is not touched.
    /// - `StorageError` if the replace fails. A compensating delete-all has
    ///   been attempted and previous records are lost.
    pub async fn import(&self, upload: UploadedFile) -> Result<ImportReport, CategoryServiceError> {
        let name = upload.original_name().to_string();
        let result = match read_plan(&upload).await {
            Ok(plan) => self.apply(plan).await,
            Err(e) => Err(e),
        };
        upload.discard();

        match &result {
            Ok(report) => tracing::info!(
                "Imported {} categories from '{}' ({} rows rejected, {} duplicates dropped)",
                report.inserted_count,
                name,
                report.rejected_rows,
                report.duplicates_dropped
            ),
            Err(e) => tracing::error!("Import of '{}' failed: {}", name, e),
        }
        result
    }

    /// Run the atomic replace for an already resolved plan
    pub async fn apply(&self, plan: ImportPlan) -> Result<ImportReport, CategoryServiceError> {
        let ImportPlan {
            records,
            rejected_rows,
            duplicates_dropped,
            warnings,
        } = plan;

        let inserted_count = self.replace_all(records).await?;

        Ok(ImportReport {
            inserted_count,
            rejected_rows,
            duplicates_dropped,
            warnings,
        })
    }

    async fn replace_all(&self, records: Vec<NewCategory>) -> Result<usize, CategoryServiceError> {
        match self.store.delete_all().await {
            Ok(count) => tracing::debug!("Cleared {} existing categories before import", count),
            Err(e) => {
                self.compensate().await;
                return Err(storage_error("delete existing categories", e));
            }
        }

        match self.store.insert_many(records).await {
            Ok(inserted) => Ok(inserted.len()),
            Err(e) => {
                self.compensate().await;
                Err(storage_error("insert imported categories", e))
            }
        }
    }

    /// Best-effort rollback: leave the collection empty rather than half-imported
    async fn compensate(&self) {
        match self.store.delete_all().await {
            Ok(count) => tracing::warn!("Rolled back import, removed {} partial records", count),
            Err(e) => tracing::error!("Rollback after failed import also failed: {:#}", e),
        }
    }
}

async fn read_plan(upload: &UploadedFile) -> Result<ImportPlan, CategoryServiceError> {
    let format = upload.format()?;
    let bytes = tokio::fs::read(upload.path()).await.map_err(|e| {
        CategoryServiceError::parse_error(format!(
            "Unable to read uploaded file '{}': {}",
            upload.original_name(),
            e
        ))
    })?;
    plan_from_bytes(format, bytes)
}

/// Steps 2-5 of the pipeline over in-memory file content
pub fn plan_from_bytes(
    format: ImportFormat,
    bytes: Vec<u8>,
) -> Result<ImportPlan, CategoryServiceError> {
    let raw_rows = match format {
        ImportFormat::DelimitedText => parse_delimited(&bytes)?,
        ImportFormat::Workbook => parse_workbook(bytes)?,
    };

    let mut warnings = Vec::new();
    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut rejected_rows = 0;
    for raw in &raw_rows {
        match raw.normalize() {
            Ok(row) => rows.push(row),
            Err(rejection) => {
                tracing::debug!("Skipping import row: {}", rejection);
                warnings.push(rejection.to_string());
                rejected_rows += 1;
            }
        }
    }

    let (rows, duplicates_dropped) = deduplicate(rows);
    if rows.is_empty() {
        return Err(CategoryServiceError::parse_error(
            "File contains no valid category rows",
        ));
    }

    let records = resolve_parents(rows, &mut warnings);

    Ok(ImportPlan {
        records,
        rejected_rows,
        duplicates_dropped,
        warnings,
    })
}

/// Keep the first row for each name, then the first row for each id
fn deduplicate(rows: Vec<ImportRow>) -> (Vec<ImportRow>, usize) {
    let total = rows.len();
    let mut names = HashSet::new();
    let mut ids = HashSet::new();

    let kept: Vec<ImportRow> = rows
        .into_iter()
        .filter(|row| {
            if !names.insert(row.name.clone()) {
                tracing::debug!("Dropping duplicate name '{}' at row {}", row.name, row.line);
                return false;
            }
            if !ids.insert(row.id) {
                tracing::debug!("Dropping duplicate id {} at row {}", row.id, row.line);
                return false;
            }
            true
        })
        .collect();

    let dropped = total - kept.len();
    (kept, dropped)
}

/// Turn tagged parents into ids that exist in the imported set
fn resolve_parents(rows: Vec<ImportRow>, warnings: &mut Vec<String>) -> Vec<NewCategory> {
    let ids: HashSet<i64> = rows.iter().map(|r| r.id).collect();
    let by_name: HashMap<String, i64> = rows.iter().map(|r| (r.name.clone(), r.id)).collect();

    let mut records: Vec<NewCategory> = rows
        .into_iter()
        .map(|row| {
            let parent = match &row.parent {
                None => None,
                Some(ParentRef::ById(id)) if ids.contains(id) => Some(*id),
                Some(ParentRef::ByName(name)) if by_name.contains_key(name) => {
                    by_name.get(name).copied()
                }
                Some(reference) => {
                    let message = format!(
                        "Parent {} for category '{}' (id {}) not found in the uploaded file; imported as a root",
                        reference, row.name, row.id
                    );
                    tracing::warn!("{}", message);
                    warnings.push(message);
                    None
                }
            };
            NewCategory::new(row.id, row.name, parent)
        })
        .collect();

    while let Some(id) = first_cycle_closing_edge(&records) {
        if let Some(record) = records.iter_mut().find(|r| r.id == id) {
            let message = format!(
                "Parent {:?} for category '{}' (id {}) would create a cycle; imported as a root",
                record.parent, record.name, record.id
            );
            tracing::warn!("{}", message);
            warnings.push(message);
            record.parent = None;
        }
    }

    records
}
