//! Bulk import endpoint
//!
//! # Endpoints
//!
//! - `POST /api/categories/upload` - Replace all categories from a CSV or
//!   spreadsheet (multipart field `file`)
//! - `POST /api/categories/upload?dryRun=true` - Parse and resolve only
//!
//! The upload is streamed into a temp file under the upload directory. The
//! importer removes that file once it is done, whatever the outcome.

use axum::{
    extract::{multipart::Field, Multipart, State},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use catalog_core::models::NewCategory;
use catalog_core::UploadedFile;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::extract::ApiQuery;
use crate::{AppState, HttpError};

/// Query parameters for upload
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    #[serde(default)]
    dry_run: bool,
}

/// Response after a completed import
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub message: String,
    pub inserted_count: usize,
    pub rejected_rows: usize,
    pub duplicates_dropped: usize,
    pub warnings: Vec<String>,
}

/// Response for a dry run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResponse {
    pub message: String,
    pub record_count: usize,
    pub rejected_rows: usize,
    pub duplicates_dropped: usize,
    pub warnings: Vec<String>,
    pub records: Vec<NewCategory>,
}

/// Import categories from an uploaded file
///
/// ```bash
/// curl -X POST http://localhost:5000/api/categories/upload -F file=@categories.csv
/// ```
async fn upload_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Response, HttpError> {
    let upload = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some("file") => {
                break stream_to_temp_file(&state, field).await?;
            }
            Some(_) => continue,
            None => {
                return Err(HttpError::new(
                    "No file uploaded. Use multipart field 'file'",
                    "VALIDATION_ERROR",
                ))
            }
        }
    };

    let importer = state.service.importer();

    if query.dry_run {
        let plan = importer.plan(upload).await?;
        let response = DryRunResponse {
            message: format!("{} categories would be imported", plan.records.len()),
            record_count: plan.records.len(),
            rejected_rows: plan.rejected_rows,
            duplicates_dropped: plan.duplicates_dropped,
            warnings: plan.warnings,
            records: plan.records,
        };
        return Ok(Json(response).into_response());
    }

    let report = importer.import(upload).await?;
    let response = ImportResponse {
        message: format!("{} categories uploaded successfully", report.inserted_count),
        inserted_count: report.inserted_count,
        rejected_rows: report.rejected_rows,
        duplicates_dropped: report.duplicates_dropped,
        warnings: report.warnings,
    };
    Ok(Json(response).into_response())
}

/// Write a multipart field to a fresh temp file, enforcing the size limit
async fn stream_to_temp_file(
    state: &AppState,
    mut field: Field<'_>,
) -> Result<UploadedFile, HttpError> {
    let original_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(str::to_string);
    let limit = state.max_upload_bytes();

    let upload = UploadedFile::create_in(&state.upload_dir, original_name, content_type)
        .map_err(|e| HttpError::from_anyhow(e.into(), "UPLOAD_ERROR"))?;

    // `upload` is dropped (and the file removed) on every early return below
    let mut file = tokio::fs::File::create(upload.path())
        .await
        .map_err(|e| HttpError::from_anyhow(e.into(), "UPLOAD_ERROR"))?;

    let mut written = 0usize;
    while let Some(chunk) = field.chunk().await? {
        written += chunk.len();
        if written > limit {
            return Err(HttpError::new(
                format!("Upload exceeds {} bytes", limit),
                "PAYLOAD_TOO_LARGE",
            ));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| HttpError::from_anyhow(e.into(), "UPLOAD_ERROR"))?;
    }
    file.flush()
        .await
        .map_err(|e| HttpError::from_anyhow(e.into(), "UPLOAD_ERROR"))?;

    tracing::debug!(
        "Received upload '{}' ({} bytes)",
        upload.original_name(),
        written
    );
    Ok(upload)
}

/// Create router with the upload endpoint
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/categories/upload", post(upload_categories))
        .with_state(state)
}
