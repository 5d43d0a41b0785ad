//! HTTP error handling
//!
//! Every failed request answers with `{message, code, details?}`. The status
//! is derived from the machine-readable code.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use catalog_core::CategoryServiceError;
use serde::{Deserialize, Serialize};

/// JSON error body returned by all endpoints
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create a new HTTP error with details
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    /// Convert from anyhow::Error
    pub fn from_anyhow(err: anyhow::Error, code: impl Into<String>) -> Self {
        Self {
            message: err.to_string(),
            code: code.into(),
            details: Some(format!("{:#}", err)),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "INVALID_INPUT" | "PARENT_NOT_FOUND" | "SELF_PARENT"
            | "CYCLIC_ASSIGNMENT" | "PARSE_ERROR" => StatusCode::BAD_REQUEST,
            "DUPLICATE_NAME" | "HAS_CHILDREN" => StatusCode::CONFLICT,
            "PAYLOAD_TOO_LARGE" => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{} ({}): {}", status, self.code, self.message);
        }
        (status, Json(self)).into_response()
    }
}

impl From<CategoryServiceError> for HttpError {
    fn from(err: CategoryServiceError) -> Self {
        let code = err.code();
        match &err {
            // Internal context stays in details, the message stays generic
            CategoryServiceError::StorageError { context }
            | CategoryServiceError::MediaError { context } => {
                let message = match code {
                    "MEDIA_ERROR" => "Image storage failed",
                    _ => "Category storage failed",
                };
                HttpError::with_details(message, code, context.clone())
            }
            _ => HttpError::new(err.to_string(), code),
        }
    }
}

impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        HttpError::with_details("Malformed multipart body", "INVALID_INPUT", err.body_text())
    }
}
