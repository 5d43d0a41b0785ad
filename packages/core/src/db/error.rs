//! Store Error Types
//!
//! This module defines error types for the store backends, providing
//! clear error handling for I/O, serialization and key conflicts.

use std::path::PathBuf;
use thiserror::Error;

/// Store backend errors
///
/// Backends return these wrapped in `anyhow::Error` through the
/// `CategoryStore` trait. Referential checks (parents, cycles) are
/// handled by the service layer, not here.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record with this id does not exist
    #[error("Category not found in store: {id}")]
    NotFound { id: i64 },

    /// Insert collided with an existing id
    #[error("Duplicate category id: {id}")]
    DuplicateId { id: i64 },

    /// Failed to read or write the backing file
    #[error("Store file error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Backing document could not be (de)serialized
    #[error("Store document is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to create the parent directory of the store file
    #[error("Failed to create store directory: {0}")]
    DirectoryCreationFailed(std::io::Error),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create a duplicate id error
    pub fn duplicate_id(id: i64) -> Self {
        Self::DuplicateId { id }
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
