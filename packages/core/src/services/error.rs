//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations. All
//! validation and referential errors are raised before any store mutation.

use crate::models::ValidationError;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum CategoryServiceError {
    /// Missing or empty required field
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Category not found by id
    #[error("Category not found: {id}")]
    NotFound { id: i64 },

    /// Referenced parent does not exist
    #[error("Parent category not found: {parent_id}")]
    ParentNotFound { parent_id: i64 },

    /// Category would become its own parent
    #[error("Category {id} cannot be its own parent")]
    SelfParent { id: i64 },

    /// New parent is a descendant of the category
    #[error("Cannot set parent of {node_id} to {parent_id}: it is a descendant (would create a cycle)")]
    CyclicAssignment { node_id: i64, parent_id: i64 },

    /// Ancestor walk did not reach a root within the record count
    #[error("Category hierarchy is corrupt: ancestor walk from {start_id} exceeded {limit} steps")]
    CorruptHierarchy { start_id: i64, limit: usize },

    /// Delete blocked because the category still has children
    #[error("Category {id} has {child_count} child categories. Delete children first")]
    HasChildren { id: i64, child_count: usize },

    /// Uploaded import file is malformed or unsupported
    #[error("Failed to parse upload: {context}")]
    ParseError { context: String },

    /// Underlying store operation failed
    #[error("Storage operation failed: {context}")]
    StorageError { context: String },

    /// Another category already uses this name
    #[error("Category name must be unique: '{name}' already exists")]
    DuplicateName { name: String },

    /// Blob store operation failed
    #[error("Media operation failed: {context}")]
    MediaError { context: String },
}

impl CategoryServiceError {
    /// Create a not found error
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    /// Create a parent not found error
    pub fn parent_not_found(parent_id: i64) -> Self {
        Self::ParentNotFound { parent_id }
    }

    /// Create a self parent error
    pub fn self_parent(id: i64) -> Self {
        Self::SelfParent { id }
    }

    /// Create a cyclic assignment error
    pub fn cyclic_assignment(node_id: i64, parent_id: i64) -> Self {
        Self::CyclicAssignment { node_id, parent_id }
    }

    /// Create a corrupt hierarchy error
    pub fn corrupt_hierarchy(start_id: i64, limit: usize) -> Self {
        Self::CorruptHierarchy { start_id, limit }
    }

    /// Create a has children error
    pub fn has_children(id: i64, child_count: usize) -> Self {
        Self::HasChildren { id, child_count }
    }

    /// Create a parse error
    pub fn parse_error(context: impl Into<String>) -> Self {
        Self::ParseError {
            context: context.into(),
        }
    }

    /// Create a storage error
    pub fn storage(context: impl Into<String>) -> Self {
        Self::StorageError {
            context: context.into(),
        }
    }

    /// Create a duplicate name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create a media error
    pub fn media(context: impl Into<String>) -> Self {
        Self::MediaError {
            context: context.into(),
        }
    }

    /// Machine-readable error code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationFailed(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ParentNotFound { .. } => "PARENT_NOT_FOUND",
            Self::SelfParent { .. } => "SELF_PARENT",
            Self::CyclicAssignment { .. } => "CYCLIC_ASSIGNMENT",
            Self::CorruptHierarchy { .. } => "CORRUPT_HIERARCHY",
            Self::HasChildren { .. } => "HAS_CHILDREN",
            Self::ParseError { .. } => "PARSE_ERROR",
            Self::StorageError { .. } => "STORAGE_ERROR",
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::MediaError { .. } => "MEDIA_ERROR",
        }
    }
}

/// Map a store failure to `StorageError`, keeping the full cause chain
pub(crate) fn storage_error(operation: &str, err: anyhow::Error) -> CategoryServiceError {
    CategoryServiceError::storage(format!("{}: {:#}", operation, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CategoryServiceError::has_children(10, 1);
        assert_eq!(
            err.to_string(),
            "Category 10 has 1 child categories. Delete children first"
        );
        assert_eq!(err.code(), "HAS_CHILDREN");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: CategoryServiceError = ValidationError::EmptyName.into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("name cannot be empty"));
    }

    #[test]
    fn test_storage_error_keeps_cause_chain() {
        let cause = anyhow::anyhow!("disk full").context("write failed");
        let err = storage_error("insert_many", cause);
        assert_eq!(
            err.to_string(),
            "Storage operation failed: insert_many: write failed: disk full"
        );
    }
}
