//! CategoryStore Trait - Persistence Abstraction Layer
//!
//! This module defines the `CategoryStore` trait that abstracts the document
//! store holding category records. Services receive an `Arc<dyn CategoryStore>`
//! so backends can be swapped without touching business logic.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so network-backed stores fit the same seam
//! 2. **Ownership Semantics**: Inputs are taken by value; callers clone if needed
//! 3. **Error Handling**: Uses `anyhow::Result`; the service layer maps failures
//!    to `CategoryServiceError::StorageError`
//! 4. **No Transactions**: The store is not assumed to support multi-record
//!    transactions. Bulk replace is built from `delete_all` + `insert_many`
//! 5. **No Referential Integrity**: The store accepts any `parent` value;
//!    parents and cycles are validated by the services before writing
//!
//! # Examples
//!
//! ```rust,no_run
//! use catalog_core::db::{CategoryStore, MemoryStore};
//! use catalog_core::models::NewCategory;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn CategoryStore> = Arc::new(MemoryStore::new());
//!     store.insert(NewCategory::new(1, "Shoes", None)).await?;
//!     assert_eq!(store.count_children(1).await?, 0);
//!     Ok(())
//! }
//! ```

use crate::models::{Category, CategoryPatch, NewCategory};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction layer for category persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so they can be shared across
/// request handlers.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// All records, ordered by id
    async fn find_all(&self) -> Result<Vec<Category>>;

    /// Get a record by id
    ///
    /// - `Ok(Some(category))` if it exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn find_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Insert a single record, setting `created_at`/`updated_at`
    ///
    /// # Errors
    ///
    /// Fails if the id is already present.
    async fn insert(&self, category: NewCategory) -> Result<Category>;

    /// Insert many records in order
    ///
    /// Not atomic: a failure part-way may leave earlier records inserted.
    async fn insert_many(&self, categories: Vec<NewCategory>) -> Result<Vec<Category>>;

    /// Apply a sparse update and bump `updated_at`
    ///
    /// # Errors
    ///
    /// Fails if the record doesn't exist.
    async fn update(&self, id: i64, patch: CategoryPatch) -> Result<Category>;

    /// Delete a record, returning whether anything was removed
    async fn delete_by_id(&self, id: i64) -> Result<bool>;

    /// Delete every record, returning how many were removed
    async fn delete_all(&self) -> Result<usize>;

    /// Number of records whose `parent` equals `parent_id`
    async fn count_children(&self, parent_id: i64) -> Result<usize>;
}
