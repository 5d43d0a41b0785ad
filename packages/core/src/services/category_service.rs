//! Category Service - CRUD and Hierarchy Queries
//!
//! This module provides the business logic layer for categories:
//!
//! - CRUD operations (create, get, update, delete)
//! - Image attachment through the blob store
//! - Read views (name-sorted list, dropdown, tree, search, children)
//! - Access to the bulk importer sharing the same store
//!
//! # Hierarchy Rules
//!
//! Every write that sets a parent checks that the parent exists and, for
//! updates, that the move keeps the hierarchy a forest (see
//! [`CycleGuard`]). Deletes never cascade: a category with children cannot
//! be removed.
//!
//! All validation runs before the store is touched. Blob cleanup after a
//! store write is best-effort and only logged on failure.

use crate::config::CatalogConfig;
use crate::db::CategoryStore;
use crate::media::{BlobStore, UploadedBlob};
use crate::models::{
    Category, CategoryImage, CategoryPatch, CategorySummary, CreateCategory, ImageUpload,
    NewCategory, TreeNode, UpdateCategory, ValidationError,
};
use crate::services::cycle_guard::CycleGuard;
use crate::services::error::{storage_error, CategoryServiceError};
use crate::services::import::BulkImporter;
use crate::services::tree::build_forest;
use std::sync::Arc;

/// Category CRUD and query service
///
/// Store and blob store are injected, so the same service runs against the
/// JSON file backend in production and in-memory backends in tests.
///
/// # Examples
///
/// ```rust
/// # use catalog_core::config::CatalogConfig;
/// # use catalog_core::db::MemoryStore;
/// # use catalog_core::media::MemoryBlobStore;
/// # use catalog_core::models::CreateCategory;
/// # use catalog_core::services::CategoryService;
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = CategoryService::new(
///     Arc::new(MemoryStore::new()),
///     Arc::new(MemoryBlobStore::new()),
///     CatalogConfig::default(),
/// );
///
/// let shoes = service
///     .create(CreateCategory { id: None, name: "Shoes".into(), parent: None }, None)
///     .await?;
/// assert_eq!(shoes.id, 1);
/// # Ok(())
/// # }
/// ```
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    blobs: Arc<dyn BlobStore>,
    config: CatalogConfig,
}

impl CategoryService {
    pub fn new(
        store: Arc<dyn CategoryStore>,
        blobs: Arc<dyn BlobStore>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            store,
            blobs,
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Bulk importer writing to the same store
    pub fn importer(&self) -> BulkImporter {
        BulkImporter::new(self.store.clone())
    }

    /// Create a category, optionally with an image
    ///
    /// When `input.id` is `None` the next sequential id (max + 1) is used.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for an empty name or an id already in use
    /// - `DuplicateName` if unique names are enforced and the name is taken
    /// - `ParentNotFound` if `input.parent` doesn't exist
    /// - `MediaError` if the image upload fails
    /// - `StorageError` if the insert fails (the uploaded image is removed)
    pub async fn create(
        &self,
        input: CreateCategory,
        image: Option<ImageUpload>,
    ) -> Result<Category, CategoryServiceError> {
        let name = validate_name(&input.name)?;
        let existing = self.load_all().await?;

        self.ensure_name_available(&existing, &name, None)?;

        let id = match input.id {
            Some(id) if existing.iter().any(|c| c.id == id) => {
                return Err(ValidationError::IdInUse(id).into());
            }
            Some(id) => id,
            None => next_id(&existing)?,
        };

        if let Some(parent_id) = input.parent {
            if !existing.iter().any(|c| c.id == parent_id) {
                return Err(CategoryServiceError::parent_not_found(parent_id));
            }
        }

        let mut record = NewCategory::new(id, name, input.parent);
        let uploaded = match image {
            Some(upload) => Some(self.upload_image(upload).await?),
            None => None,
        };
        if let Some(blob) = &uploaded {
            record = record.with_image(image_of(blob));
        }

        match self.store.insert(record).await {
            Ok(category) => {
                tracing::info!("Created category {} '{}'", category.id, category.name);
                Ok(category)
            }
            Err(e) => {
                if let Some(blob) = uploaded {
                    self.delete_blob_best_effort(&blob.public_id).await;
                }
                Err(storage_error("insert category", e))
            }
        }
    }

    /// Get a category by id
    pub async fn get(&self, id: i64) -> Result<Category, CategoryServiceError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| storage_error("load category", e))?
            .ok_or_else(|| CategoryServiceError::not_found(id))
    }

    /// Update name and/or parent, optionally replacing the image
    ///
    /// `input.parent = Some(None)` detaches the category to a root.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `id` doesn't exist
    /// - `ValidationFailed` / `DuplicateName` for a bad new name
    /// - `SelfParent`, `ParentNotFound`, `CyclicAssignment`,
    ///   `CorruptHierarchy` for a bad new parent
    /// - `MediaError` if the new image can't be uploaded
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategory,
        image: Option<ImageUpload>,
    ) -> Result<Category, CategoryServiceError> {
        let current = self.get(id).await?;
        let mut patch = CategoryPatch::new();

        if let Some(name) = &input.name {
            let name = validate_name(name)?;
            if name != current.name {
                let existing = self.load_all().await?;
                self.ensure_name_available(&existing, &name, Some(id))?;
            }
            patch = patch.with_name(name);
        }

        if let Some(parent) = input.parent {
            if parent != current.parent {
                if let Some(parent_id) = parent {
                    self.check_new_parent(id, parent_id).await?;
                }
            }
            patch = patch.with_parent(parent);
        }

        let uploaded = match image {
            Some(upload) => Some(self.upload_image(upload).await?),
            None => None,
        };
        if let Some(blob) = &uploaded {
            patch = patch.with_image(Some(image_of(blob)));
        }

        if patch.is_empty() {
            return Ok(current);
        }

        let updated = match self.store.update(id, patch).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(blob) = uploaded {
                    self.delete_blob_best_effort(&blob.public_id).await;
                }
                return Err(storage_error("update category", e));
            }
        };

        if uploaded.is_some() {
            if let Some(old) = &current.image {
                self.delete_blob_best_effort(&old.public_id).await;
            }
        }

        tracing::info!("Updated category {}", id);
        Ok(updated)
    }

    /// Replace a category's image
    pub async fn set_image(
        &self,
        id: i64,
        image: ImageUpload,
    ) -> Result<Category, CategoryServiceError> {
        self.update(id, UpdateCategory::default(), Some(image)).await
    }

    /// Delete a leaf category and its image
    ///
    /// # Errors
    ///
    /// - `NotFound` if `id` doesn't exist
    /// - `HasChildren` if any category still points at `id`
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let current = self.get(id).await?;

        let child_count = self
            .store
            .count_children(id)
            .await
            .map_err(|e| storage_error("count children", e))?;
        if child_count > 0 {
            return Err(CategoryServiceError::has_children(id, child_count));
        }

        let deleted = self
            .store
            .delete_by_id(id)
            .await
            .map_err(|e| storage_error("delete category", e))?;
        if !deleted {
            return Err(CategoryServiceError::not_found(id));
        }

        if let Some(image) = &current.image {
            self.delete_blob_best_effort(&image.public_id).await;
        }

        tracing::info!("Deleted category {} '{}'", id, current.name);
        Ok(())
    }

    /// All categories, sorted by name
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        let mut categories = self.load_all().await?;
        sort_by_name(&mut categories);
        Ok(categories)
    }

    /// `{id, name, parent}` projections, sorted by name
    pub async fn dropdown(&self) -> Result<Vec<CategorySummary>, CategoryServiceError> {
        Ok(self.list().await?.iter().map(Category::summary).collect())
    }

    /// Forest of all roots, or the subtree under `root_id`
    ///
    /// # Errors
    ///
    /// `NotFound` if `root_id` is given and doesn't exist.
    pub async fn tree(&self, root_id: Option<i64>) -> Result<Vec<TreeNode>, CategoryServiceError> {
        let categories = self.load_all().await?;
        if let Some(id) = root_id {
            if !categories.iter().any(|c| c.id == id) {
                return Err(CategoryServiceError::not_found(id));
            }
        }
        Ok(build_forest(&categories, root_id))
    }

    /// Case-insensitive substring search on name, optionally under one parent
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if `query` is blank.
    pub async fn search(
        &self,
        query: &str,
        parent: Option<i64>,
    ) -> Result<Vec<Category>, CategoryServiceError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ValidationError::MissingField("q".to_string()).into());
        }

        let mut matches: Vec<Category> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .filter(|c| parent.is_none() || c.parent == parent)
            .collect();
        sort_by_name(&mut matches);

        tracing::debug!("Search '{}' matched {} categories", query, matches.len());
        Ok(matches)
    }

    /// Direct children of `id`, sorted by name
    ///
    /// # Errors
    ///
    /// `NotFound` if `id` doesn't exist.
    pub async fn children(&self, id: i64) -> Result<Vec<Category>, CategoryServiceError> {
        let categories = self.load_all().await?;
        if !categories.iter().any(|c| c.id == id) {
            return Err(CategoryServiceError::not_found(id));
        }

        let mut children: Vec<Category> = categories
            .into_iter()
            .filter(|c| c.parent == Some(id))
            .collect();
        sort_by_name(&mut children);
        Ok(children)
    }

    async fn load_all(&self) -> Result<Vec<Category>, CategoryServiceError> {
        self.store
            .find_all()
            .await
            .map_err(|e| storage_error("load categories", e))
    }

    fn ensure_name_available(
        &self,
        existing: &[Category],
        name: &str,
        except_id: Option<i64>,
    ) -> Result<(), CategoryServiceError> {
        if !self.config.enforce_unique_names {
            return Ok(());
        }
        let taken = existing
            .iter()
            .any(|c| Some(c.id) != except_id && c.name == name);
        if taken {
            return Err(CategoryServiceError::duplicate_name(name));
        }
        Ok(())
    }

    async fn check_new_parent(&self, id: i64, parent_id: i64) -> Result<(), CategoryServiceError> {
        if parent_id == id {
            return Err(CategoryServiceError::self_parent(id));
        }

        let parent_exists = self
            .store
            .find_by_id(parent_id)
            .await
            .map_err(|e| storage_error("load parent", e))?
            .is_some();
        if !parent_exists {
            return Err(CategoryServiceError::parent_not_found(parent_id));
        }

        CycleGuard::new(self.store.as_ref())
            .check(id, parent_id)
            .await
    }

    async fn upload_image(&self, image: ImageUpload) -> Result<UploadedBlob, CategoryServiceError> {
        if image.bytes.is_empty() {
            return Err(ValidationError::InvalidInput("image file is empty".to_string()).into());
        }
        if image.bytes.len() > self.config.max_upload_bytes {
            return Err(ValidationError::InvalidInput(format!(
                "image exceeds {} bytes",
                self.config.max_upload_bytes
            ))
            .into());
        }

        self.blobs
            .upload(image.bytes, &self.config.image_folder, &image.filename)
            .await
            .map_err(|e| CategoryServiceError::media(format!("upload '{}': {:#}", image.filename, e)))
    }

    async fn delete_blob_best_effort(&self, public_id: &str) {
        if let Err(e) = self.blobs.delete(public_id).await {
            tracing::warn!("Failed to delete image {}: {:#}", public_id, e);
        }
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

fn next_id(existing: &[Category]) -> Result<i64, ValidationError> {
    let max = existing.iter().map(|c| c.id).max().unwrap_or(0);
    max.checked_add(1).ok_or_else(|| {
        ValidationError::InvalidInput(format!(
            "No id left after {}; supply an explicit id",
            max
        ))
    })
}

fn image_of(blob: &UploadedBlob) -> CategoryImage {
    CategoryImage {
        url: blob.url.clone(),
        public_id: blob.public_id.clone(),
    }
}

fn sort_by_name(categories: &mut [Category]) {
    categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

#[cfg(test)]
#[path = "category_service_test.rs"]
mod category_service_test;
