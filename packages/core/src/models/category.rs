//! Category Data Structures
//!
//! This module defines the `Category` record and the related input/projection
//! types used by the store, the services and the HTTP layer.
//!
//! # Architecture
//!
//! - **Flat Records**: Categories are stored flat, keyed by a stable integer `id`
//! - **Parent Pointers**: Hierarchy is expressed only through the `parent` field
//! - **Computed Trees**: Nested views are built on demand (see `services::tree`)
//!
//! # Examples
//!
//! ```rust
//! use catalog_core::models::NewCategory;
//!
//! let root = NewCategory::new(1, "Shoes", None);
//! let child = NewCategory::new(2, "Sneakers", Some(1));
//! assert_eq!(child.parent, Some(root.id));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Validation errors for category input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("Category id {0} is already in use")]
    IdInUse(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Image attached to a category, as returned by the blob store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryImage {
    /// Public URL of the uploaded image
    pub url: String,

    /// Blob store identifier, used to delete the image later
    pub public_id: String,
}

/// A persisted category record.
///
/// # Fields
///
/// - `id`: Stable integer identifier, unique within the store
/// - `name`: Display name, never empty
/// - `parent`: Id of the parent category, `None` for roots
/// - `image`: Optional image hosted by the blob store
/// - `created_at` / `updated_at`: Managed by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,

    pub name: String,

    /// Parent category id (`None` means this category is a root)
    pub parent: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CategoryImage>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Whether this category sits at the top of the hierarchy
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Project to the `{id, name, parent}` shape used by dropdowns
    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            id: self.id,
            name: self.name.clone(),
            parent: self.parent,
        }
    }
}

/// A category ready to be inserted. The store fills in the timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub id: i64,
    pub name: String,
    pub parent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CategoryImage>,
}

impl NewCategory {
    pub fn new(id: i64, name: impl Into<String>, parent: Option<i64>) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
            image: None,
        }
    }

    pub fn with_image(mut self, image: CategoryImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Deserialize a field that may be explicitly `null`
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial update applied by `CategoryStore::update`
///
/// Nullable fields use the double-`Option` pattern:
///
/// - `None`: Don't change this field
/// - `Some(None)`: Set the field to null
/// - `Some(Some(value))`: Set the field to `value`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent: Option<Option<i64>>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub image: Option<Option<CategoryImage>>,
}

impl CategoryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_parent(mut self, parent: Option<i64>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_image(mut self, image: Option<CategoryImage>) -> Self {
        self.image = Some(image);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent.is_none() && self.image.is_none()
    }

    /// Apply this patch to a record, leaving timestamps untouched
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name = name.clone();
        }
        if let Some(parent) = self.parent {
            category.parent = parent;
        }
        if let Some(image) = &self.image {
            category.image = image.clone();
        }
    }
}

/// Caller input for creating a single category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    /// Explicit id; the next sequential id is used when omitted
    #[serde(default)]
    pub id: Option<i64>,

    pub name: String,

    #[serde(default)]
    pub parent: Option<i64>,
}

/// Caller input for updating a category. `parent: null` detaches it to a root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_field")]
    pub parent: Option<Option<i64>>,
}

/// Image bytes handed to the CRUD service for upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `{id, name, parent}` projection used by list and dropdown views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub parent: Option<i64>,
}

/// One node of a computed category tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: i64,
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Number of nodes in this subtree, including this one
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

/// Read access to the three fields the hierarchy logic cares about.
///
/// Implemented for both stored records and insert inputs so the tree builder
/// and cycle checks work on either.
pub trait Hierarchical {
    fn id(&self) -> i64;
    fn name(&self) -> &str;
    fn parent(&self) -> Option<i64>;
}

impl Hierarchical for Category {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn parent(&self) -> Option<i64> {
        self.parent
    }
}

impl Hierarchical for NewCategory {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn parent(&self) -> Option<i64> {
        self.parent
    }
}

impl Hierarchical for CategorySummary {
    fn id(&self) -> i64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn parent(&self) -> Option<i64> {
        self.parent
    }
}
