//! Data Models
//!
//! This module contains the data structures used throughout the catalog:
//!
//! - `Category` - The persisted category record
//! - `NewCategory` / `CategoryPatch` - Store inputs
//! - `CreateCategory` / `UpdateCategory` - Service inputs
//! - `CategorySummary` / `TreeNode` - Read-only projections

mod category;

pub use category::{
    Category, CategoryImage, CategoryPatch, CategorySummary, CreateCategory, Hierarchical,
    ImageUpload, NewCategory, TreeNode, UpdateCategory, ValidationError,
};
