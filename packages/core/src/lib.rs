//! Catalog Core Business Logic Layer
//!
//! This crate provides category storage, hierarchy rules and bulk import for
//! the catalog backend.
//!
//! # Architecture
//!
//! - **Flat Records**: Categories are stored keyed by integer id with a `parent` pointer
//! - **Computed Trees**: Nested views are rebuilt from the flat list on demand
//! - **Injected Backends**: Services receive their store and blob store explicitly
//! - **Replace-on-Import**: Bulk uploads swap the whole collection
//!
//! # Modules
//!
//! - [`models`] - Data structures (Category, NewCategory, TreeNode, etc.)
//! - [`db`] - Category store trait with memory and JSON file backends
//! - [`media`] - Blob store for category images
//! - [`services`] - Business services (CategoryService, CycleGuard, import)
//! - [`config`] - Service configuration

pub mod config;
pub mod db;
pub mod media;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::CatalogConfig;
pub use models::*;
pub use services::*;
