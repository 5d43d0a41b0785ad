//! Storage Layer
//!
//! This module handles category persistence:
//!
//! - `CategoryStore` trait - the document-store seam used by all services
//! - `MemoryStore` - volatile backend for tests and ephemeral servers
//! - `JsonFileStore` - single-document JSON backend on local disk
//!
//! # Architecture
//!
//! Stores are deliberately dumb: they keep records keyed by id and apply
//! sparse patches. Hierarchy rules (parent existence, cycle prevention,
//! delete-with-children) live in the service layer.

mod category_store;
mod error;
mod json_store;
mod memory_store;
mod table;

pub use category_store::CategoryStore;
pub use error::StoreError;
pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
