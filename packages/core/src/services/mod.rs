//! Business Services
//!
//! This module contains the catalog business logic:
//!
//! - `CategoryService` - CRUD operations, image handling and read views
//! - `CycleGuard` - Re-parenting validation against the stored hierarchy
//! - `tree` - Forest building from flat parent-pointer records
//! - `import` - Bulk replace of the collection from CSV or spreadsheet files
//!
//! Services coordinate between the store, the blob store and the HTTP layer,
//! enforcing the hierarchy rules the stores don't know about.

pub mod category_service;
pub mod cycle_guard;
pub mod error;
pub mod import;
pub mod tree;

pub use category_service::CategoryService;
pub use cycle_guard::{first_cycle_closing_edge, CycleGuard};
pub use error::CategoryServiceError;
pub use import::{BulkImporter, ImportFormat, ImportPlan, ImportReport, UploadedFile};
pub use tree::{build_forest, forest_size, unreachable_ids};
