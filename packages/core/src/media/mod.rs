//! Media Layer
//!
//! Category images live in a blob store outside the category collection.
//! The store hands back a public URL plus an opaque `public_id` that is
//! kept on the record and used to delete the blob later.
//!
//! - `BlobStore` trait - upload/delete seam used by `CategoryService`
//! - `LocalBlobStore` - files under a media directory, served by the HTTP layer
//! - `MemoryBlobStore` - volatile backend for tests

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedBlob {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `folder`. `filename` is only used to pick an extension.
    async fn upload(&self, bytes: Vec<u8>, folder: &str, filename: &str) -> Result<UploadedBlob>;

    /// Remove a previously uploaded blob. Deleting an unknown id is not an error.
    async fn delete(&self, public_id: &str) -> Result<()>;
}

/// Lowercase extension of `filename`, limited to plain alphanumerics
pub(crate) fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Build a fresh `folder/uuid[.ext]` public id
pub(crate) fn new_public_id(folder: &str, filename: &str) -> String {
    let stem = uuid::Uuid::new_v4().to_string();
    let folder = folder.trim_matches('/');
    let name = match extension_of(filename) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    };
    if folder.is_empty() {
        name
    } else {
        format!("{}/{}", folder, name)
    }
}
