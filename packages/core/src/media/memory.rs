use super::{new_public_id, BlobStore, UploadedBlob};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps blobs in memory, keyed by public id
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, public_id: &str) -> bool {
        self.blobs.read().await.contains_key(public_id)
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, bytes: Vec<u8>, folder: &str, filename: &str) -> Result<UploadedBlob> {
        let public_id = new_public_id(folder, filename);
        self.blobs.write().await.insert(public_id.clone(), bytes);
        Ok(UploadedBlob {
            url: format!("memory://{}", public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        self.blobs.write().await.remove(public_id);
        Ok(())
    }
}
