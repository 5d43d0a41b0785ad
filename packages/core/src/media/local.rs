//! Blob store backed by a local media directory

use super::{new_public_id, BlobStore, UploadedBlob};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Writes blobs to `root/<public_id>` and reports `base_url/<public_id>` as the URL
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a public id to a path inside `root`, refusing traversal
    fn resolve(&self, public_id: &str) -> Result<PathBuf> {
        let relative = Path::new(public_id);
        let is_plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if public_id.is_empty() || !is_plain {
            bail!("Invalid blob id: {}", public_id);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, bytes: Vec<u8>, folder: &str, filename: &str) -> Result<UploadedBlob> {
        let public_id = new_public_id(folder, filename);
        let path = self.resolve(&public_id)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create media folder {}", parent.display()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write blob {}", path.display()))?;

        tracing::debug!("Stored blob {} at {}", public_id, path.display());

        Ok(UploadedBlob {
            url: format!("{}/{}", self.base_url, public_id),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<()> {
        let path = self.resolve(public_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete blob {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_then_delete() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = LocalBlobStore::new(temp_dir.path(), "/media/");

        let uploaded = blobs
            .upload(b"png-bytes".to_vec(), "categories", "shoe.png")
            .await
            .unwrap();
        assert_eq!(uploaded.url, format!("/media/{}", uploaded.public_id));

        let path = temp_dir.path().join(&uploaded.public_id);
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");

        blobs.delete(&uploaded.public_id).await.unwrap();
        assert!(!path.exists());
        // Deleting twice is fine
        blobs.delete(&uploaded.public_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_refuses_path_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = LocalBlobStore::new(temp_dir.path(), "/media");
        assert!(blobs.delete("../outside.png").await.is_err());
        assert!(blobs.delete("/etc/passwd").await.is_err());
    }
}
