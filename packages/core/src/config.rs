/// Configuration for the category services
use serde::{Deserialize, Serialize};

/// Upper bound for uploaded import files and images (10 MiB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Hard ceiling accepted by `validate`
const MAX_SUPPORTED_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Reject create/update when another category already has the same name
    pub enforce_unique_names: bool,

    /// Blob store folder for category images
    pub image_folder: String,

    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            enforce_unique_names: true,
            image_folder: "categories".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl CatalogConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.image_folder.trim_matches('/').is_empty() {
            return Err("image_folder cannot be empty".to_string());
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        if self.max_upload_bytes > MAX_SUPPORTED_UPLOAD_BYTES {
            return Err(format!(
                "max_upload_bytes cannot exceed {}",
                MAX_SUPPORTED_UPLOAD_BYTES
            ));
        }

        Ok(())
    }
}
