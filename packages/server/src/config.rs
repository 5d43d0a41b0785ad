//! Runtime server configuration
//!
//! Read once from the environment at startup and immutable afterwards.
//!
//! | Variable | Default |
//! |---|---|
//! | `CATALOG_PORT` | `5000` |
//! | `CATALOG_DATA_DIR` | `~/.catalog` |
//! | `CATALOG_UPLOAD_DIR` | `<data>/uploads` |
//! | `CATALOG_MEDIA_DIR` | `<data>/media` |
//! | `CATALOG_MEDIA_BASE_URL` | `/media` |
//! | `CATALOG_UNIQUE_NAMES` | `true` |
//! | `CATALOG_MAX_UPLOAD_BYTES` | `10485760` |
//! | `CORS_ALLOW_ORIGIN` | local dev origins |

use anyhow::{anyhow, Context, Result};
use catalog_core::CatalogConfig;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MEDIA_BASE_URL: &str = "/media";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,

    /// Directory holding the category document
    pub data_dir: PathBuf,

    /// Temp files for in-flight import uploads
    pub upload_dir: PathBuf,

    /// Category images, served under `media_base_url`
    pub media_dir: PathBuf,

    pub media_base_url: String,

    /// Single allowed CORS origin; the local dev origins when unset
    pub cors_origin: Option<String>,

    pub catalog: CatalogConfig,
}

impl ServerConfig {
    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            port: DEFAULT_PORT,
            upload_dir: data_dir.join("uploads"),
            media_dir: data_dir.join("media"),
            data_dir,
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            cors_origin: None,
            catalog: CatalogConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = match get("CATALOG_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or_else(|| anyhow!("Failed to get home directory; set CATALOG_DATA_DIR"))?
                .join(".catalog"),
        };

        let mut config = Self::with_data_dir(data_dir);

        if let Some(port) = get("CATALOG_PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid CATALOG_PORT '{}'", port))?;
        }
        if let Some(dir) = get("CATALOG_UPLOAD_DIR") {
            config.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("CATALOG_MEDIA_DIR") {
            config.media_dir = PathBuf::from(dir);
        }
        if let Some(url) = get("CATALOG_MEDIA_BASE_URL") {
            config.media_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(flag) = get("CATALOG_UNIQUE_NAMES") {
            config.catalog.enforce_unique_names = parse_flag(&flag)
                .ok_or_else(|| anyhow!("Invalid CATALOG_UNIQUE_NAMES '{}'", flag))?;
        }
        if let Some(bytes) = get("CATALOG_MAX_UPLOAD_BYTES") {
            config.catalog.max_upload_bytes = bytes
                .trim()
                .parse()
                .with_context(|| format!("Invalid CATALOG_MAX_UPLOAD_BYTES '{}'", bytes))?;
        }
        config.cors_origin = get("CORS_ALLOW_ORIGIN");

        config.catalog.validate().map_err(|e| anyhow!(e))?;
        Ok(config)
    }

    /// Path of the JSON category document
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("categories.json")
    }

    /// Route prefix to serve media from, if the base URL is a local path
    pub fn media_route(&self) -> Option<&str> {
        let route = self.media_base_url.as_str();
        (route.starts_with('/') && route.len() > 1).then_some(route)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_follow_data_dir() {
        let config = ServerConfig::from_lookup(lookup(&[("CATALOG_DATA_DIR", "/srv/catalog")]))
            .unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.upload_dir, PathBuf::from("/srv/catalog/uploads"));
        assert_eq!(config.media_dir, PathBuf::from("/srv/catalog/media"));
        assert_eq!(config.store_path(), PathBuf::from("/srv/catalog/categories.json"));
        assert_eq!(config.media_route(), Some("/media"));
        assert!(config.catalog.enforce_unique_names);
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("CATALOG_DATA_DIR", "/srv/catalog"),
            ("CATALOG_PORT", "8080"),
            ("CATALOG_UPLOAD_DIR", "/tmp/uploads"),
            ("CATALOG_MEDIA_BASE_URL", "https://cdn.example.com/"),
            ("CATALOG_UNIQUE_NAMES", "off"),
            ("CORS_ALLOW_ORIGIN", "https://admin.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/uploads"));
        assert_eq!(config.media_base_url, "https://cdn.example.com");
        assert_eq!(config.media_route(), None);
        assert!(!config.catalog.enforce_unique_names);
        assert_eq!(
            config.cors_origin.as_deref(),
            Some("https://admin.example.com")
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let base = ("CATALOG_DATA_DIR", "/srv/catalog");
        assert!(ServerConfig::from_lookup(lookup(&[base, ("CATALOG_PORT", "http")])).is_err());
        assert!(
            ServerConfig::from_lookup(lookup(&[base, ("CATALOG_UNIQUE_NAMES", "maybe")])).is_err()
        );
        assert!(
            ServerConfig::from_lookup(lookup(&[base, ("CATALOG_MAX_UPLOAD_BYTES", "0")])).is_err()
        );
    }
}
