//! File-backed `CategoryStore` backend
//!
//! Holds the whole collection as one JSON document on disk:
//!
//! ```json
//! { "version": 1, "categories": [ { "id": 1, "name": "Shoes", ... } ] }
//! ```
//!
//! Reads are served from memory. Every mutation is applied to a copy of the
//! table, which replaces the live one only after the document is rewritten.
//! The rewrite goes to a sibling temp file that is renamed over the original,
//! so a crash mid-write leaves the previous document intact.

use crate::db::table::CategoryTable;
use crate::db::{CategoryStore, StoreError};
use crate::models::{Category, CategoryPatch, NewCategory};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    categories: Vec<Category>,
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: RwLock<CategoryTable>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating an empty document if none exists
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(StoreError::DirectoryCreationFailed)?;
            }
        }

        let table = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let document: StoreDocument = serde_json::from_slice(&bytes)?;
                CategoryTable::from_records(document.categories)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let table = CategoryTable::default();
                write_document(&path, &table).await?;
                table
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        tracing::info!("Opened category store at {}", path.display());

        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `staged`, then make it the live table
    ///
    /// The live table is left as it was when the write fails, so memory and
    /// disk never disagree.
    async fn commit(
        &self,
        live: &mut CategoryTable,
        staged: CategoryTable,
    ) -> Result<(), StoreError> {
        write_document(&self.path, &staged).await?;
        *live = staged;
        Ok(())
    }
}

async fn write_document(path: &Path, table: &CategoryTable) -> Result<(), StoreError> {
    let document = StoreDocument {
        version: DOCUMENT_VERSION,
        categories: table.all(),
    };
    let bytes = serde_json::to_vec_pretty(&document)?;

    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, bytes)
        .await
        .map_err(|e| StoreError::io(&staging, e))?;
    tokio::fs::rename(&staging, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

#[async_trait]
impl CategoryStore for JsonFileStore {
    async fn find_all(&self) -> Result<Vec<Category>> {
        Ok(self.table.read().await.all())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.table.read().await.get(id))
    }

    async fn insert(&self, category: NewCategory) -> Result<Category> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let created = staged.insert(category)?;
        self.commit(&mut table, staged).await?;
        Ok(created)
    }

    async fn insert_many(&self, categories: Vec<NewCategory>) -> Result<Vec<Category>> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let mut inserted = Vec::with_capacity(categories.len());
        let mut failure = None;
        for category in categories {
            match staged.insert(category) {
                Ok(created) => inserted.push(created),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        // Records inserted before a failure stay, matching the non-atomic contract.
        self.commit(&mut table, staged).await?;
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(inserted),
        }
    }

    async fn update(&self, id: i64, patch: CategoryPatch) -> Result<Category> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let updated = staged.update(id, &patch)?;
        self.commit(&mut table, staged).await?;
        Ok(updated)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let removed = staged.remove(id);
        if removed {
            self.commit(&mut table, staged).await?;
        }
        Ok(removed)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut table = self.table.write().await;
        let mut staged = table.clone();
        let count = staged.clear();
        self.commit(&mut table, staged).await?;
        Ok(count)
    }

    async fn count_children(&self, parent_id: i64) -> Result<usize> {
        Ok(self.table.read().await.count_children(parent_id))
    }
}
