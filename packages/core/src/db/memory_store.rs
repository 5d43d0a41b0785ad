//! Volatile `CategoryStore` backend
//!
//! Keeps records in a `BTreeMap` behind a `tokio::sync::RwLock`. Used by tests
//! and benchmarks.

use crate::db::table::CategoryTable;
use crate::db::CategoryStore;
use crate::models::{Category, CategoryPatch, NewCategory};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<CategoryTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with records
    pub fn with_categories(categories: Vec<NewCategory>) -> Result<Self> {
        let mut table = CategoryTable::default();
        for category in categories {
            table.insert(category)?;
        }
        Ok(Self {
            table: RwLock::new(table),
        })
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Category>> {
        Ok(self.table.read().await.all())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.table.read().await.get(id))
    }

    async fn insert(&self, category: NewCategory) -> Result<Category> {
        Ok(self.table.write().await.insert(category)?)
    }

    async fn insert_many(&self, categories: Vec<NewCategory>) -> Result<Vec<Category>> {
        let mut table = self.table.write().await;
        let mut inserted = Vec::with_capacity(categories.len());
        for category in categories {
            inserted.push(table.insert(category)?);
        }
        Ok(inserted)
    }

    async fn update(&self, id: i64, patch: CategoryPatch) -> Result<Category> {
        Ok(self.table.write().await.update(id, &patch)?)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        Ok(self.table.write().await.remove(id))
    }

    async fn delete_all(&self) -> Result<usize> {
        Ok(self.table.write().await.clear())
    }

    async fn count_children(&self, parent_id: i64) -> Result<usize> {
        Ok(self.table.read().await.count_children(parent_id))
    }
}
