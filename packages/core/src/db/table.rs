//! In-memory category table shared by the store backends

use crate::db::StoreError;
use crate::models::{Category, CategoryPatch, NewCategory};
use chrono::Utc;
use std::collections::BTreeMap;

/// Arena of category records keyed by id
#[derive(Debug, Default, Clone)]
pub(crate) struct CategoryTable {
    rows: BTreeMap<i64, Category>,
}

impl CategoryTable {
    pub(crate) fn from_records(records: Vec<Category>) -> Result<Self, StoreError> {
        let mut rows = BTreeMap::new();
        for record in records {
            let id = record.id;
            if rows.insert(id, record).is_some() {
                return Err(StoreError::duplicate_id(id));
            }
        }
        Ok(Self { rows })
    }

    pub(crate) fn all(&self) -> Vec<Category> {
        self.rows.values().cloned().collect()
    }

    pub(crate) fn get(&self, id: i64) -> Option<Category> {
        self.rows.get(&id).cloned()
    }

    pub(crate) fn insert(&mut self, new: NewCategory) -> Result<Category, StoreError> {
        if self.rows.contains_key(&new.id) {
            return Err(StoreError::duplicate_id(new.id));
        }
        let now = Utc::now();
        let category = Category {
            id: new.id,
            name: new.name,
            parent: new.parent,
            image: new.image,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(category.id, category.clone());
        Ok(category)
    }

    pub(crate) fn update(&mut self, id: i64, patch: &CategoryPatch) -> Result<Category, StoreError> {
        let category = self.rows.get_mut(&id).ok_or(StoreError::not_found(id))?;
        patch.apply_to(category);
        category.updated_at = Utc::now();
        Ok(category.clone())
    }

    pub(crate) fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }

    pub(crate) fn clear(&mut self) -> usize {
        let count = self.rows.len();
        self.rows.clear();
        count
    }

    pub(crate) fn count_children(&self, parent_id: i64) -> usize {
        self.rows
            .values()
            .filter(|c| c.parent == Some(parent_id))
            .count()
    }
}
