//! Cycle Guard
//!
//! Validates that giving a category a new parent keeps the hierarchy a forest.
//! The guard walks the ancestor chain of the proposed parent, one store lookup
//! per level, and fails if it meets the category being moved.
//!
//! The walk is bounded by the number of records in the store. A chain longer
//! than that can only mean the stored data already contains a cycle, which is
//! reported as `CorruptHierarchy` instead of looping forever.
//!
//! Protection is best-effort under concurrent writers: records read mid-walk
//! may already be stale.

use crate::db::CategoryStore;
use crate::models::Hierarchical;
use crate::services::error::{storage_error, CategoryServiceError};
use std::collections::{HashMap, HashSet};

pub struct CycleGuard<'a> {
    store: &'a dyn CategoryStore,
}

impl<'a> CycleGuard<'a> {
    pub fn new(store: &'a dyn CategoryStore) -> Self {
        Self { store }
    }

    /// Check that `node_id` may take `new_parent_id` as its parent
    ///
    /// # Errors
    ///
    /// - `CyclicAssignment` if `new_parent_id == node_id` or `node_id` is an
    ///   ancestor of `new_parent_id`
    /// - `CorruptHierarchy` if the walk exceeds the record count
    /// - `StorageError` if a lookup fails
    pub async fn check(&self, node_id: i64, new_parent_id: i64) -> Result<(), CategoryServiceError> {
        if new_parent_id == node_id {
            return Err(CategoryServiceError::cyclic_assignment(node_id, new_parent_id));
        }

        let limit = self
            .store
            .find_all()
            .await
            .map_err(|e| storage_error("count categories", e))?
            .len();

        let mut current = new_parent_id;
        let mut steps = 0usize;
        loop {
            if current == node_id {
                tracing::debug!(
                    "Rejected parent {} for {}: {} is an ancestor",
                    new_parent_id,
                    node_id,
                    node_id
                );
                return Err(CategoryServiceError::cyclic_assignment(node_id, new_parent_id));
            }

            steps += 1;
            if steps > limit {
                tracing::error!(
                    "Ancestor walk from {} exceeded {} steps; stored hierarchy contains a cycle",
                    new_parent_id,
                    limit
                );
                return Err(CategoryServiceError::corrupt_hierarchy(new_parent_id, limit));
            }

            let record = self
                .store
                .find_by_id(current)
                .await
                .map_err(|e| storage_error("load ancestor", e))?;

            match record.and_then(|r| r.parent) {
                Some(parent) => current = parent,
                // Reached a root, or a dangling link that ends the chain
                None => return Ok(()),
            }
        }
    }
}

/// Find a parent link that closes a cycle in an in-memory record set.
///
/// Returns the id of one record whose `parent` should be cleared to break the
/// first cycle found (records are scanned in input order), or `None` if the
/// set is already a forest. Call repeatedly until it returns `None` to break
/// every cycle.
pub fn first_cycle_closing_edge<T: Hierarchical>(records: &[T]) -> Option<i64> {
    let parents: HashMap<i64, Option<i64>> =
        records.iter().map(|r| (r.id(), r.parent())).collect();
    // Ids already known to lead to a root
    let mut settled: HashSet<i64> = HashSet::new();

    for record in records {
        if settled.contains(&record.id()) {
            continue;
        }

        // Walk up from this record; the chain is bounded by the record count
        let mut seen = Vec::new();
        let mut current = Some(record.id());
        while let Some(id) = current {
            if settled.contains(&id) {
                break;
            }
            if seen.contains(&id) {
                // The last record walked points back into the chain
                return seen.last().copied();
            }
            seen.push(id);
            current = parents.get(&id).copied().flatten();
        }

        settled.extend(seen);
    }

    None
}
