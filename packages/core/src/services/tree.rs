//! Tree Builder
//!
//! Turns a flat parent-pointer list into a nested forest. Pure: the input is
//! only read, and the output is rebuilt from scratch on every call.
//!
//! # Matching Rules
//!
//! - Roots are records with `parent == None`
//! - Children of `id` are records with `parent == Some(id)`
//! - Siblings keep their input order
//! - A record whose parent doesn't exist is never attached; use
//!   [`unreachable_ids`] to find such orphans
//!
//! # Examples
//!
//! ```rust
//! use catalog_core::models::NewCategory;
//! use catalog_core::services::tree::build_forest;
//!
//! let records = vec![
//!     NewCategory::new(1, "Shoes", None),
//!     NewCategory::new(2, "Sneakers", Some(1)),
//! ];
//! let forest = build_forest(&records, None);
//! assert_eq!(forest[0].children[0].name, "Sneakers");
//! ```

use crate::models::{Hierarchical, TreeNode};
use std::collections::{HashMap, HashSet};

/// Build the forest hanging under `parent_id` (`None` = all roots)
pub fn build_forest<T: Hierarchical>(records: &[T], parent_id: Option<i64>) -> Vec<TreeNode> {
    // Adjacency list: parent -> children, in input order
    let mut adjacency: HashMap<Option<i64>, Vec<&T>> = HashMap::new();
    for record in records {
        adjacency.entry(record.parent()).or_default().push(record);
    }

    // The starting node never reappears as its own descendant
    let mut visited: HashSet<i64> = parent_id.into_iter().collect();
    build_level(&adjacency, parent_id, &mut visited)
}

fn build_level<T: Hierarchical>(
    adjacency: &HashMap<Option<i64>, Vec<&T>>,
    parent_id: Option<i64>,
    visited: &mut HashSet<i64>,
) -> Vec<TreeNode> {
    let Some(children) = adjacency.get(&parent_id) else {
        return Vec::new();
    };

    let mut level = Vec::with_capacity(children.len());
    for child in children {
        // A record can only appear once; this also stops at cycles
        if !visited.insert(child.id()) {
            continue;
        }
        level.push(TreeNode {
            id: child.id(),
            name: child.name().to_string(),
            children: build_level(adjacency, Some(child.id()), visited),
        });
    }
    level
}

/// Total number of nodes in a forest
pub fn forest_size(forest: &[TreeNode]) -> usize {
    forest.iter().map(TreeNode::size).sum()
}

/// Ids of records that are not reachable from the roots (orphans and cycle members)
pub fn unreachable_ids<T: Hierarchical>(records: &[T], forest: &[TreeNode]) -> Vec<i64> {
    let mut reachable = HashSet::new();
    let mut stack: Vec<&TreeNode> = forest.iter().collect();
    while let Some(node) = stack.pop() {
        reachable.insert(node.id);
        stack.extend(node.children.iter());
    }

    records
        .iter()
        .map(Hierarchical::id)
        .filter(|id| !reachable.contains(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewCategory;

    fn record(id: i64, name: &str, parent: Option<i64>) -> NewCategory {
        NewCategory::new(id, name, parent)
    }

    #[test]
    fn test_empty_input_gives_empty_forest() {
        let records: Vec<NewCategory> = Vec::new();
        assert!(build_forest(&records, None).is_empty());
    }

    #[test]
    fn test_shoes_and_sneakers() {
        let records = vec![record(1, "Shoes", None), record(2, "Sneakers", Some(1))];
        let forest = build_forest(&records, None);

        assert_eq!(
            forest,
            vec![TreeNode {
                id: 1,
                name: "Shoes".into(),
                children: vec![TreeNode {
                    id: 2,
                    name: "Sneakers".into(),
                    children: vec![],
                }],
            }]
        );
    }

    #[test]
    fn test_every_child_appears_once_under_its_parent() {
        let records = vec![
            record(1, "A", None),
            record(2, "B", Some(1)),
            record(3, "C", Some(1)),
            record(4, "D", Some(3)),
            record(5, "E", None),
        ];
        let forest = build_forest(&records, None);

        assert_eq!(forest.len(), 2);
        let a = &forest[0];
        assert_eq!(
            a.children.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(a.children[1].children[0].id, 4);
        assert_eq!(forest_size(&forest), records.len());
        assert!(unreachable_ids(&records, &forest).is_empty());
    }

    #[test]
    fn test_orphans_are_left_out() {
        let records = vec![
            record(1, "A", None),
            record(2, "B", Some(99)),
            record(3, "C", Some(2)),
        ];
        let forest = build_forest(&records, None);

        assert_eq!(forest_size(&forest), 1);
        assert!(forest_size(&forest) < records.len());
        assert_eq!(unreachable_ids(&records, &forest), vec![2, 3]);
    }

    #[test]
    fn test_subtree_from_given_parent() {
        let records = vec![
            record(1, "A", None),
            record(2, "B", Some(1)),
            record(3, "C", Some(2)),
        ];
        let subtree = build_forest(&records, Some(1));
        assert_eq!(subtree.len(), 1);
        assert_eq!(subtree[0].id, 2);
        assert_eq!(subtree[0].children[0].id, 3);
    }

    #[test]
    fn test_cycle_members_terminate() {
        let records = vec![record(1, "A", Some(2)), record(2, "B", Some(1))];

        assert!(build_forest(&records, None).is_empty());

        let below = build_forest(&records, Some(1));
        assert_eq!(forest_size(&below), 1);
        assert_eq!(below[0].id, 2);
        assert!(below[0].children.is_empty());
    }

    #[test]
    fn test_root_on_longer_cycle_is_not_its_own_descendant() {
        let records = vec![
            record(1, "A", Some(3)),
            record(2, "B", Some(1)),
            record(3, "C", Some(2)),
            record(4, "D", Some(1)),
        ];
        let below = build_forest(&records, Some(1));

        assert_eq!(forest_size(&below), 3);
        let mut stack: Vec<&TreeNode> = below.iter().collect();
        while let Some(node) = stack.pop() {
            assert_ne!(node.id, 1);
            stack.extend(node.children.iter());
        }
    }
}
