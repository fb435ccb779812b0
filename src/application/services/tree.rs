//! Tree building service behind the `tree` command.

use serde::Serialize;
use tracing::debug;

use crate::config::TreeSettings;
use crate::domain::{AvlTree, BinarySearchTree, TreeRender};

/// What the `tree` command prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeReport {
    pub rendered: String,
    pub in_order: Vec<i64>,
    pub height: usize,
    pub len: usize,
    pub balanced: bool,
}

pub struct TreeService {
    settings: TreeSettings,
}

impl TreeService {
    pub fn new(settings: TreeSettings) -> Self {
        Self { settings }
    }

    /// Insert `keys` in order into an AVL tree, or a plain BST when `plain`.
    pub fn build(&self, keys: &[i64], plain: bool) -> TreeReport {
        debug!(count = keys.len(), plain, unique = self.settings.unique, "building tree");
        if plain {
            let mut tree = BinarySearchTree::new().unique(self.settings.unique);
            tree.extend(keys.iter().copied());
            TreeReport {
                rendered: tree.to_tree_string().to_string(),
                in_order: tree.iter().copied().collect(),
                height: tree.height(),
                len: tree.len(),
                balanced: tree.is_height_balanced(),
            }
        } else {
            let mut tree = AvlTree::new().unique(self.settings.unique);
            tree.extend(keys.iter().copied());
            TreeReport {
                rendered: tree.to_tree_string().to_string(),
                in_order: tree.iter().copied().collect(),
                height: tree.height(),
                len: tree.len(),
                balanced: tree.is_balanced(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_sorted_keys_when_avl_then_height_is_logarithmic() {
        let svc = TreeService::new(TreeSettings::default());
        let report = svc.build(&(1..=7).collect::<Vec<_>>(), false);
        assert_eq!(report.height, 3);
        assert!(report.balanced);
        assert_eq!(report.in_order, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn given_sorted_keys_when_plain_then_tree_degenerates() {
        let svc = TreeService::new(TreeSettings::default());
        let report = svc.build(&[1, 2, 3, 4], true);
        assert_eq!(report.height, 4);
        assert!(!report.balanced);
    }

    #[test]
    fn given_unique_setting_when_duplicate_keys_then_kept_once() {
        let svc = TreeService::new(TreeSettings { unique: true });
        let report = svc.build(&[5, 3, 5, 3], false);
        assert_eq!(report.in_order, vec![3, 5]);
        assert_eq!(report.len, 2);
    }
}
