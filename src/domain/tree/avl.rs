//! Height-balanced tree on top of [`BinarySearchTree`].
//!
//! Placement, removal and the rotation primitives come from the BST core;
//! this layer only keeps balance factors and picks rotations. Factors live
//! beside the arena, indexed by slot, so plain BST nodes carry none.

use std::cmp::Ordering;
use std::fmt;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use super::bst::{BinarySearchTree, Comparator, DfsOrder, UniqueSlot};
use super::iter::{BreadthFirst, InOrder};
use super::node::{BalanceFactor, Side, TreeNode};

/// Self-balancing (AVL) binary search tree.
#[derive(Clone)]
pub struct AvlTree<T, C = Comparator<T>> {
    tree: BinarySearchTree<T, C>,
    factors: Vec<i8>,
}

fn slot(idx: Index) -> usize {
    idx.into_raw_parts().0
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> AvlTree<T> {
    pub fn new() -> Self {
        Self {
            tree: BinarySearchTree::new(),
            factors: Vec::new(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for AvlTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree").field("tree", &self.tree).finish()
    }
}

impl<T, C> AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn with_comparator(compare: C) -> Self {
        Self {
            tree: BinarySearchTree::with_comparator(compare),
            factors: Vec::new(),
        }
    }

    pub fn unique(self, unique: bool) -> Self {
        Self {
            tree: self.tree.unique(unique),
            factors: self.factors,
        }
    }

    /// Read-only view of the underlying search tree.
    pub fn as_bst(&self) -> &BinarySearchTree<T, C> {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn root(&self) -> Option<Index> {
        self.tree.root()
    }

    pub fn get(&self, idx: Index) -> Option<&TreeNode<T>> {
        self.tree.get(idx)
    }

    pub fn find(&self, value: &T) -> Option<Index> {
        self.tree.find(value)
    }

    pub fn find_by<F: Fn(&T) -> Ordering>(&self, search: F) -> Option<Index> {
        self.tree.find_by(search)
    }

    pub fn find_id(&self, id: &str) -> Option<Index> {
        self.tree.find_id(id)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.tree.contains(value)
    }

    pub fn min(&self) -> Option<Index> {
        self.tree.min()
    }

    pub fn max(&self) -> Option<Index> {
        self.tree.max()
    }

    pub fn successor(&self, idx: Index) -> Option<Index> {
        self.tree.successor(idx)
    }

    pub fn predecessor(&self, idx: Index) -> Option<Index> {
        self.tree.predecessor(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.tree.iter()
    }

    pub fn iter_bfs(&self) -> BreadthFirst<'_, T> {
        self.tree.iter_bfs()
    }

    pub fn iter_in_order(&self) -> InOrder<'_, T> {
        self.tree.iter_in_order()
    }

    pub fn dfs(&self, order: DfsOrder) -> Vec<Index> {
        self.tree.dfs(order)
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.factors.clear();
    }

    // ------------------------------------------------------------------
    // mutation
    // ------------------------------------------------------------------

    pub fn insert(&mut self, data: T) -> Index
    where
        T: fmt::Display,
    {
        let id = data.to_string();
        self.insert_with_id(id, data)
    }

    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_with_id(&mut self, id: impl Into<String> + fmt::Debug, data: T) -> Index {
        let id = id.into();
        let data = match self.tree.claim_unique(&id, data) {
            UniqueSlot::Updated(idx) => return idx,
            UniqueSlot::Occupied(stale, data) => {
                self.delete_node(stale);
                data
            }
            UniqueSlot::Vacant(data) => data,
        };
        let idx = self.tree.attach(id, data);
        self.set_balance(idx, 0);
        self.rebalance_after_insert(idx);
        idx
    }

    pub fn delete(&mut self, value: &T) -> Option<T> {
        let idx = self.tree.find(value)?;
        self.delete_node(idx)
    }

    pub fn delete_by<F: Fn(&T) -> Ordering>(&mut self, search: F) -> Option<T> {
        let idx = self.tree.find_by(search)?;
        self.delete_node(idx)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn delete_node(&mut self, idx: Index) -> Option<T> {
        let detached = self.tree.detach(idx)?;
        self.rebalance_after_delete(detached.parent, detached.side);
        Some(detached.data)
    }

    // ------------------------------------------------------------------
    // balancing
    // ------------------------------------------------------------------

    // Walk up from the new node until a subtree keeps its height or one
    // rotation has been done.
    fn rebalance_after_insert(&mut self, inserted: Index) {
        let mut child = inserted;
        while let Some(parent) = self.tree.node(child).parent {
            let side = self.tree.side_of(parent, child);
            let balance = self.shift_balance(parent, side.growth());
            match balance {
                0 => break,
                -1 | 1 => child = parent,
                _ => {
                    self.rebalance(parent);
                    break;
                }
            }
        }
    }

    // Deletion can unbalance several ancestors, so every one up to the root
    // is checked. `shrunk` tracks whether the subtree below lost a level.
    fn rebalance_after_delete(&mut self, mut parent: Option<Index>, mut side: Option<Side>) {
        let mut shrunk = true;
        while let Some(node) = parent {
            let mut top = node;
            if shrunk {
                if let Some(s) = side {
                    let balance = self.shift_balance(node, -s.growth());
                    shrunk = balance == 0;
                }
            }
            if self.balance(node).abs() > 1 {
                top = self.rebalance(node);
                shrunk = self.balance(top) == 0;
            }
            parent = self.tree.node(top).parent;
            side = parent.map(|p| self.tree.side_of(p, top));
        }
    }

    fn shift_balance(&mut self, idx: Index, delta: i8) -> i8 {
        let balance = self.balance(idx) + delta;
        self.set_balance(idx, balance);
        balance
    }

    /// Restore the balance of `idx` by rotation; returns the new subtree root.
    fn rebalance(&mut self, idx: Index) -> Index {
        let balance = self.balance(idx);
        let heavy = if balance > 1 { Side::Right } else { Side::Left };
        let Some(child) = self.tree.node(idx).child(heavy) else {
            return idx;
        };
        let child_balance = self.balance(child);
        trace!(balance, child_balance, ?heavy, "rebalancing");

        match heavy {
            Side::Right if child_balance >= 0 => self.single_left(idx),
            Side::Right => self.double_right_left(idx),
            Side::Left if child_balance <= 0 => self.single_right(idx),
            Side::Left => self.double_left_right(idx),
        }
    }

    fn single_left(&mut self, x: Index) -> Index {
        let Some(z) = self.tree.rotate_left(x) else {
            return x;
        };
        let (xb, zb) = (self.balance(x), self.balance(z));
        let new_x = xb - 1 - zb.max(0);
        let new_z = zb - 1 + new_x.min(0);
        self.set_balance(x, new_x);
        self.set_balance(z, new_z);
        debug!("single left rotation");
        z
    }

    fn single_right(&mut self, x: Index) -> Index {
        let Some(z) = self.tree.rotate_right(x) else {
            return x;
        };
        let (xb, zb) = (self.balance(x), self.balance(z));
        let new_x = xb + 1 - zb.min(0);
        let new_z = zb + 1 + new_x.max(0);
        self.set_balance(x, new_x);
        self.set_balance(z, new_z);
        debug!("single right rotation");
        z
    }

    fn double_right_left(&mut self, x: Index) -> Index {
        let Some(z) = self.tree.node(x).right else {
            return x;
        };
        let Some(y) = self.tree.node(z).left else {
            return x;
        };
        let (xb, zb, yb) = (self.balance(x), self.balance(z), self.balance(y));
        if self.tree.rotate_right_left(x).is_none() {
            return x;
        }
        // right rotation at z, then left rotation at x
        let new_z = zb + 1 - yb.min(0);
        let mid_y = yb + 1 + new_z.max(0);
        let new_x = xb - 1 - mid_y.max(0);
        let new_y = mid_y - 1 + new_x.min(0);
        self.set_balance(x, new_x);
        self.set_balance(z, new_z);
        self.set_balance(y, new_y);
        debug!("double right-left rotation");
        y
    }

    fn double_left_right(&mut self, x: Index) -> Index {
        let Some(z) = self.tree.node(x).left else {
            return x;
        };
        let Some(y) = self.tree.node(z).right else {
            return x;
        };
        let (xb, zb, yb) = (self.balance(x), self.balance(z), self.balance(y));
        if self.tree.rotate_left_right(x).is_none() {
            return x;
        }
        // left rotation at z, then right rotation at x
        let new_z = zb - 1 - yb.max(0);
        let mid_y = yb - 1 + new_z.min(0);
        let new_x = xb + 1 - mid_y.min(0);
        let new_y = mid_y + 1 + new_x.max(0);
        self.set_balance(x, new_x);
        self.set_balance(z, new_z);
        self.set_balance(y, new_y);
        debug!("double left-right rotation");
        y
    }

    fn balance(&self, idx: Index) -> i8 {
        self.factors.get(slot(idx)).copied().unwrap_or(0)
    }

    // Arena slots are reused after removal, so a fresh node always resets
    // its slot here.
    fn set_balance(&mut self, idx: Index, balance: i8) {
        let slot = slot(idx);
        if slot >= self.factors.len() {
            self.factors.resize(slot + 1, 0);
        }
        if let Some(factor) = self.factors.get_mut(slot) {
            *factor = balance;
        }
    }

    /// Verify ordering plus every stored balance factor against real heights.
    pub fn is_balanced(&self) -> bool {
        self.tree.is_ordered()
            && self
                .tree
                .fold_heights(|idx, left, right| {
                    let real = right as i64 - left as i64;
                    let stored = i64::from(self.balance(idx));
                    (real.abs() <= 1 && real == stored).then_some(1 + left.max(right))
                })
                .is_some()
    }
}

impl<T, C> BalanceFactor for AvlTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    fn balance_factor(&self, idx: Index) -> Option<i8> {
        self.tree.get(idx).map(|_| self.balance(idx))
    }
}

impl<T: Ord + fmt::Display> FromIterator<T> for AvlTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: fmt::Display, C: Fn(&T, &T) -> Ordering> Extend<T> for AvlTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for data in iter {
            self.insert(data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn shape(tree: &AvlTree<i32>) -> (i32, Option<i32>, Option<i32>) {
        let root = tree.get(tree.root().unwrap()).unwrap();
        let data = |idx: Option<Index>| idx.map(|i| *tree.get(i).unwrap().data());
        (*root.data(), data(root.left()), data(root.right()))
    }

    #[rstest]
    #[case::right_right(&[1, 2, 3])]
    #[case::left_left(&[3, 2, 1])]
    #[case::left_right(&[3, 1, 2])]
    #[case::right_left(&[1, 3, 2])]
    fn three_keys_always_balance_to_root_two(#[case] keys: &[i32]) {
        let tree: AvlTree<i32> = keys.iter().copied().collect();
        assert_eq!(shape(&tree), (2, Some(1), Some(3)));
        assert!(tree.is_balanced());
    }

    #[test]
    fn balanced_after_every_insert() {
        let mut tree = AvlTree::new();
        for k in 0..200 {
            tree.insert((k * 37) % 101);
            assert!(tree.is_balanced(), "unbalanced after inserting step {k}");
        }
        assert_eq!(tree.len(), 200);
        assert!(tree.height() <= 11);
    }

    #[test]
    fn ascending_inserts_stay_logarithmic() {
        let tree: AvlTree<i32> = (1..=1023).collect();
        assert_eq!(tree.height(), 10);
        assert!(tree.is_balanced());
    }

    #[test]
    fn balanced_after_every_delete() {
        let mut tree: AvlTree<i32> = (0..64).collect();
        for k in (0..64).step_by(3) {
            assert_eq!(tree.delete(&k), Some(k));
            assert!(tree.is_balanced(), "unbalanced after deleting {k}");
        }
        let rest: Vec<i32> = tree.iter().copied().collect();
        let expected: Vec<i32> = (0..64).filter(|k| k % 3 != 0).collect();
        assert_eq!(rest, expected);
    }

    #[test]
    fn deleting_two_child_root_shrinks_by_one() {
        let mut tree: AvlTree<i32> = [4, 2, 6, 1, 3, 5, 7].into_iter().collect();
        let root = tree.root().unwrap();
        assert_eq!(tree.delete_node(root), Some(4));
        assert_eq!(tree.len(), 6);
        assert!(tree.is_balanced());
        assert!(!tree.contains(&4));
    }

    #[test]
    fn delete_cascades_rotations_up_the_tree() {
        // Fibonacci-shaped tree: removing from the short side forces
        // rebalancing at more than one level.
        let mut tree: AvlTree<i32> = [8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1].into_iter().collect();
        assert!(tree.is_balanced());
        tree.delete(&12);
        assert!(tree.is_balanced());
        tree.delete(&10);
        assert!(tree.is_balanced());
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn balance_factors_follow_rotations() {
        let mut tree: AvlTree<i32> = [2, 1, 3, 4].into_iter().collect();
        let root = tree.root().unwrap();
        assert_eq!(tree.balance_factor(root), Some(1));

        let three = tree.find(&3).unwrap();
        assert_eq!(tree.balance_factor(three), Some(1));
        tree.insert(5);
        // 3-4-5 rotated left under the root; 4 now parents 3 and 5
        let four = tree.find(&4).unwrap();
        assert_eq!(tree.balance_factor(four), Some(0));
        assert_eq!(tree.balance_factor(tree.find(&3).unwrap()), Some(0));
        assert!(tree.is_balanced());
    }

    #[test]
    fn freed_slot_is_reset_on_reuse() {
        let mut tree: AvlTree<i32> = [2, 1, 3, 4].into_iter().collect();
        let three = tree.find(&3).unwrap();
        assert_eq!(tree.balance_factor(three), Some(1));
        assert_eq!(tree.delete(&3), Some(3));
        assert_eq!(tree.balance_factor(three), None);

        // the arena hands 3's slot to the next node
        tree.insert(0);
        let zero = tree.find(&0).unwrap();
        assert_eq!(tree.balance_factor(zero), Some(0));
        assert_eq!(tree.balance_factor(tree.root().unwrap()), Some(-1));
        assert!(tree.is_balanced());
    }

    #[test]
    fn unique_mode_keeps_one_node_per_id() {
        let mut tree = AvlTree::new().unique(true);
        for k in [5, 3, 5, 3, 8] {
            tree.insert(k);
        }
        assert_eq!(tree.len(), 3);
        assert!(tree.is_balanced());
    }
}
