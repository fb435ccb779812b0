//! Unbalanced binary search tree over a generational arena.
//!
//! Nodes are stored in an [`Arena`] and linked by [`Index`]. Rotations and
//! deletions only reassign indices, so multi-node surgery never holds two
//! mutable references at once.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use super::iter::{BreadthFirst, InOrder};
use super::node::{Side, TreeNode};
use crate::domain::frontier::Stack;

/// Default ordering strategy for `T: Ord`.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// Order in which [`BinarySearchTree::dfs`] reports nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfsOrder {
    PreOrder,
    InOrder,
    PostOrder,
}

/// What a physical removal left behind: the payload and where the tree shrank.
#[derive(Debug)]
pub(crate) struct Detached<T> {
    pub id: String,
    pub data: T,
    /// Former parent of the node that was physically unlinked
    pub parent: Option<Index>,
    /// Slot of `parent` that lost a level
    pub side: Option<Side>,
}

/// Outcome of probing unique mode before an insert.
pub(crate) enum UniqueSlot<T> {
    /// Existing node with the same id and an equal payload was overwritten.
    Updated(Index),
    /// Same id exists but the payload orders elsewhere; caller removes it first.
    Occupied(Index, T),
    Vacant(T),
}

/// Binary search tree ordered by an injected comparator.
#[derive(Clone)]
pub struct BinarySearchTree<T, C = Comparator<T>> {
    arena: Arena<TreeNode<T>>,
    root: Option<Index>,
    compare: C,
    unique: bool,
}

impl<T: Ord> Default for BinarySearchTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> BinarySearchTree<T> {
    pub fn new() -> Self {
        Self::with_comparator(T::cmp)
    }
}

impl<T: fmt::Debug, C> fmt::Debug for BinarySearchTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinarySearchTree")
            .field("root", &self.root)
            .field("len", &self.arena.len())
            .field("unique", &self.unique)
            .field("arena", &self.arena)
            .finish()
    }
}

impl<T, C> BinarySearchTree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn with_comparator(compare: C) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            compare,
            unique: false,
        }
    }

    /// Enable unique mode: inserting an existing id updates that node instead
    /// of adding a second one.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn get(&self, idx: Index) -> Option<&TreeNode<T>> {
        self.arena.get(idx)
    }

    pub(crate) fn node(&self, idx: Index) -> &TreeNode<T> {
        &self.arena[idx]
    }

    pub(crate) fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.compare)(a, b)
    }

    // ------------------------------------------------------------------
    // insertion
    // ------------------------------------------------------------------

    /// Insert `data` using its display form as the node id.
    pub fn insert(&mut self, data: T) -> Index
    where
        T: fmt::Display,
    {
        let id = data.to_string();
        self.insert_with_id(id, data)
    }

    /// Insert `data` under an explicit id.
    ///
    /// Returns the handle of the new node, or of the updated node in unique mode.
    pub fn insert_with_id(&mut self, id: impl Into<String>, data: T) -> Index {
        let id = id.into();
        match self.claim_unique(&id, data) {
            UniqueSlot::Updated(idx) => idx,
            UniqueSlot::Occupied(stale, data) => {
                self.delete_node(stale);
                self.attach(id, data)
            }
            UniqueSlot::Vacant(data) => self.attach(id, data),
        }
    }

    pub(crate) fn claim_unique(&mut self, id: &str, data: T) -> UniqueSlot<T> {
        if !self.unique {
            return UniqueSlot::Vacant(data);
        }
        match self.find_id(id) {
            Some(existing) if self.compare(&data, &self.arena[existing].data).is_eq() => {
                trace!(id, "unique mode: replacing payload in place");
                self.arena[existing].data = data;
                UniqueSlot::Updated(existing)
            }
            Some(existing) => UniqueSlot::Occupied(existing, data),
            None => UniqueSlot::Vacant(data),
        }
    }

    /// Place a new node by comparator-driven descent from the root.
    #[instrument(level = "trace", skip(self, data))]
    pub(crate) fn attach(&mut self, id: String, data: T) -> Index {
        let mut parent = None;
        let mut side = Side::Left;
        let mut cursor = self.root;

        while let Some(current) = cursor {
            parent = Some(current);
            let node = &self.arena[current];
            if self.compare(&data, &node.data).is_lt() {
                side = Side::Left;
                cursor = node.left;
            } else {
                side = Side::Right;
                cursor = node.right;
            }
        }

        let idx = self.arena.insert(TreeNode::new(id, data, parent));
        match parent {
            Some(p) => self.set_child(p, side, Some(idx)),
            None => self.root = Some(idx),
        }
        idx
    }

    // ------------------------------------------------------------------
    // search
    // ------------------------------------------------------------------

    /// Locate a node with `search(node_data)` telling where the target lies:
    /// `Less` left, `Equal` here, `Greater` right.
    pub fn find_by<F>(&self, search: F) -> Option<Index>
    where
        F: Fn(&T) -> Ordering,
    {
        let mut cursor = self.root;
        while let Some(current) = cursor {
            let node = &self.arena[current];
            cursor = match search(&node.data) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(current),
            };
        }
        None
    }

    pub fn find(&self, value: &T) -> Option<Index> {
        self.find_by(|data| self.compare(value, data))
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Linear scan for a node id; ids are not part of the ordering.
    pub fn find_id(&self, id: &str) -> Option<Index> {
        self.arena
            .iter()
            .find(|(_, node)| node.id == id)
            .map(|(idx, _)| idx)
    }

    pub fn min(&self) -> Option<Index> {
        self.root.and_then(|r| self.min_from(r))
    }

    pub fn max(&self) -> Option<Index> {
        self.root.and_then(|r| self.max_from(r))
    }

    /// Leftmost node of the subtree rooted at `idx`; `None` for a stale handle.
    pub fn min_from(&self, idx: Index) -> Option<Index> {
        let mut current = idx;
        while let Some(left) = self.arena.get(current)?.left {
            current = left;
        }
        Some(current)
    }

    /// Rightmost node of the subtree rooted at `idx`; `None` for a stale handle.
    pub fn max_from(&self, idx: Index) -> Option<Index> {
        let mut current = idx;
        while let Some(right) = self.arena.get(current)?.right {
            current = right;
        }
        Some(current)
    }

    /// In-order successor.
    pub fn successor(&self, idx: Index) -> Option<Index> {
        let node = self.arena.get(idx)?;
        if let Some(right) = node.right {
            return self.min_from(right);
        }
        self.climb_from(idx, Side::Right)
    }

    /// In-order predecessor.
    pub fn predecessor(&self, idx: Index) -> Option<Index> {
        let node = self.arena.get(idx)?;
        if let Some(left) = node.left {
            return self.max_from(left);
        }
        self.climb_from(idx, Side::Left)
    }

    // Walk up while we are the `side` child; the first ancestor reached from
    // the other side is the answer.
    fn climb_from(&self, idx: Index, side: Side) -> Option<Index> {
        let mut child = idx;
        let mut parent = self.arena[idx].parent;
        while let Some(p) = parent {
            if self.arena[p].child(side) != Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.arena[p].parent;
        }
        None
    }

    // ------------------------------------------------------------------
    // deletion
    // ------------------------------------------------------------------

    pub fn delete(&mut self, value: &T) -> Option<T> {
        let idx = self.find(value)?;
        self.delete_node(idx)
    }

    pub fn delete_by<F>(&mut self, search: F) -> Option<T>
    where
        F: Fn(&T) -> Ordering,
    {
        let idx = self.find_by(search)?;
        self.delete_node(idx)
    }

    /// Remove the node at `idx` and return its payload.
    ///
    /// For a node with two children the handle stays valid and now carries
    /// the in-order successor's id and payload.
    #[instrument(level = "trace", skip(self))]
    pub fn delete_node(&mut self, idx: Index) -> Option<T> {
        self.detach(idx).map(|d| d.data)
    }

    pub(crate) fn detach(&mut self, idx: Index) -> Option<Detached<T>> {
        let node = self.arena.get(idx)?;
        match (node.left, node.right) {
            (Some(_), Some(right)) => {
                let successor = self.min_from(right)?;
                let removed = self.splice_out(successor)?;
                let target = &mut self.arena[idx];
                let id = std::mem::replace(&mut target.id, removed.id);
                let data = std::mem::replace(&mut target.data, removed.data);
                debug!(id = %id, "deleted two-child node via successor");
                Some(Detached {
                    id,
                    data,
                    parent: removed.parent,
                    side: removed.side,
                })
            }
            _ => self.splice_out(idx),
        }
    }

    // Unlink a node with at most one child, moving the child into its slot.
    fn splice_out(&mut self, idx: Index) -> Option<Detached<T>> {
        let parent = self.arena.get(idx)?.parent;
        let side = parent.map(|p| self.side_of(p, idx));
        let node = self.arena.remove(idx)?;
        let child = node.left.or(node.right);

        if let Some(c) = child {
            self.arena[c].parent = parent;
        }
        match (parent, side) {
            (Some(p), Some(s)) => self.set_child(p, s, child),
            _ => self.root = child,
        }

        Some(Detached {
            id: node.id,
            data: node.data,
            parent,
            side,
        })
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    // ------------------------------------------------------------------
    // rotations
    // ------------------------------------------------------------------

    /// Single left rotation: the pivot's right child takes its place.
    ///
    /// Returns the new subtree root, or `None` (and no change) when the pivot
    /// has no right child.
    pub fn rotate_left(&mut self, pivot: Index) -> Option<Index> {
        let heir = self.arena.get(pivot)?.right?;
        self.rotate(pivot, heir, Side::Left);
        Some(heir)
    }

    /// Single right rotation: the pivot's left child takes its place.
    pub fn rotate_right(&mut self, pivot: Index) -> Option<Index> {
        let heir = self.arena.get(pivot)?.left?;
        self.rotate(pivot, heir, Side::Right);
        Some(heir)
    }

    /// Double rotation: left at the pivot's left child, then right at the pivot.
    pub fn rotate_left_right(&mut self, pivot: Index) -> Option<Index> {
        let left = self.arena.get(pivot)?.left?;
        self.arena[left].right?;
        self.rotate_left(left)?;
        self.rotate_right(pivot)
    }

    /// Double rotation: right at the pivot's right child, then left at the pivot.
    pub fn rotate_right_left(&mut self, pivot: Index) -> Option<Index> {
        let right = self.arena.get(pivot)?.right?;
        self.arena[right].left?;
        self.rotate_right(right)?;
        self.rotate_left(pivot)
    }

    // `direction` is the way the pivot moves down: Left means heir was the
    // right child. The heir's inner subtree changes sides.
    fn rotate(&mut self, pivot: Index, heir: Index, direction: Side) {
        let inner = self.arena[heir].child(direction);
        let parent = self.arena[pivot].parent;

        // 1. former parent now points at the heir
        match parent {
            Some(p) => {
                let side = self.side_of(p, pivot);
                self.set_child(p, side, Some(heir));
            }
            None => self.root = Some(heir),
        }
        self.arena[heir].parent = parent;

        // 2. inner subtree moves under the pivot
        self.set_child(pivot, direction.opposite(), inner);
        if let Some(i) = inner {
            self.arena[i].parent = Some(pivot);
        }

        // 3. pivot becomes the heir's child
        self.set_child(heir, direction, Some(pivot));
        self.arena[pivot].parent = Some(heir);
    }

    pub(crate) fn side_of(&self, parent: Index, child: Index) -> Side {
        if self.arena[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn set_child(&mut self, parent: Index, side: Side, child: Option<Index>) {
        let node = &mut self.arena[parent];
        match side {
            Side::Left => node.left = child,
            Side::Right => node.right = child,
        }
    }

    // ------------------------------------------------------------------
    // traversal
    // ------------------------------------------------------------------

    pub fn iter_bfs(&self) -> BreadthFirst<'_, T> {
        BreadthFirst::new(&self.arena, self.root)
    }

    pub fn iter_in_order(&self) -> InOrder<'_, T> {
        InOrder::new(&self.arena, self.root)
    }

    /// Payloads in comparator order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter_in_order().map(|(_, node)| &node.data)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.iter_in_order().map(|(_, node)| node.id.as_str()).collect()
    }

    /// Depth-first collection of node handles.
    pub fn dfs(&self, order: DfsOrder) -> Vec<Index> {
        let mut out = Vec::with_capacity(self.len());
        // (node, emit): an emit entry is reported, the other expands
        let mut stack = Stack::new();
        if let Some(root) = self.root {
            stack.push((root, false));
        }
        while let Some((idx, emit)) = stack.pop() {
            if emit {
                out.push(idx);
                continue;
            }
            let Some(node) = self.arena.get(idx) else {
                continue;
            };
            let left = node.left.map(|l| (l, false));
            let right = node.right.map(|r| (r, false));
            let here = Some((idx, true));
            // pushed in reverse visiting order
            let plan = match order {
                DfsOrder::PreOrder => [right, left, here],
                DfsOrder::InOrder => [right, here, left],
                DfsOrder::PostOrder => [here, right, left],
            };
            for entry in plan.into_iter().flatten() {
                stack.push(entry);
            }
        }
        out
    }

    pub fn height(&self) -> usize {
        self.fold_heights(|_, left, right| Some(1 + left.max(right)))
            .unwrap_or(0)
    }

    /// Post-order sweep computing subtree heights bottom-up.
    ///
    /// `visit(node, left_height, right_height)` returns the height to record
    /// for `node`, or `None` to abort the sweep. Yields the root's height.
    pub(crate) fn fold_heights<F>(&self, mut visit: F) -> Option<usize>
    where
        F: FnMut(Index, usize, usize) -> Option<usize>,
    {
        let mut heights: HashMap<Index, usize> = HashMap::new();
        let mut stack = Stack::new();
        if let Some(root) = self.root {
            stack.push((root, false));
        }
        while let Some((idx, children_done)) = stack.pop() {
            let node = self.arena.get(idx)?;
            if children_done {
                let left = node.left.and_then(|l| heights.remove(&l)).unwrap_or(0);
                let right = node.right.and_then(|r| heights.remove(&r)).unwrap_or(0);
                heights.insert(idx, visit(idx, left, right)?);
            } else {
                stack.push((idx, true));
                for child in [node.right, node.left].into_iter().flatten() {
                    stack.push((child, false));
                }
            }
        }
        Some(self.root.and_then(|r| heights.remove(&r)).unwrap_or(0))
    }

    /// Shape check only: subtree heights differ by at most one everywhere.
    pub fn is_height_balanced(&self) -> bool {
        self.fold_heights(|_, left, right| (left.abs_diff(right) <= 1).then_some(1 + left.max(right)))
            .is_some()
    }

    /// Check the ordering invariant and every parent back-reference.
    pub fn is_ordered(&self) -> bool {
        let Some(root) = self.root else {
            return true;
        };
        if self.arena.get(root).map_or(true, |n| n.parent.is_some()) {
            return false;
        }
        // (node, lower bound holder, upper bound holder)
        let mut stack = Stack::new();
        stack.push((root, None, None));
        while let Some((idx, lower, upper)) = stack.pop() {
            let Some(node) = self.arena.get(idx) else {
                return false;
            };
            // Both bounds are inclusive: rotations can move an equal key to either side.
            if self.data_at(lower).is_some_and(|lo| self.compare(&node.data, lo).is_lt()) {
                return false;
            }
            if self.data_at(upper).is_some_and(|hi| self.compare(&node.data, hi).is_gt()) {
                return false;
            }
            for (child, lo, hi) in [(node.left, lower, Some(idx)), (node.right, Some(idx), upper)] {
                let Some(c) = child else {
                    continue;
                };
                if self.arena.get(c).map(|n| n.parent) != Some(Some(idx)) {
                    return false;
                }
                stack.push((c, lo, hi));
            }
        }
        true
    }

    fn data_at(&self, idx: Option<Index>) -> Option<&T> {
        idx.and_then(|i| self.arena.get(i)).map(|n| &n.data)
    }
}

impl<T: Ord + fmt::Display> FromIterator<T> for BinarySearchTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: fmt::Display, C: Fn(&T, &T) -> Ordering> Extend<T> for BinarySearchTree<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for data in iter {
            self.insert(data);
        }
    }
}
