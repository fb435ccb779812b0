use generational_arena::Index;
use std::fmt;

/// Which child slot of a parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Balance-factor delta when the subtree on this side gets one level taller.
    pub(crate) fn growth(self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

/// Trees that keep a balance factor, height(right) - height(left), per node.
pub trait BalanceFactor {
    /// Stored factor of the node at `idx`; `None` for a stale handle.
    fn balance_factor(&self, idx: Index) -> Option<i8>;
}

/// Tree node in the arena-based binary search tree.
///
/// Links are arena indices: `parent` is a back-reference used for upward
/// walks, `left` and `right` are the owned children.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    pub(crate) id: String,
    pub(crate) data: T,
    pub(crate) parent: Option<Index>,
    pub(crate) left: Option<Index>,
    pub(crate) right: Option<Index>,
}

impl<T> TreeNode<T> {
    pub(crate) fn new(id: String, data: T, parent: Option<Index>) -> Self {
        Self {
            id,
            data,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn parent(&self) -> Option<Index> {
        self.parent
    }

    pub fn left(&self) -> Option<Index> {
        self.left
    }

    pub fn right(&self) -> Option<Index> {
        self.right
    }

    pub fn child(&self, side: Side) -> Option<Index> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl<T: fmt::Display> fmt::Display for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}
