//! Binary search trees: the unbalanced core and the AVL layer on top of it.

pub mod avl;
pub mod bst;
pub mod iter;
pub mod node;
pub mod render;

pub use avl::AvlTree;
pub use bst::{BinarySearchTree, Comparator, DfsOrder};
pub use iter::{BreadthFirst, InOrder};
pub use node::{BalanceFactor, Side, TreeNode};
pub use render::TreeRender;
