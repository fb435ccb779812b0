//! Domain layer: trees, graphs and their algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod frontier;
pub mod graph;
pub mod tree;

pub use error::{DomainError, DomainResult};
pub use frontier::{Frontier, Queue, Stack};
pub use graph::{
    CriticalPath, Edge, EdgeSpec, Graph, GraphSnapshot, Network, Node, NodeSpec, ShortestPath,
};
pub use tree::{AvlTree, BalanceFactor, BinarySearchTree, DfsOrder, Side, TreeNode, TreeRender};
