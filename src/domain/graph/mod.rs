//! Directed graphs with named nodes and the algorithms that run on them.

pub mod analysis;
pub mod network;
pub mod ops;
pub mod snapshot;
pub mod store;
pub mod traversal;
mod union_find;

pub use network::{CriticalPath, ShortestPath};
pub use snapshot::GraphSnapshot;
pub use store::{Edge, EdgeSpec, Graph, Network, Node, NodeSpec, DEFAULT_WEIGHT};
pub use traversal::{BreadthFirstWalk, DepthFirstWalk, Direction, Walk};
