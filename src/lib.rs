//! arborgraph: self-balancing search trees and directed graphs with the
//! classic algorithms on top (traversal, bridges, shortest paths, spanning
//! trees, PERT/CPM).
//!
//! Layering: `domain` holds the data structures and algorithms, `application`
//! runs analyses over snapshot files, `infrastructure` provides the I/O
//! boundary, `cli` the command-line surface.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    AvlTree, BinarySearchTree, DomainError, DomainResult, EdgeSpec, Graph, Network, NodeSpec,
};
