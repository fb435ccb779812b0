/*
Renders binary trees with termtree. A node with a single child still shows
both slots so left and right stay distinguishable. Levels below MAX_DEPTH are
folded into a single marker.
 */
use std::cmp::Ordering;
use std::fmt::Display;

use generational_arena::Index;
use termtree::Tree;

use super::avl::AvlTree;
use super::bst::BinarySearchTree;
use super::node::{BalanceFactor, TreeNode};
use crate::domain::frontier::Stack;

const EMPTY_SLOT: &str = "·";
const ELIDED: &str = "…";
const MAX_DEPTH: usize = 64;

pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<T: Display, C: Fn(&T, &T) -> Ordering> TreeRender for BinarySearchTree<T, C> {
    fn to_tree_string(&self) -> Tree<String> {
        render(self, |_, node| node.data().to_string())
    }
}

impl<T: Display, C: Fn(&T, &T) -> Ordering> TreeRender for AvlTree<T, C> {
    fn to_tree_string(&self) -> Tree<String> {
        render(self.as_bst(), |idx, node| {
            format!("{} [{:+}]", node.data(), self.balance_factor(idx).unwrap_or(0))
        })
    }
}

enum Step {
    Enter(Index, usize),
    /// Parent whose `usize` finished children sit on top of `built`
    Assemble(Index, usize),
    Placeholder(&'static str),
}

// Post-order assembly: children are built onto `built` before their parent
// collects them.
fn render<T, C, L>(tree: &BinarySearchTree<T, C>, label: L) -> Tree<String>
where
    C: Fn(&T, &T) -> Ordering,
    L: Fn(Index, &TreeNode<T>) -> String,
{
    let Some(root) = tree.root() else {
        return Tree::new("Empty tree".to_string());
    };
    let mut built: Vec<Tree<String>> = Vec::new();
    let mut steps = Stack::new();
    steps.push(Step::Enter(root, 1));

    while let Some(step) = steps.pop() {
        match step {
            Step::Placeholder(text) => built.push(Tree::new(text.to_string())),
            Step::Enter(idx, depth) => {
                let Some(node) = tree.get(idx) else {
                    continue;
                };
                if node.is_leaf() {
                    built.push(Tree::new(label(idx, node)));
                    continue;
                }
                if depth >= MAX_DEPTH {
                    steps.push(Step::Assemble(idx, 1));
                    steps.push(Step::Placeholder(ELIDED));
                    continue;
                }
                steps.push(Step::Assemble(idx, 2));
                for child in [node.right(), node.left()] {
                    steps.push(match child {
                        Some(c) => Step::Enter(c, depth + 1),
                        None => Step::Placeholder(EMPTY_SLOT),
                    });
                }
            }
            Step::Assemble(idx, arity) => {
                let Some(node) = tree.get(idx) else {
                    continue;
                };
                let leaves = built.split_off(built.len().saturating_sub(arity));
                built.push(Tree::new(label(idx, node)).with_leaves(leaves));
            }
        }
    }
    built
        .pop()
        .unwrap_or_else(|| Tree::new("Empty tree".to_string()))
}
