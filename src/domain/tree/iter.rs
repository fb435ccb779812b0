use generational_arena::{Arena, Index};

use super::node::TreeNode;
use crate::domain::frontier::{Queue, Stack};

/// Level-order iterator, driven by a queue seeded with the root.
pub struct BreadthFirst<'a, T> {
    arena: &'a Arena<TreeNode<T>>,
    queue: Queue<Index>,
}

impl<'a, T> BreadthFirst<'a, T> {
    pub(crate) fn new(arena: &'a Arena<TreeNode<T>>, root: Option<Index>) -> Self {
        let mut queue = Queue::new();
        if let Some(root) = root {
            queue.enqueue(root);
        }
        Self { arena, queue }
    }
}

impl<'a, T> Iterator for BreadthFirst<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.dequeue()?;
        let node = self.arena.get(current)?;
        for child in [node.left, node.right].into_iter().flatten() {
            self.queue.enqueue(child);
        }
        Some((current, node))
    }
}

/// In-order iterator on an explicit stack of pending left spines.
pub struct InOrder<'a, T> {
    arena: &'a Arena<TreeNode<T>>,
    stack: Stack<Index>,
}

impl<'a, T> InOrder<'a, T> {
    pub(crate) fn new(arena: &'a Arena<TreeNode<T>>, root: Option<Index>) -> Self {
        let mut iter = Self {
            arena,
            stack: Stack::new(),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut cursor: Option<Index>) {
        while let Some(idx) = cursor {
            self.stack.push(idx);
            cursor = self.arena.get(idx).and_then(|n| n.left);
        }
    }
}

impl<'a, T> Iterator for InOrder<'a, T> {
    type Item = (Index, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let node = self.arena.get(current)?;
        self.push_left_spine(node.right);
        Some((current, node))
    }
}
