//! FIFO and LIFO containers used as traversal frontiers.
//!
//! Both are thin wrappers with O(1) push/pop. The `Frontier` trait lets a
//! single walk run breadth-first on a [`Queue`] or depth-first on a [`Stack`].
//! A [`Stack`] also serves as the explicit frame stack of the iterative
//! depth-first algorithms.

use std::collections::VecDeque;

/// Container a traversal draws its next candidate from.
pub trait Frontier<T> {
    fn take(&mut self) -> Option<T>;

    /// Put a batch of successors so that the first of them is taken first.
    fn put_all(&mut self, items: Vec<T>);
}

/// First-in first-out queue.
#[derive(Debug, Clone)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    /// Item that the next `dequeue` returns.
    pub fn peek(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Frontier<T> for Queue<T> {
    fn take(&mut self) -> Option<T> {
        self.dequeue()
    }

    fn put_all(&mut self, items: Vec<T>) {
        self.items.extend(items);
    }
}

/// Last-in first-out stack.
#[derive(Debug, Clone)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    /// Top frame, for algorithms that advance it in place.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Frontier<T> for Stack<T> {
    fn take(&mut self) -> Option<T> {
        self.pop()
    }

    // Push in reverse order for left-to-right traversal
    fn put_all(&mut self, items: Vec<T>) {
        self.items.extend(items.into_iter().rev());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_fifo() {
        let mut q = Queue::new();
        q.enqueue(1);
        q.enqueue(2);
        q.enqueue(3);
        assert_eq!(q.peek(), Some(&1));
        assert_eq!(q.dequeue(), Some(1));
        assert_eq!(q.dequeue(), Some(2));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn stack_is_lifo() {
        let mut s = Stack::new();
        s.push(1);
        s.push(2);
        assert_eq!(s.peek(), Some(&2));
        assert_eq!(s.pop(), Some(2));
        assert_eq!(s.pop(), Some(1));
        assert!(s.pop().is_none());
    }

    #[test]
    fn peek_mut_advances_the_top_frame_in_place() {
        let mut s = Stack::new();
        s.push(vec![1, 2].into_iter());
        s.push(vec![3].into_iter());

        assert_eq!(s.peek_mut().and_then(Iterator::next), Some(3));
        assert_eq!(s.peek_mut().and_then(Iterator::next), None);
        s.pop();
        assert_eq!(s.peek_mut().and_then(Iterator::next), Some(1));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn put_all_keeps_first_item_first_for_both_frontiers() {
        let mut q = Queue::new();
        q.put_all(vec!["a", "b"]);
        assert_eq!(q.take(), Some("a"));

        let mut s = Stack::new();
        s.put_all(vec!["a", "b"]);
        assert_eq!(s.take(), Some("a"));
        assert_eq!(s.take(), Some("b"));
    }
}
