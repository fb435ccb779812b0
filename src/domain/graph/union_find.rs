//! Disjoint-set forest over dense element ids, used by Kruskal.

/// Union-find with path compression.
#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    /// Parent pointers (self-loop = root)
    parent: Vec<usize>,
    sets: usize,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            sets: n,
        }
    }

    pub(crate) fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // compress
        let mut cursor = x;
        while self.parent[cursor] != root {
            let next = self.parent[cursor];
            self.parent[cursor] = root;
            cursor = next;
        }
        root
    }

    /// Merge the sets of `x` and `y`; `false` if they were already one set.
    pub(crate) fn union(&mut self, x: usize, y: usize) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }
        self.parent[root_y] = root_x;
        self.sets -= 1;
        true
    }

    pub(crate) fn count(&self) -> usize {
        self.sets
    }
}
