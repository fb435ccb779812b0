//! Structural queries: connectivity, cycles, bridges, ordering, colouring.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument};

use super::store::{Edge, Graph};
use super::traversal::{BreadthFirstWalk, Direction};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::frontier::{Queue, Stack};

/// Discovery bookkeeping for Tarjan's bridge search.
#[derive(Default)]
struct Discovery {
    disc: HashMap<Index, usize>,
    low: HashMap<Index, usize>,
    timer: usize,
}

impl Discovery {
    fn enter(&mut self, node: Index) {
        self.timer += 1;
        self.disc.insert(node, self.timer);
        self.low.insert(node, self.timer);
    }

    fn lower(&mut self, node: Index, value: usize) {
        if let Some(low) = self.low.get_mut(&node) {
            *low = (*low).min(value);
        }
    }
}

/// One level of an explicit depth-first search: the node and the items it
/// still has to look at.
struct Frame<T> {
    node: Index,
    pending: std::vec::IntoIter<T>,
}

impl<T> Frame<T> {
    fn new(node: Index, pending: Vec<T>) -> Self {
        Self {
            node,
            pending: pending.into_iter(),
        }
    }
}

/// Frame of the bridge search, remembering the edge it was entered by.
struct LowLinkFrame<'g, E> {
    via: Option<&'g Edge<E>>,
    frame: Frame<&'g Edge<E>>,
}

impl<N, E> Graph<N, E> {
    /// True when every node is reachable from the first one ignoring edge
    /// direction. The empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.nodes().next() else {
            return true;
        };
        let reached = BreadthFirstWalk::new(self, Some(first.name()), Direction::Undirected).count();
        reached == self.node_count()
    }

    /// Every elementary directed cycle.
    ///
    /// Each cycle is reported once as a closed name sequence starting at its
    /// earliest registered node, e.g. `[A, B, C, A]`. The search from a start
    /// node only enters later-registered nodes of the same strongly connected
    /// component. Exponential in the number of cycles.
    #[instrument(level = "debug", skip(self))]
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let order = self.node_indices();
        let rank: HashMap<Index, usize> = order.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();
        let component = self.strong_components();
        let mut keys = HashSet::new();
        let mut found = Vec::new();

        for &start in &order {
            let eligible = |idx: Index| {
                component.get(&idx) == component.get(&start) && rank.get(&idx) > rank.get(&start)
            };
            let mut path = vec![start];
            let mut on_path = HashSet::from([start]);
            let mut frames = Stack::new();
            frames.push(Frame::new(start, self.successor_indices(start)));

            while let Some(frame) = frames.peek_mut() {
                let Some(next) = frame.pending.next() else {
                    frames.pop();
                    if let Some(left) = path.pop() {
                        on_path.remove(&left);
                    }
                    continue;
                };
                if next == start {
                    let mut cycle = self.names_of(&path);
                    cycle.push(self.name_of(start).to_string());
                    if keys.insert(cycle_key(&cycle)) {
                        found.push(cycle);
                    }
                } else if eligible(next) && on_path.insert(next) {
                    path.push(next);
                    frames.push(Frame::new(next, self.successor_indices(next)));
                }
            }
        }
        debug!(found = found.len(), "cycle search finished");
        found
    }

    /// Kosaraju: finish order over outgoing edges, then components collected
    /// backwards over incoming edges. Maps each node to a component number.
    pub(crate) fn strong_components(&self) -> HashMap<Index, usize> {
        let mut finished = Vec::with_capacity(self.node_count());
        let mut seen = HashSet::new();
        for root in self.node_indices() {
            if !seen.insert(root) {
                continue;
            }
            let mut frames = Stack::new();
            frames.push(Frame::new(root, self.successor_indices(root)));
            while let Some(frame) = frames.peek_mut() {
                match frame.pending.next() {
                    Some(next) => {
                        if seen.insert(next) {
                            frames.push(Frame::new(next, self.successor_indices(next)));
                        }
                    }
                    None => {
                        finished.push(frame.node);
                        frames.pop();
                    }
                }
            }
        }

        let mut component = HashMap::with_capacity(finished.len());
        for (number, &root) in finished.iter().rev().enumerate() {
            if component.contains_key(&root) {
                continue;
            }
            component.insert(root, number);
            let mut stack = Stack::new();
            stack.push(root);
            while let Some(current) = stack.pop() {
                for edge in self.in_edges(current) {
                    if !component.contains_key(&edge.source()) {
                        component.insert(edge.source(), number);
                        stack.push(edge.source());
                    }
                }
            }
        }
        component
    }

    fn successor_indices(&self, idx: Index) -> Vec<Index> {
        self.out_edges(idx).map(|edge| edge.target()).collect()
    }

    /// Edges whose removal disconnects the undirected view of the graph.
    ///
    /// Tarjan's low-link search on an explicit frame stack. The edge used to
    /// enter a node is skipped by identity, not by parent node, and bridges
    /// are reported as the search unwinds.
    #[instrument(level = "debug", skip(self))]
    pub fn bridges(&self) -> Vec<&Edge<E>> {
        let mut discovery = Discovery::default();
        let mut found = Vec::new();
        for start in self.node_indices() {
            if discovery.disc.contains_key(&start) {
                continue;
            }
            discovery.enter(start);
            let mut frames = Stack::new();
            frames.push(LowLinkFrame {
                via: None,
                frame: Frame::new(start, self.incident_edges(start).collect()),
            });

            while let Some(top) = frames.peek_mut() {
                let node = top.frame.node;
                let entered_by = top.via.map(|edge| edge.id());
                match top.frame.pending.next() {
                    Some(edge) if Some(edge.id()) == entered_by => {}
                    Some(edge) => {
                        let other = edge.other(node);
                        match discovery.disc.get(&other).copied() {
                            Some(seen) => discovery.lower(node, seen),
                            None => {
                                discovery.enter(other);
                                frames.push(LowLinkFrame {
                                    via: Some(edge),
                                    frame: Frame::new(other, self.incident_edges(other).collect()),
                                });
                            }
                        }
                    }
                    None => {
                        let Some(done) = frames.pop() else {
                            break;
                        };
                        let (Some(edge), Some(parent)) = (done.via, frames.peek()) else {
                            continue;
                        };
                        let parent = parent.frame.node;
                        let child_low = discovery.low.get(&done.frame.node).copied().unwrap_or(usize::MAX);
                        discovery.lower(parent, child_low);
                        if discovery.disc.get(&parent).is_some_and(|&d| child_low > d) {
                            found.push(edge);
                        }
                    }
                }
            }
        }
        found
    }

    /// Edges `u -> v` such that `v` is no longer reachable from `u` once the
    /// edge is gone.
    pub fn directed_bridges(&self) -> Vec<&Edge<E>> {
        self.edges()
            .filter(|edge| !self.reachable_without(edge.source(), edge.target(), edge.id()))
            .collect()
    }

    /// [`Graph::directed_bridges`] refusing graphs with more than `max_edges`
    /// edges, since every edge costs a full reachability search.
    pub fn directed_bridges_bounded(&self, max_edges: usize) -> DomainResult<Vec<&Edge<E>>> {
        if self.edge_count() > max_edges {
            return Err(DomainError::CapacityExceeded {
                what: "directed bridge search",
                limit: max_edges,
            });
        }
        Ok(self.directed_bridges())
    }

    fn reachable_without(&self, from: Index, to: Index, skip: Index) -> bool {
        let mut seen = HashSet::from([from]);
        let mut queue = Queue::new();
        queue.enqueue(from);
        while let Some(current) = queue.dequeue() {
            for edge in self.out_edges(current) {
                if edge.id() == skip {
                    continue;
                }
                let next = edge.target();
                if next == to {
                    return true;
                }
                if seen.insert(next) {
                    queue.enqueue(next);
                }
            }
        }
        false
    }

    /// Kahn's algorithm. `None` when the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<String>> {
        self.topological_indices()
            .map(|order| self.names_of(&order))
    }

    pub(crate) fn topological_indices(&self) -> Option<Vec<Index>> {
        let mut in_degree: HashMap<Index, usize> = HashMap::new();
        let mut ready = Queue::new();
        for idx in self.node_indices() {
            let degree = self.node_at(idx).map_or(0, |n| n.in_degree());
            if degree == 0 {
                ready.enqueue(idx);
            }
            in_degree.insert(idx, degree);
        }

        let mut order = Vec::with_capacity(self.node_count());
        while let Some(idx) = ready.dequeue() {
            order.push(idx);
            for edge in self.out_edges(idx) {
                if let Some(degree) = in_degree.get_mut(&edge.target()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.enqueue(edge.target());
                    }
                }
            }
        }

        (order.len() == self.node_count()).then_some(order)
    }

    /// Two-colouring of the undirected view, component by component.
    pub fn is_bipartite(&self) -> bool {
        let mut colour: HashMap<Index, bool> = HashMap::new();
        for start in self.node_indices() {
            if colour.contains_key(&start) {
                continue;
            }
            colour.insert(start, false);
            let mut queue = Queue::new();
            queue.enqueue(start);
            while let Some(current) = queue.dequeue() {
                let side = colour[&current];
                for edge in self.incident_edges(current) {
                    let other = edge.other(current);
                    match colour.get(&other) {
                        Some(&c) if c == side => return false,
                        Some(_) => {}
                        None => {
                            colour.insert(other, !side);
                            queue.enqueue(other);
                        }
                    }
                }
            }
        }
        true
    }

    /// A directed cycle through every node, starting and ending at the first
    /// registered node. Exponential in the worst case.
    pub fn hamiltonian_cycle(&self) -> Option<Vec<String>> {
        self.hamiltonian_search(None).ok().flatten()
    }

    /// [`Graph::hamiltonian_cycle`] giving up after `max_steps` extensions.
    pub fn hamiltonian_cycle_bounded(&self, max_steps: usize) -> DomainResult<Option<Vec<String>>> {
        self.hamiltonian_search(Some(max_steps))
    }

    fn hamiltonian_search(&self, budget: Option<usize>) -> DomainResult<Option<Vec<String>>> {
        let Some(start) = self.node_indices().first().copied() else {
            return Ok(None);
        };
        let total = self.node_count();
        let closes = |last: Index| self.out_edges(last).any(|e| e.target() == start);
        if total == 1 {
            return Ok(closes(start).then(|| self.closed_path(&[start])));
        }

        let mut path = vec![start];
        let mut on_path = HashSet::from([start]);
        let mut steps = 0usize;
        let mut frames = Stack::new();
        frames.push(Frame::new(start, self.successor_indices(start)));

        while let Some(frame) = frames.peek_mut() {
            let Some(next) = frame.pending.next() else {
                frames.pop();
                if let Some(left) = path.pop() {
                    on_path.remove(&left);
                }
                continue;
            };
            if on_path.contains(&next) {
                continue;
            }
            steps += 1;
            if let Some(limit) = budget {
                if steps > limit {
                    return Err(DomainError::CapacityExceeded {
                        what: "hamiltonian search",
                        limit,
                    });
                }
            }
            if path.len() + 1 == total {
                if closes(next) {
                    path.push(next);
                    return Ok(Some(self.closed_path(&path)));
                }
                continue;
            }
            path.push(next);
            on_path.insert(next);
            frames.push(Frame::new(next, self.successor_indices(next)));
        }
        Ok(None)
    }

    fn closed_path(&self, path: &[Index]) -> Vec<String> {
        let mut names = self.names_of(path);
        if let Some(&first) = path.first() {
            names.push(self.name_of(first).to_string());
        }
        names
    }
}

/// Rotation-independent identity of a closed cycle `[a, b, c, a]`.
fn cycle_key(cycle: &[String]) -> String {
    let open = &cycle[..cycle.len().saturating_sub(1)];
    let pivot = open
        .iter()
        .position_min()
        .unwrap_or_default();
    open[pivot..].iter().chain(&open[..pivot]).join("->")
}
