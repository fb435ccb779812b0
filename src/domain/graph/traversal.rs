//! Breadth-first and depth-first traversal.
//!
//! One [`Walk`] iterator does the visiting; the frontier type picks the
//! order. The callback drivers (sync and async) consume the same walk, so
//! ordering semantics cannot drift between them.

use std::collections::HashSet;
use std::future::Future;

use generational_arena::Index;
use tracing::warn;

use super::store::{Graph, Node};
use crate::domain::frontier::{Frontier, Queue, Stack};

/// Which edges a walk follows from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Undirected,
}

/// Visits every node reachable from the seeds once.
///
/// Without an explicit start the seeds are all nodes in registry order, so
/// disconnected components are picked up in turn.
pub struct Walk<'g, N, E, F> {
    graph: &'g Graph<N, E>,
    frontier: F,
    seeds: std::vec::IntoIter<Index>,
    visited: HashSet<Index>,
    direction: Direction,
}

pub type BreadthFirstWalk<'g, N, E> = Walk<'g, N, E, Queue<Index>>;
pub type DepthFirstWalk<'g, N, E> = Walk<'g, N, E, Stack<Index>>;

impl<'g, N, E, F: Frontier<Index> + Default> Walk<'g, N, E, F> {
    pub(crate) fn new(graph: &'g Graph<N, E>, start: Option<&str>, direction: Direction) -> Self {
        let seeds = match start {
            Some(name) => graph.index_of(name).into_iter().collect(),
            None => graph.node_indices(),
        };
        Self {
            graph,
            frontier: F::default(),
            seeds: seeds.into_iter(),
            visited: HashSet::new(),
            direction,
        }
    }
}

impl<'g, N, E, F: Frontier<Index>> Iterator for Walk<'g, N, E, F> {
    type Item = &'g Node<N>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let current = match self.frontier.take() {
                Some(idx) => idx,
                None => self.seeds.next()?,
            };
            if !self.visited.insert(current) {
                continue;
            }
            let graph = self.graph;
            let next: Vec<Index> = match self.direction {
                Direction::Outgoing => graph.out_edges(current).map(|e| e.target()).collect(),
                Direction::Undirected => graph
                    .incident_edges(current)
                    .map(|e| e.other(current))
                    .collect(),
            };
            self.frontier.put_all(
                next.into_iter()
                    .filter(|idx| !self.visited.contains(idx))
                    .collect(),
            );
            return graph.node_at(current);
        }
    }
}

impl<N, E> Graph<N, E> {
    /// Breadth-first walk over outgoing edges.
    pub fn breadth_first(&self, start: Option<&str>) -> BreadthFirstWalk<'_, N, E> {
        Walk::new(self, start, Direction::Outgoing)
    }

    /// Depth-first (pre-order) walk over outgoing edges.
    pub fn depth_first(&self, start: Option<&str>) -> DepthFirstWalk<'_, N, E> {
        Walk::new(self, start, Direction::Outgoing)
    }

    /// Visit nodes breadth-first, returning the visit order.
    ///
    /// A failing `visit` does not stop the walk; the error is handed to
    /// `on_error` together with the node it came from.
    pub fn bfs<Err, V, H>(&self, start: Option<&str>, visit: V, on_error: H) -> Vec<String>
    where
        V: FnMut(&Node<N>) -> Result<(), Err>,
        H: FnMut(&Node<N>, Err),
    {
        drive(self.breadth_first(start), visit, on_error)
    }

    /// Visit nodes depth-first, returning the visit order.
    pub fn dfs<Err, V, H>(&self, start: Option<&str>, visit: V, on_error: H) -> Vec<String>
    where
        V: FnMut(&Node<N>) -> Result<(), Err>,
        H: FnMut(&Node<N>, Err),
    {
        drive(self.depth_first(start), visit, on_error)
    }

    /// Like [`Graph::bfs`], awaiting each visit before moving on.
    pub async fn bfs_async<'g, Err, V, Fut, H>(
        &'g self,
        start: Option<&str>,
        visit: V,
        on_error: H,
    ) -> Vec<String>
    where
        V: FnMut(&'g Node<N>) -> Fut,
        Fut: Future<Output = Result<(), Err>>,
        H: FnMut(&'g Node<N>, Err),
    {
        drive_async(self.breadth_first(start), visit, on_error).await
    }

    /// Like [`Graph::dfs`], awaiting each visit before moving on.
    pub async fn dfs_async<'g, Err, V, Fut, H>(
        &'g self,
        start: Option<&str>,
        visit: V,
        on_error: H,
    ) -> Vec<String>
    where
        V: FnMut(&'g Node<N>) -> Fut,
        Fut: Future<Output = Result<(), Err>>,
        H: FnMut(&'g Node<N>, Err),
    {
        drive_async(self.depth_first(start), visit, on_error).await
    }
}

fn drive<'g, N: 'g, I, Err, V, H>(walk: I, mut visit: V, mut on_error: H) -> Vec<String>
where
    I: Iterator<Item = &'g Node<N>>,
    V: FnMut(&Node<N>) -> Result<(), Err>,
    H: FnMut(&Node<N>, Err),
{
    let mut order = Vec::new();
    for node in walk {
        order.push(node.name().to_string());
        if let Err(err) = visit(node) {
            warn!(node = node.name(), "visit failed, routed to error handler");
            on_error(node, err);
        }
    }
    order
}

async fn drive_async<'g, N: 'g, I, Err, V, Fut, H>(
    walk: I,
    mut visit: V,
    mut on_error: H,
) -> Vec<String>
where
    I: Iterator<Item = &'g Node<N>>,
    V: FnMut(&'g Node<N>) -> Fut,
    Fut: Future<Output = Result<(), Err>>,
    H: FnMut(&'g Node<N>, Err),
{
    let mut order = Vec::new();
    for node in walk {
        order.push(node.name().to_string());
        if let Err(err) = visit(node).await {
            warn!(node = node.name(), "async visit failed, routed to error handler");
            on_error(node, err);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{EdgeSpec, NodeSpec};

    //  A -> B -> D
    //  A -> C -> D
    fn diamond() -> Graph<(), ()> {
        Graph::from_parts(
            ["A", "B", "C", "D"].map(|n| NodeSpec::named(n)),
            [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]
                .map(|(s, t)| EdgeSpec::between(s, t)),
            serde_json::Value::Null,
        )
        .unwrap()
    }

    fn no_errors(_: &Node<()>, _: ()) {}

    #[test]
    fn bfs_visits_by_level() {
        let g = diamond();
        let order = g.bfs(Some("A"), |_| Ok::<(), ()>(()), no_errors);
        assert_eq!(order, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn dfs_goes_deep_first() {
        let g = diamond();
        let order = g.dfs(Some("A"), |_| Ok::<(), ()>(()), no_errors);
        assert_eq!(order, vec!["A", "B", "D", "C"]);
    }

    #[test]
    fn unreachable_nodes_are_not_visited_from_explicit_start() {
        let g = diamond();
        let order = g.bfs(Some("C"), |_| Ok::<(), ()>(()), no_errors);
        assert_eq!(order, vec!["C", "D"]);
    }

    #[test]
    fn without_start_every_node_is_visited_once() {
        let mut g = diamond();
        g.add_node(NodeSpec::named("Z")).unwrap();
        let order: Vec<&str> = g.depth_first(None).map(Node::name).collect();
        assert_eq!(order, vec!["A", "B", "D", "C", "Z"]);
    }

    #[test]
    fn unknown_start_yields_nothing() {
        let g = diamond();
        assert_eq!(g.breadth_first(Some("nope")).count(), 0);
    }

    #[test]
    fn failing_visit_is_routed_and_walk_continues() {
        let g = diamond();
        let mut failed = Vec::new();
        let order = g.bfs(
            Some("A"),
            |node| {
                if node.name() == "B" {
                    Err("boom")
                } else {
                    Ok(())
                }
            },
            |node, err| failed.push((node.name().to_string(), err)),
        );
        assert_eq!(order.len(), 4);
        assert_eq!(failed, vec![("B".to_string(), "boom")]);
    }

    #[test]
    fn undirected_walk_follows_incoming_edges() {
        let g = diamond();
        let order: Vec<&str> = BreadthFirstWalk::new(&g, Some("D"), Direction::Undirected)
            .map(Node::name)
            .collect();
        assert_eq!(order, vec!["D", "B", "C", "A"]);
    }
}
