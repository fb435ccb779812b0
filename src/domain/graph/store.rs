//! Node registry keyed by name with per-node incoming/outgoing edge maps.
//!
//! Nodes and edges live in generational arenas owned by the graph. A node's
//! edge maps hold edge indices keyed by the neighbour's name, so both
//! directions of an edge are reachable in O(log d) from either endpoint.

use std::collections::{BTreeMap, HashMap};

use generational_arena::{Arena, Index};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Weight assumed by the network algorithms for an edge without one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Input for [`Graph::add_node`]; also the node entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec<N> {
    pub name: String,
    #[serde(default)]
    pub data: N,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl<N> NodeSpec<N> {
    pub fn new(name: impl Into<String>, data: N) -> Self {
        Self {
            name: name.into(),
            data,
            value: None,
        }
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

impl<N: Default> NodeSpec<N> {
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, N::default())
    }
}

/// Input for [`Graph::add_edge`]; also the edge entry of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec<E> {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub data: E,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl<E> EdgeSpec<E> {
    pub fn new(source: impl Into<String>, target: impl Into<String>, data: E) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            data,
            weight: None,
        }
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

impl<E: Default> EdgeSpec<E> {
    pub fn between(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, E::default())
    }
}

/// Graph vertex.
#[derive(Debug, Clone)]
pub struct Node<N> {
    name: String,
    data: N,
    value: Option<f64>,
    /// Registration sequence number, defines registry order
    seq: u64,
    outgoing: BTreeMap<String, Index>,
    incoming: BTreeMap<String, Index>,
}

impl<N> Node<N> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &N {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut N {
        &mut self.data
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn set_value(&mut self, value: Option<f64>) {
        self.value = value;
    }

    pub fn out_degree(&self) -> usize {
        self.outgoing.len()
    }

    pub fn in_degree(&self) -> usize {
        self.incoming.len()
    }

    /// Names of the targets of outgoing edges.
    pub fn successors(&self) -> impl Iterator<Item = &str> {
        self.outgoing.keys().map(String::as_str)
    }

    /// Names of the sources of incoming edges.
    pub fn predecessors(&self) -> impl Iterator<Item = &str> {
        self.incoming.keys().map(String::as_str)
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn outgoing(&self) -> &BTreeMap<String, Index> {
        &self.outgoing
    }

    pub(crate) fn incoming(&self) -> &BTreeMap<String, Index> {
        &self.incoming
    }
}

/// Directed edge between two registered nodes.
#[derive(Debug, Clone)]
pub struct Edge<E> {
    id: Index,
    source: Index,
    target: Index,
    data: E,
    weight: Option<f64>,
}

impl<E> Edge<E> {
    pub fn id(&self) -> Index {
        self.id
    }

    pub fn source(&self) -> Index {
        self.source
    }

    pub fn target(&self) -> Index {
        self.target
    }

    pub fn data(&self) -> &E {
        &self.data
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    /// Weight used by the network algorithms.
    pub fn cost(&self) -> f64 {
        self.weight.unwrap_or(DEFAULT_WEIGHT)
    }

    /// The endpoint opposite to `node`.
    pub fn other(&self, node: Index) -> Index {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

/// Directed graph with named nodes and at most one edge per ordered pair.
#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    nodes: Arena<Node<N>>,
    edges: Arena<Edge<E>>,
    names: HashMap<String, Index>,
    registry: BTreeMap<u64, Index>,
    next_seq: u64,
    state: serde_json::Value,
}

/// A graph whose algorithms read edge weights; same storage.
pub type Network<N, E> = Graph<N, E>;

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            edges: Arena::new(),
            names: HashMap::new(),
            registry: BTreeMap::new(),
            next_seq: 0,
            state: serde_json::Value::Null,
        }
    }

    /// Build a graph from node and edge lists plus an opaque state value.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = NodeSpec<N>>,
        edges: impl IntoIterator<Item = EdgeSpec<E>>,
        state: serde_json::Value,
    ) -> DomainResult<Self> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }
        graph.state = state;
        Ok(graph)
    }

    // ------------------------------------------------------------------
    // mutation
    // ------------------------------------------------------------------

    #[instrument(level = "trace", skip(self, spec), fields(name = %spec.name))]
    pub fn add_node(&mut self, spec: NodeSpec<N>) -> DomainResult<&mut Self> {
        if self.names.contains_key(&spec.name) {
            return Err(DomainError::duplicate_node(&spec.name));
        }
        self.insert_node(spec);
        Ok(self)
    }

    pub(crate) fn insert_node(&mut self, spec: NodeSpec<N>) -> Index {
        let seq = self.next_seq;
        self.next_seq += 1;
        let idx = self.nodes.insert(Node {
            name: spec.name.clone(),
            data: spec.data,
            value: spec.value,
            seq,
            outgoing: BTreeMap::new(),
            incoming: BTreeMap::new(),
        });
        self.names.insert(spec.name, idx);
        self.registry.insert(seq, idx);
        idx
    }

    /// Add a directed edge. The graph is unchanged on error.
    #[instrument(level = "trace", skip(self, spec), fields(source = %spec.source, target = %spec.target))]
    pub fn add_edge(&mut self, spec: EdgeSpec<E>) -> DomainResult<&mut Self> {
        let source = self
            .index_of(&spec.source)
            .ok_or_else(|| DomainError::MissingReference(spec.source.clone()))?;
        let target = self
            .index_of(&spec.target)
            .ok_or_else(|| DomainError::MissingReference(spec.target.clone()))?;
        if source == target {
            return Err(DomainError::SelfLoop(spec.source));
        }
        if self.nodes[source].outgoing.contains_key(&spec.target) {
            return Err(DomainError::duplicate_edge(&spec.source, &spec.target));
        }
        self.insert_edge(source, target, spec.data, spec.weight);
        Ok(self)
    }

    pub(crate) fn insert_edge(
        &mut self,
        source: Index,
        target: Index,
        data: E,
        weight: Option<f64>,
    ) -> Index {
        let id = self.edges.insert_with(|id| Edge {
            id,
            source,
            target,
            data,
            weight,
        });
        let target_name = self.nodes[target].name.clone();
        let source_name = self.nodes[source].name.clone();
        self.nodes[source].outgoing.insert(target_name, id);
        self.nodes[target].incoming.insert(source_name, id);
        id
    }

    /// Remove a node and every incident edge. Returns `None` if absent.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_node(&mut self, name: &str) -> Option<N> {
        let idx = self.names.remove(name)?;
        let node = self.nodes.remove(idx)?;
        self.registry.remove(&node.seq);

        for edge_id in node.outgoing.values() {
            if let Some(edge) = self.edges.remove(*edge_id) {
                if let Some(target) = self.nodes.get_mut(edge.target) {
                    target.incoming.remove(name);
                }
            }
        }
        for edge_id in node.incoming.values() {
            if let Some(edge) = self.edges.remove(*edge_id) {
                if let Some(source) = self.nodes.get_mut(edge.source) {
                    source.outgoing.remove(name);
                }
            }
        }
        debug!(
            name,
            detached = node.outgoing.len() + node.incoming.len(),
            "removed node"
        );
        Some(node.data)
    }

    /// Remove the edge `source -> target`. Returns `None` if absent.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_edge(&mut self, source: &str, target: &str) -> Option<E> {
        let s = self.index_of(source)?;
        let t = self.index_of(target)?;
        let edge_id = self.nodes[s].outgoing.remove(target)?;
        self.nodes[t].incoming.remove(source);
        self.edges.remove(edge_id).map(|edge| edge.data)
    }

    pub fn set_state(&mut self, state: serde_json::Value) -> &mut Self {
        self.state = state;
        self
    }

    // ------------------------------------------------------------------
    // lookup
    // ------------------------------------------------------------------

    pub fn state(&self) -> &serde_json::Value {
        &self.state
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        self.edge_between(source, target).is_some()
    }

    pub fn index_of(&self, name: &str) -> Option<Index> {
        self.names.get(name).copied()
    }

    pub fn node(&self, name: &str) -> Option<&Node<N>> {
        self.index_of(name).and_then(|idx| self.nodes.get(idx))
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node<N>> {
        let idx = self.index_of(name)?;
        self.nodes.get_mut(idx)
    }

    pub fn node_at(&self, idx: Index) -> Option<&Node<N>> {
        self.nodes.get(idx)
    }

    pub fn edge(&self, id: Index) -> Option<&Edge<E>> {
        self.edges.get(id)
    }

    pub fn edge_between(&self, source: &str, target: &str) -> Option<&Edge<E>> {
        let id = *self.node(source)?.outgoing.get(target)?;
        self.edges.get(id)
    }

    /// `(source, target)` names of an edge.
    pub fn endpoints(&self, edge: &Edge<E>) -> (&str, &str) {
        (self.name_of(edge.source), self.name_of(edge.target))
    }

    /// Nodes in registry (insertion) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<N>> {
        self.registry.values().map(|&idx| &self.nodes[idx])
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes().map(Node::name).collect()
    }

    /// Edges grouped by source in registry order, then by target name.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<E>> {
        self.nodes()
            .flat_map(|node| node.outgoing.values())
            .map(|&id| &self.edges[id])
    }

    pub fn successors(&self, name: &str) -> Vec<&str> {
        self.node(name)
            .map(|node| node.successors().collect())
            .unwrap_or_default()
    }

    pub fn predecessors(&self, name: &str) -> Vec<&str> {
        self.node(name)
            .map(|node| node.predecessors().collect())
            .unwrap_or_default()
    }

    /// Successors followed by predecessors, without repeats.
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        let mut out = self.successors(name);
        for pred in self.predecessors(name) {
            if !out.contains(&pred) {
                out.push(pred);
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // index-level helpers for the algorithms
    // ------------------------------------------------------------------

    pub(crate) fn name_of(&self, idx: Index) -> &str {
        &self.nodes[idx].name
    }

    pub(crate) fn names_of(&self, path: &[Index]) -> Vec<String> {
        path.iter().map(|&idx| self.name_of(idx).to_string()).collect()
    }

    pub(crate) fn node_indices(&self) -> Vec<Index> {
        self.registry.values().copied().collect()
    }

    pub(crate) fn out_edges(&self, idx: Index) -> impl Iterator<Item = &Edge<E>> {
        self.nodes[idx].outgoing.values().map(|&id| &self.edges[id])
    }

    pub(crate) fn in_edges(&self, idx: Index) -> impl Iterator<Item = &Edge<E>> {
        self.nodes[idx].incoming.values().map(|&id| &self.edges[id])
    }

    /// Outgoing then incoming edges: the undirected view of `idx`.
    pub(crate) fn incident_edges(&self, idx: Index) -> impl Iterator<Item = &Edge<E>> {
        self.out_edges(idx).chain(self.in_edges(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph<(), ()> {
        Graph::from_parts(
            nodes.iter().map(|n| NodeSpec::named(*n)),
            edges.iter().map(|(s, t)| EdgeSpec::between(*s, *t)),
            serde_json::Value::Null,
        )
        .unwrap()
    }

    #[test]
    fn add_node_rejects_duplicate_names() {
        let mut g: Graph<(), ()> = Graph::new();
        g.add_node(NodeSpec::named("a")).unwrap();
        let err = g.add_node(NodeSpec::named("a")).unwrap_err();
        assert!(matches!(err, DomainError::DuplicateKey { kind: "node", .. }));
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn add_edge_rejects_self_loops_and_parallel_edges() {
        let mut g = graph(&["a", "b"], &[("a", "b")]);
        assert_eq!(
            g.add_edge(EdgeSpec::between("a", "a")).unwrap_err(),
            DomainError::SelfLoop("a".into())
        );
        assert!(matches!(
            g.add_edge(EdgeSpec::between("a", "b")).unwrap_err(),
            DomainError::DuplicateKey { kind: "edge", .. }
        ));
        // the reverse direction is a different ordered pair
        g.add_edge(EdgeSpec::between("b", "a")).unwrap();
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn edge_maps_are_mutually_consistent() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("c", "b")]);
        assert_eq!(g.successors("a"), vec!["b"]);
        assert_eq!(g.predecessors("b"), vec!["a", "c"]);
        assert_eq!(g.neighbors("b"), vec!["a", "c"]);
        let edge = g.edge_between("c", "b").unwrap();
        assert_eq!(g.endpoints(edge), ("c", "b"));
    }

    #[test]
    fn remove_edge_is_absent_tolerant() {
        let mut g = graph(&["a", "b"], &[("a", "b")]);
        assert_eq!(g.remove_edge("a", "b"), Some(()));
        assert_eq!(g.remove_edge("a", "b"), None);
        assert_eq!(g.remove_edge("x", "b"), None);
        assert!(g.predecessors("b").is_empty());
    }

    #[test]
    fn nodes_iterate_in_registry_order_after_removal() {
        let mut g = graph(&["c", "a", "b"], &[]);
        g.remove_node("a");
        g.add_node(NodeSpec::named("a")).unwrap();
        assert_eq!(g.node_names(), vec!["c", "b", "a"]);
    }

    #[test]
    fn chained_mutators() {
        let mut g: Graph<u8, ()> = Graph::new();
        g.add_node(NodeSpec::new("a", 1))
            .and_then(|g| g.add_node(NodeSpec::new("b", 2).value(0.5)))
            .and_then(|g| g.add_edge(EdgeSpec::between("a", "b").weight(3.0)))
            .unwrap();
        assert_eq!(g.node("b").unwrap().value(), Some(0.5));
        assert_eq!(g.edge_between("a", "b").unwrap().cost(), 3.0);
    }
}
