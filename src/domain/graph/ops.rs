//! Whole-graph operations that build a new graph from existing ones.

use std::collections::HashSet;

use super::store::{Graph, NodeSpec};

impl<N: Clone, E: Clone> Graph<N, E> {
    /// Induced subgraph on `names`. Unknown names are ignored.
    pub fn subgraph(&self, names: &[&str]) -> Self {
        let keep: HashSet<&str> = names.iter().copied().collect();
        self.filtered(|name| keep.contains(name))
    }

    /// Nodes and edges of both graphs. Where both define a node or an edge,
    /// `self`'s copy wins.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for node in other.nodes() {
            if !out.contains_node(node.name()) {
                out.insert_node(spec_of(node));
            }
        }
        for edge in other.edges() {
            let (s, t) = other.endpoints(edge);
            if out.contains_edge(s, t) {
                continue;
            }
            if let (Some(source), Some(target)) = (out.index_of(s), out.index_of(t)) {
                out.insert_edge(source, target, edge.data().clone(), edge.weight());
            }
        }
        out
    }

    /// Subgraph induced by the nodes of `self` that `other` lacks.
    pub fn difference<M, F>(&self, other: &Graph<M, F>) -> Self {
        self.filtered(|name| !other.contains_node(name))
    }

    /// Tensor product. Node `(a, b)` is named `"a,b"` and carries both
    /// payloads; there is an edge `(a, b) -> (c, d)` for every pair of edges
    /// `a -> c` and `b -> d`.
    pub fn kronecker<M: Clone, F: Clone>(&self, other: &Graph<M, F>) -> Graph<(N, M), (E, F)> {
        let mut out = Graph::new();
        for left in self.nodes() {
            for right in other.nodes() {
                let name = product_name(left.name(), right.name());
                // names containing commas can collide; first pair wins
                if out.contains_node(&name) {
                    continue;
                }
                let mut spec = NodeSpec::new(name, (left.data().clone(), right.data().clone()));
                spec.value = multiply(left.value(), right.value());
                out.insert_node(spec);
            }
        }
        for left in self.edges() {
            let (ls, lt) = self.endpoints(left);
            for right in other.edges() {
                let (rs, rt) = other.endpoints(right);
                let (source_name, target_name) = (product_name(ls, rs), product_name(lt, rt));
                if out.contains_edge(&source_name, &target_name) {
                    continue;
                }
                let source = out.index_of(&source_name);
                let target = out.index_of(&target_name).filter(|t| Some(*t) != source);
                if let (Some(source), Some(target)) = (source, target) {
                    out.insert_edge(
                        source,
                        target,
                        (left.data().clone(), right.data().clone()),
                        multiply(left.weight(), right.weight()),
                    );
                }
            }
        }
        out.set_state(self.state().clone());
        out
    }

    fn filtered(&self, keep: impl Fn(&str) -> bool) -> Self {
        let mut out = Graph::new();
        for node in self.nodes().filter(|n| keep(n.name())) {
            out.insert_node(spec_of(node));
        }
        for edge in self.edges() {
            let (s, t) = self.endpoints(edge);
            if let (Some(source), Some(target)) = (out.index_of(s), out.index_of(t)) {
                out.insert_edge(source, target, edge.data().clone(), edge.weight());
            }
        }
        out.set_state(self.state().clone());
        out
    }
}

fn spec_of<N: Clone>(node: &super::store::Node<N>) -> NodeSpec<N> {
    NodeSpec {
        name: node.name().to_string(),
        data: node.data().clone(),
        value: node.value(),
    }
}

fn product_name(left: &str, right: &str) -> String {
    format!("{left},{right}")
}

fn multiply(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (Some(a), Some(b)) => Some(a * b),
        (Some(w), None) | (None, Some(w)) => Some(w),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::EdgeSpec;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph<u8, ()> {
        Graph::from_parts(
            nodes.iter().map(|n| NodeSpec::new(*n, 0)),
            edges.iter().map(|(s, t)| EdgeSpec::between(*s, *t)),
            serde_json::Value::Null,
        )
        .unwrap()
    }

    #[test]
    fn subgraph_keeps_only_internal_edges() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let sub = g.subgraph(&["a", "b", "zzz"]);
        assert_eq!(sub.node_names(), vec!["a", "b"]);
        assert!(sub.contains_edge("a", "b"));
        assert_eq!(sub.edge_count(), 1);
    }

    #[test]
    fn union_prefers_receiver_payloads() {
        let mut left = graph(&["a", "b"], &[("a", "b")]);
        *left.node_mut("a").unwrap().data_mut() = 1;
        let mut right = graph(&["a", "c"], &[("a", "c")]);
        *right.node_mut("a").unwrap().data_mut() = 2;

        let joined = left.union(&right);
        assert_eq!(joined.node_names(), vec!["a", "b", "c"]);
        assert_eq!(*joined.node("a").unwrap().data(), 1);
        assert!(joined.contains_edge("a", "c"));
        assert_eq!(joined.edge_count(), 2);
    }

    #[test]
    fn difference_drops_shared_nodes_and_their_edges() {
        let left = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let right = graph(&["b"], &[]);
        let diff = left.difference(&right);
        assert_eq!(diff.node_names(), vec!["a", "c"]);
        assert_eq!(diff.edge_count(), 0);
    }

    #[test]
    fn kronecker_pairs_nodes_and_edges() {
        let left = graph(&["a", "b"], &[("a", "b")]);
        let right = graph(&["x", "y"], &[("x", "y"), ("y", "x")]);
        let product = left.kronecker(&right);
        assert_eq!(product.node_names(), vec!["a,x", "a,y", "b,x", "b,y"]);
        assert_eq!(product.edge_count(), 2);
        assert!(product.contains_edge("a,x", "b,y"));
        assert!(product.contains_edge("a,y", "b,x"));
    }

    #[test]
    fn kronecker_multiplies_weights() {
        let mut left: Graph<(), ()> = Graph::new();
        left.add_node(NodeSpec::named("a"))
            .and_then(|g| g.add_node(NodeSpec::named("b")))
            .and_then(|g| g.add_edge(EdgeSpec::between("a", "b").weight(2.0)))
            .unwrap();
        let product = left.kronecker(&left);
        let edge = product.edge_between("a,a", "b,b").unwrap();
        assert_eq!(edge.weight(), Some(4.0));
    }
}
