//! JSON-ready snapshot of a graph and the conversions to and from [`Graph`].

use serde::{Deserialize, Serialize};

use super::store::{EdgeSpec, Graph, NodeSpec};
use crate::domain::error::DomainResult;

/// Serializable form of a graph: node list, edge list, opaque state.
///
/// Loading a snapshot goes through the regular mutators, so a malformed
/// snapshot fails with the same errors as building the graph by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot<N, E> {
    #[serde(default)]
    pub nodes: Vec<NodeSpec<N>>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec<E>>,
    #[serde(default)]
    pub state: serde_json::Value,
}

impl<N: Clone, E: Clone> Graph<N, E> {
    pub fn to_snapshot(&self) -> GraphSnapshot<N, E> {
        let nodes = self
            .nodes()
            .map(|n| NodeSpec {
                name: n.name().to_string(),
                data: n.data().clone(),
                value: n.value(),
            })
            .collect();
        let edges = self
            .edges()
            .map(|e| {
                let (source, target) = self.endpoints(e);
                EdgeSpec {
                    source: source.to_string(),
                    target: target.to_string(),
                    data: e.data().clone(),
                    weight: e.weight(),
                }
            })
            .collect();
        GraphSnapshot {
            nodes,
            edges,
            state: self.state().clone(),
        }
    }
}

impl<N, E> Graph<N, E> {
    pub fn from_snapshot(snapshot: GraphSnapshot<N, E>) -> DomainResult<Self> {
        Self::from_parts(snapshot.nodes, snapshot.edges, snapshot.state)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::error::DomainError;

    #[test]
    fn snapshot_survives_json() {
        let mut g: Graph<Value, Value> = Graph::new();
        g.add_node(NodeSpec::new("a", json!({"label": "start"})).value(2.0))
            .and_then(|g| g.add_node(NodeSpec::named("b")))
            .and_then(|g| g.add_edge(EdgeSpec::between("a", "b").weight(0.5)))
            .unwrap();
        g.set_state(json!({"revision": 3}));

        let text = serde_json::to_string(&g.to_snapshot()).unwrap();
        let restored = Graph::from_snapshot(serde_json::from_str(&text).unwrap()).unwrap();

        assert_eq!(restored.to_snapshot(), g.to_snapshot());
        assert_eq!(restored.state()["revision"], 3);
    }

    #[test]
    fn minimal_json_uses_defaults() {
        let snapshot: GraphSnapshot<Value, Value> = serde_json::from_value(json!({
            "nodes": [{"name": "a"}, {"name": "b"}],
            "edges": [{"source": "a", "target": "b"}]
        }))
        .unwrap();
        let g = Graph::from_snapshot(snapshot).unwrap();
        assert_eq!(g.edge_between("a", "b").unwrap().cost(), 1.0);
        assert_eq!(*g.state(), Value::Null);
    }

    #[test]
    fn dangling_edge_in_snapshot_is_rejected() {
        let snapshot: GraphSnapshot<Value, Value> = serde_json::from_value(json!({
            "nodes": [{"name": "a"}],
            "edges": [{"source": "a", "target": "ghost"}]
        }))
        .unwrap();
        assert_eq!(
            Graph::from_snapshot(snapshot).unwrap_err(),
            DomainError::MissingReference("ghost".into())
        );
    }
}
