//! Snapshot analysis service
//!
//! Loads a graph snapshot (JSON) through the filesystem boundary and runs one
//! of the graph or network algorithms over it, producing a JSON report.

use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Limits;
use crate::domain::{Edge, Graph, GraphSnapshot};
use crate::infrastructure::traits::FileSystem;

/// Graph loaded from a snapshot: opaque JSON payloads on nodes and edges.
pub type SnapshotGraph = Graph<Value, Value>;

/// Analysis to run over a loaded graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Bfs { start: Option<String> },
    Dfs { start: Option<String> },
    Connected,
    Cycles,
    Bridges,
    DirectedBridges,
    Topo,
    Bipartite,
    Hamiltonian,
    ShortestPath { from: String, to: String },
    Mst,
    Prim { start: Option<String> },
    Pert,
    Cpm,
}

impl Analysis {
    pub fn name(&self) -> &'static str {
        match self {
            Analysis::Bfs { .. } => "bfs",
            Analysis::Dfs { .. } => "dfs",
            Analysis::Connected => "connected",
            Analysis::Cycles => "cycles",
            Analysis::Bridges => "bridges",
            Analysis::DirectedBridges => "directed-bridges",
            Analysis::Topo => "topo",
            Analysis::Bipartite => "bipartite",
            Analysis::Hamiltonian => "hamiltonian",
            Analysis::ShortestPath { .. } => "shortest-path",
            Analysis::Mst => "mst",
            Analysis::Prim { .. } => "prim",
            Analysis::Pert => "pert",
            Analysis::Cpm => "cpm",
        }
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub analysis: String,
    pub nodes: usize,
    pub edges: usize,
    pub result: Value,
}

#[derive(Serialize)]
struct EdgeView<'a> {
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

/// Service for running graph analyses over snapshot files.
pub struct AnalysisService {
    fs: Arc<dyn FileSystem>,
    limits: Limits,
}

impl AnalysisService {
    pub fn new(fs: Arc<dyn FileSystem>, limits: Limits) -> Self {
        Self { fs, limits }
    }

    /// Read and validate a snapshot file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<SnapshotGraph> {
        let text = self
            .fs
            .read_to_string(path)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("read snapshot: {}", path.display()),
                source: Box::new(e),
            })?;
        let snapshot: GraphSnapshot<Value, Value> =
            serde_json::from_str(&text).map_err(|e| ApplicationError::Snapshot {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let graph = Graph::from_snapshot(snapshot)?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "snapshot loaded"
        );
        Ok(graph)
    }

    /// Load `path` and run `analysis` on it.
    pub fn analyze(&self, path: &Path, analysis: &Analysis) -> ApplicationResult<AnalysisReport> {
        let graph = self.load(path)?;
        self.run(&graph, analysis)
    }

    /// Run `analysis` on an already loaded graph.
    #[instrument(level = "debug", skip(self, graph), fields(analysis = analysis.name()))]
    pub fn run(&self, graph: &SnapshotGraph, analysis: &Analysis) -> ApplicationResult<AnalysisReport> {
        let result = match analysis {
            Analysis::Bfs { start } => {
                json!({ "order": graph.bfs(start.as_deref(), |_| Ok::<(), Infallible>(()), |_, _| {}) })
            }
            Analysis::Dfs { start } => {
                json!({ "order": graph.dfs(start.as_deref(), |_| Ok::<(), Infallible>(()), |_, _| {}) })
            }
            Analysis::Connected => json!({ "connected": graph.is_connected() }),
            Analysis::Cycles => json!({ "cycles": graph.cycles() }),
            Analysis::Bridges => edge_list(graph, &graph.bridges()),
            Analysis::DirectedBridges => {
                let bridges = match self.limits.directed_bridge_max_edges {
                    Some(max) => graph.directed_bridges_bounded(max)?,
                    None => graph.directed_bridges(),
                };
                edge_list(graph, &bridges)
            }
            Analysis::Topo => json!({ "order": graph.topological_order() }),
            Analysis::Bipartite => json!({ "bipartite": graph.is_bipartite() }),
            Analysis::Hamiltonian => {
                let cycle = match self.limits.hamiltonian_max_steps {
                    Some(max) => graph.hamiltonian_cycle_bounded(max)?,
                    None => graph.hamiltonian_cycle(),
                };
                json!({ "cycle": cycle })
            }
            Analysis::ShortestPath { from, to } => json!(graph.shortest_path(from, to)?),
            Analysis::Mst => spanning_tree(graph, &graph.minimum_spanning_tree()),
            Analysis::Prim { start } => spanning_tree(graph, &graph.prim(start.as_deref())),
            Analysis::Pert => {
                let finish: Vec<Value> = graph
                    .pert()
                    .into_iter()
                    .map(|(node, time)| json!({ "node": node, "earliest_finish": time }))
                    .collect();
                json!({ "schedule": finish })
            }
            Analysis::Cpm => json!(graph.cpm()),
        };
        info!(analysis = analysis.name(), "analysis finished");

        Ok(AnalysisReport {
            analysis: analysis.name().to_string(),
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            result,
        })
    }

    /// Write a report as pretty JSON.
    pub fn write_report(&self, report: &AnalysisReport, path: &Path) -> ApplicationResult<()> {
        let text = report.to_json_pretty()?;
        self.fs
            .write(path, &text)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("write report: {}", path.display()),
                source: Box::new(e),
            })
    }
}

impl AnalysisReport {
    pub fn to_json_pretty(&self) -> ApplicationResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ApplicationError::OperationFailed {
            context: "serialize report".to_string(),
            source: Box::new(e),
        })
    }
}

fn edge_views<'g>(graph: &'g SnapshotGraph, edges: &[&'g Edge<Value>]) -> Vec<EdgeView<'g>> {
    edges
        .iter()
        .map(|edge| {
            let (source, target) = graph.endpoints(edge);
            EdgeView {
                source,
                target,
                weight: edge.weight(),
            }
        })
        .collect()
}

fn edge_list(graph: &SnapshotGraph, edges: &[&Edge<Value>]) -> Value {
    json!({ "edges": edge_views(graph, edges) })
}

fn spanning_tree(graph: &SnapshotGraph, edges: &[&Edge<Value>]) -> Value {
    let total: f64 = edges.iter().map(|e| e.cost()).sum();
    json!({ "edges": edge_views(graph, edges), "total_weight": total })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::DomainError;

    #[derive(Default)]
    struct MemoryFs {
        files: Mutex<HashMap<PathBuf, String>>,
    }

    impl MemoryFs {
        fn with(path: &str, content: &str) -> Self {
            let fs = Self::default();
            fs.files
                .lock()
                .unwrap()
                .insert(PathBuf::from(path), content.to_string());
            fs
        }
    }

    impl FileSystem for MemoryFs {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn write(&self, path: &Path, content: &str) -> io::Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), content.to_string());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }
    }

    const CHAIN: &str = r#"{
        "nodes": [{"name": "A"}, {"name": "B"}, {"name": "C"}],
        "edges": [
            {"source": "A", "target": "B", "weight": 2.0},
            {"source": "B", "target": "C"}
        ]
    }"#;

    fn service(fs: MemoryFs, limits: Limits) -> AnalysisService {
        AnalysisService::new(Arc::new(fs), limits)
    }

    #[test]
    fn given_chain_snapshot_when_shortest_path_then_reports_distance() {
        let svc = service(MemoryFs::with("g.json", CHAIN), Limits::default());
        let report = svc
            .analyze(
                Path::new("g.json"),
                &Analysis::ShortestPath {
                    from: "A".into(),
                    to: "C".into(),
                },
            )
            .unwrap();
        assert_eq!(report.analysis, "shortest-path");
        assert_eq!(report.nodes, 3);
        assert_eq!(report.result["distance"], 3.0);
        assert_eq!(report.result["path"], json!(["A", "B", "C"]));
    }

    #[test]
    fn given_missing_file_when_analyze_then_operation_failed() {
        let svc = service(MemoryFs::default(), Limits::default());
        let err = svc
            .analyze(Path::new("nope.json"), &Analysis::Connected)
            .unwrap_err();
        assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    }

    #[test]
    fn given_malformed_json_when_analyze_then_snapshot_error() {
        let svc = service(MemoryFs::with("bad.json", "{ nodes: "), Limits::default());
        let err = svc
            .analyze(Path::new("bad.json"), &Analysis::Connected)
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Snapshot { .. }));
    }

    #[test]
    fn given_dangling_edge_when_analyze_then_domain_error() {
        let text = r#"{"nodes": [{"name": "A"}], "edges": [{"source": "A", "target": "Z"}]}"#;
        let svc = service(MemoryFs::with("g.json", text), Limits::default());
        let err = svc.analyze(Path::new("g.json"), &Analysis::Topo).unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::MissingReference(_))
        ));
    }

    #[test]
    fn given_edge_limit_when_directed_bridges_then_capacity_exceeded() {
        let limits = Limits {
            directed_bridge_max_edges: Some(1),
            ..Limits::default()
        };
        let svc = service(MemoryFs::with("g.json", CHAIN), limits);
        let err = svc
            .analyze(Path::new("g.json"), &Analysis::DirectedBridges)
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn given_chain_when_mst_then_total_weight_uses_default_for_unweighted() {
        let svc = service(MemoryFs::with("g.json", CHAIN), Limits::default());
        let report = svc.analyze(Path::new("g.json"), &Analysis::Mst).unwrap();
        assert_eq!(report.result["total_weight"], 3.0);
        // lightest first
        assert_eq!(report.result["edges"][0], json!({"source": "B", "target": "C"}));
        assert_eq!(report.result["edges"][1], json!({"source": "A", "target": "B", "weight": 2.0}));
    }

    #[test]
    fn given_report_when_written_then_file_holds_json() {
        let fs = Arc::new(MemoryFs::with("g.json", CHAIN));
        let svc = AnalysisService::new(fs.clone(), Limits::default());
        let report = svc.analyze(Path::new("g.json"), &Analysis::Cpm).unwrap();
        svc.write_report(&report, Path::new("out.json")).unwrap();

        let written = fs.read_to_string(Path::new("out.json")).unwrap();
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["result"]["length"], 3.0);
    }
}
