use std::fs;
use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::{json, Value};
use tempfile::TempDir;

use arborgraph::application::error::ApplicationError;
use arborgraph::application::services::{Analysis, AnalysisService};
use arborgraph::config::{Limits, Settings};
use arborgraph::domain::DomainError;
use arborgraph::infrastructure::traits::RealFileSystem;
use arborgraph::infrastructure::ServiceContainer;
use arborgraph::util::testing;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn snapshot(&self, name: &str, content: &Value) -> std::path::PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content.to_string()).unwrap();
        path
    }
}

#[fixture]
fn workspace() -> Workspace {
    testing::init_test_setup();
    Workspace {
        dir: TempDir::new().unwrap(),
    }
}

fn roads() -> Value {
    json!({
        "nodes": [{"name": "A"}, {"name": "B"}, {"name": "C"}, {"name": "D"}],
        "edges": [
            {"source": "A", "target": "B", "weight": 1.0},
            {"source": "B", "target": "C", "weight": 1.0},
            {"source": "C", "target": "D", "weight": 1.0},
            {"source": "B", "target": "D", "weight": 1.0}
        ],
        "state": {"label": "roads"}
    })
}

fn service() -> AnalysisService {
    ServiceContainer::with_deps(Settings::default(), Arc::new(RealFileSystem)).analysis_service()
}

#[rstest]
fn given_snapshot_file_when_routing_then_report_carries_path(workspace: Workspace) {
    let path = workspace.snapshot("roads.json", &roads());
    let analysis = Analysis::ShortestPath {
        from: "A".to_string(),
        to: "D".to_string(),
    };

    let report = service().analyze(&path, &analysis).unwrap();

    assert_eq!(report.analysis, "shortest-path");
    assert_eq!((report.nodes, report.edges), (4, 4));
    assert_eq!(report.result["distance"], 2.0);
    assert_eq!(report.result["path"], json!(["A", "B", "D"]));
}

#[rstest]
fn given_report_when_written_then_file_holds_pretty_json(workspace: Workspace) {
    let path = workspace.snapshot("roads.json", &roads());
    let service = service();
    let report = service.analyze(&path, &Analysis::Mst).unwrap();
    let target = workspace.dir.path().join("out/mst.json");

    service.write_report(&report, &target).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(written["analysis"], "mst");
    assert_eq!(written["result"]["edges"].as_array().map(Vec::len), Some(3));
    assert_eq!(written["result"]["total_weight"], 3.0);
}

#[rstest]
fn given_dangling_edge_when_loading_then_domain_error(workspace: Workspace) {
    let path = workspace.snapshot(
        "dangling.json",
        &json!({"nodes": [{"name": "A"}], "edges": [{"source": "A", "target": "Z"}]}),
    );

    let err = service().load(&path).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MissingReference(ref name)) if name == "Z"
    ));
}

#[rstest]
fn given_invalid_json_when_loading_then_snapshot_error(workspace: Workspace) {
    let path = workspace.dir.path().join("garbage.json");
    fs::write(&path, "{ nodes: ").unwrap();
    assert!(matches!(
        service().load(&path),
        Err(ApplicationError::Snapshot { .. })
    ));
}

#[rstest]
fn given_missing_file_when_loading_then_operation_failed(workspace: Workspace) {
    let path = workspace.dir.path().join("nowhere.json");
    assert!(matches!(
        service().load(&path),
        Err(ApplicationError::OperationFailed { .. })
    ));
}

#[rstest]
fn given_step_limit_when_searching_hamiltonian_then_capacity_exceeded(workspace: Workspace) {
    let path = workspace.snapshot("roads.json", &roads());
    let limits = Limits {
        hamiltonian_max_steps: Some(1),
        directed_bridge_max_edges: None,
    };
    let service = AnalysisService::new(Arc::new(RealFileSystem), limits);

    let err = service.analyze(&path, &Analysis::Hamiltonian).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::CapacityExceeded { limit: 1, .. })
    ));
}
