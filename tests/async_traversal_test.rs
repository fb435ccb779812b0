use arborgraph::domain::graph::{EdgeSpec, Graph, Node, NodeSpec};
use arborgraph::util::testing;

//  A -> B -> D -> E
//  A -> C -> D
fn pipeline() -> Graph<u32, ()> {
    Graph::from_parts(
        [("A", 1), ("B", 2), ("C", 3), ("D", 4), ("E", 5)].map(|(n, d)| NodeSpec::new(n, d)),
        [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E")]
            .map(|(s, t)| EdgeSpec::between(s, t)),
        serde_json::Value::Null,
    )
    .unwrap()
}

fn ignore(_: &Node<u32>, _: String) {}

#[tokio::test]
async fn given_graph_when_walking_async_then_order_matches_sync_walk() {
    testing::init_test_setup();
    let g = pipeline();

    for start in [Some("A"), Some("C"), None] {
        let sync_bfs = g.bfs(start, |_| Ok::<(), String>(()), ignore);
        let async_bfs = g
            .bfs_async(start, |_| async { Ok::<(), String>(()) }, ignore)
            .await;
        assert_eq!(async_bfs, sync_bfs);

        let sync_dfs = g.dfs(start, |_| Ok::<(), String>(()), ignore);
        let async_dfs = g
            .dfs_async(start, |_| async { Ok::<(), String>(()) }, ignore)
            .await;
        assert_eq!(async_dfs, sync_dfs);
    }
}

#[tokio::test]
async fn given_failing_visit_when_walking_async_then_error_routed_and_walk_continues() {
    testing::init_test_setup();
    let g = pipeline();
    let mut failures: Vec<(String, String)> = Vec::new();

    let order = g
        .bfs_async(
            Some("A"),
            |node| async move {
                tokio::task::yield_now().await;
                if node.data() % 2 == 0 {
                    Err(format!("even payload {}", node.data()))
                } else {
                    Ok(())
                }
            },
            |node, err| failures.push((node.name().to_string(), err)),
        )
        .await;

    assert_eq!(order, vec!["A", "B", "C", "D", "E"]);
    assert_eq!(
        failures,
        vec![
            ("B".to_string(), "even payload 2".to_string()),
            ("D".to_string(), "even payload 4".to_string()),
        ]
    );
}

#[test]
fn given_failing_visit_when_walking_sync_then_every_node_still_visited() {
    let g = pipeline();
    let mut seen = Vec::new();
    let mut failed = Vec::new();

    let order = g.dfs(
        Some("A"),
        |node| {
            seen.push(*node.data());
            if node.name() == "D" {
                Err("boom")
            } else {
                Ok(())
            }
        },
        |node, err| failed.push(format!("{}: {err}", node.name())),
    );

    assert_eq!(order, vec!["A", "B", "D", "E", "C"]);
    assert_eq!(seen, vec![1, 2, 4, 5, 3]);
    assert_eq!(failed, vec!["D: boom"]);
}

#[test]
fn given_unknown_start_when_walking_then_nothing_visited() {
    let g = pipeline();
    assert!(g.breadth_first(Some("missing")).next().is_none());
    assert_eq!(g.depth_first(None).count(), 5);
}
