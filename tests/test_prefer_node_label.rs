use std::sync::Arc;

use rayon::prelude::*;
use serde_json::json;

use prefer_node_label::core::node::Node;
use prefer_node_label::core::pod::Pod;
use prefer_node_label::core::scheduler::context::Context;
use prefer_node_label::core::scheduler::cycle_state::CycleState;
use prefer_node_label::core::scheduler::handle::Handle;
use prefer_node_label::core::scheduler::interface::{ConstructionError, Plugin};
use prefer_node_label::core::scheduler::status::{Status, StatusError, MAX_NODE_SCORE};
use prefer_node_label::core::snapshot::{LookupError, NodeInfo, NodeInfoLister, Snapshot};
use prefer_node_label::plugins::prefer_node_label::{PreferNodeLabel, NAME};
use prefer_node_label::test_util::helpers::{handle_with_nodes, labeled_node};

fn build_plugin(args: Option<serde_json::Value>, nodes: Vec<Node>) -> Box<dyn Plugin> {
    let handle: Arc<dyn Handle> = handle_with_nodes(nodes);
    PreferNodeLabel::new(args.as_ref(), handle).unwrap()
}

fn score(plugin: &dyn Plugin, node_name: &str) -> (i64, Status) {
    plugin.as_score().unwrap().score(
        &Context::background(),
        &CycleState::new(),
        &Pod::new("pod".to_string()),
        node_name,
    )
}

fn filter(plugin: &dyn Plugin, node: Node) -> Status {
    plugin.as_filter().unwrap().filter(
        &Context::background(),
        &CycleState::new(),
        &Pod::new("pod".to_string()),
        &NodeInfo::new(node),
    )
}

fn scenario_one_nodes() -> Vec<Node> {
    vec![
        labeled_node("A", &[("workload", "true")]),
        labeled_node("B", &[]),
        labeled_node("C", &[("workload", "false")]),
    ]
}

#[test]
fn test_default_config_prefers_workload_label() {
    let _ = env_logger::try_init();

    let nodes = scenario_one_nodes();
    let plugin = build_plugin(None, nodes.clone());

    assert_eq!(score(plugin.as_ref(), "A"), (MAX_NODE_SCORE, Status::Success));
    assert_eq!(score(plugin.as_ref(), "B"), (0, Status::Success));
    assert_eq!(score(plugin.as_ref(), "C"), (0, Status::Success));
    for node in nodes {
        assert_eq!(filter(plugin.as_ref(), node), Status::Success);
    }
}

#[test]
fn test_custom_label_matching_node_gets_max_score() {
    let plugin = build_plugin(
        Some(json!({"labelKey": "zone", "labelValue": "us-east"})),
        vec![labeled_node("D", &[("zone", "us-east")])],
    );
    assert_eq!(score(plugin.as_ref(), "D"), (MAX_NODE_SCORE, Status::Success));
}

#[test]
fn test_custom_label_other_value_scores_zero_but_passes_filter() {
    let node = labeled_node("E", &[("zone", "us-west")]);
    let plugin = build_plugin(
        Some(json!({"labelKey": "zone", "labelValue": "us-east"})),
        vec![node.clone()],
    );
    assert_eq!(score(plugin.as_ref(), "E"), (0, Status::Success));
    assert_eq!(filter(plugin.as_ref(), node), Status::Success);
}

#[test]
fn test_default_key_is_ignored_with_custom_config() {
    let plugin = build_plugin(
        Some(json!({"labelKey": "zone", "labelValue": "us-east"})),
        vec![labeled_node("A", &[("workload", "true")])],
    );
    assert_eq!(score(plugin.as_ref(), "A"), (0, Status::Success));
}

#[test]
fn test_score_of_unknown_node_is_an_error() {
    let plugin = build_plugin(None, scenario_one_nodes());
    let (_, status) = score(plugin.as_ref(), "Z");
    assert_eq!(
        status,
        Status::Error(StatusError::Lookup(LookupError::NodeNotFound("Z".to_string())))
    );
}

#[test]
fn test_score_of_node_info_without_node_is_an_error() {
    let handle: Arc<dyn Handle> = Arc::new(
        prefer_node_label::core::scheduler::handle::FrameworkHandle::new(
            Snapshot::from_node_infos(vec![NodeInfo::without_node("gone".to_string())]),
        ),
    );
    let plugin = PreferNodeLabel::new(None, handle).unwrap();
    let (_, status) = score(plugin.as_ref(), "gone");
    assert!(status.is_error());
}

#[test]
fn test_score_is_idempotent() {
    let plugin = build_plugin(None, scenario_one_nodes());
    for node_name in ["A", "B", "C", "Z"] {
        assert_eq!(score(plugin.as_ref(), node_name), score(plugin.as_ref(), node_name));
    }
}

#[test]
fn test_score_is_step_function() {
    let nodes: Vec<Node> = (0..50)
        .map(|idx| {
            let value = if idx % 3 == 0 { "true" } else { "no" };
            labeled_node(&format!("node{}", idx), &[("workload", value)])
        })
        .collect();
    let plugin = build_plugin(None, nodes.clone());
    for node in nodes {
        let expected = if node.metadata.label("workload") == Some("true") {
            MAX_NODE_SCORE
        } else {
            0
        };
        assert_eq!(score(plugin.as_ref(), &node.metadata.name).0, expected);
    }
}

#[test]
fn test_concurrent_calls_agree_with_sequential_ones() {
    let nodes: Vec<Node> = (0..200)
        .map(|idx| {
            let value = if idx % 2 == 0 { "true" } else { "false" };
            labeled_node(&format!("node{}", idx), &[("workload", value)])
        })
        .collect();
    let snapshot = Snapshot::new(nodes.clone());
    let plugin = build_plugin(None, nodes);

    let sequential: Vec<(i64, Status)> = snapshot
        .list()
        .iter()
        .map(|node_info| score(plugin.as_ref(), node_info.name()))
        .collect();
    let parallel: Vec<(i64, Status)> = snapshot
        .list()
        .par_iter()
        .map(|node_info| score(plugin.as_ref(), node_info.name()))
        .collect();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_malformed_args_fail_construction() {
    let handle: Arc<dyn Handle> = handle_with_nodes(vec![]);
    let err = PreferNodeLabel::new(Some(&json!({"labelValue": ["a"]})), handle)
        .err()
        .unwrap();
    assert!(matches!(err, ConstructionError::InvalidField { .. }));
    assert_eq!(
        err.to_string(),
        format!("plugin {}: field \"labelValue\" must be a string", NAME)
    );
}

#[test]
fn test_plugin_name() {
    let plugin = build_plugin(None, vec![]);
    assert_eq!(plugin.name(), "PreferNodeLabel");
}
