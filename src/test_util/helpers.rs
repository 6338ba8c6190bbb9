use std::sync::Arc;

use crate::config::KubeSchedulerConfiguration;
use crate::core::node::Node;
use crate::core::scheduler::handle::FrameworkHandle;
use crate::core::scheduler::kube_scheduler::KubeScheduler;
use crate::core::snapshot::Snapshot;
use crate::plugins::new_registry;

pub fn labeled_node(name: &str, labels: &[(&str, &str)]) -> Node {
    Node::with_labels(name.to_string(), labels.iter().copied())
}

pub fn handle_with_nodes(nodes: Vec<Node>) -> Arc<FrameworkHandle> {
    Arc::new(FrameworkHandle::new(Snapshot::new(nodes)))
}

/// Default profile enabling PreferNodeLabel for filter and score. `plugin_args` is appended as
/// the YAML body of its `args`.
pub fn default_test_scheduler_config(plugin_args: Option<&str>) -> KubeSchedulerConfiguration {
    let mut config = r#"
profiles:
- schedulerName: default-scheduler
  plugins:
    filter:
      enabled:
      - name: PreferNodeLabel
    score:
      enabled:
      - name: PreferNodeLabel
        weight: 1
"#
    .to_string();

    if let Some(args) = plugin_args {
        config.push_str("  pluginConfig:\n  - name: PreferNodeLabel\n    args:\n");
        for line in args.lines().filter(|line| !line.trim().is_empty()) {
            config.push_str("      ");
            config.push_str(line.trim());
            config.push('\n');
        }
    }

    serde_yaml::from_str::<KubeSchedulerConfiguration>(&config).unwrap()
}

pub fn create_scheduler(config: &KubeSchedulerConfiguration, nodes: Vec<Node>) -> KubeScheduler {
    KubeScheduler::new(config, &new_registry().unwrap(), handle_with_nodes(nodes)).unwrap()
}
