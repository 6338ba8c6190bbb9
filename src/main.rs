use std::env;
use std::sync::Arc;

use clap::Parser;
use log::info;

use prefer_node_label::config::{default_kube_scheduler_config, read_yaml, KubeSchedulerConfiguration};
use prefer_node_label::core::node::Node;
use prefer_node_label::core::pod::Pod;
use prefer_node_label::core::scheduler::context::Context;
use prefer_node_label::core::scheduler::handle::FrameworkHandle;
use prefer_node_label::core::scheduler::interface::PodSchedulingAlgorithm;
use prefer_node_label::core::scheduler::kube_scheduler::KubeScheduler;
use prefer_node_label::core::snapshot::Snapshot;
use prefer_node_label::plugins::new_registry;
use prefer_node_label::printer::{print_placements, OutputFormat, PodPlacement};

#[derive(Parser)]
struct Args {
    /// Scheduler configuration. The default profile runs PreferNodeLabel with default args.
    #[clap(short, long)]
    config_file: Option<std::path::PathBuf>,
    /// YAML list of nodes forming the cluster snapshot.
    #[clap(long)]
    cluster_file: std::path::PathBuf,
    /// YAML list of pods to place.
    #[clap(short, long)]
    workload_file: std::path::PathBuf,
    #[clap(short, long, value_enum, default_value_t = OutputFormat::PrettyTable)]
    format: OutputFormat,
}

fn main() {
    // log level INFO by default
    let mut env_logger_builder = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        env_logger_builder.filter_level(log::LevelFilter::Info);
    }
    env_logger_builder.init();

    let args = Args::parse();

    let config: KubeSchedulerConfiguration = match &args.config_file {
        Some(path) => {
            info!("Path to config file: {:?}", path);
            read_yaml(path).expect("could not load scheduler config")
        }
        None => default_kube_scheduler_config(),
    };
    info!("Path to cluster file: {:?}", args.cluster_file);
    info!("Path to workload file: {:?}", args.workload_file);

    let nodes: Vec<Node> = read_yaml(&args.cluster_file).expect("could not load cluster");
    let pods: Vec<Pod> = read_yaml(&args.workload_file).expect("could not load workload");

    let registry = new_registry().expect("could not build plugin registry");
    let handle = Arc::new(FrameworkHandle::new(Snapshot::new(nodes)));
    let scheduler =
        KubeScheduler::new(&config, &registry, handle).expect("could not initialize scheduler");

    let ctx = Context::background();
    let placements: Vec<PodPlacement> = pods
        .iter()
        .map(|pod| PodPlacement::new(pod.metadata.name.clone(), scheduler.schedule_one(&ctx, pod)))
        .collect();

    print_placements(&placements, args.format, &mut std::io::stdout().lock())
        .expect("could not print placements");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_defaults_to_pretty_table() {
        let args =
            Args::try_parse_from(["prefer-node-label", "--cluster-file", "c.yaml", "-w", "w.yaml"])
                .unwrap();
        assert_eq!(args.format, OutputFormat::PrettyTable);
        assert!(args.config_file.is_none());

        let args = Args::try_parse_from([
            "prefer-node-label",
            "--cluster-file",
            "c.yaml",
            "-w",
            "w.yaml",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
    }
}
