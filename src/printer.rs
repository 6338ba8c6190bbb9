//! Prints placement decisions of the binary as JSON or as a pretty table.

use std::io::Write;

use prettytable::{row, Table};
use serde::Serialize;

use crate::core::scheduler::framework::{NodePluginScores, ScheduleResult};
use crate::core::scheduler::interface::ScheduleError;

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    PrettyTable,
}

/// Decision for one pod, flattened for output.
#[derive(Debug, Serialize, PartialEq)]
pub struct PodPlacement {
    pub pod: String,
    pub suggested_host: Option<String>,
    pub error: Option<String>,
    pub node_scores: Vec<NodePluginScores>,
}

impl PodPlacement {
    pub fn new(pod: String, result: Result<ScheduleResult, ScheduleError>) -> Self {
        match result {
            Ok(result) => Self {
                pod,
                suggested_host: Some(result.suggested_host),
                error: None,
                node_scores: result.node_scores,
            },
            Err(err) => Self {
                pod,
                suggested_host: None,
                error: Some(err.to_string()),
                node_scores: vec![],
            },
        }
    }
}

pub fn print_placements(
    placements: &[PodPlacement],
    format: OutputFormat,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    match format {
        OutputFormat::PrettyTable => print_placements_as_pretty_table(placements, out),
        OutputFormat::Json => print_placements_as_json(placements, out),
    }
}

pub fn print_placements_as_pretty_table(
    placements: &[PodPlacement],
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let mut summary_table = Table::new();
    summary_table.add_row(row!["Pod", "Node", "Error"]);
    for placement in placements {
        summary_table.add_row(row![
            placement.pod,
            placement.suggested_host.as_deref().unwrap_or("-"),
            placement.error.as_deref().unwrap_or("-")
        ]);
    }

    let mut scores_table = Table::new();
    scores_table.add_row(row!["Pod", "Node", "Plugin scores", "Total"]);
    for placement in placements {
        for node in placement.node_scores.iter() {
            let plugin_scores = node
                .scores
                .iter()
                .map(|score| format!("{}={}", score.name, score.score))
                .collect::<Vec<_>>()
                .join(", ");
            scores_table.add_row(row![placement.pod, node.name, plugin_scores, node.total_score]);
        }
    }

    write!(out, "{}", summary_table)?;
    write!(out, "{}", scores_table)
}

pub fn print_placements_as_json(
    placements: &[PodPlacement],
    out: &mut dyn Write,
) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, placements)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::framework::PluginScore;

    fn placements() -> Vec<PodPlacement> {
        vec![
            PodPlacement::new(
                "pod1".to_string(),
                Ok(ScheduleResult {
                    suggested_host: "node1".to_string(),
                    evaluated_nodes: 1,
                    feasible_nodes: 1,
                    node_scores: vec![NodePluginScores {
                        name: "node1".to_string(),
                        scores: vec![PluginScore {
                            name: "PreferNodeLabel".to_string(),
                            score: 100,
                        }],
                        total_score: 100,
                    }],
                }),
            ),
            PodPlacement::new("pod2".to_string(), Err(ScheduleError::NoNodesAvailable)),
        ]
    }

    #[test]
    fn test_json_output() {
        let mut out = Vec::new();
        print_placements(&placements(), OutputFormat::Json, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["suggested_host"], "node1");
        assert_eq!(value[0]["node_scores"][0]["total_score"], 100);
        assert_eq!(value[1]["error"], "no nodes available to schedule pods");
    }

    #[test]
    fn test_pretty_table_output() {
        let mut out = Vec::new();
        print_placements(&placements(), OutputFormat::PrettyTable, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("PreferNodeLabel=100"));
        assert!(text.contains("no nodes available to schedule pods"));
    }
}
