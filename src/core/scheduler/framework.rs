//! Runs the enabled plugins of one scheduler profile against the current snapshot:
//! filter every node, score the feasible ones, normalize per plugin, then sum weighted scores.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info, warn};
use prefer_node_label_derive::StateData;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::KubeSchedulerProfile;
use crate::core::pod::Pod;
use crate::core::scheduler::context::Context;
use crate::core::scheduler::cycle_state::CycleState;
use crate::core::scheduler::handle::{CycleSnapshot, FrameworkHandle, Handle, CYCLE_SNAPSHOT_KEY};
use crate::core::scheduler::interface::{ConstructionError, Plugin, ScheduleError};
use crate::core::scheduler::registry::Registry;
use crate::core::scheduler::status::{
    NodeScore, NodeScoreList, Status, StatusError, MAX_NODE_SCORE, MIN_NODE_SCORE,
};
use crate::core::snapshot::{NodeInfo, NodeInfoLister};

/// Key under which the framework stores [`FeasibleNodes`] between filter and score.
pub const FEASIBLE_NODES_KEY: &str = "FeasibleNodes";

/// Names of the nodes that passed filtering in the current cycle, in snapshot order.
#[derive(Clone, Debug, PartialEq, StateData)]
pub struct FeasibleNodes(pub Vec<String>);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginScore {
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePluginScores {
    pub name: String,
    /// Normalized score of every score plugin, before weights are applied.
    pub scores: Vec<PluginScore>,
    pub total_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResult {
    pub suggested_host: String,
    pub evaluated_nodes: usize,
    pub feasible_nodes: usize,
    pub node_scores: Vec<NodePluginScores>,
}

pub struct Framework {
    profile_name: String,
    handle: Arc<FrameworkHandle>,
    // Each plugin is built once per profile, even when enabled at several extension points.
    plugins: Vec<(String, Box<dyn Plugin>)>,
    filter_plugins: Vec<usize>,
    score_plugins: Vec<(usize, i64)>,
}

impl Framework {
    pub fn new(
        profile: &KubeSchedulerProfile,
        registry: &Registry,
        handle: Arc<FrameworkHandle>,
    ) -> Result<Self, ConstructionError> {
        let mut framework = Self {
            profile_name: profile.scheduler_name.clone(),
            handle,
            plugins: vec![],
            filter_plugins: vec![],
            score_plugins: vec![],
        };

        for enabled in profile.plugins.filter.enabled.iter() {
            let idx = framework.instantiate(profile, registry, &enabled.name)?;
            if framework.plugins[idx].1.as_filter().is_none() {
                return Err(ConstructionError::MissingCapability {
                    plugin: enabled.name.clone(),
                    extension_point: "filter",
                });
            }
            framework.filter_plugins.push(idx);
        }

        // Sum of weights so far. Bounded so that a node's weighted total can not overflow.
        let mut total_weight: i64 = 0;
        for enabled in profile.plugins.score.enabled.iter() {
            let weight = enabled.weight.unwrap_or(1);
            let max_total = weight
                .checked_add(total_weight)
                .and_then(|total| total.checked_mul(MAX_NODE_SCORE));
            if weight <= 0 || max_total.is_none() {
                return Err(ConstructionError::InvalidWeight {
                    plugin: enabled.name.clone(),
                    weight,
                });
            }
            total_weight += weight;
            let idx = framework.instantiate(profile, registry, &enabled.name)?;
            if framework.plugins[idx].1.as_score().is_none() {
                return Err(ConstructionError::MissingCapability {
                    plugin: enabled.name.clone(),
                    extension_point: "score",
                });
            }
            framework.score_plugins.push((idx, weight));
        }

        info!(
            "Profile {:?} is ready: filter plugins {:?}, score plugins {:?}",
            framework.profile_name,
            framework.filter_plugin_names(),
            framework.score_plugin_names(),
        );
        Ok(framework)
    }

    fn instantiate(
        &mut self,
        profile: &KubeSchedulerProfile,
        registry: &Registry,
        name: &str,
    ) -> Result<usize, ConstructionError> {
        if let Some(idx) = self.plugins.iter().position(|(n, _)| n == name) {
            return Ok(idx);
        }
        let handle: Arc<dyn Handle> = self.handle.clone();
        let plugin = registry.build(name, profile.plugin_args(name), handle)?;
        self.plugins.push((name.to_string(), plugin));
        Ok(self.plugins.len() - 1)
    }

    pub fn profile_name(&self) -> &str {
        &self.profile_name
    }

    pub fn handle(&self) -> &Arc<FrameworkHandle> {
        &self.handle
    }

    pub fn filter_plugin_names(&self) -> Vec<&str> {
        self.filter_plugins
            .iter()
            .map(|&idx| self.plugins[idx].0.as_str())
            .collect()
    }

    pub fn score_plugin_names(&self) -> Vec<&str> {
        self.score_plugins
            .iter()
            .map(|&(idx, _)| self.plugins[idx].0.as_str())
            .collect()
    }

    /// Runs filter plugins in order and stops at the first one which does not return success.
    pub fn run_filter_plugins(
        &self,
        ctx: &Context,
        state: &CycleState,
        pod: &Pod,
        node_info: &NodeInfo,
    ) -> Status {
        for plugin in self
            .filter_plugins
            .iter()
            .filter_map(|&idx| self.plugins[idx].1.as_filter())
        {
            let status = plugin.filter(ctx, state, pod, node_info);
            if !status.is_success() {
                debug!(
                    "{} rejected node {:?} for pod {:?}: {}",
                    plugin.name(),
                    node_info.name(),
                    pod.metadata.name,
                    status
                );
                return status;
            }
        }
        Status::Success
    }

    /// Filters all nodes in parallel. Returns the feasible node names and, for every other
    /// node, the status which ruled it out.
    pub fn find_nodes_that_fit(
        &self,
        ctx: &Context,
        state: &CycleState,
        pod: &Pod,
        node_infos: &[&NodeInfo],
    ) -> (Vec<String>, BTreeMap<String, Status>) {
        let statuses: Vec<Status> = node_infos
            .par_iter()
            .map(|node_info| self.run_filter_plugins(ctx, state, pod, node_info))
            .collect();

        let mut feasible = vec![];
        let mut diagnosis = BTreeMap::new();
        for (node_info, status) in node_infos.iter().zip(statuses) {
            match status {
                Status::Success => feasible.push(node_info.name().to_string()),
                status => {
                    if status.is_error() {
                        warn!(
                            "Excluding node {:?} for pod {:?}: {}",
                            node_info.name(),
                            pod.metadata.name,
                            status
                        );
                    }
                    diagnosis.insert(node_info.name().to_string(), status);
                }
            }
        }
        (feasible, diagnosis)
    }

    /// Scores the nodes stored under [`FEASIBLE_NODES_KEY`]. A node for which any score plugin
    /// fails is dropped from every plugin's list before normalization.
    pub fn prioritize_nodes(
        &self,
        ctx: &Context,
        state: &CycleState,
        pod: &Pod,
    ) -> Result<Vec<NodePluginScores>, ScheduleError> {
        let feasible: &[String] = state
            .read::<FeasibleNodes>(FEASIBLE_NODES_KEY)
            .map(|nodes| nodes.0.as_slice())
            .unwrap_or_default();

        let mut raw_scores: Vec<(usize, i64, Vec<(i64, Status)>)> = vec![];
        let mut failed: BTreeMap<String, Status> = BTreeMap::new();

        for &(idx, weight) in self.score_plugins.iter() {
            let Some(plugin) = self.plugins[idx].1.as_score() else {
                continue;
            };
            let results: Vec<(i64, Status)> = feasible
                .par_iter()
                .map(|node_name| plugin.score(ctx, state, pod, node_name))
                .collect();
            for (node_name, (_, status)) in feasible.iter().zip(results.iter()) {
                if !status.is_success() && !failed.contains_key(node_name) {
                    warn!(
                        "{} could not score node {:?} for pod {:?}: {}",
                        plugin.name(),
                        node_name,
                        pod.metadata.name,
                        status
                    );
                    failed.insert(node_name.clone(), status.clone());
                }
            }
            raw_scores.push((idx, weight, results));
        }

        if ctx.is_cancelled() {
            return Err(ScheduleError::Cancelled);
        }

        let mut totals: Vec<NodePluginScores> = feasible
            .iter()
            .filter(|node_name| !failed.contains_key(*node_name))
            .map(|node_name| NodePluginScores {
                name: node_name.clone(),
                scores: vec![],
                total_score: 0,
            })
            .collect();
        if totals.is_empty() {
            return Err(ScheduleError::Unschedulable {
                total: feasible.len(),
                reasons: failed
                    .into_iter()
                    .map(|(node_name, status)| (node_name, status.to_string()))
                    .collect(),
            });
        }

        for (idx, weight, results) in raw_scores {
            let (plugin_name, plugin) = &self.plugins[idx];
            let Some(plugin) = plugin.as_score() else {
                continue;
            };
            let mut scores: NodeScoreList = feasible
                .iter()
                .zip(results)
                .filter(|(node_name, _)| !failed.contains_key(*node_name))
                .map(|(node_name, (score, _))| NodeScore {
                    name: node_name.clone(),
                    score,
                })
                .collect();

            if let Some(extensions) = plugin.score_extensions() {
                let status = extensions.normalize_score(ctx, state, pod, &mut scores);
                if !status.is_success() {
                    return Err(ScheduleError::PluginFailed {
                        plugin: plugin_name.clone(),
                        status,
                    });
                }
            }

            for node in totals.iter_mut() {
                let score = Self::normalized_score_of(&scores, &node.name).map_err(|err| {
                    ScheduleError::PluginFailed {
                        plugin: plugin_name.clone(),
                        status: err.into(),
                    }
                })?;
                node.scores.push(PluginScore {
                    name: plugin_name.clone(),
                    score,
                });
                node.total_score = score
                    .checked_mul(weight)
                    .and_then(|weighted| node.total_score.checked_add(weighted))
                    .ok_or_else(|| ScheduleError::PluginFailed {
                        plugin: plugin_name.clone(),
                        status: StatusError::TotalScoreOverflow(node.name.clone()).into(),
                    })?;
            }
        }

        Ok(totals)
    }

    fn normalized_score_of(scores: &NodeScoreList, node_name: &str) -> Result<i64, StatusError> {
        let score = scores
            .iter()
            .find(|node_score| node_score.name == node_name)
            .map(|node_score| node_score.score)
            .ok_or_else(|| StatusError::NodeScoreMissing(node_name.to_string()))?;
        if !(MIN_NODE_SCORE..=MAX_NODE_SCORE).contains(&score) {
            return Err(StatusError::ScoreOutOfRange {
                node: node_name.to_string(),
                score,
            });
        }
        Ok(score)
    }

    /// Highest total wins. Ties go to the node whose name sorts first.
    pub fn select_host(node_scores: &[NodePluginScores]) -> Option<&NodePluginScores> {
        node_scores.iter().max_by(|a, b| {
            a.total_score
                .cmp(&b.total_score)
                .then_with(|| b.name.cmp(&a.name))
        })
    }

    pub fn schedule_one(&self, ctx: &Context, pod: &Pod) -> Result<ScheduleResult, ScheduleError> {
        ctx.err().map_err(|_| ScheduleError::Cancelled)?;

        let snapshot = self.handle.snapshot();
        let node_infos = snapshot.list();
        if node_infos.is_empty() {
            return Err(ScheduleError::NoNodesAvailable);
        }

        let mut state = CycleState::new();
        state.write(CYCLE_SNAPSHOT_KEY, Box::new(CycleSnapshot(snapshot.clone())));
        let (feasible, diagnosis) = self.find_nodes_that_fit(ctx, &state, pod, &node_infos);
        ctx.err().map_err(|_| ScheduleError::Cancelled)?;
        if feasible.is_empty() {
            return Err(ScheduleError::Unschedulable {
                total: node_infos.len(),
                reasons: diagnosis
                    .into_iter()
                    .map(|(node_name, status)| (node_name, status.to_string()))
                    .collect(),
            });
        }

        let feasible_nodes = feasible.len();
        state.write(FEASIBLE_NODES_KEY, Box::new(FeasibleNodes(feasible)));

        let node_scores = self.prioritize_nodes(ctx, &state, pod)?;
        let suggested_host = Self::select_host(&node_scores)
            .map(|node| node.name.clone())
            .ok_or(ScheduleError::NoNodesAvailable)?;

        info!(
            "Pod {:?} fits node {:?} ({} of {} nodes feasible)",
            pod.metadata.name,
            suggested_host,
            feasible_nodes,
            node_infos.len()
        );

        Ok(ScheduleResult {
            suggested_host,
            evaluated_nodes: node_infos.len(),
            feasible_nodes,
            node_scores,
        })
    }
}
