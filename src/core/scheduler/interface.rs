//! Extension points a scheduler plugin can implement.
//!
//! Every capability is its own narrow trait. The host asks a constructed plugin which of them
//! it implements through [`Plugin::as_filter`], [`Plugin::as_score`] and
//! [`ScorePlugin::score_extensions`], and wires it only into those extension points.

use std::collections::BTreeMap;

use crate::core::pod::Pod;
use crate::core::scheduler::context::Context;
use crate::core::scheduler::cycle_state::CycleState;
use crate::core::scheduler::framework::ScheduleResult;
use crate::core::scheduler::status::{NodeScoreList, Status};
use crate::core::snapshot::NodeInfo;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn as_filter(&self) -> Option<&dyn FilterPlugin> {
        None
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        None
    }
}

/// Filter plugins rule out nodes that can not run the pod. Any status other than
/// `Success` removes the node from the candidates of this cycle.
pub trait FilterPlugin: Plugin {
    fn filter(&self, ctx: &Context, state: &CycleState, pod: &Pod, node_info: &NodeInfo)
        -> Status;
}

/// Score plugins rank nodes that passed filtering. Raw scores must end up in
/// `[MIN_NODE_SCORE, MAX_NODE_SCORE]` after normalization.
pub trait ScorePlugin: Plugin {
    fn score(&self, ctx: &Context, state: &CycleState, pod: &Pod, node_name: &str)
        -> (i64, Status);

    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        None
    }
}

/// Called once per cycle with all scores of the same plugin.
pub trait ScoreExtensions: Send + Sync {
    fn normalize_score(
        &self,
        ctx: &Context,
        state: &CycleState,
        pod: &Pod,
        scores: &mut NodeScoreList,
    ) -> Status;
}

#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("plugin {plugin}: args must be an object, got {found}")]
    NotAnObject { plugin: String, found: &'static str },
    #[error("plugin {plugin}: unknown field {field:?} in args")]
    UnknownField { plugin: String, field: String },
    #[error("plugin {plugin}: field {field:?} must be {expected}")]
    InvalidField {
        plugin: String,
        field: String,
        expected: &'static str,
    },
    #[error("plugin {plugin}: decoding args: {source}")]
    Decode {
        plugin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("plugin {0:?} is not registered")]
    UnknownPlugin(String),
    #[error("plugin {0:?} is already registered")]
    DuplicatePlugin(String),
    #[error("plugin {plugin:?} is enabled at {extension_point} but does not implement it")]
    MissingCapability {
        plugin: String,
        extension_point: &'static str,
    },
    #[error("plugin {plugin:?} has score weight {weight}, must be positive and keep total scores within i64")]
    InvalidWeight { plugin: String, weight: i64 },
    #[error("scheduler profile {0:?} is defined more than once")]
    DuplicateProfile(String),
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("no nodes available to schedule pods")]
    NoNodesAvailable,
    /// Map from node name to the status which ruled it out.
    #[error("0/{total} nodes are available")]
    Unschedulable {
        total: usize,
        reasons: BTreeMap<String, String>,
    },
    #[error("profile {0:?} not found")]
    UnknownProfile(String),
    #[error("plugin {plugin:?} failed: {status}")]
    PluginFailed { plugin: String, status: Status },
    #[error("scheduling cycle cancelled")]
    Cancelled,
}

// Trait which any scheduler implementation should implement.
pub trait PodSchedulingAlgorithm {
    // Assigns a node on which the pod should run.
    // Returns the scheduling result with the suggested host or a scheduling error.
    fn schedule_one(&self, ctx: &Context, pod: &Pod) -> Result<ScheduleResult, ScheduleError>;
}
