//! PreferNodeLabel prefers nodes which carry a configured label.
//!
//! A node whose `labelKey` label equals `labelValue` scores [`MAX_NODE_SCORE`], every other node
//! scores zero. Filtering is permissive: all nodes pass unless the plugin is configured with
//! `enforceLabel: true`, in which case nodes without the label are unschedulable.
//!
//! Args, as given in `pluginConfig`:
//!
//! ```yaml
//! - name: PreferNodeLabel
//!   args:
//!     labelKey: zone        # default "workload"
//!     labelValue: us-east   # default "true"
//!     enforceLabel: false   # default false
//! ```

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::node::Node;
use crate::core::pod::Pod;
use crate::core::scheduler::context::Context;
use crate::core::scheduler::cycle_state::CycleState;
use crate::core::scheduler::handle::{cycle_shared_lister, Handle};
use crate::core::scheduler::interface::{
    ConstructionError, FilterPlugin, Plugin, ScoreExtensions, ScorePlugin,
};
use crate::core::scheduler::status::{
    NodeScoreList, Status, StatusError, MAX_NODE_SCORE, MIN_NODE_SCORE,
};
use crate::core::snapshot::NodeInfo;

pub const NAME: &str = "PreferNodeLabel";
pub const DEFAULT_LABEL_KEY: &str = "workload";
pub const DEFAULT_LABEL_VALUE: &str = "true";

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    String,
    Bool,
}

impl FieldKind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string() || value.is_null(),
            FieldKind::Bool => value.is_boolean() || value.is_null(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Bool => "a boolean",
        }
    }
}

const ARGS_FIELDS: &[(&str, FieldKind)] = &[
    ("labelKey", FieldKind::String),
    ("labelValue", FieldKind::String),
    ("enforceLabel", FieldKind::Bool),
];

/// Raw plugin args. Absent and empty fields are filled in by [`PreferNodeLabelConfig`].
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PreferNodeLabelArgs {
    #[serde(default)]
    pub label_key: Option<String>,
    #[serde(default)]
    pub label_value: Option<String>,
    #[serde(default)]
    pub enforce_label: Option<bool>,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl PreferNodeLabelArgs {
    /// Validates the payload shape field by field, then decodes it. A missing or null payload
    /// decodes to empty args.
    pub fn decode(payload: Option<&Value>) -> Result<Self, ConstructionError> {
        let object = match payload {
            None | Some(Value::Null) => return Ok(Self::default()),
            Some(Value::Object(object)) => object,
            Some(other) => {
                return Err(ConstructionError::NotAnObject {
                    plugin: NAME.to_string(),
                    found: json_kind(other),
                })
            }
        };

        for (field, value) in object.iter() {
            let Some(&(_, kind)) = ARGS_FIELDS.iter().find(|(name, _)| *name == field.as_str()) else {
                return Err(ConstructionError::UnknownField {
                    plugin: NAME.to_string(),
                    field: field.clone(),
                });
            };
            if !kind.accepts(value) {
                return Err(ConstructionError::InvalidField {
                    plugin: NAME.to_string(),
                    field: field.clone(),
                    expected: kind.expected(),
                });
            }
        }

        Self::deserialize(Value::Object(object.clone())).map_err(|source| {
            ConstructionError::Decode {
                plugin: NAME.to_string(),
                source,
            }
        })
    }
}

/// Effective plugin configuration. Defaults are applied once, when it is built from args.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferNodeLabelConfig {
    label_key: String,
    label_value: String,
    enforce_label: bool,
}

impl PreferNodeLabelConfig {
    pub fn from_args(args: PreferNodeLabelArgs) -> Self {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Self {
            label_key: or_default(args.label_key, DEFAULT_LABEL_KEY),
            label_value: or_default(args.label_value, DEFAULT_LABEL_VALUE),
            enforce_label: args.enforce_label.unwrap_or(false),
        }
    }

    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    pub fn label_value(&self) -> &str {
        &self.label_value
    }

    pub fn enforce_label(&self) -> bool {
        self.enforce_label
    }

    pub fn matches(&self, node: &Node) -> bool {
        node.metadata.label(&self.label_key) == Some(self.label_value.as_str())
    }
}

impl Default for PreferNodeLabelConfig {
    fn default() -> Self {
        Self::from_args(PreferNodeLabelArgs::default())
    }
}

pub struct PreferNodeLabel {
    handle: Arc<dyn Handle>,
    config: PreferNodeLabelConfig,
}

impl PreferNodeLabel {
    /// Plugin factory registered under [`NAME`].
    pub fn new(
        args: Option<&Value>,
        handle: Arc<dyn Handle>,
    ) -> Result<Box<dyn Plugin>, ConstructionError> {
        let config = PreferNodeLabelConfig::from_args(PreferNodeLabelArgs::decode(args)?);
        info!(
            "{} prefers nodes labeled {}={} (enforce: {})",
            NAME, config.label_key, config.label_value, config.enforce_label
        );
        Ok(Box::new(Self::with_config(config, handle)))
    }

    pub fn with_config(config: PreferNodeLabelConfig, handle: Arc<dyn Handle>) -> Self {
        Self { handle, config }
    }

    pub fn config(&self) -> &PreferNodeLabelConfig {
        &self.config
    }

    fn node_score(&self, node: &Node) -> i64 {
        if self.config.matches(node) {
            MAX_NODE_SCORE
        } else {
            MIN_NODE_SCORE
        }
    }
}

impl Plugin for PreferNodeLabel {
    fn name(&self) -> &'static str {
        NAME
    }

    fn as_filter(&self) -> Option<&dyn FilterPlugin> {
        Some(self)
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        Some(self)
    }
}

impl FilterPlugin for PreferNodeLabel {
    fn filter(
        &self,
        ctx: &Context,
        _state: &CycleState,
        pod: &Pod,
        node_info: &NodeInfo,
    ) -> Status {
        if let Err(err) = ctx.err() {
            return err.into();
        }
        let node = match node_info.try_node() {
            Ok(node) => node,
            Err(err) => return err.into(),
        };
        if !self.config.enforce_label || self.config.matches(node) {
            return Status::Success;
        }
        debug!(
            "Node {:?} lacks label {}={} required by pod {:?}",
            node_info.name(),
            self.config.label_key,
            self.config.label_value,
            pod.metadata.name
        );
        Status::unschedulable(format!(
            "node(s) didn't have label {}={}",
            self.config.label_key, self.config.label_value
        ))
    }
}

impl ScorePlugin for PreferNodeLabel {
    fn score(&self, ctx: &Context, state: &CycleState, pod: &Pod, node_name: &str) -> (i64, Status) {
        if let Err(err) = ctx.err() {
            return (MIN_NODE_SCORE, err.into());
        }
        let lister = cycle_shared_lister(state, self.handle.as_ref());
        let node = match lister.node_infos().get(node_name).and_then(NodeInfo::try_node) {
            Ok(node) => node,
            Err(err) => return (MIN_NODE_SCORE, err.into()),
        };
        let score = self.node_score(node);
        debug!(
            "Pod {:?} on node {:?}: score {}",
            pod.metadata.name, node_name, score
        );
        (score, Status::Success)
    }

    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        Some(self)
    }
}

impl ScoreExtensions for PreferNodeLabel {
    // Raw scores are already MIN_NODE_SCORE or MAX_NODE_SCORE, so normalization keeps them.
    fn normalize_score(
        &self,
        ctx: &Context,
        _state: &CycleState,
        _pod: &Pod,
        scores: &mut NodeScoreList,
    ) -> Status {
        if let Err(err) = ctx.err() {
            return err.into();
        }
        match scores
            .iter()
            .find(|node_score| !(MIN_NODE_SCORE..=MAX_NODE_SCORE).contains(&node_score.score))
        {
            Some(node_score) => StatusError::ScoreOutOfRange {
                node: node_score.name.clone(),
                score: node_score.score,
            }
            .into(),
            None => Status::Success,
        }
    }
}
