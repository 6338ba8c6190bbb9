//! Type definition for Pod, the workload being placed.

use serde::{Deserialize, Serialize};

use crate::core::common::ObjectMeta;

pub const DEFAULT_SCHEDULER_NAME: &str = "default-scheduler";

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PodSpec {
    /// Profile which should schedule this pod. None means the default profile.
    #[serde(default)]
    pub scheduler_name: Option<String>,
}

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Pod {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PodSpec,
}

impl Pod {
    pub fn new(name: String) -> Self {
        Self {
            metadata: ObjectMeta {
                name,
                labels: Default::default(),
            },
            spec: Default::default(),
        }
    }

    pub fn scheduler_name(&self) -> &str {
        self.spec
            .scheduler_name
            .as_deref()
            .unwrap_or(DEFAULT_SCHEDULER_NAME)
    }
}
