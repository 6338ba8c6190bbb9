//! Type definitions for node objects as they appear in a cluster snapshot.

use serde::{Deserialize, Serialize};

use crate::core::common::ObjectMeta;

#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeSpec {
    // placeholder for future fields
}

#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Node {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NodeSpec,
}

impl Node {
    pub fn new(name: String) -> Self {
        Self {
            metadata: ObjectMeta {
                name,
                labels: Default::default(),
            },
            spec: Default::default(),
        }
    }

    pub fn with_labels<K, V>(name: String, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut node = Self::new(name);
        node.metadata.labels = labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        node
    }
}
