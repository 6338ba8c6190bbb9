//! Point-in-time view of the cluster used by plugins during a scheduling cycle.
//!
//! The snapshot is owned by the host. Plugins reach it through a [`Handle`] and only ever look
//! nodes up by name; nothing in a snapshot is mutated after it has been built.
//!
//! [`Handle`]: crate::core::scheduler::handle::Handle

use std::collections::BTreeMap;

use crate::core::node::Node;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("node {0:?} not found in snapshot")]
    NodeNotFound(String),
    #[error("node info {0:?} has no node object")]
    NodeInfoWithoutNode(String),
}

/// Node-level aggregated information kept in a snapshot.
///
/// A node info may outlive its node object (the node was removed but the entry is still
/// tracked), so `node()` is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    name: String,
    node: Option<Node>,
}

impl NodeInfo {
    pub fn new(node: Node) -> Self {
        Self {
            name: node.metadata.name.clone(),
            node: Some(node),
        }
    }

    pub fn without_node(name: String) -> Self {
        Self { name, node: None }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    pub fn try_node(&self) -> Result<&Node, LookupError> {
        self.node
            .as_ref()
            .ok_or_else(|| LookupError::NodeInfoWithoutNode(self.name.clone()))
    }
}

pub trait NodeInfoLister: Send + Sync {
    fn get(&self, node_name: &str) -> Result<&NodeInfo, LookupError>;
    /// All node infos ordered by node name.
    fn list(&self) -> Vec<&NodeInfo>;
}

pub trait SharedLister: Send + Sync {
    fn node_infos(&self) -> &dyn NodeInfoLister;
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Snapshot {
    node_infos: BTreeMap<String, NodeInfo>,
}

impl Snapshot {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self::from_node_infos(nodes.into_iter().map(NodeInfo::new))
    }

    pub fn from_node_infos(node_infos: impl IntoIterator<Item = NodeInfo>) -> Self {
        Self {
            node_infos: node_infos
                .into_iter()
                .map(|node_info| (node_info.name.clone(), node_info))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.node_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_infos.is_empty()
    }
}

impl NodeInfoLister for Snapshot {
    fn get(&self, node_name: &str) -> Result<&NodeInfo, LookupError> {
        self.node_infos
            .get(node_name)
            .ok_or_else(|| LookupError::NodeNotFound(node_name.to_string()))
    }

    fn list(&self) -> Vec<&NodeInfo> {
        self.node_infos.values().collect()
    }
}

impl SharedLister for Snapshot {
    fn node_infos(&self) -> &dyn NodeInfoLister {
        self
    }
}
