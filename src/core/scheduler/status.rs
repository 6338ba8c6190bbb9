//! Outcome of a single plugin call.

use std::fmt;

use serde::Serialize;

use crate::core::snapshot::LookupError;

/// Highest score a score plugin may return after normalization.
pub const MAX_NODE_SCORE: i64 = 100;
/// Lowest score a score plugin may return after normalization.
pub const MIN_NODE_SCORE: i64 = 0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatusError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("context cancelled")]
    Cancelled,
    #[error("score {score} of node {node:?} is outside [{min}, {max}]", min = MIN_NODE_SCORE, max = MAX_NODE_SCORE)]
    ScoreOutOfRange { node: String, score: i64 },
    #[error("normalized scores lack node {0:?}")]
    NodeScoreMissing(String),
    #[error("weighted total score of node {0:?} overflows")]
    TotalScoreOverflow(String),
}

/// Tri-state result of a filter, score or normalize call.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Success,
    /// The node can not host the pod. Not an error.
    Unschedulable { reason: String },
    Error(StatusError),
}

impl Status {
    pub fn unschedulable(reason: impl Into<String>) -> Self {
        Status::Unschedulable {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::Success)
    }

    pub fn is_unschedulable(&self) -> bool {
        matches!(self, Status::Unschedulable { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

impl From<StatusError> for Status {
    fn from(err: StatusError) -> Self {
        Status::Error(err)
    }
}

impl From<LookupError> for Status {
    fn from(err: LookupError) -> Self {
        Status::Error(err.into())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "Success"),
            Status::Unschedulable { reason } => write!(f, "Unschedulable: {}", reason),
            Status::Error(err) => write!(f, "Error: {}", err),
        }
    }
}

/// Score of one node given by one plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeScore {
    pub name: String,
    pub score: i64,
}

pub type NodeScoreList = Vec<NodeScore>;
