use thiserror::Error;
use uuid::Uuid;

use crate::graph::NodeId;

/// Which side of the call boundary an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller supplied something malformed.
    Input,
    /// An invariant inside the crate was violated.
    Internal,
}

#[derive(Debug, Error)]
pub enum AssignError {
    #[error("invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("resource {resource_id} has non-positive capacity")]
    InvalidCapacity { resource_id: Uuid },

    #[error("candidate list is empty")]
    NoCandidates,

    #[error("duplicate candidate id: {0}")]
    DuplicateCandidate(Uuid),

    #[error("duplicate request id: {0}")]
    DuplicateRequest(Uuid),

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("duplicate graph node: {0}")]
    DuplicateNode(NodeId),

    #[error("unknown graph node: {0}")]
    UnknownNode(NodeId),

    #[error("invalid edge weight {weight} between nodes {from} and {to}")]
    InvalidEdgeWeight { from: usize, to: usize, weight: f64 },

    #[error("negative distance {distance} computed for node {node}")]
    NegativeDistance { node: NodeId, distance: f64 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl AssignError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AssignError::InvalidCoordinate { .. }
            | AssignError::InvalidCapacity { .. }
            | AssignError::NoCandidates
            | AssignError::DuplicateCandidate(_)
            | AssignError::DuplicateRequest(_)
            | AssignError::InvalidOptions(_)
            | AssignError::InvalidConfig(_)
            | AssignError::DuplicateNode(_) => ErrorClass::Input,
            AssignError::UnknownNode(_)
            | AssignError::InvalidEdgeWeight { .. }
            | AssignError::NegativeDistance { .. }
            | AssignError::Internal(_) => ErrorClass::Internal,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.class() == ErrorClass::Internal
    }
}
