//! Network model errors.

use ps_core::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// A branch end or injection names a node that is neither indexed nor the reference.
    #[error("Node {node} is not in the index map and is not the reference node")]
    UnmappedIndex { node: NodeId },

    /// The reference node is missing or declared inconsistently across sources.
    #[error("Input inconsistency: {what}")]
    InputInconsistency { what: String },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
