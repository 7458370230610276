//! Error types for assembly.

use ps_network::NetworkError;
use ps_sparse::SparseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Sparse error: {0}")]
    Sparse(#[from] SparseError),

    #[error("Right-hand side has length {actual} but {expected} nodes are indexed")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type AssemblyResult<T> = Result<T, AssemblyError>;
