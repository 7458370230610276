//! Error types for solver operations.

use ps_assembly::AssemblyError;
use ps_network::NetworkError;
use ps_sparse::SparseError;
use thiserror::Error;

/// Errors that can occur while factoring or solving a system.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// No pivot candidate in `column` cleared the threshold.
    #[error("Singular matrix: no acceptable pivot in column {column}{}", external_suffix(.external_id))]
    SingularMatrix {
        column: usize,
        external_id: Option<String>,
    },

    #[error("Invalid column ordering: {what}")]
    InvalidOrdering { what: String },

    #[error("Invalid solver configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Equation has not been factorized")]
    NotFactorized,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index {index} out of bounds for dimension {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Sparse error: {0}")]
    Sparse(#[from] SparseError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

pub type SolverResult<T> = Result<T, SolverError>;

fn external_suffix(external_id: &Option<String>) -> String {
    match external_id {
        Some(id) => format!(" (bus {id})"),
        None => String::new(),
    }
}

impl SolverError {
    /// Attach an external identifier to a singular-matrix error.
    ///
    /// Other variants, and errors that already carry an id, pass through.
    pub fn with_external_id(self, lookup: impl FnOnce(usize) -> Option<String>) -> Self {
        match self {
            SolverError::SingularMatrix {
                column,
                external_id: None,
            } => SolverError::SingularMatrix {
                column,
                external_id: lookup(column),
            },
            other => other,
        }
    }

    pub fn is_singular(&self) -> bool {
        matches!(self, SolverError::SingularMatrix { .. })
    }
}
