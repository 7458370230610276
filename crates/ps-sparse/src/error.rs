//! Error types for sparse storage.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparseError {
    #[error("Structural error: {what}")]
    Structural { what: String },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

pub type SparseResult<T> = Result<T, SparseError>;

impl SparseError {
    pub fn structural(what: impl Into<String>) -> Self {
        Self::Structural { what: what.into() }
    }
}
