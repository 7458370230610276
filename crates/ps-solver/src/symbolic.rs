//! Symbolic analysis for sparse LU.

use ps_core::Scalar;
use ps_sparse::CompressedMatrix;
use tracing::debug;

use crate::error::SolverResult;
use crate::ordering::{ColumnOrdering, validate_permutation};

/// Column permutation and storage estimates for one factorization.
///
/// The exact pattern of every column of `L` and `U` depends on the pivots,
/// so it is found column by column during the numeric phase; this only fixes
/// the column order and sizes the factor storage up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicLu {
    n: usize,
    column_order: Vec<usize>,
    lnz_estimate: usize,
    unz_estimate: usize,
}

impl SymbolicLu {
    pub fn analyze<T: Scalar>(
        a: &CompressedMatrix<T>,
        ordering: &dyn ColumnOrdering,
    ) -> SolverResult<Self> {
        let n = a.dim()?;
        let column_order = ordering.column_order(&a.pattern());
        validate_permutation(&column_order, n)?;

        // Same initial guess CSparse makes for LU; storage grows if needed.
        let estimate = 4 * a.nnz() + n;
        debug!(n, nnz = a.nnz(), ordering = ordering.name(), "symbolic analysis");

        Ok(Self {
            n,
            column_order,
            lnz_estimate: estimate,
            unz_estimate: estimate,
        })
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    /// `q[k]` is the original column factored at step `k`.
    pub fn column_order(&self) -> &[usize] {
        &self.column_order
    }

    pub fn lnz_estimate(&self) -> usize {
        self.lnz_estimate
    }

    pub fn unz_estimate(&self) -> usize {
        self.unz_estimate
    }
}
