//! The sparse direct solver capability.

use std::sync::Arc;

use ps_core::{Complex64, Scalar};
use ps_sparse::CompressedMatrix;

use crate::config::{SolverConfig, validate_pivot_tolerance, validate_singular_tolerance};
use crate::error::SolverResult;
use crate::lu::{self, LuFactors, PivotThresholds};
use crate::ordering::ColumnOrdering;
use crate::symbolic::SymbolicLu;

/// Something that can factor and solve a square sparse system.
///
/// Assembly never depends on the implementor, so hosts can swap solvers (or
/// coefficient types) without touching stamping or right-hand-side code.
pub trait SparseDirectSolver<T: Scalar>: Send + Sync {
    fn factorize(&self, a: &CompressedMatrix<T>) -> SolverResult<LuFactors<T>>;

    /// Factor then solve; the factors are dropped afterwards.
    fn solve(&self, a: &CompressedMatrix<T>, b: &[T]) -> SolverResult<Vec<T>> {
        self.factorize(a)?.solve(b)
    }
}

/// Real-coefficient solver object.
pub type RealLuSolver = dyn SparseDirectSolver<f64>;

/// Complex-coefficient solver object.
pub type ComplexLuSolver = dyn SparseDirectSolver<Complex64>;

/// Left-looking sparse LU with threshold partial pivoting.
#[derive(Debug, Clone)]
pub struct LuSolver {
    thresholds: PivotThresholds,
    ordering: Arc<dyn ColumnOrdering>,
}

impl LuSolver {
    pub fn new(config: &SolverConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self {
            thresholds: PivotThresholds {
                tolerance: config.pivot_tolerance,
                singular: config.singular_tolerance,
            },
            ordering: Arc::new(config.ordering),
        })
    }

    /// Replace the column ordering with a custom strategy.
    pub fn with_ordering(mut self, ordering: Arc<dyn ColumnOrdering>) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_pivot_tolerance(mut self, tol: f64) -> SolverResult<Self> {
        validate_pivot_tolerance(tol)?;
        self.thresholds.tolerance = tol;
        Ok(self)
    }

    pub fn with_singular_tolerance(mut self, tol: f64) -> SolverResult<Self> {
        validate_singular_tolerance(tol)?;
        self.thresholds.singular = tol;
        Ok(self)
    }

    pub fn pivot_tolerance(&self) -> f64 {
        self.thresholds.tolerance
    }

    pub fn singular_tolerance(&self) -> f64 {
        self.thresholds.singular
    }

    pub fn ordering(&self) -> &dyn ColumnOrdering {
        self.ordering.as_ref()
    }
}

impl Default for LuSolver {
    fn default() -> Self {
        Self {
            thresholds: PivotThresholds::default(),
            ordering: Arc::new(SolverConfig::default().ordering),
        }
    }
}

impl<T: Scalar> SparseDirectSolver<T> for LuSolver {
    fn factorize(&self, a: &CompressedMatrix<T>) -> SolverResult<LuFactors<T>> {
        let symbolic = SymbolicLu::analyze(a, self.ordering.as_ref())?;
        lu::factorize(a, &symbolic, self.thresholds)
    }
}

/// Order, factor and solve `a x = b` in one call, with the default
/// singularity floor.
pub fn factorize_and_solve<T: Scalar>(
    a: &CompressedMatrix<T>,
    b: &[T],
    ordering: &dyn ColumnOrdering,
    pivot_tolerance: f64,
) -> SolverResult<Vec<T>> {
    validate_pivot_tolerance(pivot_tolerance)?;
    let symbolic = SymbolicLu::analyze(a, ordering)?;
    lu::factorize(a, &symbolic, PivotThresholds::new(pivot_tolerance))?.solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::ordering::OrderingPolicy;
    use ps_sparse::TripletList;

    fn tridiagonal<T: Scalar>(n: usize, diag: T, off: T) -> CompressedMatrix<T> {
        let mut t = TripletList::new();
        for i in 0..n {
            t.push(i, i, diag);
            if i + 1 < n {
                t.push(i, i + 1, off);
                t.push(i + 1, i, off);
            }
        }
        CompressedMatrix::from_triplets(&t, n, n).unwrap()
    }

    #[test]
    fn real_and_complex_behind_trait_objects() {
        let real: Box<RealLuSolver> = Box::new(LuSolver::default());
        let complex: Box<ComplexLuSolver> = Box::new(LuSolver::default());

        let a = tridiagonal(5, 4.0, -1.0);
        let x_true = vec![1.0, -2.0, 3.0, 0.5, 2.0];
        let b = a.multiply(&x_true).unwrap();
        let x = real.solve(&a, &b).unwrap();
        for (xi, ti) in x.iter().zip(&x_true) {
            assert!((xi - ti).abs() < 1e-12);
        }

        let y = Complex64::new(2.0, -6.0);
        let ac = tridiagonal(4, y * 2.5, -y);
        let xc_true: Vec<Complex64> = (0..4).map(|k| Complex64::new(k as f64, 1.0)).collect();
        let bc = ac.multiply(&xc_true).unwrap();
        let xc = complex.solve(&ac, &bc).unwrap();
        for (xi, ti) in xc.iter().zip(&xc_true) {
            assert!((xi - ti).norm() < 1e-12);
        }
    }

    #[test]
    fn free_function_matches_solver() {
        let a = tridiagonal(6, 3.0, 1.0);
        let b = vec![1.0; 6];
        let via_fn = factorize_and_solve(&a, &b, &OrderingPolicy::Natural, 1e-5).unwrap();
        let solver = LuSolver::new(&SolverConfig {
            ordering: OrderingPolicy::Natural,
            ..SolverConfig::default()
        })
        .unwrap();
        assert_eq!(via_fn, solver.solve(&a, &b).unwrap());
    }

    #[test]
    fn bad_tolerance_rejected() {
        let a = tridiagonal(2, 1.0, 0.0);
        let err = factorize_and_solve(&a, &[1.0, 1.0], &OrderingPolicy::Natural, 0.0).unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig { .. }));
        assert!(LuSolver::default().with_pivot_tolerance(2.0).is_err());
        assert!(LuSolver::default().with_singular_tolerance(1.0).is_err());
    }
}
