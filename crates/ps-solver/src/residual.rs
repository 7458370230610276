//! Residual check for a computed solution.

use ps_core::Scalar;
use ps_sparse::CompressedMatrix;
use tracing::warn;

use crate::error::{SolverError, SolverResult};

/// Comparison of `A x` against the right-hand side it was solved for.
///
/// Advisory only: a failing report is logged, never raised.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualReport<T> {
    /// `y = A x`
    pub y: Vec<T>,
    /// `max_i |y_i - b_i|`
    pub max_abs: f64,
    /// `|| y - b ||_2`
    pub norm: f64,
    /// Whether `max_abs <= tolerance * (1 + max_i |b_i|)`
    pub passed: bool,
}

impl<T: Scalar> ResidualReport<T> {
    pub fn check(
        a: &CompressedMatrix<T>,
        x: &[T],
        b: &[T],
        tolerance: f64,
    ) -> SolverResult<Self> {
        let y = a.multiply(x)?;
        if b.len() != y.len() {
            return Err(SolverError::DimensionMismatch {
                expected: y.len(),
                actual: b.len(),
            });
        }

        let mut max_abs: f64 = 0.0;
        let mut sum_sq = 0.0;
        for (&yi, &bi) in y.iter().zip(b) {
            let d = (yi - bi).modulus();
            max_abs = max_abs.max(d);
            sum_sq += d * d;
        }
        let b_max = b.iter().map(|v| v.modulus()).fold(0.0, f64::max);
        let passed = max_abs.is_finite() && max_abs <= tolerance * (1.0 + b_max);

        if !passed {
            warn!(max_abs, tolerance, "residual check failed");
        }

        Ok(Self {
            y,
            max_abs,
            norm: sum_sq.sqrt(),
            passed,
        })
    }
}
