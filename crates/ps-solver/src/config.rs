//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};
use crate::ordering::OrderingPolicy;

/// Default threshold for partial pivoting.
///
/// The diagonal candidate is kept as pivot while its magnitude is at least
/// this fraction of the largest candidate in its column.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-5;

/// Default bound for the residual check, relative to `1 + max |b_i|`.
pub const DEFAULT_RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Default singularity floor, relative to the largest `|a_ij|` of the matrix.
///
/// A column whose largest pivot candidate is at or below
/// `singular_tolerance * max |a_ij|` is singular. Cancelled diagonals and
/// floating islands leave roundoff of order `n * EPSILON` there.
pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 256.0 * f64::EPSILON;

/// Named solver parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Column ordering applied before factorization
    pub ordering: OrderingPolicy,
    /// Threshold pivoting tolerance, in (0, 1]
    pub pivot_tolerance: f64,
    /// Residual check tolerance (advisory only)
    pub residual_tolerance: f64,
    /// Relative pivot floor below which a column is singular, in [0, 1)
    pub singular_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingPolicy::default(),
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            residual_tolerance: DEFAULT_RESIDUAL_TOLERANCE,
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> SolverResult<()> {
        validate_pivot_tolerance(self.pivot_tolerance)?;
        validate_singular_tolerance(self.singular_tolerance)?;
        if !(self.residual_tolerance.is_finite() && self.residual_tolerance >= 0.0) {
            return Err(SolverError::InvalidConfig {
                what: format!(
                    "residual_tolerance must be finite and non-negative, got {}",
                    self.residual_tolerance
                ),
            });
        }
        Ok(())
    }
}

pub(crate) fn validate_pivot_tolerance(tol: f64) -> SolverResult<()> {
    if tol > 0.0 && tol <= 1.0 {
        Ok(())
    } else {
        Err(SolverError::InvalidConfig {
            what: format!("pivot_tolerance must lie in (0, 1], got {tol}"),
        })
    }
}

pub(crate) fn validate_singular_tolerance(tol: f64) -> SolverResult<()> {
    if (0.0..1.0).contains(&tol) {
        Ok(())
    } else {
        Err(SolverError::InvalidConfig {
            what: format!("singular_tolerance must lie in [0, 1), got {tol}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SolverConfig::default();
        assert_eq!(cfg.pivot_tolerance, DEFAULT_PIVOT_TOLERANCE);
        assert_eq!(cfg.ordering, OrderingPolicy::MinDegreeAtA);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn pivot_tolerance_bounds() {
        for bad in [0.0, -1.0, 1.5, f64::NAN] {
            let cfg = SolverConfig {
                pivot_tolerance: bad,
                ..SolverConfig::default()
            };
            assert!(cfg.validate().is_err(), "{bad} accepted");
        }
        let cfg = SolverConfig {
            pivot_tolerance: 1.0,
            ..SolverConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn singular_tolerance_bounds() {
        for bad in [-1e-12, 1.0, f64::NAN, f64::INFINITY] {
            let cfg = SolverConfig {
                singular_tolerance: bad,
                ..SolverConfig::default()
            };
            assert!(cfg.validate().is_err(), "{bad} accepted");
        }
        let exact_zero_only = SolverConfig {
            singular_tolerance: 0.0,
            ..SolverConfig::default()
        };
        assert!(exact_zero_only.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SolverConfig = serde_json::from_str(r#"{ "ordering": "natural" }"#).unwrap();
        assert_eq!(cfg.ordering, OrderingPolicy::Natural);
        assert_eq!(cfg.pivot_tolerance, DEFAULT_PIVOT_TOLERANCE);
        assert_eq!(cfg.singular_tolerance, DEFAULT_SINGULAR_TOLERANCE);

        let err = serde_json::from_str::<SolverConfig>(r#"{ "tol": 1.0 }"#);
        assert!(err.is_err());
    }
}
