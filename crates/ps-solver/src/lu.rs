//! Numeric sparse LU with threshold partial pivoting.
//!
//! Left-looking: column `k` of `A Q` is solved against the columns of `L`
//! found so far, then a pivot is chosen among the rows not yet pivotal.
//! The result satisfies `P A Q = L U` with `L` unit lower triangular.

use ps_core::Scalar;
use ps_sparse::CompressedMatrix;
use tracing::debug;

use crate::config::{DEFAULT_PIVOT_TOLERANCE, DEFAULT_SINGULAR_TOLERANCE};
use crate::error::{SolverError, SolverResult};
use crate::symbolic::SymbolicLu;
use crate::triangular::{Factor, ReachWorkspace, lower_solve_column};

/// Factors of one matrix, ready for repeated solves.
#[derive(Debug, Clone)]
pub struct LuFactors<T> {
    n: usize,
    l: Factor<T>,
    u: Factor<T>,
    /// Row permutation: original row `i` is pivot row `pinv[i]`.
    pinv: Vec<usize>,
    /// Column permutation: step `k` factored original column `q[k]`.
    q: Vec<usize>,
}

/// Pivot acceptance thresholds for [`factorize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotThresholds {
    /// Diagonal kept while `|diag| >= tolerance * max |candidate|`, in (0, 1]
    pub tolerance: f64,
    /// Column singular while `max |candidate| <= singular * max |a_ij|`, in [0, 1)
    pub singular: f64,
}

impl PivotThresholds {
    /// `tolerance` with the default singularity floor.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            singular: DEFAULT_SINGULAR_TOLERANCE,
        }
    }
}

impl Default for PivotThresholds {
    fn default() -> Self {
        Self::new(DEFAULT_PIVOT_TOLERANCE)
    }
}

/// Factor `a` under the column order from `symbolic`.
///
/// During column `k`, the diagonal candidate `a[col][col]` is kept when
/// `|a[col][col]| >= tolerance * max |candidate|` and it clears the
/// singularity floor; otherwise the largest candidate wins. The floor is
/// `singular * max |a_ij|`. A column whose largest candidate is at or below
/// the floor (or non-finite) makes the matrix singular and the whole
/// factorization fails.
pub fn factorize<T: Scalar>(
    a: &CompressedMatrix<T>,
    symbolic: &SymbolicLu,
    thresholds: PivotThresholds,
) -> SolverResult<LuFactors<T>> {
    let n = a.dim()?;
    if symbolic.dim() != n {
        return Err(SolverError::DimensionMismatch {
            expected: n,
            actual: symbolic.dim(),
        });
    }
    let q = symbolic.column_order();
    let a_max = a.values().iter().map(|v| v.modulus()).fold(0.0, f64::max);
    let floor = thresholds.singular * a_max;

    let mut l = Factor::with_capacity(n, symbolic.lnz_estimate());
    let mut u = Factor::with_capacity(n, symbolic.unz_estimate());
    let mut pinv: Vec<Option<usize>> = vec![None; n];
    let mut x = vec![T::zero(); n];
    let mut ws = ReachWorkspace::new(n);

    for (k, &col) in q.iter().enumerate() {
        l.begin_column();
        u.begin_column();

        lower_solve_column(&l, &pinv, a, col, &mut x, &mut ws);

        let mut best: Option<(usize, f64)> = None;
        for &i in &ws.pattern {
            match pinv[i] {
                Some(row) => u.push(row, x[i]),
                None => {
                    let t = x[i].modulus();
                    if best.is_none_or(|(_, m)| t > m) {
                        best = Some((i, t));
                    }
                }
            }
        }

        let ipiv = match best {
            Some((i, amax)) if amax > floor && amax.is_finite() => {
                let diag = x[col].modulus();
                if pinv[col].is_none() && diag >= amax * thresholds.tolerance && diag > floor {
                    col
                } else {
                    i
                }
            }
            _ => {
                let amax = best.map_or(0.0, |(_, m)| m);
                debug!(column = col, step = k, amax, floor, "no acceptable pivot");
                return Err(SolverError::SingularMatrix {
                    column: col,
                    external_id: None,
                });
            }
        };

        let pivot = x[ipiv];
        u.push(k, pivot);
        pinv[ipiv] = Some(k);
        l.push(ipiv, T::one());
        for &i in &ws.pattern {
            if pinv[i].is_none() {
                l.push(i, x[i] / pivot);
            }
            x[i] = T::zero();
        }
    }

    l.finish();
    u.finish();

    let pinv: Vec<usize> = pinv
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| SolverError::InvalidOrdering {
            what: "row permutation left incomplete".into(),
        })?;
    l.map_rows(|r| pinv[r]);

    debug!(n, lnz = l.nnz(), unz = u.nnz(), "numeric factorization");

    Ok(LuFactors {
        n,
        l,
        u,
        pinv,
        q: q.to_vec(),
    })
}

impl<T: Scalar> LuFactors<T> {
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn l_nnz(&self) -> usize {
        self.l.nnz()
    }

    pub fn u_nnz(&self) -> usize {
        self.u.nnz()
    }

    pub fn row_permutation(&self) -> &[usize] {
        &self.pinv
    }

    pub fn column_permutation(&self) -> &[usize] {
        &self.q
    }

    /// `L` with rows in pivot order.
    pub fn lower(&self) -> SolverResult<CompressedMatrix<T>> {
        self.l.to_matrix(self.n)
    }

    /// `U` with rows in pivot order.
    pub fn upper(&self) -> SolverResult<CompressedMatrix<T>> {
        self.u.to_matrix(self.n)
    }

    /// Solve `A x = b`.
    pub fn solve(&self, b: &[T]) -> SolverResult<Vec<T>> {
        if b.len() != self.n {
            return Err(SolverError::DimensionMismatch {
                expected: self.n,
                actual: b.len(),
            });
        }

        // x = P b
        let mut x = vec![T::zero(); self.n];
        for (i, &bi) in b.iter().enumerate() {
            x[self.pinv[i]] = bi;
        }

        self.l.lower_solve(&mut x);
        self.u.upper_solve(&mut x);

        // result(q) = x
        let mut result = vec![T::zero(); self.n];
        for (k, &qk) in self.q.iter().enumerate() {
            result[qk] = x[k];
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::OrderingPolicy;
    use nalgebra::DMatrix;
    use ps_sparse::TripletList;

    fn from_dense(rows: &[&[f64]]) -> CompressedMatrix {
        let n = rows.len();
        let mut t = TripletList::new();
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    t.push(i, j, v);
                }
            }
        }
        CompressedMatrix::from_triplets(&t, n, n).unwrap()
    }

    fn factor(a: &CompressedMatrix, policy: OrderingPolicy, tol: f64) -> SolverResult<LuFactors<f64>> {
        let s = SymbolicLu::analyze(a, &policy)?;
        factorize(a, &s, PivotThresholds::new(tol))
    }

    /// Rebuild `P A Q` and `L U` densely and compare.
    fn assert_plu(a: &CompressedMatrix, f: &LuFactors<f64>) {
        let n = a.nrows();
        let dense = a.to_dense();
        let mut paq = DMatrix::zeros(n, n);
        for i in 0..n {
            for (k, &qk) in f.column_permutation().iter().enumerate() {
                paq[(f.row_permutation()[i], k)] = dense[(i, qk)];
            }
        }
        let lu = f.lower().unwrap().to_dense() * f.upper().unwrap().to_dense();
        assert!((paq - lu).abs().max() < 1e-12);
    }

    #[test]
    fn factors_reproduce_permuted_matrix() {
        let a = from_dense(&[
            &[4.0, -1.0, 0.0, -1.0],
            &[-1.0, 4.0, -1.0, 0.0],
            &[0.0, -1.0, 4.0, -1.0],
            &[-1.0, 0.0, -1.0, 4.0],
        ]);
        for policy in OrderingPolicy::ALL {
            let f = factor(&a, policy, 1e-5).unwrap();
            assert_plu(&a, &f);
        }
    }

    #[test]
    fn zero_diagonal_forces_row_exchange() {
        let a = from_dense(&[&[0.0, 2.0], &[3.0, 1.0]]);
        let f = factor(&a, OrderingPolicy::Natural, 1e-5).unwrap();
        assert_eq!(f.row_permutation(), &[1, 0]);
        assert_plu(&a, &f);

        let x = f.solve(&[4.0, 5.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn threshold_keeps_acceptable_diagonal() {
        // Diagonal 1 is well above 0.1 * 3, so no exchange with tol = 0.1.
        let a = from_dense(&[&[1.0, 1.0], &[3.0, 5.0]]);
        let f = factor(&a, OrderingPolicy::Natural, 0.1).unwrap();
        assert_eq!(f.row_permutation(), &[0, 1]);

        // With tol = 1 only the largest candidate is acceptable.
        let f = factor(&a, OrderingPolicy::Natural, 1.0).unwrap();
        assert_eq!(f.row_permutation(), &[1, 0]);
        assert_plu(&a, &f);
    }

    #[test]
    fn empty_column_is_singular() {
        let a = from_dense(&[&[1.0, 0.0, 0.0], &[0.0, 0.0, 0.0], &[0.0, 0.0, 2.0]]);
        let err = factor(&a, OrderingPolicy::Natural, 1e-5).unwrap_err();
        assert_eq!(
            err,
            SolverError::SingularMatrix {
                column: 1,
                external_id: None
            }
        );
    }

    #[test]
    fn dependent_columns_are_singular() {
        let a = from_dense(&[&[1.0, 2.0], &[2.0, 4.0]]);
        let err = factor(&a, OrderingPolicy::Natural, 1e-5).unwrap_err();
        assert!(err.is_singular());
    }

    #[test]
    fn roundoff_pivot_is_singular() {
        // 0.3 - 0.1 - 0.2 leaves -2.8e-17 instead of an exact zero.
        let cancelled = 0.3 - 0.1 - 0.2;
        assert_ne!(cancelled, 0.0);
        let a = from_dense(&[&[1.0, 0.0], &[0.0, cancelled]]);
        for policy in OrderingPolicy::ALL {
            let err = factor(&a, policy, 1e-5).unwrap_err();
            assert_eq!(
                err,
                SolverError::SingularMatrix {
                    column: 1,
                    external_id: None
                }
            );
        }

        // A zero floor only rejects exact zeros.
        let s = SymbolicLu::analyze(&a, &OrderingPolicy::Natural).unwrap();
        let exact_only = PivotThresholds {
            tolerance: 1e-5,
            singular: 0.0,
        };
        assert!(factorize(&a, &s, exact_only).is_ok());
    }

    #[test]
    fn diagonal_below_floor_is_exchanged() {
        // tol = 1e-30 would keep the 1e-20 diagonal; the floor rejects it.
        let a = from_dense(&[&[1e-20, 1.0], &[1.0, 1.0]]);
        let f = factor(&a, OrderingPolicy::Natural, 1e-30).unwrap();
        assert_eq!(f.row_permutation(), &[1, 0]);
        assert_plu(&a, &f);
    }

    #[test]
    fn solve_checks_length() {
        let a = from_dense(&[&[2.0]]);
        let f = factor(&a, OrderingPolicy::Natural, 1e-5).unwrap();
        assert_eq!(f.solve(&[4.0]).unwrap(), vec![2.0]);
        assert!(matches!(
            f.solve(&[1.0, 2.0]),
            Err(SolverError::DimensionMismatch { expected: 1, actual: 2 })
        ));
    }
}
