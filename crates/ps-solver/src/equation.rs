//! Sparse equation objects driven step by step by a host application.
//!
//! A host fills `[A]` and `b`, factorizes, then solves (possibly for several
//! right-hand sides). Indices run from `0` to `n - 1`; every row can carry an
//! external bus id used when a factorization fails.

use std::sync::Arc;

use ps_assembly::{assemble, build_rhs};
use ps_core::{Complex64, NodeIndex, Scalar};
use ps_network::{IndexMap, Partition};
use ps_sparse::{SparseEntryStore, compress_square};
use tracing::debug;

use crate::config::{DEFAULT_PIVOT_TOLERANCE, SolverConfig};
use crate::direct::{LuSolver, SparseDirectSolver};
use crate::error::{SolverError, SolverResult};
use crate::lu::LuFactors;
use crate::ordering::ColumnOrdering;

/// Contract of a square sparse `[A] x = b` problem.
pub trait SparseEquation {
    type Value: Scalar;

    fn is_square_matrix(&self) -> bool;

    /// Number of stored matrix entries.
    fn total_elements(&self) -> usize;

    fn dimension(&self) -> usize;

    /// Append a row and column: `a_nn = 1`, `b_n = 0`.
    fn increase_dimension(&mut self);

    /// Set `b` to the unit vector `e_i`.
    fn set_b_to_unity(&mut self, i: usize) -> SolverResult<()>;

    fn set_b_to_zero(&mut self);

    /// Drop every matrix entry and zero `b`; the dimension is kept.
    fn reset(&mut self);

    /// Zero every matrix entry, keeping the sparse structure.
    fn set_to_zero(&mut self);

    fn is_factorized(&self) -> bool;

    /// LU-factor `[A]` with the given pivot tolerance.
    fn factorization(&mut self, tolerance: f64) -> SolverResult<()>;

    /// LU-factor `[A]` with [`DEFAULT_PIVOT_TOLERANCE`].
    fn factorization_default(&mut self) -> SolverResult<()> {
        self.factorization(DEFAULT_PIVOT_TOLERANCE)
    }

    /// Solve with the existing factors; the solution replaces the previous one.
    fn solve_eqn(&mut self) -> SolverResult<()>;

    /// Solve for a caller-supplied `b` with the existing factors. The stored
    /// `b` and solution are left alone.
    fn solve_lued_eqn(&self, b: &[Self::Value]) -> SolverResult<Vec<Self::Value>>;

    /// Factorize with `tolerance` and solve.
    fn solve_eqn_with_tolerance(&mut self, tolerance: f64) -> SolverResult<()> {
        self.factorization(tolerance)?;
        self.solve_eqn()
    }

    /// `[A] x` for the current matrix.
    fn multiply(&self, x: &[Self::Value]) -> SolverResult<Vec<Self::Value>>;

    /// Row of the column that had no acceptable pivot in the last failed factorization.
    fn zero_aii_row(&self) -> Option<usize>;

    fn bus_id(&self, row: usize) -> Option<&str>;

    fn set_bus_id(&mut self, row: usize, id: impl Into<String>) -> SolverResult<()>;

    fn add_to_aij(&mut self, i: usize, j: usize, value: Self::Value) -> SolverResult<()>;

    fn set_bi(&mut self, i: usize, value: Self::Value) -> SolverResult<()>;

    fn add_to_bi(&mut self, i: usize, value: Self::Value) -> SolverResult<()>;

    fn bi(&self, i: usize) -> SolverResult<Self::Value>;

    /// Solution of the last successful `solve_eqn`.
    fn solution(&self) -> Option<&[Self::Value]>;
}

/// [`SparseEquation`] backed by a [`SparseEntryStore`] and [`LuSolver`].
#[derive(Debug, Clone)]
pub struct SparseEqn<T> {
    n: usize,
    store: SparseEntryStore<T>,
    b: Vec<T>,
    bus_ids: Vec<Option<String>>,
    ordering: Arc<dyn ColumnOrdering>,
    factors: Option<LuFactors<T>>,
    solution: Option<Vec<T>>,
    zero_aii_row: Option<usize>,
}

pub type SparseEqnReal = SparseEqn<f64>;
pub type SparseEqnComplex = SparseEqn<Complex64>;

impl<T: Scalar> SparseEqn<T> {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            store: SparseEntryStore::new(),
            b: vec![T::zero(); n],
            bus_ids: vec![None; n],
            ordering: Arc::new(SolverConfig::default().ordering),
            factors: None,
            solution: None,
            zero_aii_row: None,
        }
    }

    pub fn with_ordering(mut self, ordering: Arc<dyn ColumnOrdering>) -> Self {
        self.ordering = ordering;
        self.factors = None;
        self
    }

    /// Build from a partition with the same stamping and rhs rules as the
    /// pipeline. Row `i` is tagged with the node id at index `i`.
    pub fn from_partition(partition: &Partition<T>) -> SolverResult<(Self, IndexMap)> {
        let index = IndexMap::build(partition.branches(), partition.reference);
        let store = assemble(partition.branches(), &index)?;
        let b = build_rhs(&partition.injections, &index, index.len())?;

        let mut eqn = Self::new(index.len());
        eqn.store = store;
        eqn.b = b;
        for (node, idx) in index.iter() {
            eqn.bus_ids[idx.get()] = Some(node.to_string());
        }
        Ok((eqn, index))
    }

    fn check_index(&self, i: usize) -> SolverResult<()> {
        if i < self.n {
            Ok(())
        } else {
            Err(SolverError::IndexOutOfBounds {
                index: i,
                len: self.n,
            })
        }
    }

    fn invalidate(&mut self) {
        self.factors = None;
    }
}

impl<T: Scalar> SparseEquation for SparseEqn<T> {
    type Value = T;

    fn is_square_matrix(&self) -> bool {
        true
    }

    fn total_elements(&self) -> usize {
        self.store.len()
    }

    fn dimension(&self) -> usize {
        self.n
    }

    fn increase_dimension(&mut self) {
        let i = NodeIndex::new(self.n);
        self.n += 1;
        self.store.add(i, i, T::one());
        self.b.push(T::zero());
        self.bus_ids.push(None);
        self.invalidate();
    }

    fn set_b_to_unity(&mut self, i: usize) -> SolverResult<()> {
        self.check_index(i)?;
        self.set_b_to_zero();
        self.b[i] = T::one();
        Ok(())
    }

    fn set_b_to_zero(&mut self) {
        self.b.fill(T::zero());
    }

    fn reset(&mut self) {
        self.store.clear();
        self.set_b_to_zero();
        self.solution = None;
        self.zero_aii_row = None;
        self.invalidate();
    }

    fn set_to_zero(&mut self) {
        self.store.zero_values();
        self.invalidate();
    }

    fn is_factorized(&self) -> bool {
        self.factors.is_some()
    }

    fn factorization(&mut self, tolerance: f64) -> SolverResult<()> {
        self.invalidate();
        let a = compress_square(&self.store, self.n)?;
        let solver = LuSolver::default()
            .with_ordering(Arc::clone(&self.ordering))
            .with_pivot_tolerance(tolerance)?;

        match solver.factorize(&a) {
            Ok(factors) => {
                debug!(
                    n = self.n,
                    lnz = factors.l_nnz(),
                    unz = factors.u_nnz(),
                    "equation factorized"
                );
                self.zero_aii_row = None;
                self.factors = Some(factors);
                Ok(())
            }
            Err(err) => {
                if let SolverError::SingularMatrix { column, .. } = err {
                    self.zero_aii_row = Some(column);
                }
                let bus_ids = &self.bus_ids;
                Err(err.with_external_id(|column| bus_ids.get(column).cloned().flatten()))
            }
        }
    }

    fn solve_eqn(&mut self) -> SolverResult<()> {
        let factors = self.factors.as_ref().ok_or(SolverError::NotFactorized)?;
        self.solution = Some(factors.solve(&self.b)?);
        Ok(())
    }

    fn solve_lued_eqn(&self, b: &[T]) -> SolverResult<Vec<T>> {
        self.factors
            .as_ref()
            .ok_or(SolverError::NotFactorized)?
            .solve(b)
    }

    fn multiply(&self, x: &[T]) -> SolverResult<Vec<T>> {
        let a = compress_square(&self.store, self.n)?;
        Ok(a.multiply(x)?)
    }

    fn zero_aii_row(&self) -> Option<usize> {
        self.zero_aii_row
    }

    fn bus_id(&self, row: usize) -> Option<&str> {
        self.bus_ids.get(row).and_then(|id| id.as_deref())
    }

    fn set_bus_id(&mut self, row: usize, id: impl Into<String>) -> SolverResult<()> {
        self.check_index(row)?;
        self.bus_ids[row] = Some(id.into());
        Ok(())
    }

    fn add_to_aij(&mut self, i: usize, j: usize, value: T) -> SolverResult<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        self.store.add(NodeIndex::new(i), NodeIndex::new(j), value);
        self.invalidate();
        Ok(())
    }

    fn set_bi(&mut self, i: usize, value: T) -> SolverResult<()> {
        self.check_index(i)?;
        self.b[i] = value;
        Ok(())
    }

    fn add_to_bi(&mut self, i: usize, value: T) -> SolverResult<()> {
        self.check_index(i)?;
        self.b[i] += value;
        Ok(())
    }

    fn bi(&self, i: usize) -> SolverResult<T> {
        self.check_index(i)?;
        Ok(self.b[i])
    }

    fn solution(&self) -> Option<&[T]> {
        self.solution.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps_core::NodeId;
    use ps_network::{Branch, InjectionMap};

    fn two_by_two() -> SparseEqnReal {
        let mut eqn = SparseEqnReal::new(2);
        eqn.add_to_aij(0, 0, 7.0).unwrap();
        eqn.add_to_aij(0, 1, -2.0).unwrap();
        eqn.add_to_aij(1, 0, -2.0).unwrap();
        eqn.add_to_aij(1, 1, 2.0).unwrap();
        eqn.set_bi(1, 1.0).unwrap();
        eqn
    }

    #[test]
    fn factorize_then_solve() {
        let mut eqn = two_by_two();
        assert!(!eqn.is_factorized());
        assert_eq!(eqn.solve_eqn(), Err(SolverError::NotFactorized));

        eqn.solve_eqn_with_tolerance(1e-5).unwrap();
        assert!(eqn.is_factorized());
        let x = eqn.solution().unwrap().to_vec();
        assert!((x[0] - 0.2).abs() < 1e-12);
        assert!((x[1] - 0.7).abs() < 1e-12);

        let y = eqn.multiply(&x).unwrap();
        assert!((y[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn factors_reused_for_new_rhs() {
        let mut eqn = two_by_two();
        eqn.factorization(1e-5).unwrap();

        eqn.set_b_to_unity(0).unwrap();
        eqn.solve_eqn().unwrap();
        let col0 = eqn.solution().unwrap().to_vec();
        // First column of the inverse of [[7,-2],[-2,2]]: [0.2, 0.2]
        assert!((col0[0] - 0.2).abs() < 1e-12);
        assert!((col0[1] - 0.2).abs() < 1e-12);

        eqn.add_to_aij(0, 0, 1.0).unwrap();
        assert!(!eqn.is_factorized());
    }

    #[test]
    fn caller_rhs_leaves_stored_state_alone() {
        let mut eqn = two_by_two();
        assert_eq!(eqn.solve_lued_eqn(&[1.0, 0.0]), Err(SolverError::NotFactorized));

        eqn.factorization_default().unwrap();
        eqn.solve_eqn().unwrap();
        let stored = eqn.solution().unwrap().to_vec();

        let col0 = eqn.solve_lued_eqn(&[1.0, 0.0]).unwrap();
        assert!((col0[0] - 0.2).abs() < 1e-12);
        assert!((col0[1] - 0.2).abs() < 1e-12);

        assert_eq!(eqn.bi(0).unwrap(), 0.0);
        assert_eq!(eqn.bi(1).unwrap(), 1.0);
        assert_eq!(eqn.solution().unwrap(), stored.as_slice());
        assert!(matches!(
            eqn.solve_lued_eqn(&[1.0]),
            Err(SolverError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn singular_reports_row_and_bus() {
        let mut eqn = SparseEqnReal::new(2);
        eqn.add_to_aij(0, 0, 1.0).unwrap();
        eqn.set_bus_id(1, "BUS-7").unwrap();

        let err = eqn.factorization(1e-5).unwrap_err();
        assert_eq!(
            err,
            SolverError::SingularMatrix {
                column: 1,
                external_id: Some("BUS-7".into())
            }
        );
        assert_eq!(eqn.zero_aii_row(), Some(1));
        assert!(!eqn.is_factorized());
    }

    #[test]
    fn dimension_and_structure_management() {
        let mut eqn = two_by_two();
        assert_eq!(eqn.total_elements(), 4);

        eqn.increase_dimension();
        assert_eq!(eqn.dimension(), 3);
        assert_eq!(eqn.total_elements(), 5);
        assert_eq!(eqn.bi(2).unwrap(), 0.0);

        eqn.set_to_zero();
        assert_eq!(eqn.total_elements(), 5);
        assert_eq!(eqn.multiply(&[1.0, 1.0, 1.0]).unwrap(), vec![0.0; 3]);

        eqn.reset();
        assert_eq!(eqn.total_elements(), 0);
        assert_eq!(eqn.dimension(), 3);
        assert_eq!(eqn.bi(1).unwrap(), 0.0);

        assert!(matches!(
            eqn.add_to_aij(3, 0, 1.0),
            Err(SolverError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn complex_variant_from_partition() {
        let y = Complex64::new(1.0, -4.0);
        let mut injections = InjectionMap::new();
        injections.insert(NodeId::new(2), Complex64::new(0.0, 1.0));
        let partition = Partition::new(
            NodeId::new(0),
            vec![Branch::new(0, 1, y), Branch::new(1, 2, y)],
            injections,
        );

        let (mut eqn, index) = SparseEqnComplex::from_partition(&partition).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(eqn.bus_id(1), Some("2"));

        eqn.solve_eqn_with_tolerance(1e-5).unwrap();
        let x = eqn.solution().unwrap().to_vec();
        let y_check = eqn.multiply(&x).unwrap();
        assert!((y_check[1] - Complex64::new(0.0, 1.0)).norm() < 1e-12);
        assert!(y_check[0].norm() < 1e-12);
    }
}
