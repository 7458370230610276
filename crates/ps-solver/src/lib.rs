//! Sparse direct solver for partitioned nodal systems.
//!
//! This crate factors the compressed matrix produced by `ps-assembly` with a
//! left-looking sparse LU (threshold partial pivoting, pluggable column
//! ordering) and runs the triangular solves. On top of that it provides:
//! - the per-partition pipeline (index, stamp, compress, rhs, solve, residual)
//! - a parallel driver for independent partitions
//! - the `SparseEquation` contract hosts use to drive a solve step by step

pub mod config;
pub mod direct;
pub mod equation;
pub mod error;
pub mod lu;
pub mod ordering;
pub mod pipeline;
pub mod residual;
pub mod symbolic;
mod triangular;

pub use config::{
    DEFAULT_PIVOT_TOLERANCE, DEFAULT_RESIDUAL_TOLERANCE, DEFAULT_SINGULAR_TOLERANCE, SolverConfig,
};
pub use direct::{ComplexLuSolver, LuSolver, RealLuSolver, SparseDirectSolver, factorize_and_solve};
pub use equation::{SparseEqn, SparseEqnComplex, SparseEqnReal, SparseEquation};
pub use error::{SolverError, SolverResult};
pub use lu::{LuFactors, PivotThresholds};
pub use ordering::{ColumnOrdering, OrderingPolicy};
pub use pipeline::{PartitionSolution, solve_partition, solve_partition_with, solve_partitions};
pub use residual::ResidualReport;
pub use symbolic::SymbolicLu;
