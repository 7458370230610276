//! Partition solve pipeline.
//!
//! index -> stamp -> compress -> rhs -> factor/solve -> residual. Every
//! intermediate is owned by the call that made it, so independent
//! partitions can run on separate threads.

use ps_assembly::{assemble_matrix, build_rhs};
use ps_core::{NodeId, NodeIndex, Scalar};
use ps_network::{IndexMap, Partition};
use ps_sparse::CompressedMatrix;
use rayon::prelude::*;
use tracing::debug;

use crate::config::SolverConfig;
use crate::direct::{LuSolver, SparseDirectSolver};
use crate::error::{SolverError, SolverResult};
use crate::residual::ResidualReport;

/// Everything produced by one partition solve.
#[derive(Debug, Clone)]
pub struct PartitionSolution<T> {
    pub index: IndexMap,
    pub matrix: CompressedMatrix<T>,
    pub rhs: Vec<T>,
    /// Solution indexed by [`NodeIndex`].
    pub x: Vec<T>,
    pub residual: ResidualReport<T>,
}

impl<T: Scalar> PartitionSolution<T> {
    /// Solution value at an original node; the reference node is zero.
    pub fn value_at(&self, node: NodeId) -> Option<T> {
        if self.index.is_reference(node) {
            return Some(T::zero());
        }
        self.index.index_of(node).map(|i| self.x[i.get()])
    }

    /// `(NodeId, value)` pairs in index order, reference excluded.
    pub fn node_values(&self) -> Vec<(NodeId, T)> {
        self.index
            .iter()
            .map(|(node, idx)| (node, self.x[idx.get()]))
            .collect()
    }
}

/// Solve one partition with the built-in LU solver.
pub fn solve_partition<T: Scalar>(
    partition: &Partition<T>,
    config: &SolverConfig,
) -> SolverResult<PartitionSolution<T>> {
    let solver = LuSolver::new(config)?;
    solve_partition_with(partition, &solver, config.residual_tolerance)
}

/// Solve one partition with any direct solver.
///
/// A singular matrix error is tagged with the node id of its column.
pub fn solve_partition_with<T, S>(
    partition: &Partition<T>,
    solver: &S,
    residual_tolerance: f64,
) -> SolverResult<PartitionSolution<T>>
where
    T: Scalar,
    S: SparseDirectSolver<T> + ?Sized,
{
    let name = partition.name.as_deref().unwrap_or("<unnamed>");
    let index = IndexMap::build(partition.branches(), partition.reference);
    if index.is_empty() {
        return Err(ps_sparse::SparseError::structural(
            "partition has no nodes besides the reference",
        )
        .into());
    }

    let matrix = assemble_matrix(partition.branches(), &index)?;
    let rhs = build_rhs(&partition.injections, &index, index.len())?;
    debug!(name, n = index.len(), nnz = matrix.nnz(), "assembled partition");

    let x = solver
        .solve(&matrix, &rhs)
        .map_err(|e| tag_singular(e, &index))?;
    let residual = ResidualReport::check(&matrix, &x, &rhs, residual_tolerance)?;

    Ok(PartitionSolution {
        index,
        matrix,
        rhs,
        x,
        residual,
    })
}

/// Solve independent partitions in parallel, results in input order.
pub fn solve_partitions<T: Scalar>(
    partitions: &[Partition<T>],
    config: &SolverConfig,
) -> Vec<SolverResult<PartitionSolution<T>>> {
    let solver = match LuSolver::new(config) {
        Ok(s) => s,
        Err(e) => return partitions.iter().map(|_| Err(e.clone())).collect(),
    };
    partitions
        .par_iter()
        .map(|p| solve_partition_with(p, &solver, config.residual_tolerance))
        .collect()
}

fn tag_singular(err: SolverError, index: &IndexMap) -> SolverError {
    err.with_external_id(|column| {
        index
            .node_at(NodeIndex::new(column))
            .map(|node| node.to_string())
    })
}
