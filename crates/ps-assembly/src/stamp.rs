//! Branch stamping into the nodal admittance matrix.

use ps_core::Scalar;
use ps_network::{Branch, IndexMap};
use ps_sparse::{CompressedMatrix, SparseEntryStore, compress_square};
use tracing::debug;

use crate::error::AssemblyResult;

/// Add one branch's contribution to `store`.
///
/// Diagonal terms get `+x` and mutual terms `-x`. A branch to the reference
/// node only touches the other end's diagonal; a self loop subtracts `x`
/// from its diagonal; a branch with both ends on the reference stamps nothing.
pub fn stamp_branch<T: Scalar>(
    branch: &Branch<T>,
    index: &IndexMap,
    store: &mut SparseEntryStore<T>,
) -> AssemblyResult<()> {
    let x = branch.value;
    let from_ref = index.is_reference(branch.from);
    let to_ref = index.is_reference(branch.to);

    match (from_ref, to_ref) {
        (true, true) => {}
        (true, false) => {
            let t = index.require(branch.to)?;
            store.add(t, t, x);
        }
        (false, true) => {
            let f = index.require(branch.from)?;
            store.add(f, f, x);
        }
        (false, false) if branch.is_self_loop() => {
            let f = index.require(branch.from)?;
            store.add(f, f, -x);
        }
        (false, false) => {
            let f = index.require(branch.from)?;
            let t = index.require(branch.to)?;
            store.add(f, f, x);
            store.add(f, t, -x);
            store.add(t, f, -x);
            store.add(t, t, x);
        }
    }

    Ok(())
}

/// Stamp every branch into a fresh accumulator.
///
/// The first failing branch aborts assembly; no partial store is returned.
pub fn assemble<T: Scalar>(
    branches: &[Branch<T>],
    index: &IndexMap,
) -> AssemblyResult<SparseEntryStore<T>> {
    let mut store = SparseEntryStore::with_capacity(4 * branches.len());
    for branch in branches {
        stamp_branch(branch, index, &mut store)?;
    }
    debug!(
        branches = branches.len(),
        nodes = index.len(),
        entries = store.len(),
        "stamped branches"
    );
    Ok(store)
}

/// Stamp and compress to an `n x n` matrix with `n = index.len()`.
pub fn assemble_matrix<T: Scalar>(
    branches: &[Branch<T>],
    index: &IndexMap,
) -> AssemblyResult<CompressedMatrix<T>> {
    let store = assemble(branches, index)?;
    Ok(compress_square(&store, index.len())?)
}
