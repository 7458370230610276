//! Right-hand side assembly.

use ps_core::Scalar;
use ps_network::{IndexMap, InjectionMap, NetworkError};
use tracing::debug;

use crate::error::{AssemblyError, AssemblyResult};

/// Dense right-hand side of length `n` aligned to the index map.
///
/// Injections at the reference node are dropped, since the grounded node has
/// no equation. Injections at any other node missing from the map are an
/// error.
pub fn build_rhs<T: Scalar>(
    injections: &InjectionMap<T>,
    index: &IndexMap,
    n: usize,
) -> AssemblyResult<Vec<T>> {
    if n < index.len() {
        return Err(AssemblyError::DimensionMismatch {
            expected: index.len(),
            actual: n,
        });
    }

    let mut b = vec![T::zero(); n];
    for (node, value) in injections.iter() {
        if index.is_reference(node) {
            debug!(%node, %value, "dropping injection at reference node");
            continue;
        }
        let i = index
            .index_of(node)
            .ok_or(NetworkError::UnmappedIndex { node })?;
        b[i.get()] = value;
    }
    Ok(b)
}
