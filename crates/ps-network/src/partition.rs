//! A partition: everything needed to assemble one nodal system.

use ps_core::{NodeId, Scalar};

use crate::branch::Branch;
use crate::injection::InjectionMap;

/// Branches, injections and the grounded node for one piece of a grid.
///
/// Branches are held interior first, then boundary, which is the order the
/// index map is built from. The list is fixed at construction so the split
/// point always stays valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T = f64> {
    pub name: Option<String>,
    pub reference: NodeId,
    branches: Vec<Branch<T>>,
    pub injections: InjectionMap<T>,
    interior_len: usize,
}

impl<T: Scalar> Partition<T> {
    /// A partition with every branch treated as interior.
    pub fn new(reference: NodeId, branches: Vec<Branch<T>>, injections: InjectionMap<T>) -> Self {
        let interior_len = branches.len();
        Self {
            name: None,
            reference,
            branches,
            injections,
            interior_len,
        }
    }

    /// Concatenate interior and boundary branches, interior first.
    pub fn from_groups(
        reference: NodeId,
        interior: Vec<Branch<T>>,
        boundary: Vec<Branch<T>>,
        injections: InjectionMap<T>,
    ) -> Self {
        let interior_len = interior.len();
        let mut branches = interior;
        branches.extend(boundary);
        Self {
            name: None,
            reference,
            branches,
            injections,
            interior_len,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// All branches, interior first.
    pub fn branches(&self) -> &[Branch<T>] {
        &self.branches
    }

    pub fn interior(&self) -> &[Branch<T>] {
        &self.branches[..self.interior_len]
    }

    pub fn boundary(&self) -> &[Branch<T>] {
        &self.branches[self.interior_len..]
    }
}
