//! Dense indexing of network nodes for solver integration.
//!
//! Provides a bidirectional mapping between original node ids and contiguous
//! solver indices (0..N). The reference node is grounded and never receives
//! an index, which removes its row and column from the nodal system.

use std::collections::HashMap;

use ps_core::{NodeId, NodeIndex};

use crate::branch::Branch;
use crate::error::{NetworkError, NetworkResult};

/// Index map from node ids to contiguous solver indices.
///
/// Indices are handed out in first-seen order while scanning the branch
/// list, so the map depends on branch order and not on id values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    /// The grounded node this map was built around.
    reference: NodeId,

    /// Contiguous list of node IDs (index -> NodeId).
    node_ids: Vec<NodeId>,

    /// Reverse lookup: NodeId -> index.
    node_to_idx: HashMap<NodeId, NodeIndex>,
}

impl IndexMap {
    /// Build an index map by scanning `branches` in order.
    ///
    /// For every branch the `from` end is considered before the `to` end.
    pub fn build<T>(branches: &[Branch<T>], reference: NodeId) -> Self {
        let mut map = Self {
            reference,
            node_ids: Vec::new(),
            node_to_idx: HashMap::new(),
        };

        for branch in branches {
            map.insert(branch.from);
            map.insert(branch.to);
        }

        map
    }

    fn insert(&mut self, id: NodeId) {
        if id == self.reference || self.node_to_idx.contains_key(&id) {
            return;
        }
        let idx = NodeIndex::new(self.node_ids.len());
        self.node_ids.push(id);
        self.node_to_idx.insert(id, idx);
    }

    pub fn reference(&self) -> NodeId {
        self.reference
    }

    pub fn is_reference(&self, id: NodeId) -> bool {
        id == self.reference
    }

    /// Number of indexed (non-reference) nodes.
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Get the contiguous index for a node ID, if it has one.
    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_to_idx.get(&id).copied()
    }

    /// Like [`IndexMap::index_of`] but unknown ids are an error.
    pub fn require(&self, id: NodeId) -> NetworkResult<NodeIndex> {
        self.index_of(id)
            .ok_or(NetworkError::UnmappedIndex { node: id })
    }

    /// Get the node ID for a contiguous index.
    pub fn node_at(&self, idx: NodeIndex) -> Option<NodeId> {
        self.node_ids.get(idx.get()).copied()
    }

    /// All node IDs in index order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    /// Iterate `(NodeId, NodeIndex)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeIndex)> + '_ {
        self.node_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, NodeIndex::new(i)))
    }
}
