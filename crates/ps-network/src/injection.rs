//! Sparse nodal injections (the right-hand side, keyed by original id).

use std::collections::HashMap;

use ps_core::{NodeId, Scalar};

/// Sparse `NodeId -> value` map. Nodes that are absent inject zero.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionMap<T = f64> {
    values: HashMap<NodeId, T>,
}

impl<T> Default for InjectionMap<T> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<T: Scalar> InjectionMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the injection at `node`, returning the previous value if any.
    pub fn insert(&mut self, node: NodeId, value: T) -> Option<T> {
        self.values.insert(node, value)
    }

    /// Injection at `node`; zero when not present.
    pub fn get(&self, node: NodeId) -> T {
        self.values.get(&node).copied().unwrap_or_else(T::zero)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.values.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in ascending node id order.
    ///
    /// Sorting keeps downstream logging and error reporting deterministic.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, T)> + '_ {
        let mut entries: Vec<(NodeId, T)> = self.values.iter().map(|(&k, &v)| (k, v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries.into_iter()
    }
}

impl<T: Scalar> FromIterator<(NodeId, T)> for InjectionMap<T> {
    fn from_iter<I: IntoIterator<Item = (NodeId, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (node, value) in iter {
            map.insert(node, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_nodes_inject_zero() {
        let map: InjectionMap = [(NodeId::new(1), 2.5)].into_iter().collect();
        assert_eq!(map.get(NodeId::new(1)), 2.5);
        assert_eq!(map.get(NodeId::new(9)), 0.0);
        assert!(!map.contains(NodeId::new(9)));
    }

    #[test]
    fn iteration_is_sorted_by_node() {
        let map: InjectionMap = [(5, 1.0), (-2, 2.0), (3, 3.0)]
            .into_iter()
            .map(|(n, v)| (NodeId::new(n), v))
            .collect();
        let nodes: Vec<i64> = map.iter().map(|(n, _)| n.get()).collect();
        assert_eq!(nodes, vec![-2, 3, 5]);
    }
}
