//! Merge-on-insert accumulator for stamped entries.

use std::collections::HashMap;

use ps_core::{NodeIndex, Scalar};

use crate::triplet::TripletList;

/// One live `(row, col)` entry of a [`SparseEntryStore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<T> {
    pub row: NodeIndex,
    pub col: NodeIndex,
    pub value: T,
}

/// Accumulator keyed by `(row, col)`.
///
/// Entries live in an arena in first-insertion order; a lookup table maps
/// each key to its slot. There is at most one entry per key and `add` sums
/// into it.
#[derive(Debug, Clone)]
pub struct SparseEntryStore<T = f64> {
    entries: Vec<Entry<T>>,
    slots: HashMap<(NodeIndex, NodeIndex), usize>,
}

impl<T> Default for SparseEntryStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<T: Scalar> SparseEntryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
        }
    }

    /// Add `value` to the entry at `(row, col)`, creating it if needed.
    pub fn add(&mut self, row: NodeIndex, col: NodeIndex, value: T) {
        match self.slots.get(&(row, col)) {
            Some(&slot) => self.entries[slot].value += value,
            None => {
                self.slots.insert((row, col), self.entries.len());
                self.entries.push(Entry { row, col, value });
            }
        }
    }

    pub fn get(&self, row: NodeIndex, col: NodeIndex) -> Option<T> {
        self.slots.get(&(row, col)).map(|&slot| self.entries[slot].value)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Smallest square dimension holding every entry: `max(row, col) + 1`.
    pub fn dimension(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.row.get().max(e.col.get()) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> + '_ {
        self.entries.iter()
    }

    /// Keep the structure, zero every value.
    pub fn zero_values(&mut self) {
        for e in &mut self.entries {
            e.value = T::zero();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.slots.clear();
    }

    /// Emit the entries as a triplet list.
    pub fn to_triplets(&self) -> TripletList<T> {
        let mut triplets = TripletList::with_capacity(self.entries.len());
        for e in &self.entries {
            triplets.push(e.row.get(), e.col.get(), e.value);
        }
        triplets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ix(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn add_merges_instead_of_overwriting() {
        let mut store = SparseEntryStore::new();
        store.add(ix(0), ix(0), 5.0);
        store.add(ix(0), ix(0), 2.0);
        store.add(ix(0), ix(1), -2.0);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get(ix(0), ix(0)), Some(7.0));
        assert_eq!(store.get(ix(0), ix(1)), Some(-2.0));
        assert_eq!(store.get(ix(1), ix(0)), None);
    }

    #[test]
    fn dimension_tracks_largest_index() {
        let mut store: SparseEntryStore = SparseEntryStore::new();
        assert_eq!(store.dimension(), 0);
        store.add(ix(3), ix(1), 1.0);
        assert_eq!(store.dimension(), 4);
    }

    #[test]
    fn zero_values_keeps_structure() {
        let mut store = SparseEntryStore::new();
        store.add(ix(1), ix(1), 3.0);
        store.zero_values();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(ix(1), ix(1)), Some(0.0));

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.get(ix(1), ix(1)), None);
    }

    #[test]
    fn triplets_follow_insertion_order() {
        let mut store = SparseEntryStore::new();
        store.add(ix(1), ix(0), 1.0);
        store.add(ix(0), ix(0), 2.0);
        store.add(ix(1), ix(0), 3.0);

        let t = store.to_triplets();
        assert_eq!(t.len(), 2);
        assert_eq!(t.iter().next(), Some((1, 0, 4.0)));
    }
}
