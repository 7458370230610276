//! Compressed-column matrices.

use nalgebra::DMatrix;
use ps_core::Scalar;
use tracing::debug;

use crate::error::{SparseError, SparseResult};
use crate::store::SparseEntryStore;
use crate::triplet::TripletList;

/// Sparse matrix in compressed-column form.
///
/// Column `j` owns `row_idx[col_ptr[j]..col_ptr[j + 1]]` and the matching
/// `values`. Row indices are strictly increasing inside a column. Explicit
/// zeros are kept as structural entries.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedMatrix<T = f64> {
    nrows: usize,
    ncols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
}

/// Borrowed nonzero structure of a [`CompressedMatrix`].
#[derive(Debug, Clone, Copy)]
pub struct SparsityPattern<'a> {
    pub nrows: usize,
    pub ncols: usize,
    pub col_ptr: &'a [usize],
    pub row_idx: &'a [usize],
}

impl<'a> SparsityPattern<'a> {
    /// Row indices of column `j`.
    pub fn column(&self, j: usize) -> &'a [usize] {
        &self.row_idx[self.col_ptr[j]..self.col_ptr[j + 1]]
    }

    pub fn nnz(&self) -> usize {
        self.row_idx.len()
    }
}

/// Compress an accumulator to a square matrix of dimension `max(row, col) + 1`.
pub fn compress<T: Scalar>(store: &SparseEntryStore<T>) -> SparseResult<CompressedMatrix<T>> {
    if store.is_empty() {
        return Err(SparseError::structural("matrix has no entries"));
    }
    let n = store.dimension();
    CompressedMatrix::from_triplets(&store.to_triplets(), n, n)
}

/// Compress an accumulator to an `n x n` matrix.
///
/// Rows or columns without entries are allowed; entries outside `n` are not.
pub fn compress_square<T: Scalar>(
    store: &SparseEntryStore<T>,
    n: usize,
) -> SparseResult<CompressedMatrix<T>> {
    if n == 0 {
        return Err(SparseError::structural("matrix dimension is zero"));
    }
    let needed = store.dimension();
    if needed > n {
        return Err(SparseError::structural(format!(
            "entry at index {} does not fit a {n}x{n} matrix",
            needed - 1
        )));
    }
    CompressedMatrix::from_triplets(&store.to_triplets(), n, n)
}

impl<T: Scalar> CompressedMatrix<T> {
    /// Build from triplets, summing repeated coordinates.
    pub fn from_triplets(
        triplets: &TripletList<T>,
        nrows: usize,
        ncols: usize,
    ) -> SparseResult<Self> {
        let mut columns: Vec<Vec<(usize, T)>> = vec![Vec::new(); ncols];
        for (r, c, v) in triplets.iter() {
            if r >= nrows || c >= ncols {
                return Err(SparseError::structural(format!(
                    "triplet ({r}, {c}) outside {nrows}x{ncols} matrix"
                )));
            }
            columns[c].push((r, v));
        }

        let mut col_ptr = Vec::with_capacity(ncols + 1);
        let mut row_idx = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());
        col_ptr.push(0);

        for mut column in columns {
            column.sort_by_key(|&(r, _)| r);
            let start = row_idx.len();
            for (r, v) in column {
                if row_idx.len() > start && row_idx.last() == Some(&r) {
                    if let Some(last) = values.last_mut() {
                        *last += v;
                    }
                } else {
                    row_idx.push(r);
                    values.push(v);
                }
            }
            col_ptr.push(row_idx.len());
        }

        let merged = triplets.len() - row_idx.len();
        debug!(nrows, ncols, nnz = row_idx.len(), merged, "compressed triplets");

        Ok(Self {
            nrows,
            ncols,
            col_ptr,
            row_idx,
            values,
        })
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Dimension of a square matrix.
    pub fn dim(&self) -> SparseResult<usize> {
        if self.is_square() {
            Ok(self.ncols)
        } else {
            Err(SparseError::structural(format!(
                "matrix is {}x{}, not square",
                self.nrows, self.ncols
            )))
        }
    }

    /// Number of structural entries.
    pub fn nnz(&self) -> usize {
        self.row_idx.len()
    }

    pub fn col_ptr(&self) -> &[usize] {
        &self.col_ptr
    }

    pub fn row_idx(&self) -> &[usize] {
        &self.row_idx
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// `(row, value)` pairs of column `j`.
    pub fn column(&self, j: usize) -> impl Iterator<Item = (usize, T)> + '_ {
        let range = self.col_ptr[j]..self.col_ptr[j + 1];
        self.row_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Structural entry at `(row, col)`, `None` if not stored.
    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if col >= self.ncols {
            return None;
        }
        let start = self.col_ptr[col];
        let rows = &self.row_idx[start..self.col_ptr[col + 1]];
        rows.binary_search(&row).ok().map(|k| self.values[start + k])
    }

    pub fn pattern(&self) -> SparsityPattern<'_> {
        SparsityPattern {
            nrows: self.nrows,
            ncols: self.ncols,
            col_ptr: &self.col_ptr,
            row_idx: &self.row_idx,
        }
    }

    /// `y = A * x`, visiting structural entries only.
    pub fn multiply(&self, x: &[T]) -> SparseResult<Vec<T>> {
        if x.len() != self.ncols {
            return Err(SparseError::DimensionMismatch {
                expected: self.ncols,
                actual: x.len(),
            });
        }
        let mut y = vec![T::zero(); self.nrows];
        for (j, &xj) in x.iter().enumerate() {
            for p in self.col_ptr[j]..self.col_ptr[j + 1] {
                y[self.row_idx[p]] += self.values[p] * xj;
            }
        }
        Ok(y)
    }

    /// Dense copy, for diagnostics and small cross-checks.
    pub fn to_dense(&self) -> DMatrix<T> {
        let mut dense = DMatrix::from_element(self.nrows, self.ncols, T::zero());
        for j in 0..self.ncols {
            for (i, v) in self.column(j) {
                dense[(i, j)] = v;
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ps_core::{Complex64, NodeIndex};

    fn ix(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn duplicate_triplets_are_summed() {
        let mut t = TripletList::new();
        t.push(1, 0, 1.0);
        t.push(0, 0, 2.0);
        t.push(1, 0, 3.0);
        t.push(1, 1, 5.0);

        let a = CompressedMatrix::from_triplets(&t, 2, 2).unwrap();
        assert_eq!(a.nnz(), 3);
        assert_eq!(a.col_ptr(), &[0, 2, 3]);
        assert_eq!(a.row_idx(), &[0, 1, 1]);
        assert_eq!(a.get(1, 0), Some(4.0));
        assert_eq!(a.get(0, 1), None);
    }

    #[test]
    fn out_of_range_triplet_is_structural() {
        let mut t = TripletList::new();
        t.push(2, 0, 1.0);
        let err = CompressedMatrix::from_triplets(&t, 2, 2).unwrap_err();
        assert!(matches!(err, SparseError::Structural { .. }));
    }

    #[test]
    fn compress_uses_max_index_dimension() {
        let mut store = SparseEntryStore::new();
        store.add(ix(0), ix(0), 7.0);
        store.add(ix(0), ix(1), -2.0);
        store.add(ix(1), ix(0), -2.0);
        store.add(ix(1), ix(1), 2.0);

        let a = compress(&store).unwrap();
        assert_eq!(a.dim().unwrap(), 2);
        let dense = a.to_dense();
        assert_eq!(dense, DMatrix::from_row_slice(2, 2, &[7.0, -2.0, -2.0, 2.0]));
    }

    #[test]
    fn empty_store_is_structural() {
        let store: SparseEntryStore = SparseEntryStore::new();
        assert!(matches!(
            compress(&store),
            Err(SparseError::Structural { .. })
        ));
        assert!(compress_square(&store, 0).is_err());
    }

    #[test]
    fn compress_square_allows_empty_rows() {
        let mut store = SparseEntryStore::new();
        store.add(ix(0), ix(0), 1.0);

        let a = compress_square(&store, 3).unwrap();
        assert_eq!(a.dim().unwrap(), 3);
        assert_eq!(a.column(2).count(), 0);

        store.add(ix(3), ix(3), 1.0);
        assert!(compress_square(&store, 3).is_err());
    }

    #[test]
    fn multiply_matches_dense() {
        let mut t = TripletList::new();
        t.push(0, 0, 2.0);
        t.push(1, 0, -1.0);
        t.push(0, 2, 3.0);
        t.push(2, 1, 4.0);
        let a = CompressedMatrix::from_triplets(&t, 3, 3).unwrap();

        let x = [1.0, 2.0, 3.0];
        let y = a.multiply(&x).unwrap();
        let dense = a.to_dense() * nalgebra::DVector::from_column_slice(&x);
        assert_eq!(y, dense.as_slice());

        assert!(matches!(
            a.multiply(&[1.0]),
            Err(SparseError::DimensionMismatch { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn complex_entries_compress() {
        let mut store = SparseEntryStore::new();
        store.add(ix(0), ix(0), Complex64::new(1.0, 2.0));
        store.add(ix(0), ix(0), Complex64::new(0.5, -1.0));
        let a = compress(&store).unwrap();
        assert_eq!(a.get(0, 0), Some(Complex64::new(1.5, 1.0)));
    }
}
