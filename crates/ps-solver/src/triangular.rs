//! Column-stored triangular factors and the sparse solves that build them.

use std::ops::Range;

use ps_core::Scalar;
use ps_sparse::{CompressedMatrix, TripletList};

use crate::error::SolverResult;

/// Column-compressed triangular factor under construction.
///
/// Unlike [`CompressedMatrix`], rows inside a column are kept in the order
/// they were produced. `L` stores its unit diagonal first in each column,
/// `U` stores its diagonal last.
#[derive(Debug, Clone)]
pub(crate) struct Factor<T> {
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<T>,
}

impl<T: Scalar> Factor<T> {
    pub(crate) fn with_capacity(n: usize, nnz: usize) -> Self {
        Self {
            col_ptr: Vec::with_capacity(n + 1),
            row_idx: Vec::with_capacity(nnz),
            values: Vec::with_capacity(nnz),
        }
    }

    pub(crate) fn begin_column(&mut self) {
        self.col_ptr.push(self.row_idx.len());
    }

    pub(crate) fn finish(&mut self) {
        self.col_ptr.push(self.row_idx.len());
    }

    pub(crate) fn push(&mut self, row: usize, value: T) {
        self.row_idx.push(row);
        self.values.push(value);
    }

    /// Entry range of an already finished column.
    pub(crate) fn column_range(&self, j: usize) -> Range<usize> {
        self.col_ptr[j]..self.col_ptr[j + 1]
    }

    pub(crate) fn nnz(&self) -> usize {
        self.row_idx.len()
    }

    pub(crate) fn map_rows(&mut self, f: impl Fn(usize) -> usize) {
        for r in &mut self.row_idx {
            *r = f(*r);
        }
    }

    /// Solve `L x = x` in place; diagonal first in every column.
    pub(crate) fn lower_solve(&self, x: &mut [T]) {
        for j in 0..x.len() {
            let range = self.column_range(j);
            x[j] = x[j] / self.values[range.start];
            let xj = x[j];
            for p in range.start + 1..range.end {
                x[self.row_idx[p]] -= self.values[p] * xj;
            }
        }
    }

    /// Solve `U x = x` in place; diagonal last in every column.
    pub(crate) fn upper_solve(&self, x: &mut [T]) {
        for j in (0..x.len()).rev() {
            let range = self.column_range(j);
            x[j] = x[j] / self.values[range.end - 1];
            let xj = x[j];
            for p in range.start..range.end - 1 {
                x[self.row_idx[p]] -= self.values[p] * xj;
            }
        }
    }

    pub(crate) fn to_matrix(&self, n: usize) -> SolverResult<CompressedMatrix<T>> {
        let mut t = TripletList::with_capacity(self.nnz());
        for j in 0..self.col_ptr.len().saturating_sub(1) {
            for p in self.column_range(j) {
                t.push(self.row_idx[p], j, self.values[p]);
            }
        }
        Ok(CompressedMatrix::from_triplets(&t, n, n)?)
    }
}

/// Scratch space for [`lower_solve_column`], reused across columns.
#[derive(Debug)]
pub(crate) struct ReachWorkspace {
    marked: Vec<bool>,
    stack: Vec<(usize, usize)>,
    /// Rows touched by the last solve, in topological order.
    pub(crate) pattern: Vec<usize>,
}

impl ReachWorkspace {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            marked: vec![false; n],
            stack: Vec::new(),
            pattern: Vec::with_capacity(n),
        }
    }
}

/// Rows reachable from `start` in the graph of the partial `L`.
///
/// Row `j` that already owns pivot column `pinv[j]` links to the rows of that
/// column. The result lands in `ws.pattern` so every row comes after every
/// row it depends on.
fn reach<T: Scalar>(
    l: &Factor<T>,
    pinv: &[Option<usize>],
    start: &[usize],
    ws: &mut ReachWorkspace,
) {
    ws.pattern.clear();
    for &s in start {
        if ws.marked[s] {
            continue;
        }
        ws.marked[s] = true;
        ws.stack.push((s, 0));

        while let Some(&(j, next)) = ws.stack.last() {
            let children: &[usize] = match pinv[j] {
                Some(col) => &l.row_idx[l.column_range(col)],
                None => &[],
            };
            match children[next..].iter().position(|&i| !ws.marked[i]) {
                Some(offset) => {
                    let child = children[next + offset];
                    if let Some(top) = ws.stack.last_mut() {
                        top.1 = next + offset + 1;
                    }
                    ws.marked[child] = true;
                    ws.stack.push((child, 0));
                }
                None => {
                    ws.stack.pop();
                    ws.pattern.push(j);
                }
            }
        }
    }

    ws.pattern.reverse();
    for &i in &ws.pattern {
        ws.marked[i] = false;
    }
}

/// Solve `L x = A(:, col)` for the partial `L`, leaving the nonzero rows of
/// `x` in `ws.pattern`.
///
/// `x` must be zero on entry outside the pattern of the previous column;
/// callers clear exactly those rows after use.
pub(crate) fn lower_solve_column<T: Scalar>(
    l: &Factor<T>,
    pinv: &[Option<usize>],
    a: &CompressedMatrix<T>,
    col: usize,
    x: &mut [T],
    ws: &mut ReachWorkspace,
) {
    reach(l, pinv, a.pattern().column(col), ws);

    for (i, v) in a.column(col) {
        x[i] = v;
    }

    for &j in &ws.pattern {
        let Some(pivot_col) = pinv[j] else {
            continue;
        };
        let range = l.column_range(pivot_col);
        // Unit diagonal sits first.
        let xj = x[j];
        for p in range.start + 1..range.end {
            x[l.row_idx[p]] -= l.values[p] * xj;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// L = [[1,0,0],[2,1,0],[0,3,1]] stored column-wise, diagonal first.
    fn unit_lower() -> Factor<f64> {
        let mut l = Factor::with_capacity(3, 5);
        l.begin_column();
        l.push(0, 1.0);
        l.push(1, 2.0);
        l.begin_column();
        l.push(1, 1.0);
        l.push(2, 3.0);
        l.begin_column();
        l.push(2, 1.0);
        l.finish();
        l
    }

    #[test]
    fn lower_solve_forward_substitutes() {
        let l = unit_lower();
        let mut x = vec![1.0, 4.0, 9.0];
        l.lower_solve(&mut x);
        // x0 = 1, x1 = 4 - 2 = 2, x2 = 9 - 3*2 = 3
        assert_eq!(x, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn upper_solve_back_substitutes() {
        // U = [[2,1],[0,4]], diagonal last
        let mut u = Factor::with_capacity(2, 3);
        u.begin_column();
        u.push(0, 2.0);
        u.begin_column();
        u.push(0, 1.0);
        u.push(1, 4.0);
        u.finish();

        let mut x = vec![5.0, 8.0];
        u.upper_solve(&mut x);
        assert_eq!(x, vec![1.5, 2.0]);
    }

    #[test]
    fn reach_orders_dependencies_first() {
        let l = unit_lower();
        let pinv = [Some(0), Some(1), None];
        let mut ws = ReachWorkspace::new(3);

        reach(&l, &pinv, &[0], &mut ws);
        assert_eq!(ws.pattern, vec![0, 1, 2]);

        reach(&l, &pinv, &[2], &mut ws);
        assert_eq!(ws.pattern, vec![2]);
    }

    #[test]
    fn to_matrix_sorts_rows() {
        let l = unit_lower();
        let m = l.to_matrix(3).unwrap();
        assert_eq!(m.get(1, 0), Some(2.0));
        assert_eq!(m.get(2, 1), Some(3.0));
        assert_eq!(m.nnz(), 5);
    }
}
