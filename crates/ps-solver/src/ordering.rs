//! Column orderings applied before LU factorization.
//!
//! Ordering is a strategy: anything implementing [`ColumnOrdering`] can be
//! handed to the solver. [`OrderingPolicy`] covers the built-in choices.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use ps_sparse::SparsityPattern;
use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Produces a column permutation `q` for a square sparsity pattern.
///
/// `q[k]` is the original column placed at position `k`.
pub trait ColumnOrdering: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn column_order(&self, pattern: &SparsityPattern<'_>) -> Vec<usize>;
}

/// Built-in column orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Columns in their assembled order.
    Natural,
    /// Greedy minimum degree on the pattern of `A + A^T`.
    MinDegreeAPlusAt,
    /// Greedy minimum degree on the pattern of `A^T A`, dense rows dropped.
    #[default]
    MinDegreeAtA,
}

impl OrderingPolicy {
    pub const ALL: [OrderingPolicy; 3] = [
        OrderingPolicy::Natural,
        OrderingPolicy::MinDegreeAPlusAt,
        OrderingPolicy::MinDegreeAtA,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderingPolicy::Natural => "natural",
            OrderingPolicy::MinDegreeAPlusAt => "min_degree_a_plus_at",
            OrderingPolicy::MinDegreeAtA => "min_degree_at_a",
        }
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown ordering '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

impl ColumnOrdering for OrderingPolicy {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn column_order(&self, pattern: &SparsityPattern<'_>) -> Vec<usize> {
        let n = pattern.ncols;
        match self {
            OrderingPolicy::Natural => (0..n).collect(),
            OrderingPolicy::MinDegreeAPlusAt => minimum_degree(a_plus_at_graph(pattern)),
            OrderingPolicy::MinDegreeAtA => minimum_degree(at_a_graph(pattern)),
        }
    }
}

/// Check that `q` is a permutation of `0..n`.
pub fn validate_permutation(q: &[usize], n: usize) -> SolverResult<()> {
    if q.len() != n {
        return Err(SolverError::InvalidOrdering {
            what: format!("permutation has length {}, expected {n}", q.len()),
        });
    }
    let mut seen = vec![false; n];
    for &j in q {
        if j >= n || seen[j] {
            return Err(SolverError::InvalidOrdering {
                what: format!("column {j} is out of range or repeated"),
            });
        }
        seen[j] = true;
    }
    Ok(())
}

/// Undirected adjacency of `A + A^T`, diagonal excluded.
fn a_plus_at_graph(pattern: &SparsityPattern<'_>) -> Vec<BTreeSet<usize>> {
    let n = pattern.ncols;
    let mut adj = vec![BTreeSet::new(); n];
    for j in 0..n {
        for &i in pattern.column(j) {
            if i != j && i < n {
                adj[i].insert(j);
                adj[j].insert(i);
            }
        }
    }
    adj
}

/// Column adjacency of `A^T A`: two columns meet when they share a row.
///
/// Rows with more than `max(16, 10 sqrt(n))` entries are skipped; they would
/// make every column adjacent to every other and tell the ordering nothing.
fn at_a_graph(pattern: &SparsityPattern<'_>) -> Vec<BTreeSet<usize>> {
    let n = pattern.ncols;
    let dense = 16usize.max((10.0 * (n as f64).sqrt()) as usize);

    let mut row_cols: Vec<Vec<usize>> = vec![Vec::new(); pattern.nrows];
    for j in 0..n {
        for &i in pattern.column(j) {
            row_cols[i].push(j);
        }
    }

    let mut adj = vec![BTreeSet::new(); n];
    for cols in row_cols.iter().filter(|c| c.len() <= dense) {
        for (k, &a) in cols.iter().enumerate() {
            for &b in &cols[k + 1..] {
                adj[a].insert(b);
                adj[b].insert(a);
            }
        }
    }
    adj
}

/// Greedy minimum degree elimination.
///
/// Repeatedly eliminates the vertex of smallest current degree (lowest index
/// on ties) and joins its neighbours into a clique.
fn minimum_degree(mut adj: Vec<BTreeSet<usize>>) -> Vec<usize> {
    let n = adj.len();
    let mut eliminated = vec![false; n];
    let mut order = Vec::with_capacity(n);

    while order.len() < n {
        let Some(v) = (0..n)
            .filter(|&v| !eliminated[v])
            .min_by_key(|&v| (adj[v].len(), v))
        else {
            break;
        };
        eliminated[v] = true;
        order.push(v);

        let neighbours: Vec<usize> = std::mem::take(&mut adj[v]).into_iter().collect();
        for &a in &neighbours {
            adj[a].remove(&v);
        }
        for (k, &a) in neighbours.iter().enumerate() {
            for &b in &neighbours[k + 1..] {
                adj[a].insert(b);
                adj[b].insert(a);
            }
        }
    }

    order
}
