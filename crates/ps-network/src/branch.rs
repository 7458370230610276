//! Branch records.

use ps_core::{NodeId, Scalar};

/// Admittance-like element between two nodes.
///
/// `from` and `to` may coincide (self stamp) and either may be the reference node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch<T = f64> {
    pub from: NodeId,
    pub to: NodeId,
    pub value: T,
}

impl<T: Scalar> Branch<T> {
    /// Build a branch from raw node ids.
    pub fn new(from: i64, to: i64, value: T) -> Self {
        Self {
            from: NodeId::new(from),
            to: NodeId::new(to),
            value,
        }
    }

    /// Both end points, in `[from, to]` order.
    pub fn ends(&self) -> [NodeId; 2] {
        [self.from, self.to]
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}
