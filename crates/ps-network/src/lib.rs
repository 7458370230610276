//! ps-network: network partition model for partsolve.
//!
//! Provides:
//! - Branch and injection records as handed over by a loader
//! - The partition bundle (reference node + ordered branches + injections)
//! - Dense indexing of non-reference nodes for solver integration
//!
//! # Example
//!
//! ```
//! use ps_core::NodeId;
//! use ps_network::{Branch, IndexMap};
//!
//! let reference = NodeId::new(0);
//! let branches = vec![Branch::new(0, 1, 5.0), Branch::new(1, 2, 2.0)];
//! let index = IndexMap::build(&branches, reference);
//!
//! assert_eq!(index.len(), 2);
//! assert_eq!(index.index_of(NodeId::new(2)).map(|i| i.get()), Some(1));
//! ```

pub mod branch;
pub mod error;
pub mod indexing;
pub mod injection;
pub mod partition;

// Re-exports for ergonomics
pub use branch::Branch;
pub use error::{NetworkError, NetworkResult};
pub use indexing::IndexMap;
pub use injection::InjectionMap;
pub use partition::Partition;
