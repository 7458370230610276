//! Nodal system assembly.
//!
//! Turns a partition into the pieces of `A x = b`:
//! - [`stamp`]: branch contributions into a [`ps_sparse::SparseEntryStore`]
//! - [`rhs`]: the dense right-hand side from an injection map
//!
//! Nothing here knows which solver will consume the result.

pub mod error;
pub mod rhs;
pub mod stamp;

pub use error::{AssemblyError, AssemblyResult};
pub use rhs::build_rhs;
pub use stamp::{assemble, assemble_matrix, stamp_branch};
