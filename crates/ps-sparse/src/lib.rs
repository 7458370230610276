//! Sparse storage for assembled nodal systems.
//!
//! The accumulator ([`SparseEntryStore`]) is what stamping writes into; it is
//! turned into compressed-column form ([`CompressedMatrix`]) once assembly is
//! done. Both are plain values owned by whoever builds them.

pub mod csc;
pub mod error;
pub mod store;
pub mod triplet;

pub use csc::{CompressedMatrix, SparsityPattern, compress, compress_square};
pub use error::{SparseError, SparseResult};
pub use store::{Entry, SparseEntryStore};
pub use triplet::TripletList;
