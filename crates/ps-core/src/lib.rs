//! ps-core: shared foundation for partsolve.
//!
//! Contains:
//! - ids (original node ids and dense solver indices)
//! - numeric (finiteness checks)
//! - scalar (coefficient types the solver is generic over)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod scalar;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use scalar::Scalar;

pub use num_complex::Complex64;
