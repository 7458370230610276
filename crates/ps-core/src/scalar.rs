//! Coefficient types the sparse machinery is generic over.
//!
//! Assembly, compression and factorization only need field arithmetic plus a
//! magnitude for pivot selection, so real (`f64`) and complex (`Complex64`)
//! systems share one code path.

use core::fmt::{Debug, Display};
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use num_complex::Complex64;

pub trait Scalar:
    Copy
    + Debug
    + Display
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
{
    fn zero() -> Self;

    fn one() -> Self;

    /// Magnitude used for pivot comparisons.
    fn modulus(self) -> f64;

    fn is_finite(self) -> bool;
}

impl Scalar for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn modulus(self) -> f64 {
        self.abs()
    }

    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

impl Scalar for Complex64 {
    #[inline]
    fn zero() -> Self {
        Complex64::new(0.0, 0.0)
    }

    #[inline]
    fn one() -> Self {
        Complex64::new(1.0, 0.0)
    }

    #[inline]
    fn modulus(self) -> f64 {
        self.norm()
    }

    #[inline]
    fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn complex_on_real_axis_matches_f64(a in -1e3_f64..1e3, b in 0.5_f64..1e3) {
            let (ca, cb) = (Complex64::new(a, 0.0), Complex64::new(b, 0.0));
            prop_assert_eq!((ca * cb - ca).re, a * b - a);
            prop_assert_eq!(ca.modulus(), a.modulus());
        }
    }
}
