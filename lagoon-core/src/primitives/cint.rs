//! Complex fixed-point values.

use std::ops::{Shl, Shr};

use derive_more::{Add, Neg, Sub};
use num_bigint::BigInt;
use num_traits::Zero;

use super::bigfix::shr_round;

/// A complex number whose parts are scaled big integers.
///
/// The scale is carried by the caller (usually 2^logp); arithmetic here is
/// plain integer arithmetic on both components.
#[derive(Clone, Debug, Default, PartialEq, Eq, Add, Sub, Neg)]
pub struct CInt {
    /// Real part.
    pub r: BigInt,
    /// Imaginary part.
    pub i: BigInt,
}

impl CInt {
    pub fn new(r: BigInt, i: BigInt) -> Self {
        Self { r, i }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_i64(r: i64, i: i64) -> Self {
        Self::new(BigInt::from(r), BigInt::from(i))
    }

    pub fn is_zero(&self) -> bool {
        self.r.is_zero() && self.i.is_zero()
    }

    /// Complex conjugate.
    pub fn conj(&self) -> Self {
        Self::new(self.r.clone(), -&self.i)
    }

    /// Exact complex product (the scale doubles).
    pub fn mul(&self, rhs: &Self) -> Self {
        Self::new(
            &self.r * &rhs.r - &self.i * &rhs.i,
            &self.r * &rhs.i + &self.i * &rhs.r,
        )
    }

    /// Complex product followed by a rounded shift, for multiplying by a
    /// value scaled to `shift` fractional bits without changing the scale.
    pub fn mul_shr(&self, rhs: &Self, shift: usize) -> Self {
        let prod = self.mul(rhs);
        Self::new(shr_round(&prod.r, shift), shr_round(&prod.i, shift))
    }

    /// Multiplication by a root of unity given as a scaled (cos, sin) pair.
    pub fn mul_root(&self, cos: &BigInt, sin: &BigInt, prec: usize) -> Self {
        Self::new(
            shr_round(&(&self.r * cos - &self.i * sin), prec),
            shr_round(&(&self.r * sin + &self.i * cos), prec),
        )
    }

    fn add_ref(&self, rhs: &Self) -> Self {
        Self::new(&self.r + &rhs.r, &self.i + &rhs.i)
    }

    fn sub_ref(&self, rhs: &Self) -> Self {
        Self::new(&self.r - &rhs.r, &self.i - &rhs.i)
    }

    /// Butterfly step: returns (self + rhs, self − rhs).
    pub fn butterfly(&self, rhs: &Self) -> (Self, Self) {
        (self.add_ref(rhs), self.sub_ref(rhs))
    }
}

impl Shl<usize> for &CInt {
    type Output = CInt;

    fn shl(self, shift: usize) -> CInt {
        CInt::new(&self.r << shift, &self.i << shift)
    }
}

// Arithmetic shift; both components round toward negative infinity.
impl Shr<usize> for &CInt {
    type Output = CInt;

    fn shr(self, shift: usize) -> CInt {
        CInt::new(&self.r >> shift, &self.i >> shift)
    }
}

#[cfg(test)]
pub mod test;
