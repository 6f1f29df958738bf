//! Polynomials in the negacyclic ring `R = Z[X]/(X^N + 1)`.
//!
//! Coefficient vectors have the fixed length N. Modular operations take the
//! (power-of-two) modulus explicitly and keep every coefficient as its
//! centered representative in `(−q/2, q/2]`.

use derive_more::{AsRef, Index, IndexMut, Into};
use itertools::izip;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use super::bigfix::shr_round;

/// Degree below which multiplication falls back to the schoolbook loop.
const KARATSUBA_MIN_DEGREE: usize = 32;

/// Largest support for which the ternary-operand product path is used.
const TERNARY_MAX_SUPPORT: usize = 256;

const_assert!(KARATSUBA_MIN_DEGREE.is_power_of_two());

/// A fixed-length coefficient vector over [`BigInt`].
#[derive(Clone, Debug, Default, PartialEq, Eq, AsRef, Index, IndexMut, Into)]
pub struct Poly(Vec<BigInt>);

impl Poly {
    /// The zero polynomial of length `n`.
    pub fn zero(n: usize) -> Self {
        Self(vec![BigInt::zero(); n])
    }

    /// Wraps a coefficient vector.
    pub fn from_coeffs(coeffs: Vec<BigInt>) -> Self {
        Self(coeffs)
    }

    /// Ring degree N.
    pub fn n(&self) -> usize {
        self.0.len()
    }

    pub fn coeffs(&self) -> &[BigInt] {
        &self.0
    }

    pub fn coeffs_mut(&mut self) -> &mut [BigInt] {
        &mut self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(BigInt::is_zero)
    }

    /// Bit length of the largest coefficient magnitude.
    pub fn max_bits(&self) -> u64 {
        self.0.iter().map(BigInt::bits).max().unwrap_or(0)
    }

    /// Centers every coefficient into `(−q/2, q/2]`.
    pub fn reduce_mod(&mut self, q: &BigInt) {
        let mask = q - BigInt::one();
        let qh = q >> 1usize;
        for c in &mut self.0 {
            let mut r = &*c & &mask;
            if r > qh {
                r -= q;
            }
            *c = r;
        }
    }

    pub fn add_mod(&self, rhs: &Self, q: &BigInt) -> Self {
        let mut out = self.clone();
        out.add_assign_mod(rhs, q);
        out
    }

    pub fn add_assign_mod(&mut self, rhs: &Self, q: &BigInt) {
        for (a, b) in izip!(&mut self.0, &rhs.0) {
            *a += b;
        }
        self.reduce_mod(q);
    }

    pub fn sub_mod(&self, rhs: &Self, q: &BigInt) -> Self {
        let mut out = self.clone();
        out.sub_assign_mod(rhs, q);
        out
    }

    pub fn sub_assign_mod(&mut self, rhs: &Self, q: &BigInt) {
        for (a, b) in izip!(&mut self.0, &rhs.0) {
            *a -= b;
        }
        self.reduce_mod(q);
    }

    pub fn neg_mod(&self, q: &BigInt) -> Self {
        let mut out = Self(self.0.iter().map(|c| -c).collect());
        out.reduce_mod(q);
        out
    }

    pub fn scalar_mul_mod(&self, c: &BigInt, q: &BigInt) -> Self {
        let mut out = Self(self.0.iter().map(|a| a * c).collect());
        out.reduce_mod(q);
        out
    }

    /// Exact left shift of every coefficient (multiplication by 2^shift).
    pub fn shl(&self, shift: usize) -> Self {
        Self(self.0.iter().map(|a| a << shift).collect())
    }

    /// Rescale: rounded division of every coefficient by 2^shift.
    pub fn rshift_round(&self, shift: usize) -> Self {
        Self(self.0.iter().map(|a| shr_round(a, shift)).collect())
    }

    /// Negacyclic product reduced mod `q`.
    pub fn mul_mod(&self, rhs: &Self, q: &BigInt) -> Self {
        debug_assert_eq!(self.n(), rhs.n());
        let n = self.n();
        let raw = if let Some(support) = ternary_support(&rhs.0) {
            mul_by_ternary(&self.0, &support, n)
        } else if let Some(support) = ternary_support(&self.0) {
            mul_by_ternary(&rhs.0, &support, n)
        } else {
            negacyclic_fold(karatsuba(&self.0, &rhs.0), n)
        };
        let mut out = Self(raw);
        out.reduce_mod(q);
        out
    }

    /// The Galois automorphism X → X^power for odd `power`.
    pub fn automorph(&self, power: usize) -> Self {
        debug_assert_eq!(power % 2, 1);
        let n = self.n();
        let m = 2 * n;
        let mut out = vec![BigInt::zero(); n];
        for (k, c) in self.0.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let e = (k * power) % m;
            if e < n {
                out[e] = c.clone();
            } else {
                out[e - n] = -c;
            }
        }
        Self(out)
    }

    /// Multiplication by the monomial X^degree (degree taken mod 2N),
    /// rotating coefficients and negating those that wrap past X^N.
    pub fn mul_monomial(&self, degree: usize) -> Self {
        let n = self.n();
        let m = 2 * n;
        let d = degree % m;
        let mut out = vec![BigInt::zero(); n];
        for (k, c) in self.0.iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let e = (k + d) % m;
            if e < n {
                out[e] = c.clone();
            } else {
                out[e - n] = -c;
            }
        }
        Self(out)
    }
}

/// Support of a ternary polynomial as `(position, is_negative)`, if the
/// polynomial is ternary with at most [`TERNARY_MAX_SUPPORT`] nonzeros.
///
/// Secret keys have a fixed small Hamming weight, so products against them
/// are cheaper as shifted additions than as a full Karatsuba product.
fn ternary_support(coeffs: &[BigInt]) -> Option<Vec<(usize, bool)>> {
    let mut support = Vec::new();
    for (k, c) in coeffs.iter().enumerate() {
        if c.is_zero() {
            continue;
        }
        if !c.magnitude().is_one() || support.len() == TERNARY_MAX_SUPPORT {
            return None;
        }
        support.push((k, c.is_negative()));
    }
    Some(support)
}

/// Negacyclic product of a dense polynomial with a ternary support set.
fn mul_by_ternary(dense: &[BigInt], support: &[(usize, bool)], n: usize) -> Vec<BigInt> {
    let mut out = vec![BigInt::zero(); n];
    for &(k, neg) in support {
        for (j, c) in dense.iter().enumerate() {
            let idx = j + k;
            let (pos, wrapped) = if idx >= n { (idx - n, true) } else { (idx, false) };
            if neg ^ wrapped {
                out[pos] -= c;
            } else {
                out[pos] += c;
            }
        }
    }
    out
}

/// Folds a plain product of length 2N−1 back into the ring: `X^N = −1`.
fn negacyclic_fold(prod: Vec<BigInt>, n: usize) -> Vec<BigInt> {
    let mut out: Vec<BigInt> = prod[..n].to_vec();
    for (k, c) in prod.into_iter().enumerate().skip(n) {
        out[k - n] -= c;
    }
    out
}

/// Plain product of two coefficient slices, length `a + b − 1`.
fn schoolbook(a: &[BigInt], b: &[BigInt]) -> Vec<BigInt> {
    let mut out = vec![BigInt::zero(); a.len() + b.len() - 1];
    for (i, ai) in a.iter().enumerate() {
        if ai.is_zero() {
            continue;
        }
        for (j, bj) in b.iter().enumerate() {
            if bj.is_zero() {
                continue;
            }
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Recursive Karatsuba product of two equal-length slices.
///
/// The slice length is a power of two at every level, so the split is
/// always exact.
fn karatsuba(a: &[BigInt], b: &[BigInt]) -> Vec<BigInt> {
    debug_assert_eq!(a.len(), b.len());
    let len = a.len();
    if len <= KARATSUBA_MIN_DEGREE {
        return schoolbook(a, b);
    }
    debug_assert!(len.is_power_of_two());
    let half = len / 2;
    let (a0, a1) = a.split_at(half);
    let (b0, b1) = b.split_at(half);

    let p0 = karatsuba(a0, b0);
    let p2 = karatsuba(a1, b1);

    let asum: Vec<BigInt> = izip!(a0, a1).map(|(x, y)| x + y).collect();
    let bsum: Vec<BigInt> = izip!(b0, b1).map(|(x, y)| x + y).collect();
    let mut p1 = karatsuba(&asum, &bsum);

    // p1 := (a0 + a1)(b0 + b1) − a0·b0 − a1·b1 = a0·b1 + a1·b0
    for (m, x) in izip!(&mut p1, &p0) {
        *m -= x;
    }
    for (m, x) in izip!(&mut p1, &p2) {
        *m -= x;
    }

    // out = p0 + p1·x^half + p2·x^len
    let mut out = vec![BigInt::zero(); 2 * len - 1];
    for (k, c) in p0.into_iter().enumerate() {
        out[k] += c;
    }
    for (k, c) in p1.into_iter().enumerate() {
        out[half + k] += c;
    }
    for (k, c) in p2.into_iter().enumerate() {
        out[len + k] += c;
    }
    out
}

#[cfg(test)]
pub mod test;
