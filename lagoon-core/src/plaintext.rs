//! Encoded messages.

use num_bigint::BigInt;

use crate::primitives::poly::Poly;

/// A message encoded as a ring element.
#[derive(Clone, Debug)]
pub struct Plaintext {
    /// The encoding polynomial, centered mod `modulus`.
    pub mx: Poly,
    /// Current modulus, always a power of two.
    pub modulus: BigInt,
    /// Bit length of `modulus`.
    pub cbits: usize,
    /// Number of encoded slots (a power of two, at most N/2).
    pub slots: usize,
    /// Whether any slot carries a nonzero imaginary part.
    pub is_complex: bool,
}
