//! Ring-LWE ciphertexts.

use num_bigint::BigInt;

use crate::primitives::poly::Poly;

/// A ciphertext pair satisfying `bx + ax·s ≡ encode(m) + e (mod modulus)`
/// for a small error `e`.
///
/// Both polynomials keep their coefficients centered in
/// `(−modulus/2, modulus/2]`. The pair carries its remaining modulus
/// budget: each rescale by Δ bits lowers `cbits` by Δ and divides
/// `modulus` by 2^Δ.
#[derive(Clone, Debug)]
pub struct Ciphertext {
    pub ax: Poly,
    pub bx: Poly,
    /// Current modulus, always a power of two.
    pub modulus: BigInt,
    /// Bit length of `modulus`.
    pub cbits: usize,
    /// Number of encoded slots (a power of two, at most N/2).
    pub slots: usize,
    /// Whether any slot carries a nonzero imaginary part.
    pub is_complex: bool,
}

impl Ciphertext {
    /// log₂ of the slot count.
    pub fn log_slots(&self) -> usize {
        self.slots.trailing_zeros() as usize
    }
}
