//! Samplers for key, error and masking polynomials.
//!
//! Every sampler draws from a caller-supplied cryptographically secure
//! source; samplers never share hidden state, so distinct threads with
//! distinct generators can never produce duplicate streams.

use num_bigint::{BigInt, RandBigInt};
use num_traits::Zero;
use rand::{seq::index, CryptoRng, Rng};
use rand_distr::{Distribution, Normal};

use super::poly::Poly;

/// Discrete Gaussian: each coefficient is a rounded `Normal(0, sigma)`.
pub fn gauss<R: Rng + CryptoRng>(rng: &mut R, n: usize, sigma: f64) -> Poly {
    let normal = Normal::new(0.0, sigma).expect("sigma is validated at parameter construction");
    let coeffs = (0..n)
        .map(|_| {
            let v: f64 = normal.sample(rng);
            BigInt::from(v.round() as i64)
        })
        .collect();
    Poly::from_coeffs(coeffs)
}

/// Ternary polynomial with exactly `h` nonzero coefficients, positions
/// chosen uniformly without replacement, each nonzero ±1 uniformly.
pub fn hwt<R: Rng + CryptoRng>(rng: &mut R, n: usize, h: usize) -> Poly {
    let mut coeffs = vec![BigInt::zero(); n];
    for pos in index::sample(rng, n, h) {
        coeffs[pos] = if rng.gen::<bool>() {
            BigInt::from(1)
        } else {
            BigInt::from(-1)
        };
    }
    Poly::from_coeffs(coeffs)
}

/// Each coefficient is 0 with probability 1/2, and ±1 with probability 1/4
/// each.
pub fn zo<R: Rng + CryptoRng>(rng: &mut R, n: usize) -> Poly {
    let coeffs = (0..n)
        .map(|_| match rng.gen::<u8>() & 3 {
            0 | 1 => BigInt::zero(),
            2 => BigInt::from(1),
            _ => BigInt::from(-1),
        })
        .collect();
    Poly::from_coeffs(coeffs)
}

/// Uniform {0, 1} coefficients.
pub fn binary<R: Rng + CryptoRng>(rng: &mut R, n: usize) -> Poly {
    let coeffs = (0..n)
        .map(|_| BigInt::from(rng.gen::<bool>() as u8))
        .collect();
    Poly::from_coeffs(coeffs)
}

/// {0, 1} coefficients with exactly `h` ones.
pub fn binary_h<R: Rng + CryptoRng>(rng: &mut R, n: usize, h: usize) -> Poly {
    let mut coeffs = vec![BigInt::zero(); n];
    for pos in index::sample(rng, n, h) {
        coeffs[pos] = BigInt::from(1);
    }
    Poly::from_coeffs(coeffs)
}

/// Each coefficient uniform in `[0, 2^log_bound)`.
pub fn uniform2<R: Rng + CryptoRng>(rng: &mut R, n: usize, log_bound: usize) -> Poly {
    let coeffs = (0..n)
        .map(|_| BigInt::from(rng.gen_biguint(log_bound as u64)))
        .collect();
    Poly::from_coeffs(coeffs)
}
