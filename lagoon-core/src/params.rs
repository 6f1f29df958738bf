//! Scheme parameters and the RLWE security estimate.

use crate::error::{Error, Result};
use crate::MIN_LOG_N;

/// Default standard deviation of the error distribution.
pub const DEFAULT_SIGMA: f64 = 3.2;

/// Default Hamming weight of the secret key.
pub const DEFAULT_H: usize = 64;

/// Ring and modulus parameters.
///
/// Keys and ciphertexts produced under different parameters are
/// incompatible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params {
    /// N = 2^log_n is the degree of the ring `Z[X] / (X^N + 1)`.
    pub log_n: usize,
    /// Q = 2^log_q is the highest ciphertext modulus.
    pub log_q: usize,
    /// Standard deviation of the rounded-Gaussian error distribution.
    pub sigma: f64,
    /// Hamming weight of the ternary secret key.
    pub h: usize,
}

impl Params {
    /// Validated constructor with the default `sigma` and `h`.
    pub fn new(log_n: usize, log_q: usize) -> Result<Self> {
        Self::with_distribution(log_n, log_q, DEFAULT_SIGMA, DEFAULT_H)
    }

    /// Validated constructor with explicit distribution parameters.
    pub fn with_distribution(
        log_n: usize,
        log_q: usize,
        sigma: f64,
        h: usize,
    ) -> Result<Self> {
        if log_n < MIN_LOG_N || log_n >= usize::BITS as usize - 2 {
            return Err(Error::InvalidParams(format!(
                "log_n must be in [{MIN_LOG_N}, {}), got {log_n}",
                usize::BITS - 2
            )));
        }
        if log_q == 0 {
            return Err(Error::InvalidParams("log_q must be positive".into()));
        }
        if !(sigma > 0.0) {
            return Err(Error::InvalidParams(format!(
                "sigma must be positive, got {sigma}"
            )));
        }
        let n = 1usize << log_n;
        if h == 0 || h > n {
            return Err(Error::InvalidParams(format!(
                "secret Hamming weight must be in [1, {n}], got {h}"
            )));
        }
        Ok(Self {
            log_n,
            log_q,
            sigma,
            h,
        })
    }

    /// Ring degree N.
    pub fn n(&self) -> usize {
        1 << self.log_n
    }

    /// M = 2N, the order of the root-of-unity group.
    pub fn m(&self) -> usize {
        2 << self.log_n
    }

    /// Suggests the minimum `log_n` for which RLWE with modulus `2^log_q`
    /// resists an adversary bounded by `2^lambda` operations, following the
    /// security estimate table `N > logq * (lambda + 110) / 7.2`.
    pub fn suggest_log_n(lambda: usize, log_q: usize) -> usize {
        let bound = (log_q as f64 * (lambda as f64 + 110.0) / 7.2).ceil();
        let mut log_n = MIN_LOG_N;
        while ((1usize << log_n) as f64) < bound {
            log_n += 1;
        }
        log_n
    }
}

#[cfg(test)]
pub mod test;
