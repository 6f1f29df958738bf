//! Shared test fixtures: random message generation, fixed-point
//! conversion and maximum-error comparison.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::primitives::cint::CInt;

/// Deterministic generator so failures reproduce.
pub(crate) fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Scales a complex float to a fixed-point pair at 2^log_p.
pub(crate) fn eval_cint(re: f64, im: f64, log_p: usize) -> CInt {
    let scale = (1u64 << log_p) as f64;
    CInt::new(
        BigInt::from((re * scale).round() as i64),
        BigInt::from((im * scale).round() as i64),
    )
}

/// Uniform complex samples in the unit square.
pub(crate) fn rand_complex_vec<R: Rng>(
    rng: &mut R,
    n: usize,
    log_p: usize,
) -> (Vec<(f64, f64)>, Vec<CInt>) {
    let mut floats = Vec::with_capacity(n);
    let mut ints = Vec::with_capacity(n);
    for _ in 0..n {
        let re: f64 = rng.gen();
        let im: f64 = rng.gen();
        floats.push((re, im));
        ints.push(eval_cint(re, im, log_p));
    }
    (floats, ints)
}

/// Uniform samples on the unit circle.
pub(crate) fn rand_circle_vec<R: Rng>(
    rng: &mut R,
    n: usize,
    log_p: usize,
) -> (Vec<(f64, f64)>, Vec<CInt>) {
    let mut floats = Vec::with_capacity(n);
    let mut ints = Vec::with_capacity(n);
    for _ in 0..n {
        let angle: f64 = rng.gen::<f64>() * 2.0 * std::f64::consts::PI;
        let (re, im) = (angle.cos(), angle.sin());
        floats.push((re, im));
        ints.push(eval_cint(re, im, log_p));
    }
    (floats, ints)
}

/// Complex product of float pairs.
pub(crate) fn cmul(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0 * b.0 - a.1 * b.1, a.0 * b.1 + a.1 * b.0)
}

/// a^{2^log_degree} by repeated squaring.
pub(crate) fn cpow2(a: (f64, f64), log_degree: usize) -> (f64, f64) {
    let mut r = a;
    for _ in 0..log_degree {
        r = cmul(r, r);
    }
    r
}

/// a^degree.
pub(crate) fn cpow(a: (f64, f64), degree: usize) -> (f64, f64) {
    let mut r = (1.0, 0.0);
    for _ in 0..degree {
        r = cmul(r, a);
    }
    r
}

/// Largest absolute difference over all real and imaginary components.
pub(crate) fn max_err(expected: &[CInt], got: &[CInt]) -> BigInt {
    assert_eq!(expected.len(), got.len());
    let mut max = BigInt::zero();
    for (e, g) in expected.iter().zip(got) {
        let dr = (&e.r - &g.r).abs();
        let di = (&e.i - &g.i).abs();
        if dr > max {
            max = dr;
        }
        if di > max {
            max = di;
        }
    }
    max
}

/// Asserts that every component differs by less than 2^bound_bits.
pub(crate) fn assert_close(expected: &[CInt], got: &[CInt], bound_bits: usize) {
    let err = max_err(expected, got);
    assert!(
        err < (BigInt::from(1) << bound_bits),
        "max error {} bits, allowed {} bits",
        err.bits(),
        bound_bits
    );
}

/// Expected slot values for complex-float references at scale 2^log_p.
pub(crate) fn expected_cints(vals: &[(f64, f64)], log_p: usize) -> Vec<CInt> {
    vals.iter().map(|&(r, i)| eval_cint(r, i, log_p)).collect()
}
