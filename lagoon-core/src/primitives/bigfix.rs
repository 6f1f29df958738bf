//! Fixed-point real arithmetic on big-integer mantissas.
//!
//! A fixed-point value with precision `prec` is a [`BigInt`] mantissa `x`
//! representing `x / 2^prec`. Root-of-unity tables need on the order of
//! `logq + 2·logN` fractional bits, far beyond hardware floats, so π and
//! the trigonometric seeds are computed from integer series.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// Rounded right shift: ⌊x / 2^shift⌉ (ties round up).
pub fn shr_round(x: &BigInt, shift: usize) -> BigInt {
    if shift == 0 {
        return x.clone();
    }
    let half = BigInt::one() << (shift - 1);
    (x + half) >> shift
}

/// Rounded division ⌊a / b⌉ for positive `b`.
pub fn div_round(a: &BigInt, b: &BigInt) -> BigInt {
    debug_assert!(b.is_positive());
    let num = (a << 1usize) + b;
    floor_div(&num, &(b << 1usize))
}

/// Flooring division for positive `b`.
pub fn floor_div(a: &BigInt, b: &BigInt) -> BigInt {
    debug_assert!(b.is_positive());
    let q = a / b;
    let r = a % b;
    if r.is_negative() {
        q - BigInt::one()
    } else {
        q
    }
}

/// Fixed-point product at `prec` fractional bits.
pub fn mul_fix(a: &BigInt, b: &BigInt, prec: usize) -> BigInt {
    shr_round(&(a * b), prec)
}

/// π at `prec` fractional bits, by Machin's formula
/// π = 16·atan(1/5) − 4·atan(1/239).
pub fn pi(prec: usize) -> BigInt {
    let guard = 16;
    let work = prec + guard;
    let val = (atan_inv(5, work) << 4usize) - (atan_inv(239, work) << 2usize);
    shr_round(&val, guard)
}

/// atan(1/x) at `prec` fractional bits by the alternating power series.
fn atan_inv(x: u64, prec: usize) -> BigInt {
    let x2 = BigInt::from(x * x);
    let mut power = (BigInt::one() << prec) / BigInt::from(x);
    let mut sum = BigInt::zero();
    let mut k = 0u64;
    while !power.is_zero() {
        let term = &power / BigInt::from(2 * k + 1);
        if k % 2 == 0 {
            sum += term;
        } else {
            sum -= term;
        }
        power /= &x2;
        k += 1;
    }
    sum
}

/// (cos θ, sin θ) at `prec` fractional bits for a small fixed-point angle.
///
/// Plain Taylor summation; the callers only pass θ = 2π/M, for which the
/// series length is logarithmic in the precision.
pub fn cos_sin(theta: &BigInt, prec: usize) -> (BigInt, BigInt) {
    let mut cos = BigInt::one() << prec;
    let mut sin = theta.clone();
    let mut term = theta.clone();
    let mut k = 1u64;
    loop {
        term = mul_fix(&term, theta, prec);
        term = div_round(&term, &BigInt::from(k + 1));
        if term.is_zero() {
            break;
        }
        let idx = k + 1;
        let target = if idx % 2 == 0 { &mut cos } else { &mut sin };
        if (idx / 2) % 2 == 1 {
            *target -= &term;
        } else {
            *target += &term;
        }
        k += 1;
    }
    (cos, sin)
}

#[cfg(test)]
pub mod test;
