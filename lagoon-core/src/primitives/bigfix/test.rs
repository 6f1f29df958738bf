//! Fixed-point arithmetic tests.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::primitives::bigfix::{cos_sin, div_round, floor_div, mul_fix, pi, shr_round};

#[test]
fn rounding_shift() {
    assert_eq!(shr_round(&BigInt::from(5), 1), BigInt::from(3));
    assert_eq!(shr_round(&BigInt::from(4), 2), BigInt::from(1));
    // −2.5 rounds up to −2.
    assert_eq!(shr_round(&BigInt::from(-5), 1), BigInt::from(-2));
    assert_eq!(shr_round(&BigInt::from(-4), 2), BigInt::from(-1));
    assert_eq!(shr_round(&BigInt::from(7), 0), BigInt::from(7));
}

#[test]
fn rounding_division() {
    assert_eq!(div_round(&BigInt::from(7), &BigInt::from(2)), BigInt::from(4));
    assert_eq!(div_round(&BigInt::from(6), &BigInt::from(3)), BigInt::from(2));
    assert_eq!(div_round(&BigInt::from(-7), &BigInt::from(2)), BigInt::from(-3));
    assert_eq!(div_round(&BigInt::from(-9), &BigInt::from(4)), BigInt::from(-2));
}

#[test]
fn flooring_division() {
    assert_eq!(floor_div(&BigInt::from(7), &BigInt::from(2)), BigInt::from(3));
    assert_eq!(floor_div(&BigInt::from(-7), &BigInt::from(2)), BigInt::from(-4));
    assert_eq!(floor_div(&BigInt::from(-8), &BigInt::from(2)), BigInt::from(-4));
}

#[test]
fn pi_matches_hardware_floats() {
    // Compare the top 52 fractional bits against f64 π.
    let got = shr_round(&pi(120), 120 - 52);
    let expected = BigInt::from((std::f64::consts::PI * (1u64 << 52) as f64).round() as i64);
    let diff = (&got - &expected).to_f64().expect("small difference");
    assert!(diff.abs() <= 1.0, "pi mismatch: {diff}");
}

#[test]
fn pi_is_consistent_across_precisions() {
    let hi = pi(200);
    let lo = pi(120);
    let diff = &shr_round(&hi, 80) - &lo;
    assert!(diff.to_f64().expect("small difference").abs() <= 1.0);
}

#[test]
fn trig_of_small_angle() {
    let prec = 100usize;
    // θ = π/64, small enough for the Taylor loop and big enough to matter.
    let theta = shr_round(&pi(prec), 6);
    let (cos, sin) = cos_sin(&theta, prec);
    let angle = std::f64::consts::PI / 64.0;
    let scale = 2f64.powi(48);
    let cos48 = shr_round(&cos, prec - 48).to_f64().expect("fits");
    let sin48 = shr_round(&sin, prec - 48).to_f64().expect("fits");
    assert!((cos48 / scale - angle.cos()).abs() < 1e-12);
    assert!((sin48 / scale - angle.sin()).abs() < 1e-12);
}

#[test]
fn fixed_product() {
    let prec = 30usize;
    let a = BigInt::from(3) << (prec - 1); // 1.5
    let b = BigInt::from(5) << (prec - 2); // 1.25
    assert_eq!(mul_fix(&a, &b, prec), BigInt::from(15) << (prec - 3)); // 1.875
}
