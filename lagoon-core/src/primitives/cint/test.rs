//! Complex fixed-point tests.

use num_bigint::BigInt;

use crate::primitives::cint::CInt;

#[test]
fn complex_product() {
    let a = CInt::from_i64(3, 4);
    let b = CInt::from_i64(-2, 5);
    // (3 + 4i)(−2 + 5i) = −26 + 7i
    assert_eq!(a.mul(&b), CInt::from_i64(-26, 7));
}

#[test]
fn conjugation_negates_imaginary() {
    let a = CInt::from_i64(3, -4);
    assert_eq!(a.conj(), CInt::from_i64(3, 4));
    assert_eq!(a.conj().conj(), a);
}

#[test]
fn product_with_scaled_shift() {
    let log_p = 10usize;
    let a = CInt::new(BigInt::from(3) << log_p, BigInt::from(0));
    let b = CInt::new(BigInt::from(7) << log_p, BigInt::from(0));
    assert_eq!(
        a.mul_shr(&b, log_p),
        CInt::new(BigInt::from(21) << log_p, BigInt::from(0))
    );
}

#[test]
fn shifts_are_arithmetic() {
    let a = CInt::from_i64(-5, 5);
    // Both components round toward negative infinity.
    assert_eq!(&a >> 1, CInt::from_i64(-3, 2));
    assert_eq!(&a << 2, CInt::from_i64(-20, 20));
}

#[test]
fn butterfly_sums_and_differences() {
    let a = CInt::from_i64(5, 1);
    let b = CInt::from_i64(2, -3);
    let (lo, hi) = a.butterfly(&b);
    assert_eq!(lo, CInt::from_i64(7, -2));
    assert_eq!(hi, CInt::from_i64(3, 4));
}

#[test]
fn field_wise_operators() {
    let a = CInt::from_i64(1, 2);
    let b = CInt::from_i64(10, -20);
    assert_eq!(a.clone() + b.clone(), CInt::from_i64(11, -18));
    assert_eq!(b.clone() - a.clone(), CInt::from_i64(9, -22));
    assert_eq!(-a, CInt::from_i64(-1, -2));
}
