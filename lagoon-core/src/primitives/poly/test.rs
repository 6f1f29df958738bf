//! Tests for the negacyclic ring operations.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use rand::Rng;

use crate::primitives::poly::Poly;
use crate::primitives::sample;
use crate::testutil;

fn rand_poly<R: Rng>(rng: &mut R, n: usize, bits: u32) -> Poly {
    let coeffs = (0..n)
        .map(|_| BigInt::from(rng.gen_range(-(1i64 << bits)..(1i64 << bits))))
        .collect();
    Poly::from_coeffs(coeffs)
}

/// Reference negacyclic product, quadratic time.
fn naive_mul(a: &Poly, b: &Poly, q: &BigInt) -> Poly {
    let n = a.n();
    let mut out = vec![BigInt::zero(); n];
    for i in 0..n {
        for j in 0..n {
            let prod = &a[i] * &b[j];
            if i + j < n {
                out[i + j] += prod;
            } else {
                out[i + j - n] -= prod;
            }
        }
    }
    let mut res = Poly::from_coeffs(out);
    res.reduce_mod(q);
    res
}

#[test]
fn karatsuba_matches_naive() {
    let mut rng = testutil::rng(11);
    let q = BigInt::one() << 60;
    for _ in 0..4 {
        let a = rand_poly(&mut rng, 128, 20);
        let b = rand_poly(&mut rng, 128, 20);
        assert_eq!(a.mul_mod(&b, &q), naive_mul(&a, &b, &q));
    }
}

#[test]
fn ternary_path_matches_naive() {
    let mut rng = testutil::rng(12);
    let q = BigInt::one() << 60;
    let a = rand_poly(&mut rng, 256, 24);
    let s = sample::hwt(&mut rng, 256, 17);
    assert_eq!(a.mul_mod(&s, &q), naive_mul(&a, &s, &q));
    assert_eq!(s.mul_mod(&a, &q), naive_mul(&s, &a, &q));
}

#[test]
fn monomial_rotates_and_negates() {
    let mut rng = testutil::rng(13);
    let n = 64;
    let q = BigInt::one() << 40;
    let p = rand_poly(&mut rng, n, 16);

    // Multiplying by X^{N−1} shifts down by one and negates the wrap.
    let res = p.mul_monomial(n - 1);
    for k in 1..n {
        assert_eq!(res[k - 1], -&p[k]);
    }
    assert_eq!(res[n - 1], p[0]);

    // X^{2N} is the identity, X^N is negation.
    assert_eq!(p.mul_monomial(2 * n), p);
    assert_eq!(p.mul_monomial(n), p.neg_mod(&q));
}

#[test]
fn monomial_agrees_with_ring_product() {
    let mut rng = testutil::rng(14);
    let n = 64;
    let q = BigInt::one() << 40;
    let p = rand_poly(&mut rng, n, 16);
    for degree in [1usize, 7, n / 2, n - 1] {
        let mut mono = Poly::zero(n);
        mono[degree] = BigInt::one();
        let mut expected = p.mul_monomial(degree);
        expected.reduce_mod(&q);
        assert_eq!(p.mul_mod(&mono, &q), expected);
    }
}

#[test]
fn automorphism_composes() {
    let mut rng = testutil::rng(15);
    let n = 64;
    let p = rand_poly(&mut rng, n, 16);
    assert_eq!(p.automorph(1), p);
    let twice = p.automorph(5).automorph(5);
    assert_eq!(twice, p.automorph(25 % (2 * n)));
}

#[test]
fn automorphism_is_a_ring_map() {
    let mut rng = testutil::rng(16);
    let n = 32;
    let q = BigInt::one() << 40;
    let a = rand_poly(&mut rng, n, 10);
    let b = rand_poly(&mut rng, n, 10);
    let lhs = a.mul_mod(&b, &q).automorph(5);
    let mut lhs = lhs;
    lhs.reduce_mod(&q);
    let rhs = a.automorph(5).mul_mod(&b.automorph(5), &q);
    assert_eq!(lhs, rhs);
}

#[test]
fn centered_reduction() {
    let q = BigInt::from(16);
    let mut p = Poly::from_coeffs(vec![
        BigInt::from(8),   // +q/2 stays
        BigInt::from(-8),  // −q/2 wraps to +q/2
        BigInt::from(9),   // wraps negative
        BigInt::from(23),  // 23 ≡ 7
        BigInt::from(-1),
    ]);
    p.reduce_mod(&q);
    assert_eq!(p[0], BigInt::from(8));
    assert_eq!(p[1], BigInt::from(8));
    assert_eq!(p[2], BigInt::from(-7));
    assert_eq!(p[3], BigInt::from(7));
    assert_eq!(p[4], BigInt::from(-1));
}

#[test]
fn rescale_rounds() {
    let p = Poly::from_coeffs(vec![BigInt::from(5), BigInt::from(-5), BigInt::from(4)]);
    let r = p.rshift_round(1);
    assert_eq!(r[0], BigInt::from(3));
    assert_eq!(r[1], BigInt::from(-2));
    assert_eq!(r[2], BigInt::from(2));
}
