//! Parameter validation tests.

use crate::error::Error;
use crate::params::Params;
use crate::MIN_LOG_N;

#[test]
fn derived_sizes() {
    let params = Params::new(13, 150).expect("valid parameters");
    assert_eq!(params.n(), 8192);
    assert_eq!(params.m(), 16384);
    assert_eq!(params.sigma, 3.2);
    assert_eq!(params.h, 64);
}

#[test]
fn rejects_tiny_ring() {
    assert!(matches!(
        Params::new(MIN_LOG_N - 1, 100),
        Err(Error::InvalidParams(_))
    ));
}

#[test]
fn rejects_zero_modulus() {
    assert!(matches!(Params::new(10, 0), Err(Error::InvalidParams(_))));
}

#[test]
fn rejects_bad_distribution() {
    assert!(matches!(
        Params::with_distribution(10, 100, 0.0, 64),
        Err(Error::InvalidParams(_))
    ));
    assert!(matches!(
        Params::with_distribution(10, 100, -1.0, 64),
        Err(Error::InvalidParams(_))
    ));
    assert!(matches!(
        Params::with_distribution(10, 100, 3.2, 0),
        Err(Error::InvalidParams(_))
    ));
    assert!(matches!(
        Params::with_distribution(10, 100, 3.2, 1025),
        Err(Error::InvalidParams(_))
    ));
}

#[test]
fn hamming_weight_may_fill_the_ring() {
    assert!(Params::with_distribution(10, 100, 3.2, 1024).is_ok());
}

#[test]
fn security_estimate() {
    // N must exceed logq·(λ+110)/7.2 = 16362 for λ = 80, logq = 620.
    assert_eq!(Params::suggest_log_n(80, 620), 14);
    // The suggestion never goes below the minimum ring size.
    assert!(Params::suggest_log_n(1, 1) >= MIN_LOG_N);
    // More modulus bits can only require a larger ring.
    assert!(Params::suggest_log_n(80, 1240) >= Params::suggest_log_n(80, 620));
}
