//! Approximate-arithmetic homomorphic encryption core with bootstrapping.
//!
//! Messages are vectors of complex fixed-point values. The pipeline is one
//! way: messages are encoded into plaintext polynomials over
//! `Z[X]/(X^N + 1)`, encrypted into ring-LWE ciphertext pairs modulo a
//! power-of-two modulus, transformed homomorphically (arithmetic, slot
//! rotations, conjugation, rescaling), and eventually refreshed by the
//! bootstrapping pipeline when the modulus budget runs out.
//!
//! This library has 4 layers:
//! [`primitives`]: big-integer polynomials, fixed-point complex arithmetic,
//!                 transforms and samplers,
//! [`scheme`]: encryption, decryption and the homomorphic operations,
//! [`algo`]: higher-level algorithms composed from scheme operations,
//! [`bootstrap`]: the CoeffToSlot / remove-I-part / SlotToCoeff refresh.

#[macro_use]
extern crate static_assertions;

pub mod algo;
pub mod bootstrap;
pub mod ciphertext;
pub mod context;
pub mod encoder;
pub mod error;
pub mod key;
pub mod params;
pub mod plaintext;
pub mod pool;
pub mod primitives;
pub mod scheme;

#[cfg(test)]
pub(crate) mod testutil;

pub use algo::SchemeAlgo;
pub use ciphertext::Ciphertext;
pub use context::Context;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use key::{EvaluationKey, KeyTag, SecretKey};
pub use params::Params;
pub use plaintext::Plaintext;
pub use pool::set_num_threads;
pub use primitives::cint::CInt;
pub use scheme::Scheme;

/// The smallest supported ring-degree exponent.
pub const MIN_LOG_N: usize = 4;

// The rotation group and embedding tables assume at least two slots.
const_assert!(MIN_LOG_N >= 2);
