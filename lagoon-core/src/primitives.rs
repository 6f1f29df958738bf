//! Numeric primitives: big-integer fixed-point reals, complex pairs,
//! negacyclic polynomials, transforms and samplers.

pub mod bigfix;
pub mod cint;
pub mod fft;
pub mod poly;
pub mod sample;
