//! Library-wide error and result types.

use thiserror::Error;

use crate::key::KeyTag;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the engine can produce.
///
/// Every fallible operation validates its inputs before touching them, so a
/// returned error implies the operands were left unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// Nonsensical scheme parameters or operation arguments.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// An arithmetic operation was invoked on ciphertexts at different
    /// moduli.
    #[error("ciphertext level mismatch: {left} vs {right} bits")]
    LevelMismatch { left: usize, right: usize },

    /// A rescale or multiplication was requested with too little modulus
    /// budget left. The caller should bootstrap instead.
    #[error("modulus budget exhausted: {cbits} bits left, {needed} needed")]
    BudgetExhausted { cbits: usize, needed: usize },

    /// An operation needed an evaluation key (or bootstrap constants) that
    /// were never generated.
    #[error("missing evaluation key: {0}")]
    MissingKey(KeyTag),

    /// An algorithm was invoked outside its convergence or tabulated range.
    #[error("input outside the valid domain: {0}")]
    OutOfDomain(&'static str),

    /// An internal invariant was violated; this indicates a bug.
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}
