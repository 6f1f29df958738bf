//! Secret and evaluation keys.

use std::fmt;

use num_bigint::BigInt;
use rand::{CryptoRng, Rng};

use crate::context::Context;
use crate::params::Params;
use crate::primitives::{poly::Poly, sample};

/// Identifies an entry of the evaluation-key registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyTag {
    /// The embedded public encryption of zero.
    Encrypt,
    /// Relinearization key for the tensor term s².
    Mult,
    /// Conjugation key for σ: X → X^{−1}.
    Conj,
    /// Left-rotation key for the given slot amount.
    LeftRot(usize),
    /// Right-rotation key for the given slot amount.
    RightRot(usize),
    /// Bootstrap constants for the given log slot count.
    Boot(usize),
}

impl fmt::Display for KeyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyTag::Encrypt => write!(f, "encrypt"),
            KeyTag::Mult => write!(f, "mult"),
            KeyTag::Conj => write!(f, "conjugate"),
            KeyTag::LeftRot(r) => write!(f, "left-rotate({r})"),
            KeyTag::RightRot(r) => write!(f, "right-rotate({r})"),
            KeyTag::Boot(l) => write!(f, "bootstrap(log_slots={l})"),
        }
    }
}

/// Ternary secret key with Hamming weight `params.h`.
///
/// Generated once; never mutated afterwards.
#[derive(Clone, Debug)]
pub struct SecretKey {
    pub(crate) sx: Poly,
}

impl SecretKey {
    pub fn new<R: Rng + CryptoRng>(params: &Params, rng: &mut R) -> Self {
        Self {
            sx: sample::hwt(rng, params.n(), params.h),
        }
    }
}

/// A key-switching key: a pair (ax, bx) mod P·Q with
/// `bx + ax·s = P·s' + e` for the target secret polynomial s'.
///
/// Immutable after creation.
#[derive(Clone, Debug)]
pub struct EvaluationKey {
    pub(crate) ax: Poly,
    pub(crate) bx: Poly,
}

impl EvaluationKey {
    /// Generates a key for the target secret `target` under `sk`.
    pub(crate) fn new<R: Rng + CryptoRng>(
        ctx: &Context,
        sk: &SecretKey,
        target: &Poly,
        rng: &mut R,
    ) -> Self {
        let log_pq = 2 * ctx.log_q();
        let pq: BigInt = ctx.modulus(log_pq);
        let n = ctx.n();

        let ax = sample::uniform2(rng, n, log_pq);
        let ex = sample::gauss(rng, n, ctx.params().sigma);

        // bx = e − a·s + P·s' (mod P·Q)
        let mut bx = ax.mul_mod(&sk.sx, &pq).neg_mod(&pq);
        bx.add_assign_mod(&ex, &pq);
        bx.add_assign_mod(&target.shl(ctx.log_q()), &pq);

        Self { ax, bx }
    }

    /// A key whose target secret is the zero polynomial: a public
    /// encryption of zero, used by the encryption routine.
    pub(crate) fn encrypt_zero<R: Rng + CryptoRng>(
        ctx: &Context,
        sk: &SecretKey,
        rng: &mut R,
    ) -> Self {
        Self::new(ctx, sk, &Poly::zero(ctx.n()), rng)
    }
}
