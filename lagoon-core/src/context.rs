//! Process-lifetime constants derived from the parameters.
//!
//! A [`Context`] is built once and shared by reference; nothing in it is
//! ever mutated afterwards.

use std::collections::HashMap;

use num_bigint::BigInt;
use num_traits::One;

use crate::params::Params;
use crate::primitives::bigfix;

/// Extra fractional bits carried while chaining root-of-unity powers.
const ROOT_CHAIN_GUARD: usize = 24;

/// Precomputed tables: root powers, the power-of-five rotation group, and
/// the canonical-embedding output permutations.
pub struct Context {
    params: Params,
    n: usize,
    nh: usize,
    m: usize,
    log_nh: usize,
    q: BigInt,
    pi: BigInt,
    prec: usize,
    /// (cos, sin)(2πk/M) for k in [0, M), scaled to `prec` fractional bits.
    ksi: Vec<(BigInt, BigInt)>,
    /// rot_group[j] = 5^j mod M for j in [0, N/2).
    rot_group: Vec<usize>,
    /// Per slot-count output ordering of the special FFT.
    special_perms: HashMap<usize, Vec<usize>>,
}

impl Context {
    pub fn new(params: Params) -> Self {
        let n = params.n();
        let m = params.m();
        let nh = n / 2;
        let log_nh = params.log_n - 1;
        let q = BigInt::one() << params.log_q;

        // Root tables need roughly logq + log₂N fractional bits for the
        // encode/decode error to stay negligible; keep a healthy margin.
        let prec = params.log_q + 2 * params.log_n + 20;

        let mut rot_group = Vec::with_capacity(nh);
        let mut five = 1usize;
        for _ in 0..nh {
            rot_group.push(five);
            five = (five * 5) % m;
        }

        let work = prec + ROOT_CHAIN_GUARD;
        let pi_work = bigfix::pi(work);
        // 2π/M = π/N at `work` fractional bits; M is a power of two so the
        // division is an exact shift.
        let theta = bigfix::shr_round(&pi_work, params.log_n);
        let (cos1, sin1) = bigfix::cos_sin(&theta, work);

        let mut ksi = Vec::with_capacity(m);
        let mut cur = (BigInt::one() << work, BigInt::from(0));
        for _ in 0..m {
            ksi.push((
                bigfix::shr_round(&cur.0, ROOT_CHAIN_GUARD),
                bigfix::shr_round(&cur.1, ROOT_CHAIN_GUARD),
            ));
            cur = (
                bigfix::shr_round(&(&cur.0 * &cos1 - &cur.1 * &sin1), work),
                bigfix::shr_round(&(&cur.0 * &sin1 + &cur.1 * &cos1), work),
            );
        }

        // The special FFT emits slots in the order of the power-of-five
        // group walk; precompute the ordering for every slot count.
        let mut special_perms = HashMap::new();
        for log_slots in 0..=log_nh {
            let slots = 1usize << log_slots;
            let quad = 4 * slots;
            let perm = (0..slots)
                .map(|j| (rot_group[j] % quad - 1) / 4)
                .collect();
            special_perms.insert(slots, perm);
        }

        let pi = bigfix::shr_round(&pi_work, ROOT_CHAIN_GUARD);

        Self {
            params,
            n,
            nh,
            m,
            log_nh,
            q,
            pi,
            prec,
            ksi,
            rot_group,
            special_perms,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Ring degree N.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of slots in the full canonical embedding, N/2.
    pub fn nh(&self) -> usize {
        self.nh
    }

    /// Order of the root-of-unity group, M = 2N.
    pub fn m(&self) -> usize {
        self.m
    }

    pub fn log_n(&self) -> usize {
        self.params.log_n
    }

    /// log₂(N/2).
    pub fn log_nh(&self) -> usize {
        self.log_nh
    }

    /// Bit length of the highest ciphertext modulus Q.
    pub fn log_q(&self) -> usize {
        self.params.log_q
    }

    /// The highest ciphertext modulus Q = 2^logq. The key-switching lift
    /// modulus P equals Q, so keys live mod P·Q = 2^{2·logq}.
    pub fn q(&self) -> &BigInt {
        &self.q
    }

    /// 2^cbits as a big integer.
    pub fn modulus(&self, cbits: usize) -> BigInt {
        BigInt::one() << cbits
    }

    /// Fractional bits of the root tables.
    pub fn prec(&self) -> usize {
        self.prec
    }

    /// π scaled to [`Self::prec`] fractional bits.
    pub fn pi(&self) -> &BigInt {
        &self.pi
    }

    /// (cos, sin)(2πk/M) at [`Self::prec`] fractional bits.
    pub fn root(&self, k: usize) -> (&BigInt, &BigInt) {
        let (c, s) = &self.ksi[k % self.m];
        (c, s)
    }

    /// 5^j mod M.
    pub fn rot_group(&self) -> &[usize] {
        &self.rot_group
    }

    /// Output ordering of the special FFT for the given slot count.
    pub fn special_perm(&self, slots: usize) -> &[usize] {
        &self.special_perms[&slots]
    }
}
