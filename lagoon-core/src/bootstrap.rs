//! Bootstrapping: modulus raise, CoeffToSlot, remove-I-part, SlotToCoeff.
//!
//! After the modulus raise a ciphertext decrypts to `m + q0·I` for a small
//! integer polynomial I. CoeffToSlot moves the raw coefficients into the
//! slots, the sine approximation reduces the `q0·I` component to about one
//! ulp slot-wise, and SlotToCoeff moves the cleaned values back into the
//! coefficients, leaving a fresh encryption of (approximately) m at a high
//! modulus.
//!
//! Both linear transforms are diagonal sums `Σ_d diag_d ⊙ rot_d(c)`. For a
//! ciphertext with n < N/2 slots the transform runs over the 2n-slot view,
//! whose 2n real outputs hold the first and second coefficient halves; the
//! conjugate add makes them real so the sine can act slot-wise. The
//! full-slot case extracts the real and imaginary coefficient halves with
//! two conjugate-paired transforms and recombines them with an exact
//! X^{N/2} monomial multiply.

use num_bigint::BigInt;
use num_traits::One;
use tracing::debug;

use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::pool;
use crate::primitives::bigfix::{div_round, shr_round};
use crate::primitives::{cint::CInt, poly::Poly};
use crate::scheme::Scheme;

/// Precomputed constants for bootstrapping ciphertexts with a fixed slot
/// count.
pub struct BootContext {
    log_slots: usize,
    /// Boot precision: logq0 + logI.
    log_p: usize,
    /// Transform dimension: 2n below full packing, N/2 at full packing.
    size: usize,
    /// CoeffToSlot diagonals (real-part extraction).
    c2s: Vec<Poly>,
    /// Imaginary-part extraction diagonals; full packing only.
    c2s_im: Option<Vec<Poly>>,
    /// SlotToCoeff diagonals.
    s2c: Vec<Poly>,
    /// Rescale amount after CoeffToSlot (constants are scaled up to unit
    /// magnitude, and the conjugate add doubles the values).
    c2s_rescale: usize,
    /// Rescale amount after SlotToCoeff.
    s2c_rescale: usize,
}

impl BootContext {
    /// Builds the transform constants for ciphertexts with 2^log_slots
    /// slots, encoded at scale 2^log_p.
    pub fn new(ctx: &Context, log_slots: usize, log_p: usize) -> Result<Self> {
        if log_slots > ctx.log_nh() {
            return Err(Error::InvalidParams(format!(
                "log_slots must be at most {}, got {log_slots}",
                ctx.log_nh()
            )));
        }
        if log_p == 0 || log_p >= ctx.log_q() {
            return Err(Error::InvalidParams(format!(
                "bootstrap precision must be in [1, {}), got {log_p}",
                ctx.log_q()
            )));
        }
        if log_slots < ctx.log_nh() {
            Self::new_sparse(ctx, log_slots, log_p)
        } else {
            Self::new_full(ctx, log_p)
        }
    }

    /// Sparse packing: one conjugate-paired transform over the 2n-slot
    /// view. With constants scaled up by 4n the pipeline rescale is
    /// log_p + log_slots + 2.
    fn new_sparse(ctx: &Context, log_slots: usize, log_p: usize) -> Result<Self> {
        let n = 1usize << log_slots;
        let size = 2 * n;
        let group = 8 * n;
        let stride = ctx.m() / group;
        let encoder = Encoder::new(ctx);
        let rot_group = ctx.rot_group();

        let mut c2s = Vec::with_capacity(size);
        let mut s2c = Vec::with_capacity(size);
        for d in 0..size {
            let mut c2s_diag = Vec::with_capacity(size);
            let mut s2c_diag = Vec::with_capacity(size);
            for j in 0..size {
                let t = (j + d) % size;

                // CoeffToSlot row j, column t: ζ'^{−2j·5^t} for the real
                // rows, −i times that for the imaginary rows.
                let jj = if j < n { j } else { j - n };
                let e = (group - (2 * jj * (rot_group[t] % group)) % group) % group;
                let root = root_cint(ctx, e * stride, log_p);
                c2s_diag.push(if j < n { root } else { neg_i_times(&root) });

                // SlotToCoeff row j, column t: ζ'^{2t·5^j} for the first
                // half, i times the matching root for the second.
                let tt = if t < n { t } else { t - n };
                let e = (2 * tt * (rot_group[j] % group)) % group;
                let root = root_cint(ctx, e * stride, log_p);
                s2c_diag.push(if t < n { root } else { i_times(&root) });
            }
            c2s.push(encoder.encode(&c2s_diag, size, ctx.log_q())?.mx);
            s2c.push(encoder.encode(&s2c_diag, size, ctx.log_q())?.mx);
        }

        Ok(Self {
            log_slots,
            log_p,
            size,
            c2s,
            c2s_im: None,
            s2c,
            c2s_rescale: log_p + log_slots + 2,
            s2c_rescale: log_p,
        })
    }

    /// Full packing: the coefficient pairs live directly on the N/2-slot
    /// embedding, so two transforms extract the real and imaginary
    /// halves. With constants scaled up by 2·(N/2) the pipeline rescale
    /// is log_p + log_slots + 1.
    fn new_full(ctx: &Context, log_p: usize) -> Result<Self> {
        let nh = ctx.nh();
        let m = ctx.m();
        let encoder = Encoder::new(ctx);
        let rot_group = ctx.rot_group();

        let mut c2s = Vec::with_capacity(nh);
        let mut c2s_im = Vec::with_capacity(nh);
        let mut s2c = Vec::with_capacity(nh);
        for d in 0..nh {
            let mut re_diag = Vec::with_capacity(nh);
            let mut im_diag = Vec::with_capacity(nh);
            let mut s2c_diag = Vec::with_capacity(nh);
            for j in 0..nh {
                let t = (j + d) % nh;

                // ω^{−j·5^t} extracts coefficients 0..N/2; −i·ω^{−j·5^t}
                // extracts the upper half.
                let e = (m - (j * rot_group[t]) % m) % m;
                let root = root_cint(ctx, e, log_p);
                im_diag.push(neg_i_times(&root));
                re_diag.push(root);

                // SlotToCoeff is the plain embedding matrix ω^{t·5^j}.
                let e = (t * rot_group[j]) % m;
                s2c_diag.push(root_cint(ctx, e, log_p));
            }
            c2s.push(encoder.encode(&re_diag, nh, ctx.log_q())?.mx);
            c2s_im.push(encoder.encode(&im_diag, nh, ctx.log_q())?.mx);
            s2c.push(encoder.encode(&s2c_diag, nh, ctx.log_q())?.mx);
        }

        Ok(Self {
            log_slots: ctx.log_nh(),
            log_p,
            size: nh,
            c2s,
            c2s_im: Some(c2s_im),
            s2c,
            c2s_rescale: log_p + ctx.log_nh() + 1,
            s2c_rescale: log_p,
        })
    }

    pub fn log_slots(&self) -> usize {
        self.log_slots
    }

    pub fn log_p(&self) -> usize {
        self.log_p
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn is_full(&self) -> bool {
        self.c2s_im.is_some()
    }
}

/// Root of unity ω_M^k as a complex constant at scale 2^log_p.
fn root_cint(ctx: &Context, k: usize, log_p: usize) -> CInt {
    let (cos, sin) = ctx.root(k);
    let shift = ctx.prec() - log_p;
    CInt::new(shr_round(cos, shift), shr_round(sin, shift))
}

fn i_times(z: &CInt) -> CInt {
    CInt::new(-&z.i, z.r.clone())
}

fn neg_i_times(z: &CInt) -> CInt {
    CInt::new(z.i.clone(), -&z.r)
}

fn factorial(k: usize) -> BigInt {
    let mut f = BigInt::one();
    for i in 2..=k {
        f *= BigInt::from(i);
    }
    f
}

/// Smallest Taylor degree whose truncation error at |θ| ≤ 2π/2^log_t
/// stays below 2^{−(logq0 − 3)}, so that the error surviving the
/// squaring ladder is dominated by the sine approximation itself.
fn exp_taylor_degree(log_q0: usize, log_t: usize) -> usize {
    let x = 2.0 * std::f64::consts::PI / (1u64 << log_t) as f64;
    let target = 2f64.powi(-(log_q0 as i32) + 3);
    let mut bound = x;
    let mut degree = 0usize;
    while bound > target && degree < 48 {
        degree += 1;
        bound *= x / (degree + 1) as f64;
    }
    degree.max(3)
}

impl Scheme<'_> {
    /// `Σ_d diag_d ⊙ rot_d(c)`, rotating by one slot per step so each
    /// diagonal costs a single key switch.
    fn apply_diagonals(&self, c: &Ciphertext, diags: &[Poly]) -> Result<Ciphertext> {
        let mut acc = self.mult_by_poly(c, &diags[0]);
        let mut cur = c.clone();
        for diag in &diags[1..] {
            cur = self.left_rotate_by_po2(&cur, 0)?;
            let term = self.mult_by_poly(&cur, diag);
            self.add_inplace(&mut acc, &term)?;
        }
        Ok(acc)
    }

    /// Conjugate-paired diagonal transform: `L(c) + conj(L(c))`, then the
    /// scale-up rescale. The output slots are real.
    fn extract_real(&self, c: &Ciphertext, diags: &[Poly], rescale: usize) -> Result<Ciphertext> {
        let mut out = self.apply_diagonals(c, diags)?;
        let conj = self.conjugate(&out)?;
        self.add_inplace(&mut out, &conj)?;
        self.rescale_by_inplace(&mut out, rescale)?;
        Ok(out)
    }

    /// Homomorphic CoeffToSlot. Returns the real-half extraction and, at
    /// full packing, the imaginary-half extraction.
    pub fn coeff_to_slot(&self, c: &Ciphertext) -> Result<(Ciphertext, Option<Ciphertext>)> {
        let bc = self.boot_context(c.log_slots())?;
        debug_assert_eq!(bc.log_slots(), c.log_slots());
        if bc.is_full() {
            let im_diags = bc
                .c2s_im
                .as_ref()
                .ok_or(Error::Internal("full boot context without imaginary part"))?;
            let (re, im) = pool::join(
                || self.extract_real(c, &bc.c2s, bc.c2s_rescale),
                || self.extract_real(c, im_diags, bc.c2s_rescale),
            );
            Ok((re?, Some(im?)))
        } else {
            Ok((self.extract_real(c, &bc.c2s, bc.c2s_rescale)?, None))
        }
    }

    /// Homomorphic SlotToCoeff; the inverse of [`Self::coeff_to_slot`].
    pub fn slot_to_coeff(&self, re: &Ciphertext, im: Option<&Ciphertext>) -> Result<Ciphertext> {
        let bc = self.boot_context(re.log_slots())?;
        let mut out = match im {
            None => self.apply_diagonals(re, &bc.s2c)?,
            Some(im) => {
                let (lo, hi) = pool::join(
                    || self.apply_diagonals(re, &bc.s2c),
                    || self.apply_diagonals(im, &bc.s2c),
                );
                // The upper coefficient half lands via the exact X^{N/2}
                // monomial.
                let hi = self.imult(&hi?);
                self.add(&lo?, &hi)?
            }
        };
        self.rescale_by_inplace(&mut out, bc.s2c_rescale)?;
        Ok(out)
    }

    /// The sine approximation. Input slots hold real values
    /// `t = m + q0·k` (integer k, |k| ≤ 2^log_i, |m| ≪ q0) at scale 1;
    /// output slots hold approximately m, again at scale 1.
    ///
    /// Evaluates exp(2πi·t / (2^{log_t + log_i}·q0)) by a Taylor series in
    /// balanced power-basis form, squares log_t + log_i times to reach
    /// exp(2πi·t/q0), and extracts (q0/2π)·sin(2π·t/q0).
    pub fn remove_i_part(
        &self,
        c: &Ciphertext,
        log_q0: usize,
        log_t: usize,
        log_i: usize,
    ) -> Result<Ciphertext> {
        let log_p = log_q0 + log_i;
        if log_p <= log_t {
            return Err(Error::InvalidParams(
                "remove_i_part needs log_q0 + log_i > log_t".into(),
            ));
        }
        let ctx = self.context();
        let prec = ctx.prec();
        if log_p + 1 > prec + log_t {
            return Err(Error::InvalidParams(
                "bootstrap precision exceeds the root-table precision".into(),
            ));
        }

        // θ·2^log_p with θ = 2π·t/(2^{log_t+log_i}·q0): multiply by
        // round(2π·2^{log_p − log_t}) and rescale by log_p.
        let k0 = shr_round(ctx.pi(), prec - 1 - (log_p - log_t));
        let mut y = self.mult_by_const(c, &k0);
        self.rescale_by_inplace(&mut y, log_p)?;
        let z = self.imult(&y);

        let degree = exp_taylor_degree(log_q0, log_t);
        debug!(degree, log_t, log_i, "evaluating exp series");
        let mut e = self.exp_series(&z, log_p, degree)?;

        for _ in 0..(log_t + log_i) {
            e = self.rescale_by(&self.square(&e)?, log_p)?;
        }

        // E − conj(E) = 2i·sin; times −i gives 2·sin, times
        // round(q0/(4π)·2^log_p) and a double rescale gives
        // (q0/2π)·sin(2π·t/q0) back at scale 1.
        let conj = self.conjugate(&e)?;
        let mut s = self.sub(&e, &conj)?;
        s = self.mult_by_monomial(&s, 3 * ctx.nh());
        let k2 = div_round(
            &(BigInt::one() << (log_q0 + log_p - 2 + prec)),
            ctx.pi(),
        );
        let mut out = self.mult_by_const(&s, &k2);
        self.rescale_by_inplace(&mut out, 2 * log_p)?;
        Ok(out)
    }

    /// exp(z) for a ciphertext at scale 2^log_p, by a balanced
    /// power-basis evaluation of the degree-`degree` Taylor prefix.
    fn exp_series(&self, z: &Ciphertext, log_p: usize, degree: usize) -> Result<Ciphertext> {
        let mut pows = vec![z.clone()];
        while (1usize << pows.len()) <= degree {
            let last = pows.last().ok_or(Error::Internal("empty power basis"))?;
            pows.push(self.rescale_by(&self.square(last)?, log_p)?);
        }
        let coeffs: Vec<BigInt> = (0..=degree)
            .map(|k| div_round(&(BigInt::one() << log_p), &factorial(k)))
            .collect();
        self.eval_power_block(&pows, &coeffs, log_p)
    }

    /// Evaluates `Σ_k coeffs[k]·z^k / 2^log_p` given the power basis
    /// pows[i] = z^{2^i}, splitting at the largest power of two below the
    /// block length.
    fn eval_power_block(
        &self,
        pows: &[Ciphertext],
        coeffs: &[BigInt],
        log_p: usize,
    ) -> Result<Ciphertext> {
        let len = coeffs.len();
        debug_assert!(len >= 2);
        if len <= 2 {
            let mut res = self.mult_by_const(&pows[0], &coeffs[1]);
            self.rescale_by_inplace(&mut res, log_p)?;
            return Ok(self.add_const(&res, &coeffs[0]));
        }
        let split = len.next_power_of_two() / 2;
        let power = &pows[split.trailing_zeros() as usize];

        let hi = &coeffs[split..];
        let hi_term = if hi.len() == 1 {
            let mut t = self.mult_by_const(power, &hi[0]);
            self.rescale_by_inplace(&mut t, log_p)?;
            t
        } else {
            let hi_ct = self.eval_power_block(pows, hi, log_p)?;
            let cbits = hi_ct.cbits.min(power.cbits);
            let prod = self.mult(
                &self.mod_down_to(&hi_ct, cbits)?,
                &self.mod_down_to(power, cbits)?,
            )?;
            self.rescale_by(&prod, log_p)?
        };

        let lo_ct = self.eval_power_block(pows, &coeffs[..split], log_p)?;
        let cbits = lo_ct.cbits.min(hi_term.cbits);
        self.add(
            &self.mod_down_to(&lo_ct, cbits)?,
            &self.mod_down_to(&hi_term, cbits)?,
        )
    }

    /// End-to-end refresh: raises the exhausted ciphertext to modulus
    /// 2^log_q and removes the q0·I component. Requires
    /// [`Scheme::add_boot_keys`] for the ciphertext's slot count with
    /// log_p = cbits + log_i.
    pub fn bootstrap_inplace(
        &self,
        c: &mut Ciphertext,
        log_q: usize,
        log_t: usize,
        log_i: usize,
    ) -> Result<()> {
        let log_q0 = c.cbits;
        let log_slots = c.log_slots();
        let bc = self.boot_context(log_slots)?;
        if bc.log_p != log_q0 + log_i {
            return Err(Error::InvalidParams(format!(
                "bootstrap constants were built for log_p {}, need {}",
                bc.log_p,
                log_q0 + log_i
            )));
        }
        if log_q <= log_q0 || log_q > self.context().log_q() {
            return Err(Error::InvalidParams(format!(
                "raise target must be in ({log_q0}, {}], got {log_q}",
                self.context().log_q()
            )));
        }

        debug!(log_q0, log_q, log_slots, "bootstrap: modulus raise");
        self.normalize_inplace(c);
        c.cbits = log_q;
        c.modulus = self.context().modulus(log_q);

        // Fold rotations project onto the gap-sparse subring, scaling the
        // payload by 2^{log(N/2) − log_slots}; the rescale removes it.
        let log_nh = self.context().log_nh();
        for i in log_slots..log_nh {
            let rot = self.left_rotate_by_po2(c, i)?;
            self.add_inplace(c, &rot)?;
        }
        if log_nh > log_slots {
            self.rescale_by_inplace(c, log_nh - log_slots)?;
        }

        debug!("bootstrap: CoeffToSlot");
        let (re, im) = self.coeff_to_slot(c)?;

        debug!("bootstrap: remove I part");
        let (re, im) = match im {
            None => (self.remove_i_part(&re, log_q0, log_t, log_i)?, None),
            Some(im) => {
                let (sr, si) = pool::join(
                    || self.remove_i_part(&re, log_q0, log_t, log_i),
                    || self.remove_i_part(&im, log_q0, log_t, log_i),
                );
                (sr?, Some(si?))
            }
        };

        debug!("bootstrap: SlotToCoeff");
        let mut out = self.slot_to_coeff(&re, im.as_ref())?;
        out.slots = c.slots;
        out.is_complex = c.is_complex;
        *c = out;
        Ok(())
    }
}

#[cfg(test)]
pub mod test;
