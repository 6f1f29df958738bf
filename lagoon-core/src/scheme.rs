//! Encryption, decryption and the homomorphic operations.
//!
//! A [`Scheme`] borrows the immutable [`Context`] and [`SecretKey`] and
//! owns the evaluation-key registry. Every operation validates its
//! operands before touching them, so a returned error implies the inputs
//! were left unchanged. Out-of-place forms allocate the result; the
//! `_inplace` forms overwrite their first operand on success.

use std::collections::HashMap;

use num_bigint::BigInt;
use rand::{CryptoRng, Rng};
use tracing::debug;

use crate::bootstrap::BootContext;
use crate::ciphertext::Ciphertext;
use crate::context::Context;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::key::{EvaluationKey, KeyTag, SecretKey};
use crate::plaintext::Plaintext;
use crate::pool;
use crate::primitives::{cint::CInt, poly::Poly, sample};

pub struct Scheme<'a> {
    context: &'a Context,
    secret_key: &'a SecretKey,
    pub(crate) keys: HashMap<KeyTag, EvaluationKey>,
    pub(crate) boot: HashMap<usize, BootContext>,
}

impl<'a> Scheme<'a> {
    /// Creates a scheme holding the encryption and relinearization keys.
    pub fn new<R: Rng + CryptoRng>(
        secret_key: &'a SecretKey,
        context: &'a Context,
        rng: &mut R,
    ) -> Self {
        let mut keys = HashMap::new();

        debug!(log_n = context.log_n(), log_q = context.log_q(), "generating scheme keys");
        keys.insert(
            KeyTag::Encrypt,
            EvaluationKey::encrypt_zero(context, secret_key, rng),
        );

        let pq = context.modulus(2 * context.log_q());
        let s2 = secret_key.sx.mul_mod(&secret_key.sx, &pq);
        keys.insert(
            KeyTag::Mult,
            EvaluationKey::new(context, secret_key, &s2, rng),
        );

        Self {
            context,
            secret_key,
            keys,
            boot: HashMap::new(),
        }
    }

    pub fn context(&self) -> &Context {
        self.context
    }

    fn encoder(&self) -> Encoder<'_> {
        Encoder::new(self.context)
    }

    // ------------------------------------------------------------------
    // Key generation

    /// Adds the conjugation key σ: X → X^{−1}.
    pub fn add_conj_key<R: Rng + CryptoRng>(&mut self, rng: &mut R) {
        let target = self.secret_key.sx.automorph(self.context.m() - 1);
        let key = EvaluationKey::new(self.context, self.secret_key, &target, rng);
        self.keys.insert(KeyTag::Conj, key);
    }

    /// Adds a left-rotation key for every power-of-two slot amount.
    pub fn add_left_rot_keys<R: Rng + CryptoRng>(&mut self, rng: &mut R) {
        debug!("generating left-rotation keys");
        for i in 0..self.context.log_nh() {
            let rot = 1usize << i;
            if self.keys.contains_key(&KeyTag::LeftRot(rot)) {
                continue;
            }
            let power = self.context.rot_group()[rot];
            let target = self.secret_key.sx.automorph(power);
            let key = EvaluationKey::new(self.context, self.secret_key, &target, rng);
            self.keys.insert(KeyTag::LeftRot(rot), key);
        }
    }

    /// Adds a right-rotation key for every power-of-two slot amount.
    pub fn add_right_rot_keys<R: Rng + CryptoRng>(&mut self, rng: &mut R) {
        debug!("generating right-rotation keys");
        let nh = self.context.nh();
        for i in 0..self.context.log_nh() {
            let rot = 1usize << i;
            if self.keys.contains_key(&KeyTag::RightRot(rot)) {
                continue;
            }
            let power = self.context.rot_group()[nh - rot];
            let target = self.secret_key.sx.automorph(power);
            let key = EvaluationKey::new(self.context, self.secret_key, &target, rng);
            self.keys.insert(KeyTag::RightRot(rot), key);
        }
    }

    /// Generates everything bootstrapping needs for ciphertexts with
    /// 2^log_slots slots: the conjugation key, all power-of-two rotation
    /// keys, and the CoeffToSlot / SlotToCoeff constants at scale
    /// 2^log_p (log_p = logq0 + logI).
    pub fn add_boot_keys<R: Rng + CryptoRng>(
        &mut self,
        rng: &mut R,
        log_slots: usize,
        log_p: usize,
    ) -> Result<()> {
        debug!(log_slots, log_p, "generating bootstrap key material");
        let bc = BootContext::new(self.context, log_slots, log_p)?;
        if !self.keys.contains_key(&KeyTag::Conj) {
            self.add_conj_key(rng);
        }
        self.add_left_rot_keys(rng);
        self.boot.insert(log_slots, bc);
        Ok(())
    }

    pub(crate) fn boot_context(&self, log_slots: usize) -> Result<&BootContext> {
        self.boot
            .get(&log_slots)
            .ok_or(Error::MissingKey(KeyTag::Boot(log_slots)))
    }

    // ------------------------------------------------------------------
    // Encryption and decryption

    /// Encodes and encrypts a slot vector at modulus 2^cbits.
    pub fn encrypt<R: Rng + CryptoRng>(
        &self,
        rng: &mut R,
        vals: &[CInt],
        slots: usize,
        cbits: usize,
    ) -> Result<Ciphertext> {
        let plain = self.encoder().encode(vals, slots, cbits)?;
        self.encrypt_msg(rng, &plain)
    }

    /// Encrypts an already-encoded plaintext under the embedded public
    /// encryption of zero.
    pub fn encrypt_msg<R: Rng + CryptoRng>(
        &self,
        rng: &mut R,
        plain: &Plaintext,
    ) -> Result<Ciphertext> {
        let key = self
            .keys
            .get(&KeyTag::Encrypt)
            .ok_or(Error::MissingKey(KeyTag::Encrypt))?;

        let n = self.context.n();
        let log_p = self.context.log_q();
        let pq = self.context.modulus(log_p + plain.cbits);
        let sigma = self.context.params().sigma;

        let vx = sample::zo(rng, n);
        let e0 = sample::gauss(rng, n, sigma);
        let e1 = sample::gauss(rng, n, sigma);

        let (ra, rb) = pool::join(
            || vx.mul_mod(&key.ax, &pq),
            || vx.mul_mod(&key.bx, &pq),
        );

        let q = &plain.modulus;
        let ax = ra.rshift_round(log_p).add_mod(&e1, q);
        let bx = rb
            .rshift_round(log_p)
            .add_mod(&e0, q)
            .add_mod(&plain.mx, q);

        Ok(Ciphertext {
            ax,
            bx,
            modulus: q.clone(),
            cbits: plain.cbits,
            slots: plain.slots,
            is_complex: plain.is_complex,
        })
    }

    /// Raw decryption: returns the plaintext polynomial without decoding.
    pub fn decrypt_msg(&self, sk: &SecretKey, c: &Ciphertext) -> Plaintext {
        let mx = c
            .bx
            .add_mod(&c.ax.mul_mod(&sk.sx, &c.modulus), &c.modulus);
        Plaintext {
            mx,
            modulus: c.modulus.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        }
    }

    /// Decrypts and decodes back to slot values.
    pub fn decrypt(&self, sk: &SecretKey, c: &Ciphertext) -> Result<Vec<CInt>> {
        let plain = self.decrypt_msg(sk, c);
        self.encoder().decode(&plain)
    }

    // ------------------------------------------------------------------
    // Linear operations

    fn check_pair(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<()> {
        if c1.cbits != c2.cbits || c1.modulus != c2.modulus {
            return Err(Error::LevelMismatch {
                left: c1.cbits,
                right: c2.cbits,
            });
        }
        Ok(())
    }

    pub fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        self.check_pair(c1, c2)?;
        let q = &c1.modulus;
        Ok(Ciphertext {
            ax: c1.ax.add_mod(&c2.ax, q),
            bx: c1.bx.add_mod(&c2.bx, q),
            modulus: q.clone(),
            cbits: c1.cbits,
            slots: c1.slots,
            is_complex: c1.is_complex || c2.is_complex,
        })
    }

    pub fn add_inplace(&self, c1: &mut Ciphertext, c2: &Ciphertext) -> Result<()> {
        *c1 = self.add(c1, c2)?;
        Ok(())
    }

    pub fn sub(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        self.check_pair(c1, c2)?;
        let q = &c1.modulus;
        Ok(Ciphertext {
            ax: c1.ax.sub_mod(&c2.ax, q),
            bx: c1.bx.sub_mod(&c2.bx, q),
            modulus: q.clone(),
            cbits: c1.cbits,
            slots: c1.slots,
            is_complex: c1.is_complex || c2.is_complex,
        })
    }

    pub fn sub_inplace(&self, c1: &mut Ciphertext, c2: &Ciphertext) -> Result<()> {
        *c1 = self.sub(c1, c2)?;
        Ok(())
    }

    pub fn neg(&self, c: &Ciphertext) -> Ciphertext {
        let q = &c.modulus;
        Ciphertext {
            ax: c.ax.neg_mod(q),
            bx: c.bx.neg_mod(q),
            modulus: q.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        }
    }

    /// Adds a scaled constant to every slot (the constant lands on the
    /// free coefficient of bx).
    pub fn add_const(&self, c: &Ciphertext, cnst: &BigInt) -> Ciphertext {
        let mut out = c.clone();
        out.bx[0] += cnst;
        out.bx.reduce_mod(&out.modulus);
        out
    }

    /// Multiplies every slot by a scaled integer constant. The scale
    /// grows by the constant's scale; follow with a rescale.
    pub fn mult_by_const(&self, c: &Ciphertext, cnst: &BigInt) -> Ciphertext {
        let q = &c.modulus;
        Ciphertext {
            ax: c.ax.scalar_mul_mod(cnst, q),
            bx: c.bx.scalar_mul_mod(cnst, q),
            modulus: q.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        }
    }

    /// Multiplies every slot by a scaled complex constant:
    /// `re·c + im·(i·c)`, with the i realized by the exact X^{N/2}
    /// monomial.
    pub fn mult_by_cint_const(&self, c: &Ciphertext, cnst: &CInt) -> Ciphertext {
        let q = &c.modulus;
        let nh = self.context.nh();
        let mix = |p: &Poly| -> Poly {
            let mut out = p.scalar_mul_mod(&cnst.r, q);
            out.add_assign_mod(&p.mul_monomial(nh).scalar_mul_mod(&cnst.i, q), q);
            out
        };
        Ciphertext {
            ax: mix(&c.ax),
            bx: mix(&c.bx),
            modulus: q.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: true,
        }
    }

    /// Multiplies by a plaintext polynomial (no relinearization needed).
    pub fn mult_by_poly(&self, c: &Ciphertext, p: &Poly) -> Ciphertext {
        let q = &c.modulus;
        let (ax, bx) = pool::join(|| c.ax.mul_mod(p, q), || c.bx.mul_mod(p, q));
        Ciphertext {
            ax,
            bx,
            modulus: q.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        }
    }

    /// Multiplies by the monomial X^degree; exact, no key and no noise.
    pub fn mult_by_monomial(&self, c: &Ciphertext, degree: usize) -> Ciphertext {
        let q = &c.modulus;
        let mut ax = c.ax.mul_monomial(degree);
        let mut bx = c.bx.mul_monomial(degree);
        ax.reduce_mod(q);
        bx.reduce_mod(q);
        Ciphertext {
            ax,
            bx,
            modulus: q.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        }
    }

    /// Multiplies every slot by i. Equals multiplication by X^{N/2}, so
    /// it is exact and needs no rescale.
    pub fn imult(&self, c: &Ciphertext) -> Ciphertext {
        self.mult_by_monomial(c, self.context.nh())
    }

    // ------------------------------------------------------------------
    // Multiplication and key switching

    /// Rewrites `d·s'` as a pair under `s` using the tagged key:
    /// `(ax, bx) = ⌊d·ek / P⌉ (mod 2^cbits)`.
    pub(crate) fn key_switch(
        &self,
        d: &Poly,
        cbits: usize,
        tag: KeyTag,
    ) -> Result<(Poly, Poly)> {
        let key = self.keys.get(&tag).ok_or(Error::MissingKey(tag))?;
        let log_p = self.context.log_q();
        let pq = self.context.modulus(log_p + cbits);
        let (ra, rb) = pool::join(|| d.mul_mod(&key.ax, &pq), || d.mul_mod(&key.bx, &pq));
        let q = self.context.modulus(cbits);
        let mut ax = ra.rshift_round(log_p);
        let mut bx = rb.rshift_round(log_p);
        ax.reduce_mod(&q);
        bx.reduce_mod(&q);
        Ok((ax, bx))
    }

    /// Homomorphic product with immediate relinearization. The slot scale
    /// doubles; a rescale should follow.
    pub fn mult(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        self.check_pair(c1, c2)?;
        if !self.keys.contains_key(&KeyTag::Mult) {
            return Err(Error::MissingKey(KeyTag::Mult));
        }
        let q = &c1.modulus;

        let ((d0, d2), (a1b2, a2b1)) = pool::join(
            || {
                pool::join(
                    || c1.bx.mul_mod(&c2.bx, q),
                    || c1.ax.mul_mod(&c2.ax, q),
                )
            },
            || {
                pool::join(
                    || c1.ax.mul_mod(&c2.bx, q),
                    || c2.ax.mul_mod(&c1.bx, q),
                )
            },
        );
        let d1 = a1b2.add_mod(&a2b1, q);

        let (ea, eb) = self.key_switch(&d2, c1.cbits, KeyTag::Mult)?;
        Ok(Ciphertext {
            ax: d1.add_mod(&ea, q),
            bx: d0.add_mod(&eb, q),
            modulus: q.clone(),
            cbits: c1.cbits,
            slots: c1.slots,
            is_complex: c1.is_complex || c2.is_complex,
        })
    }

    pub fn mult_inplace(&self, c1: &mut Ciphertext, c2: &Ciphertext) -> Result<()> {
        *c1 = self.mult(c1, c2)?;
        Ok(())
    }

    /// Homomorphic square; saves one ring product over `mult`.
    pub fn square(&self, c: &Ciphertext) -> Result<Ciphertext> {
        if !self.keys.contains_key(&KeyTag::Mult) {
            return Err(Error::MissingKey(KeyTag::Mult));
        }
        let q = &c.modulus;
        let ((d0, d2), ab) = pool::join(
            || {
                pool::join(
                    || c.bx.mul_mod(&c.bx, q),
                    || c.ax.mul_mod(&c.ax, q),
                )
            },
            || c.ax.mul_mod(&c.bx, q),
        );
        let d1 = ab.add_mod(&ab, q);

        let (ea, eb) = self.key_switch(&d2, c.cbits, KeyTag::Mult)?;
        Ok(Ciphertext {
            ax: d1.add_mod(&ea, q),
            bx: d0.add_mod(&eb, q),
            modulus: q.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        })
    }

    // ------------------------------------------------------------------
    // Rescaling and modulus management

    /// Divides by 2^dlogq with rounding; lowers both the scale and the
    /// modulus budget by dlogq bits.
    pub fn rescale_by(&self, c: &Ciphertext, dlogq: usize) -> Result<Ciphertext> {
        if dlogq >= c.cbits {
            return Err(Error::BudgetExhausted {
                cbits: c.cbits,
                needed: dlogq + 1,
            });
        }
        let cbits = c.cbits - dlogq;
        let modulus = self.context.modulus(cbits);
        let mut ax = c.ax.rshift_round(dlogq);
        let mut bx = c.bx.rshift_round(dlogq);
        ax.reduce_mod(&modulus);
        bx.reduce_mod(&modulus);
        Ok(Ciphertext {
            ax,
            bx,
            modulus,
            cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        })
    }

    pub fn rescale_by_inplace(&self, c: &mut Ciphertext, dlogq: usize) -> Result<()> {
        *c = self.rescale_by(c, dlogq)?;
        Ok(())
    }

    /// Rescales down to an absolute level.
    pub fn rescale_to(&self, c: &Ciphertext, cbits: usize) -> Result<Ciphertext> {
        if cbits > c.cbits {
            return Err(Error::BudgetExhausted {
                cbits: c.cbits,
                needed: cbits,
            });
        }
        self.rescale_by(c, c.cbits - cbits)
    }

    /// Reduces the modulus without scaling the payload.
    pub fn mod_down_by(&self, c: &Ciphertext, dlogq: usize) -> Result<Ciphertext> {
        if dlogq >= c.cbits {
            return Err(Error::BudgetExhausted {
                cbits: c.cbits,
                needed: dlogq + 1,
            });
        }
        self.mod_down_to(c, c.cbits - dlogq)
    }

    pub fn mod_down_by_inplace(&self, c: &mut Ciphertext, dlogq: usize) -> Result<()> {
        *c = self.mod_down_by(c, dlogq)?;
        Ok(())
    }

    /// Reduces the modulus to an absolute level without scaling.
    pub fn mod_down_to(&self, c: &Ciphertext, cbits: usize) -> Result<Ciphertext> {
        if cbits == 0 || cbits > c.cbits {
            return Err(Error::BudgetExhausted {
                cbits: c.cbits,
                needed: cbits.max(1),
            });
        }
        let modulus = self.context.modulus(cbits);
        let mut ax = c.ax.clone();
        let mut bx = c.bx.clone();
        ax.reduce_mod(&modulus);
        bx.reduce_mod(&modulus);
        Ok(Ciphertext {
            ax,
            bx,
            modulus,
            cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        })
    }

    /// Recenters both polynomials mod the current modulus. Called before a
    /// modulus raise so that the reinterpreted coefficients stay small.
    pub fn normalize_inplace(&self, c: &mut Ciphertext) {
        c.ax.reduce_mod(&c.modulus);
        c.bx.reduce_mod(&c.modulus);
    }

    // ------------------------------------------------------------------
    // Rotations and conjugation

    /// Applies σ_{5^rot} to both components and switches back under s
    /// with the tagged key.
    fn rotate_by_tag(&self, c: &Ciphertext, rot: usize, tag: KeyTag) -> Result<Ciphertext> {
        if rot == 0 || rot >= self.context.nh() {
            return Err(Error::InvalidParams(format!(
                "rotation amount must be in [1, {}), got {rot}",
                self.context.nh()
            )));
        }
        if !self.keys.contains_key(&tag) {
            return Err(Error::MissingKey(tag));
        }
        let power = self.context.rot_group()[rot];
        let q = &c.modulus;
        let mut ax = c.ax.automorph(power);
        let mut bx = c.bx.automorph(power);
        ax.reduce_mod(q);
        bx.reduce_mod(q);
        let (na, nb) = self.key_switch(&ax, c.cbits, tag)?;
        Ok(Ciphertext {
            ax: na,
            bx: bx.add_mod(&nb, q),
            modulus: q.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        })
    }

    /// Rotates slots left by 2^log_rot.
    pub fn left_rotate_by_po2(&self, c: &Ciphertext, log_rot: usize) -> Result<Ciphertext> {
        let rot = 1usize << log_rot;
        self.rotate_by_tag(c, rot, KeyTag::LeftRot(rot))
    }

    /// Rotates slots right by 2^log_rot.
    pub fn right_rotate_by_po2(&self, c: &Ciphertext, log_rot: usize) -> Result<Ciphertext> {
        let rot = 1usize << log_rot;
        self.rotate_by_tag(c, self.context.nh() - rot, KeyTag::RightRot(rot))
    }

    /// Composite left rotation, decomposed over the nonzero bits of the
    /// amount.
    pub fn left_rotate(&self, c: &Ciphertext, rot: usize) -> Result<Ciphertext> {
        let mut remaining = rot % self.context.nh();
        let mut out = c.clone();
        let mut bit = 0;
        while remaining != 0 {
            if remaining & 1 == 1 {
                out = self.left_rotate_by_po2(&out, bit)?;
            }
            remaining >>= 1;
            bit += 1;
        }
        Ok(out)
    }

    pub fn left_rotate_inplace(&self, c: &mut Ciphertext, rot: usize) -> Result<()> {
        *c = self.left_rotate(c, rot)?;
        Ok(())
    }

    /// Composite right rotation.
    pub fn right_rotate(&self, c: &Ciphertext, rot: usize) -> Result<Ciphertext> {
        let mut remaining = rot % self.context.nh();
        let mut out = c.clone();
        let mut bit = 0;
        while remaining != 0 {
            if remaining & 1 == 1 {
                out = self.right_rotate_by_po2(&out, bit)?;
            }
            remaining >>= 1;
            bit += 1;
        }
        Ok(out)
    }

    pub fn right_rotate_inplace(&self, c: &mut Ciphertext, rot: usize) -> Result<()> {
        *c = self.right_rotate(c, rot)?;
        Ok(())
    }

    /// Complex conjugation of every slot: σ: X → X^{−1} plus a key
    /// switch with the conjugation key.
    pub fn conjugate(&self, c: &Ciphertext) -> Result<Ciphertext> {
        if !self.keys.contains_key(&KeyTag::Conj) {
            return Err(Error::MissingKey(KeyTag::Conj));
        }
        let power = self.context.m() - 1;
        let q = &c.modulus;
        let mut ax = c.ax.automorph(power);
        let mut bx = c.bx.automorph(power);
        ax.reduce_mod(q);
        bx.reduce_mod(q);
        let (na, nb) = self.key_switch(&ax, c.cbits, KeyTag::Conj)?;
        Ok(Ciphertext {
            ax: na,
            bx: bx.add_mod(&nb, q),
            modulus: q.clone(),
            cbits: c.cbits,
            slots: c.slots,
            is_complex: c.is_complex,
        })
    }
}
