//! Higher-level algorithms composed from scheme operations.

use num_bigint::BigInt;
use rayon::prelude::*;

use crate::ciphertext::Ciphertext;
use crate::error::{Error, Result};
use crate::pool;
use crate::primitives::cint::CInt;
use crate::primitives::bigfix::shr_round;
use crate::scheme::Scheme;

/// Built-in Taylor series, tabulated to degree 10.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Func {
    /// e^x around 0.
    Exponent,
    /// ln(1 + x) around 0.
    Logarithm,
    /// 1/(1 + e^{−x}) around 0.
    Sigmoid,
}

const EXPONENT_COEFFS: [f64; 11] = [
    1.0,
    1.0,
    0.5,
    0.16666666666666666,
    0.041666666666666664,
    0.008333333333333333,
    0.001388888888888889,
    0.0001984126984126984,
    0.0000248015873015873,
    0.0000027557319223985893,
    0.00000027557319223985893,
];

const LOGARITHM_COEFFS: [f64; 11] = [
    0.0,
    1.0,
    -0.5,
    0.3333333333333333,
    -0.25,
    0.2,
    -0.16666666666666666,
    0.14285714285714285,
    -0.125,
    0.1111111111111111,
    -0.1,
];

const SIGMOID_COEFFS: [f64; 11] = [
    0.5,
    0.25,
    0.0,
    -0.020833333333333332,
    0.0,
    0.0020833333333333333,
    0.0,
    -0.00021081349206349206,
    0.0,
    0.000021356922398589065,
    0.0,
];

impl Func {
    pub fn coeffs(&self) -> &'static [f64] {
        match self {
            Func::Exponent => &EXPONENT_COEFFS,
            Func::Logarithm => &LOGARITHM_COEFFS,
            Func::Sigmoid => &SIGMOID_COEFFS,
        }
    }
}

/// Encodes a float coefficient at scale 2^log_p.
fn scaled_coeff(a: f64, log_p: usize) -> BigInt {
    debug_assert!(log_p < 62);
    BigInt::from((a * (1u64 << log_p) as f64).round() as i64)
}

/// A thin view over [`Scheme`] exposing composed algorithms.
pub struct SchemeAlgo<'s, 'k> {
    scheme: &'s Scheme<'k>,
}

impl<'s, 'k> SchemeAlgo<'s, 'k> {
    pub fn new(scheme: &'s Scheme<'k>) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &Scheme<'k> {
        self.scheme
    }

    /// c^{2^log_degree} by square-and-rescale.
    pub fn power_of2(
        &self,
        c: &Ciphertext,
        log_p: usize,
        log_degree: usize,
    ) -> Result<Ciphertext> {
        let mut res = c.clone();
        for _ in 0..log_degree {
            res = self.scheme.rescale_by(&self.scheme.square(&res)?, log_p)?;
        }
        Ok(res)
    }

    /// The power basis c, c², …, c^degree, each at scale 2^log_p with
    /// levels aligned pairwise during construction.
    pub fn power_extended(
        &self,
        c: &Ciphertext,
        log_p: usize,
        degree: usize,
    ) -> Result<Vec<Ciphertext>> {
        if degree == 0 {
            return Err(Error::InvalidParams("power degree must be positive".into()));
        }
        let mut pows: Vec<Ciphertext> = Vec::with_capacity(degree);
        pows.push(c.clone());
        for k in 2..=degree {
            let next = if k % 2 == 0 {
                let half = &pows[k / 2 - 1];
                self.scheme.rescale_by(&self.scheme.square(half)?, log_p)?
            } else {
                let prev = &pows[k - 2];
                let base = self.scheme.mod_down_to(c, prev.cbits)?;
                self.scheme.rescale_by(&self.scheme.mult(prev, &base)?, log_p)?
            };
            pows.push(next);
        }
        Ok(pows)
    }

    /// c^degree via the binary decomposition of the exponent.
    pub fn power(&self, c: &Ciphertext, log_p: usize, degree: usize) -> Result<Ciphertext> {
        let mut pows = self.power_extended(c, log_p, degree)?;
        pows.pop()
            .ok_or(Error::Internal("power basis cannot be empty"))
    }

    /// Product of all inputs by a parallel logarithmic tree, rescaling at
    /// every level.
    pub fn prod(&self, cvec: &[Ciphertext], log_p: usize) -> Result<Ciphertext> {
        if cvec.is_empty() {
            return Err(Error::InvalidParams("empty product".into()));
        }
        let mut layer: Vec<Ciphertext> = cvec.to_vec();
        while layer.len() > 1 {
            let pairs = layer.len() / 2;
            let scheme = self.scheme;
            let level: &[Ciphertext] = &layer;
            let mut next: Vec<Ciphertext> = pool::install(|| {
                (0..pairs)
                    .into_par_iter()
                    .map(|i| {
                        let m = scheme.mult(&level[2 * i], &level[2 * i + 1])?;
                        scheme.rescale_by(&m, log_p)
                    })
                    .collect::<Result<Vec<_>>>()
            })?;
            if layer.len() % 2 == 1 {
                // Odd element passes through, aligned to the next level.
                let last = layer.last().ok_or(Error::Internal("empty layer"))?;
                next.push(self.scheme.mod_down_by(last, log_p)?);
            }
            layer = next;
        }
        layer.pop().ok_or(Error::Internal("empty product layer"))
    }

    /// Product of 2^log_degree inputs.
    pub fn prod_of_po2(
        &self,
        cvec: &[Ciphertext],
        log_p: usize,
        log_degree: usize,
    ) -> Result<Ciphertext> {
        if cvec.len() != 1 << log_degree {
            return Err(Error::InvalidParams(format!(
                "expected {} ciphertexts, got {}",
                1 << log_degree,
                cvec.len()
            )));
        }
        self.prod(cvec, log_p)
    }

    /// Newton-style inverse. The input must encode `1 − m` with
    /// `|m| < 1/2`; the result approximates `1/m` through the product
    /// form `(1 + v)(1 + v²)(1 + v⁴)… = (1 − v^{2^steps})/(1 − v)`.
    pub fn inverse(&self, c: &Ciphertext, log_p: usize, steps: usize) -> Result<Ciphertext> {
        if steps == 0 {
            return Err(Error::OutOfDomain("inverse needs at least one step"));
        }
        let one = BigInt::from(1) << log_p;
        let mut cpow = c.clone();
        let mut tmp = self.scheme.add_const(c, &one);
        tmp = self.scheme.mod_down_by(&tmp, log_p)?;
        for _ in 1..steps {
            cpow = self.scheme.rescale_by(&self.scheme.square(&cpow)?, log_p)?;
            let term = self.scheme.add_const(&cpow, &one);
            let aligned = self.scheme.mod_down_to(&tmp, term.cbits)?;
            tmp = self
                .scheme
                .rescale_by(&self.scheme.mult(&term, &aligned)?, log_p)?;
        }
        Ok(tmp)
    }

    /// Evaluates a tabulated Taylor series to the given degree; the result
    /// is at scale 2^log_p.
    pub fn function(
        &self,
        c: &Ciphertext,
        f: Func,
        log_p: usize,
        degree: usize,
    ) -> Result<Ciphertext> {
        let lazy = self.function_lazy(c, f, log_p, degree)?;
        self.scheme.rescale_by(&lazy, log_p)
    }

    /// Same as [`Self::function`] but leaves the final rescale to the
    /// caller (the result is at scale 2^{2·log_p}).
    pub fn function_lazy(
        &self,
        c: &Ciphertext,
        f: Func,
        log_p: usize,
        degree: usize,
    ) -> Result<Ciphertext> {
        let coeffs = f.coeffs();
        if degree == 0 || degree >= coeffs.len() {
            return Err(Error::OutOfDomain(
                "Taylor degree outside the tabulated range",
            ));
        }
        let pows = self.power_extended(c, log_p, degree)?;
        let min_cbits = pows
            .iter()
            .zip(&coeffs[1..=degree])
            .filter(|(_, a)| **a != 0.0)
            .map(|(p, _)| p.cbits)
            .min()
            .ok_or(Error::OutOfDomain("Taylor series has no nonzero term"))?;

        let mut acc: Option<Ciphertext> = None;
        for k in 1..=degree {
            if coeffs[k] == 0.0 {
                continue;
            }
            let term = self
                .scheme
                .mult_by_const(&pows[k - 1], &scaled_coeff(coeffs[k], log_p));
            let term = self.scheme.mod_down_to(&term, min_cbits)?;
            acc = Some(match acc {
                None => term,
                Some(a) => self.scheme.add(&a, &term)?,
            });
        }
        let mut res = acc.ok_or(Error::Internal("empty Taylor accumulator"))?;
        res = self
            .scheme
            .add_const(&res, &scaled_coeff(coeffs[0], 2 * log_p));
        Ok(res)
    }

    /// Slot-wise product of two ciphertext vectors with a rescale, in
    /// parallel.
    pub fn mult_mod_switch_vec(
        &self,
        v1: &mut [Ciphertext],
        v2: &[Ciphertext],
        log_p: usize,
    ) -> Result<()> {
        if v1.len() != v2.len() {
            return Err(Error::InvalidParams(format!(
                "vector length mismatch: {} vs {}",
                v1.len(),
                v2.len()
            )));
        }
        let scheme = self.scheme;
        pool::install(|| {
            v1.par_iter_mut()
                .zip(v2.par_iter())
                .try_for_each(|(a, b)| -> Result<()> {
                    let m = scheme.mult(a, b)?;
                    *a = scheme.rescale_by(&m, log_p)?;
                    Ok(())
                })
        })
    }

    /// Homomorphic forward FFT across a vector of ciphertexts, each one a
    /// time sample. Twiddles are baked in as scaled complex constants;
    /// every butterfly stage rescales by log_p, so the slot scale is
    /// preserved.
    pub fn fft(&self, cvec: &mut [Ciphertext], log_p: usize) -> Result<()> {
        self.fft_raw(cvec, log_p, true)
    }

    /// Homomorphic inverse FFT, including the division by the length
    /// (realized as a rescale by log₂(len)).
    pub fn fft_inv(&self, cvec: &mut [Ciphertext], log_p: usize) -> Result<()> {
        self.fft_raw(cvec, log_p, false)?;
        let log_len = cvec.len().trailing_zeros() as usize;
        for c in cvec.iter_mut() {
            *c = self.scheme.rescale_by(c, log_len)?;
        }
        Ok(())
    }

    /// Inverse FFT without the final division.
    pub fn fft_inv_lazy(&self, cvec: &mut [Ciphertext], log_p: usize) -> Result<()> {
        self.fft_raw(cvec, log_p, false)
    }

    fn fft_raw(&self, cvec: &mut [Ciphertext], log_p: usize, forward: bool) -> Result<()> {
        let n = cvec.len();
        if !n.is_power_of_two() {
            return Err(Error::InvalidParams(format!(
                "FFT length must be a power of two, got {n}"
            )));
        }
        bit_reverse(cvec);
        let ctx = self.scheme.context();
        let m = ctx.m();
        let prec = ctx.prec();
        let scheme = self.scheme;
        let mut len = 2;
        while len <= n {
            let half = len >> 1;
            let stride = m / len;
            // All butterflies of a stage are independent.
            let jobs: Vec<(usize, usize, usize)> = (0..n)
                .step_by(len)
                .flat_map(|start| (0..half).map(move |j| (start + j, start + j + half, j)))
                .collect();
            let level: &[Ciphertext] = cvec;
            let results: Vec<(Ciphertext, Ciphertext)> = pool::install(|| {
                jobs.par_iter()
                    .map(|&(u_idx, v_idx, j)| {
                        let mut idx = j * stride;
                        if !forward && idx != 0 {
                            idx = m - idx;
                        }
                        let (cos, sin) = ctx.root(idx);
                        let w = CInt::new(
                            shr_round(cos, prec - log_p),
                            shr_round(sin, prec - log_p),
                        );
                        let wv = scheme.mult_by_cint_const(&level[v_idx], &w);
                        let wv = scheme.rescale_by(&wv, log_p)?;
                        let u = scheme.mod_down_by(&level[u_idx], log_p)?;
                        Ok((scheme.add(&u, &wv)?, scheme.sub(&u, &wv)?))
                    })
                    .collect::<Result<Vec<_>>>()
            })?;
            for ((u_idx, v_idx, _), (lo, hi)) in jobs.into_iter().zip(results) {
                cvec[u_idx] = lo;
                cvec[v_idx] = hi;
            }
            len <<= 1;
        }
        Ok(())
    }

    /// Replaces every slot by the sum of all `slots` slots, by log₂
    /// rotate-and-add doubling.
    pub fn partial_slots_sum_inplace(&self, c: &mut Ciphertext, slots: usize) -> Result<()> {
        if !slots.is_power_of_two() {
            return Err(Error::InvalidParams(format!(
                "slot count must be a power of two, got {slots}"
            )));
        }
        let log_slots = slots.trailing_zeros() as usize;
        let mut acc = c.clone();
        for i in 0..log_slots {
            let rot = self.scheme.left_rotate_by_po2(&acc, i)?;
            self.scheme.add_inplace(&mut acc, &rot)?;
        }
        *c = acc;
        Ok(())
    }
}

/// In-place bit-reversal permutation over ciphertexts.
fn bit_reverse(vals: &mut [Ciphertext]) {
    let n = vals.len();
    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j >= bit {
            j -= bit;
            bit >>= 1;
        }
        j += bit;
        if i < j {
            vals.swap(i, j);
        }
    }
}
