//! Encoding between slot vectors and plaintext polynomials.
//!
//! Messages are complex fixed-point values, already scaled by the caller
//! (by 2^logp). Encoding runs the inverse special FFT and lays the
//! resulting pairs out at gap `N/(2·slots)` across the two halves of the
//! coefficient vector; decoding is the exact reverse.

use crate::context::Context;
use crate::error::{Error, Result};
use crate::plaintext::Plaintext;
use crate::primitives::{cint::CInt, fft, poly::Poly};
use num_traits::Zero;

#[derive(Clone, Copy)]
pub struct Encoder<'a> {
    ctx: &'a Context,
}

impl<'a> Encoder<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Encodes `vals` into a plaintext at modulus 2^cbits.
    pub fn encode(&self, vals: &[CInt], slots: usize, cbits: usize) -> Result<Plaintext> {
        self.check_slots(slots)?;
        if vals.len() != slots {
            return Err(Error::InvalidParams(format!(
                "expected {slots} values, got {}",
                vals.len()
            )));
        }
        if cbits == 0 || cbits > self.ctx.log_q() {
            return Err(Error::InvalidParams(format!(
                "cbits must be in [1, {}], got {cbits}",
                self.ctx.log_q()
            )));
        }

        let is_complex = vals.iter().any(|z| !z.i.is_zero());
        let mut v = vals.to_vec();
        fft::fft_special_inv(self.ctx, &mut v);

        let n = self.ctx.n();
        let nh = self.ctx.nh();
        let gap = nh / slots;
        let mut mx = Poly::zero(n);
        for (k, z) in v.into_iter().enumerate() {
            mx[k * gap] = z.r;
            mx[k * gap + nh] = z.i;
        }

        let modulus = self.ctx.modulus(cbits);
        mx.reduce_mod(&modulus);
        Ok(Plaintext {
            mx,
            modulus,
            cbits,
            slots,
            is_complex,
        })
    }

    /// Recovers the slot values of a plaintext.
    pub fn decode(&self, plain: &Plaintext) -> Result<Vec<CInt>> {
        self.check_slots(plain.slots)?;
        let nh = self.ctx.nh();
        let gap = nh / plain.slots;
        let mut v: Vec<CInt> = (0..plain.slots)
            .map(|k| {
                CInt::new(
                    plain.mx[k * gap].clone(),
                    plain.mx[k * gap + nh].clone(),
                )
            })
            .collect();
        fft::fft_special(self.ctx, &mut v);
        Ok(v)
    }

    fn check_slots(&self, slots: usize) -> Result<()> {
        if slots == 0 || !slots.is_power_of_two() || slots > self.ctx.nh() {
            return Err(Error::InvalidParams(format!(
                "slots must be a power of two in [1, {}], got {slots}",
                self.ctx.nh()
            )));
        }
        Ok(())
    }
}
