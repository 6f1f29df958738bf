//! Iterative FFT over complex fixed-point values, and the "special"
//! variant that realizes the canonical embedding.
//!
//! The special transform evaluates a length-n coefficient vector at the
//! odd root powers ζ^{5^j} of a primitive 4n-th root of unity ζ. It
//! factors into a per-index twist by ζ^k, an ordinary n-point FFT, and the
//! precomputed power-of-five output permutation; the inverse walks the
//! same steps backwards.

use crate::context::Context;
use crate::primitives::cint::CInt;

/// In-place forward transform: `out[t] = Σ_k v[k]·ω_n^{tk}` with
/// ω_n = e^{2πi/n}.
pub fn fft(ctx: &Context, vals: &mut [CInt]) {
    fft_raw(ctx, vals, true);
}

/// In-place inverse transform, including the division by n.
pub fn fft_inv(ctx: &Context, vals: &mut [CInt]) {
    fft_raw(ctx, vals, false);
    let log_len = vals.len().trailing_zeros() as usize;
    for v in vals.iter_mut() {
        let divided = CInt::new(
            crate::primitives::bigfix::shr_round(&v.r, log_len),
            crate::primitives::bigfix::shr_round(&v.i, log_len),
        );
        *v = divided;
    }
}

/// Inverse transform without the final division by n; the caller absorbs
/// the factor.
pub fn fft_inv_lazy(ctx: &Context, vals: &mut [CInt]) {
    fft_raw(ctx, vals, false);
}

/// Iterative bit-reversed Cooley–Tukey butterfly pass.
pub fn fft_raw(ctx: &Context, vals: &mut [CInt], is_forward: bool) {
    let n = vals.len();
    debug_assert!(n.is_power_of_two());
    debug_assert!(2 * n <= ctx.m());
    bit_reverse(vals);
    let m = ctx.m();
    let prec = ctx.prec();
    let mut len = 2;
    while len <= n {
        let half = len >> 1;
        let stride = m / len;
        for start in (0..n).step_by(len) {
            for j in 0..half {
                let mut idx = j * stride;
                if !is_forward && idx != 0 {
                    idx = m - idx;
                }
                let (cos, sin) = ctx.root(idx);
                let v = vals[start + j + half].mul_root(cos, sin, prec);
                let (lo, hi) = vals[start + j].butterfly(&v);
                vals[start + j] = lo;
                vals[start + j + half] = hi;
            }
        }
        len <<= 1;
    }
}

/// Evaluation at the odd powers ζ^{5^j}, j < n, of the primitive 4n-th
/// root ζ: the slot values of the canonical embedding.
pub fn fft_special(ctx: &Context, vals: &mut [CInt]) {
    let n = vals.len();
    debug_assert!(n.is_power_of_two());
    let stride = ctx.m() / (4 * n);
    let prec = ctx.prec();
    for (k, v) in vals.iter_mut().enumerate() {
        if k == 0 {
            continue;
        }
        let (cos, sin) = ctx.root(k * stride);
        *v = v.mul_root(cos, sin, prec);
    }
    fft(ctx, vals);
    let perm = ctx.special_perm(n);
    let mut out = vec![CInt::zero(); n];
    for (j, &t) in perm.iter().enumerate() {
        out[j] = vals[t].clone();
    }
    vals.clone_from_slice(&out);
}

/// Inverse of [`fft_special`] on slot vectors.
pub fn fft_special_inv(ctx: &Context, vals: &mut [CInt]) {
    let n = vals.len();
    debug_assert!(n.is_power_of_two());
    let perm = ctx.special_perm(n);
    let mut tmp = vec![CInt::zero(); n];
    for (j, &t) in perm.iter().enumerate() {
        tmp[t] = vals[j].clone();
    }
    vals.clone_from_slice(&tmp);
    fft_inv(ctx, vals);
    let m = ctx.m();
    let stride = m / (4 * n);
    let prec = ctx.prec();
    for (k, v) in vals.iter_mut().enumerate() {
        if k == 0 {
            continue;
        }
        let (cos, sin) = ctx.root(m - k * stride);
        *v = v.mul_root(cos, sin, prec);
    }
}

/// Standard in-place bit-reversal permutation.
fn bit_reverse(vals: &mut [CInt]) {
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
