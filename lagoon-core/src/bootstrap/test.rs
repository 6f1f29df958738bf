//! Bootstrapping tests: the linear transforms, the sine approximation,
//! and the end-to-end refresh.

use num_bigint::BigInt;
use rand::Rng;

use crate::context::Context;
use crate::error::Error;
use crate::key::{KeyTag, SecretKey};
use crate::params::Params;
use crate::pool::set_num_threads;
use crate::primitives::cint::CInt;
use crate::scheme::Scheme;
use crate::testutil;

struct Fixture {
    params: Params,
    ctx: Context,
}

impl Fixture {
    fn new(log_n: usize, log_q: usize) -> Self {
        let params = Params::new(log_n, log_q).expect("valid parameters");
        let ctx = Context::new(params);
        Self { params, ctx }
    }
}

/// Random integer messages of `bits` bits in both components.
fn rand_int_messages<R: Rng>(rng: &mut R, slots: usize, bits: u32) -> Vec<CInt> {
    (0..slots)
        .map(|_| {
            CInt::new(
                BigInt::from(rng.gen_range(0i64..(1 << bits))),
                BigInt::from(rng.gen_range(0i64..(1 << bits))),
            )
        })
        .collect()
}

#[test]
fn remove_i_part_erases_q0_multiples() {
    let f = Fixture::new(8, 560);
    let mut rng = testutil::rng(91);
    let sk = SecretKey::new(&f.params, &mut rng);
    let mut scheme = Scheme::new(&sk, &f.ctx, &mut rng);
    scheme.add_conj_key(&mut rng);

    let log_q0 = 25usize;
    let (log_t, log_i) = (3usize, 4usize);
    let slots = 4usize;

    // Slot values m + q0·k with small integers k, as they appear after
    // the modulus raise and CoeffToSlot.
    let mut clean = Vec::with_capacity(slots);
    let mut noisy = Vec::with_capacity(slots);
    for _ in 0..slots {
        let m = rng.gen_range(0i64..(1 << 19));
        let k = rng.gen_range(-8i64..=8);
        clean.push(CInt::new(BigInt::from(m), BigInt::from(0)));
        noisy.push(CInt::new(
            BigInt::from(m) + (BigInt::from(k) << log_q0),
            BigInt::from(0),
        ));
    }

    let c = scheme.encrypt(&mut rng, &noisy, slots, 500).expect("encrypt");
    let cleaned = scheme
        .remove_i_part(&c, log_q0, log_t, log_i)
        .expect("remove I part");
    let got = scheme.decrypt(&sk, &cleaned).expect("decrypt");
    testutil::assert_close(&clean, &got, log_q0 - 8);
}

#[test]
fn coeff_to_slot_round_trip_sparse() {
    let f = Fixture::new(8, 150);
    let mut rng = testutil::rng(92);
    let sk = SecretKey::new(&f.params, &mut rng);
    let mut scheme = Scheme::new(&sk, &f.ctx, &mut rng);
    scheme.add_boot_keys(&mut rng, 1, 30).expect("boot keys");

    let slots = 2usize;
    let (_, vals) = testutil::rand_complex_vec(&mut rng, slots, 30);
    let c = scheme.encrypt(&mut rng, &vals, slots, 150).expect("encrypt");

    let (re, im) = scheme.coeff_to_slot(&c).expect("coeff to slot");
    assert!(im.is_none());
    let back = scheme.slot_to_coeff(&re, None).expect("slot to coeff");
    let got = scheme.decrypt(&sk, &back).expect("decrypt");
    testutil::assert_close(&vals, &got, 16);
}

#[test]
fn coeff_to_slot_round_trip_full() {
    let f = Fixture::new(7, 150);
    let mut rng = testutil::rng(93);
    let sk = SecretKey::new(&f.params, &mut rng);
    let mut scheme = Scheme::new(&sk, &f.ctx, &mut rng);
    let log_slots = f.ctx.log_nh();
    scheme
        .add_boot_keys(&mut rng, log_slots, 30)
        .expect("boot keys");

    let slots = f.ctx.nh();
    let (_, vals) = testutil::rand_complex_vec(&mut rng, slots, 30);
    let c = scheme.encrypt(&mut rng, &vals, slots, 150).expect("encrypt");

    let (re, im) = scheme.coeff_to_slot(&c).expect("coeff to slot");
    let im = im.expect("full packing splits into two extractions");
    let back = scheme.slot_to_coeff(&re, Some(&im)).expect("slot to coeff");
    let got = scheme.decrypt(&sk, &back).expect("decrypt");
    testutil::assert_close(&vals, &got, 16);
}

#[test]
fn bootstrap_sparse_end_to_end() {
    set_num_threads(4);
    let f = Fixture::new(10, 560);
    let mut rng = testutil::rng(94);
    let sk = SecretKey::new(&f.params, &mut rng);
    let mut scheme = Scheme::new(&sk, &f.ctx, &mut rng);

    let log_q0 = 25usize;
    let (log_t, log_i) = (3usize, 4usize);
    let log_slots = 1usize;
    let slots = 1usize << log_slots;
    scheme
        .add_boot_keys(&mut rng, log_slots, log_q0 + log_i)
        .expect("boot keys");

    let vals = rand_int_messages(&mut rng, slots, 19);
    let mut c = scheme.encrypt(&mut rng, &vals, slots, log_q0).expect("encrypt");

    scheme
        .bootstrap_inplace(&mut c, 560, log_t, log_i)
        .expect("bootstrap");
    assert!(c.cbits > 2 * log_q0, "refreshed budget is {} bits", c.cbits);

    let got = scheme.decrypt(&sk, &c).expect("decrypt");
    testutil::assert_close(&vals, &got, log_q0 - 8);
    set_num_threads(1);
}

#[test]
fn bootstrap_full_slots_end_to_end() {
    set_num_threads(4);
    let f = Fixture::new(7, 560);
    let mut rng = testutil::rng(95);
    let sk = SecretKey::new(&f.params, &mut rng);
    let mut scheme = Scheme::new(&sk, &f.ctx, &mut rng);

    let log_q0 = 25usize;
    let (log_t, log_i) = (3usize, 4usize);
    let log_slots = f.ctx.log_nh();
    let slots = f.ctx.nh();
    scheme
        .add_boot_keys(&mut rng, log_slots, log_q0 + log_i)
        .expect("boot keys");

    let vals = rand_int_messages(&mut rng, slots, 19);
    let mut c = scheme.encrypt(&mut rng, &vals, slots, log_q0).expect("encrypt");

    scheme
        .bootstrap_inplace(&mut c, 560, log_t, log_i)
        .expect("bootstrap");

    let got = scheme.decrypt(&sk, &c).expect("decrypt");
    testutil::assert_close(&vals, &got, log_q0 - 8);
    set_num_threads(1);
}

#[test]
#[ignore = "runs for minutes at the full bootstrap parameters"]
fn bootstrap_one_real_at_source_parameters() {
    // logN = 15, logq = 620, logq0 = 29, logT = 2: a real scalar with 23
    // message bits is refreshed from modulus 2^29 to a high modulus.
    set_num_threads(8);
    let f = Fixture::new(15, 620);
    let mut rng = testutil::rng(96);
    let sk = SecretKey::new(&f.params, &mut rng);
    let mut scheme = Scheme::new(&sk, &f.ctx, &mut rng);

    let log_q0 = 29usize;
    let (log_t, log_i) = (2usize, 4usize);
    scheme
        .add_boot_keys(&mut rng, 0, log_q0 + log_i)
        .expect("boot keys");

    let vals = vec![CInt::new(
        BigInt::from(rng.gen_range(0i64..(1 << 23))),
        BigInt::from(0),
    )];
    let mut c = scheme.encrypt(&mut rng, &vals, 1, log_q0).expect("encrypt");

    scheme
        .bootstrap_inplace(&mut c, 620, log_t, log_i)
        .expect("bootstrap");

    let got = scheme.decrypt(&sk, &c).expect("decrypt");
    // Recovered to within 2^{−14} of the encoding scale.
    testutil::assert_close(&vals, &got, log_q0 - 14);
    set_num_threads(1);
}

#[test]
fn bootstrap_requires_key_material() {
    let f = Fixture::new(8, 300);
    let mut rng = testutil::rng(97);
    let sk = SecretKey::new(&f.params, &mut rng);
    let mut scheme = Scheme::new(&sk, &f.ctx, &mut rng);

    let vals = rand_int_messages(&mut rng, 2, 10);
    let mut c = scheme.encrypt(&mut rng, &vals, 2, 20).expect("encrypt");
    assert!(matches!(
        scheme.bootstrap_inplace(&mut c, 300, 2, 4),
        Err(Error::MissingKey(KeyTag::Boot(1)))
    ));

    // Constants at the wrong precision are rejected up front.
    scheme.add_boot_keys(&mut rng, 1, 30).expect("boot keys");
    assert!(matches!(
        scheme.bootstrap_inplace(&mut c, 300, 2, 4),
        Err(Error::InvalidParams(_))
    ));
    assert_eq!(c.cbits, 20, "failed bootstrap must not mutate its input");
}

#[test]
fn boot_context_validation() {
    let f = Fixture::new(8, 100);
    let ctx = &f.ctx;
    assert!(matches!(
        crate::bootstrap::BootContext::new(ctx, ctx.log_nh() + 1, 30),
        Err(Error::InvalidParams(_))
    ));
    assert!(matches!(
        crate::bootstrap::BootContext::new(ctx, 1, 0),
        Err(Error::InvalidParams(_))
    ));
    assert!(matches!(
        crate::bootstrap::BootContext::new(ctx, 1, 100),
        Err(Error::InvalidParams(_))
    ));
    let bc = crate::bootstrap::BootContext::new(ctx, 2, 30).expect("boot context");
    assert_eq!(bc.size(), 8);
    assert_eq!(bc.log_p(), 30);
}
