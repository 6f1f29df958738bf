//! The process-wide worker pool.
//!
//! Operations that are embarrassingly parallel (independent tensor
//! products, product trees, homomorphic FFT butterflies, Hadamard vectors)
//! run inside this pool. Callers size it once with [`set_num_threads`]
//! before entering the core; every parallel region joins before its
//! operation returns, so results are deterministic for any pool size.

use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use rayon::{ThreadPool, ThreadPoolBuilder};

lazy_static! {
    static ref POOL: RwLock<Arc<ThreadPool>> = RwLock::new(Arc::new(build(1)));
}

fn build(num_threads: usize) -> ThreadPool {
    ThreadPoolBuilder::new()
        .num_threads(num_threads.max(1))
        .build()
        .expect("worker pool construction only depends on the thread count")
}

/// Replaces the process-wide pool with one of `num_threads` workers.
///
/// Zero is treated as one. Operations already running keep the pool they
/// started with.
pub fn set_num_threads(num_threads: usize) {
    let pool = Arc::new(build(num_threads));
    *POOL.write().expect("pool lock is never poisoned") = pool;
}

/// Runs `op` inside the current pool and waits for it to finish.
pub(crate) fn install<R, F>(op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    let pool = POOL.read().expect("pool lock is never poisoned").clone();
    pool.install(op)
}

/// Runs two closures, potentially in parallel, and returns both results.
pub(crate) fn join<RA, RB, A, B>(a: A, b: B) -> (RA, RB)
where
    RA: Send,
    RB: Send,
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
{
    install(|| rayon::join(a, b))
}
