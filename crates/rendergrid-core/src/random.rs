//! Random sources for render sampling and worker selection.
//!
//! Randomness is always passed in explicitly. Components hold an
//! `Arc<dyn RandomSource>` so a test can pin a seed while the daemon
//! draws from OS entropy.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// A source of the two distributions the simulator needs.
///
/// Implementations must be safe to sample from many tasks at once.
pub trait RandomSource: Send + Sync {
    /// A sample from the standard normal distribution (mean 0, std-dev 1).
    fn standard_normal(&self) -> f64;

    /// A uniform index in `0..upper`.
    ///
    /// Callers guarantee `upper > 0`.
    fn index(&self, upper: usize) -> usize;
}

/// A deterministic generator seeded once at construction.
///
/// Sampling is serialized through a mutex. The sequence is reproducible
/// for a single consumer; with several concurrent consumers the
/// interleaving (and therefore who gets which sample) is not.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn standard_normal(&self) -> f64 {
        self.rng.lock().sample(StandardNormal)
    }

    fn index(&self, upper: usize) -> usize {
        self.rng.lock().random_range(0..upper)
    }
}

/// Draws from the thread-local RNG, reseeded from OS entropy.
///
/// Zero-sized; the generator itself is looked up on every call, so this
/// type is `Send + Sync` even though `ThreadRng` is not.
#[derive(Default, Clone, Debug)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn standard_normal(&self) -> f64 {
        rand::rng().sample(StandardNormal)
    }

    fn index(&self, upper: usize) -> usize {
        rand::rng().random_range(0..upper)
    }
}

/// Pick the random source for a run: seeded when a seed is given,
/// entropy-backed otherwise.
pub fn from_seed(seed: Option<u64>) -> Arc<dyn RandomSource> {
    match seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    }
}
