//! # Uniform random source used by the jitter decorators.
//!
//! [`UniformRandom`] is the only randomness the crate consumes: an integer drawn
//! uniformly from `[0, n)`. The default [`ThreadRandom`] delegates to `rand`'s
//! thread-local generator; tests and deterministic simulations inject their own.

use std::sync::Arc;

use rand::Rng;

/// Uniform integer source, safe for concurrent use.
pub trait UniformRandom: Send + Sync {
    /// Returns an integer in `[0, n)`.
    ///
    /// # Panics
    /// Implementations panic when `n == 0`.
    fn below(&self, n: u64) -> u64;
}

/// Shared handle to a random source.
pub type RandomRef = Arc<dyn UniformRandom>;

/// Random source backed by `rand::rng()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl UniformRandom for ThreadRandom {
    fn below(&self, n: u64) -> u64 {
        assert!(n > 0, "invalid argument: n must be positive and non-zero, got {n}");
        rand::rng().random_range(0..n)
    }
}

pub(crate) fn default_random() -> RandomRef {
    Arc::new(ThreadRandom)
}
