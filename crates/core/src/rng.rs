//! Uniform-random capability.
//!
//! The engine performs no other randomness: everything nondeterministic
//! funnels through [`UniformSource::uniform`], so a fixed seed reproduces a
//! run exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Capability for drawing a uniform integer in `[0, bound)`.
pub trait UniformSource {
    /// Draw a value in `[0, bound)`. `bound` must be nonzero.
    fn uniform(&mut self, bound: u64) -> u64;
}

/// Seeded ChaCha-backed uniform source.
///
/// Given the same seed, produces an identical draw sequence every run.
#[derive(Debug, Clone)]
pub struct SeededUniform {
    rng: ChaCha8Rng,
}

impl SeededUniform {
    /// Create a source from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl UniformSource for SeededUniform {
    fn uniform(&mut self, bound: u64) -> u64 {
        debug_assert!(bound > 0, "uniform bound must be nonzero");
        self.rng.gen_range(0..bound)
    }
}
