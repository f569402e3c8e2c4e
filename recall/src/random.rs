//! Pattern digit source.

use rand::Rng;
use rand::rngs::StdRng;
use rand_core::{RngCore, SeedableRng};

use crate::hal::RandomSource;

/// [`RandomSource`] over any seedable `rand` generator.
///
/// Defaults to `StdRng`, so the same seed yields the same patterns on the
/// board, in the simulator and in tests.
pub struct StdRandom<R = StdRng> {
    rng: R,
}

impl StdRandom<StdRng> {
    pub fn new() -> Self {
        Self::with_seed(0)
    }
}

impl Default for StdRandom<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + SeedableRng> StdRandom<R> {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: R::seed_from_u64(seed),
        }
    }
}

impl<R: RngCore + SeedableRng> RandomSource for StdRandom<R> {
    fn seed(&mut self, seed: u64) {
        self.rng = R::seed_from_u64(seed);
    }

    fn next_int_range(&mut self, lo: u32, hi: u32) -> u32 {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}
