//! Random number source for enemy fire decisions
//!
//! The engine only ever asks for uniform integers in an inclusive range, so
//! hosts can inject anything from a seeded PCG to a scripted sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform integer source
pub trait RngProvider {
    /// Uniform integer in `[min_inclusive, max_inclusive]`
    fn next_int(&mut self, min_inclusive: i32, max_inclusive: i32) -> i32;
}

/// Default generator: PCG32
#[derive(Debug, Clone)]
pub struct PcgRng {
    rng: Pcg32,
}

impl PcgRng {
    /// Reproducible generator for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Generator seeded from the thread RNG
    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg32::from_rng(&mut rand::rng()),
        }
    }
}

impl RngProvider for PcgRng {
    fn next_int(&mut self, min_inclusive: i32, max_inclusive: i32) -> i32 {
        if min_inclusive >= max_inclusive {
            return min_inclusive;
        }
        self.rng.random_range(min_inclusive..=max_inclusive)
    }
}
