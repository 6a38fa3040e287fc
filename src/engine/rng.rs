//! Injectable randomness source.
//!
//! The game threads a single rng through dealing, shuffling, and the
//! starting-player pick so tests and benchmarks can seed it.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub struct GameRng(StdRng);

impl GameRng {
    pub fn from_entropy() -> Self {
        GameRng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        GameRng(StdRng::seed_from_u64(seed))
    }

    /// Uniform index into `0..len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }
}

impl fmt::Debug for GameRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GameRng")
    }
}
