//! Per-operation random number generators
//!
//! Every operation gets its own `StdRng`, so no generator is shared between
//! tasks. With a fixed seed the sequence of per-operation seeds is fixed too.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Hands out one independent generator seed per operation
#[derive(Debug, Clone)]
pub struct OperationSeeder {
    master: StdRng,
}

impl OperationSeeder {
    /// Deterministic when `seed` is set, OS entropy otherwise
    pub fn new(seed: Option<u64>) -> Self {
        let master = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { master }
    }

    pub fn next_seed(&mut self) -> u64 {
        self.master.gen()
    }

    pub fn next_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.next_seed())
    }

    /// Seeds for the next `count` operations, in order
    pub fn take_seeds(&mut self, count: usize) -> Vec<u64> {
        (0..count).map(|_| self.next_seed()).collect()
    }
}
