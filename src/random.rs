//! Seeded random number generation.
//!
//! Every randomized operation in the engine draws from a single generator
//! owned by [`GeneticAlgorithm`](crate::ga::GeneticAlgorithm), so two runs
//! started from the same seed replay the same draw sequence.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Creates a deterministic generator from a 64-bit seed.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator from the config seed, or from OS entropy when unset.
pub fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}
