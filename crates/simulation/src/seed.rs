//! Per-iteration seed derivation.
//!
//! Iteration `i` always gets the same RNG stream for a given base seed, no
//! matter which thread evaluates it. That is what keeps the sequential and
//! parallel backends bit-identical.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// SplitMix64 finalizer.
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub fn derive_seed(base_seed: u64, iteration: usize) -> u64 {
    splitmix64(base_seed ^ (iteration as u64).rotate_left(32))
}

pub fn iteration_rng(base_seed: u64, iteration: usize) -> StdRng {
    StdRng::seed_from_u64(derive_seed(base_seed, iteration))
}

/// Fresh base seed for unseeded runs.
pub fn random_seed() -> u64 {
    rand::random()
}
