//! Arbitrary constants to seed hashers whose output is in turn used to seed RNGs.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro128PlusPlus;
use std::hash::Hasher;
use wyhash::WyHash;

pub const NOISE_PERMUTATION: u64 = 0x3fdc77fb4d7f5d2f;
pub const NOISE_GRADIENTS: u64 = 0x67caf3e7b16e9df2;
pub const BSP_SPLIT: u64 = 0x74e90549dbcadfd0;

/// Create an RNG whose stream is stable for a given user `seed`, isolated from every other
/// purpose by `magic`.
pub fn seeded_rng(seed: u64, magic: u64) -> Xoshiro128PlusPlus {
    let mut hasher = WyHash::with_seed(magic);
    hasher.write_u64(seed);
    Xoshiro128PlusPlus::seed_from_u64(hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn stream(seed: u64, magic: u64) -> Vec<u32> {
        let mut rng = seeded_rng(seed, magic);
        (0..8).map(|_| rng.gen()).collect()
    }

    #[test]
    fn same_seed_same_stream() {
        assert_eq!(stream(42, BSP_SPLIT), stream(42, BSP_SPLIT));
        assert_ne!(stream(42, BSP_SPLIT), stream(42, NOISE_PERMUTATION));
        assert_ne!(stream(42, BSP_SPLIT), stream(43, BSP_SPLIT));
    }
}
