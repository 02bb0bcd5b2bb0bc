//! Keyed Feistel permutation with cycle-walking
//!
//! A balanced Feistel network over `2 * half_bits` bits is a bijection on
//! `[0, 2^(2 * half_bits))` for any round function. `half_bits` is chosen so that
//! the network's domain is the smallest even power of two that covers N, which
//! keeps it below 4N. Values that land outside `[0, N)` are fed through the
//! network again until they land inside; following a cycle of the full-domain
//! bijection this way visits every in-range value exactly once, so the restriction
//! is still a bijection on `[0, N)`. On average fewer than four passes are needed.
//!
//! Round keys come from xoshiro256++ seeded with the permutation seed. The round
//! function is the SplitMix64 finalizer, which only uses wrapping integer ops and
//! so is identical on every platform.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const ROUNDS: usize = 6;

pub(crate) struct FeistelPermutation {
    domain_size: u64,
    half_bits: u32,
    half_mask: u64,
    keys: [u64; ROUNDS],
}

impl FeistelPermutation {
    /// `domain_size` must be at least 1
    pub(crate) fn new(domain_size: u64, seed: u64) -> Self {
        let bits = (64 - domain_size.saturating_sub(1).leading_zeros()).max(2);
        let bits = bits + (bits & 1);
        let half_bits = bits / 2;
        let half_mask = if half_bits == 32 {
            u32::MAX as u64
        } else {
            (1u64 << half_bits) - 1
        };

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut keys = [0u64; ROUNDS];
        for key in keys.iter_mut() {
            *key = rng.gen();
        }

        Self {
            domain_size,
            half_bits,
            half_mask,
            keys,
        }
    }

    /// Caller guarantees `rank < domain_size`
    #[inline]
    pub(crate) fn permute(&self, rank: u64) -> u64 {
        let mut value = self.encrypt(rank);
        while value >= self.domain_size {
            value = self.encrypt(value);
        }
        value
    }

    /// One pass of the network over the full power-of-two domain
    #[inline]
    fn encrypt(&self, value: u64) -> u64 {
        let mut left = value >> self.half_bits;
        let mut right = value & self.half_mask;
        for &key in &self.keys {
            let next = left ^ (mix64(right ^ key) & self.half_mask);
            left = right;
            right = next;
        }
        (left << self.half_bits) | right
    }
}

/// SplitMix64 finalizer
#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
