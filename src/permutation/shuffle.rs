//! Materialized Fisher-Yates permutation
//!
//! The table is the identity `[0, N)` shuffled with a xoshiro256++ stream seeded
//! from the permutation seed. `rand`'s slice shuffle draws each swap index as a
//! `u32` whenever the remaining length fits in 32 bits, so the resulting table is
//! the same on 32- and 64-bit targets.

use crate::error::PermutationError;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Largest domain a shuffle table is built for (2^32 ids, 16 GiB of `u32` entries)
///
/// Larger domains need the Feistel kind.
pub const MAX_SHUFFLE_DOMAIN: u64 = 1 << 32;

/// Shuffled lookup table of `u32` entries
pub(crate) struct ShuffleTable {
    table: Vec<u32>,
}

impl ShuffleTable {
    /// Fails instead of aborting when the table cannot be allocated
    pub(crate) fn new(domain_size: u64, seed: u64) -> Result<Self, PermutationError> {
        if domain_size > MAX_SHUFFLE_DOMAIN {
            return Err(PermutationError::DomainTooLarge {
                domain_size,
                max: MAX_SHUFFLE_DOMAIN,
            });
        }
        let len = usize::try_from(domain_size)
            .map_err(|_| PermutationError::TableAllocation { domain_size })?;

        let mut table: Vec<u32> = Vec::new();
        table
            .try_reserve_exact(len)
            .map_err(|_| PermutationError::TableAllocation { domain_size })?;
        // ids fit in u32 because domain_size <= 2^32
        table.extend((0..domain_size).map(|id| id as u32));

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        table.shuffle(&mut rng);
        Ok(Self { table })
    }

    /// Caller guarantees `rank < len`
    #[inline]
    pub(crate) fn get(&self, rank: u64) -> u64 {
        self.table[rank as usize] as u64
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_table_is_permutation() {
        let table = ShuffleTable::new(1000, 5).unwrap();
        assert_eq!(table.len(), 1000);
        let mut ids: Vec<u64> = (0..1000).map(|r| table.get(r)).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..1000).collect::<Vec<u64>>());
    }

    #[test]
    fn test_shuffle_table_moves_ids() {
        let table = ShuffleTable::new(1000, 5).unwrap();
        let fixed = (0..1000).filter(|&r| table.get(r) == r).count();
        // a random permutation has one fixed point on average
        assert!(fixed < 20, "{} fixed points", fixed);
    }

    #[test]
    fn test_shuffle_table_size_limit() {
        assert_eq!(
            ShuffleTable::new(MAX_SHUFFLE_DOMAIN + 1, 0).err(),
            Some(PermutationError::DomainTooLarge {
                domain_size: MAX_SHUFFLE_DOMAIN + 1,
                max: MAX_SHUFFLE_DOMAIN,
            })
        );
        assert!(ShuffleTable::new(1 << 40, 0).is_err());
    }

    #[test]
    fn test_single_entry_table() {
        let table = ShuffleTable::new(1, 99).unwrap();
        assert_eq!(table.get(0), 0);
    }
}
