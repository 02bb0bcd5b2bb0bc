//! Repeatable id permutations
//!
//! A Zipf sampler hands out ranks, and rank 0 is always the hottest. Writing those
//! ranks straight into the target would pile every hot id into the first few
//! containers of the id space, which is not what real skewed workloads look like.
//! A [`PermutationGenerator`] is a fixed, seed-keyed bijection `π: [0, N) → [0, N)`
//! that scatters ranks over the whole domain while keeping the workload
//! reproducible.
//!
//! # Kinds
//!
//! - **Shuffle** (default): a seeded Fisher-Yates shuffle of `[0, N)`, materialized
//!   once. O(N) to build, O(1) per lookup, 4 bytes per id; limited to 2^32 ids.
//! - **Feistel**: a keyed balanced Feistel network with cycle-walking. O(1) memory,
//!   a handful of mixing rounds per lookup. Use it when N is too large to hold a
//!   table in memory.
//!
//! Both kinds are pure functions of `(N, seed)` after construction and produce the
//! same mapping on every platform.
//!
//! # Example
//!
//! ```
//! use zipfbench::permutation::{PermutationGenerator, PermutationKind};
//!
//! let perm = PermutationGenerator::new(100, 42, PermutationKind::Shuffle).unwrap();
//! let id = perm.map(0).unwrap();
//! assert!(id < 100);
//! assert_eq!(perm.map(0).unwrap(), id); // same rank, same id
//! assert!(perm.map(100).is_err());
//! ```

pub mod feistel;
pub mod shuffle;

use crate::error::PermutationError;
use feistel::FeistelPermutation;
use serde::{Deserialize, Serialize};
use shuffle::ShuffleTable;
use std::fmt;

/// Permutation construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermutationKind {
    Shuffle,
    Feistel,
}

impl Default for PermutationKind {
    fn default() -> Self {
        Self::Shuffle
    }
}

impl fmt::Display for PermutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermutationKind::Shuffle => write!(f, "shuffle"),
            PermutationKind::Feistel => write!(f, "feistel"),
        }
    }
}

enum Inner {
    Shuffle(ShuffleTable),
    Feistel(FeistelPermutation),
}

/// Seed-keyed bijection on `[0, domain_size)`
pub struct PermutationGenerator {
    domain_size: u64,
    seed: u64,
    inner: Inner,
}

impl PermutationGenerator {
    /// Build the permutation for `(domain_size, seed)`
    ///
    /// # Errors
    ///
    /// Returns [`PermutationError::EmptyDomain`] if `domain_size` is 0. The shuffle
    /// kind also fails for domains above [`shuffle::MAX_SHUFFLE_DOMAIN`] or when its
    /// table cannot be allocated.
    pub fn new(domain_size: u64, seed: u64, kind: PermutationKind) -> Result<Self, PermutationError> {
        if domain_size < 1 {
            return Err(PermutationError::EmptyDomain);
        }
        let inner = match kind {
            PermutationKind::Shuffle => Inner::Shuffle(ShuffleTable::new(domain_size, seed)?),
            PermutationKind::Feistel => Inner::Feistel(FeistelPermutation::new(domain_size, seed)),
        };
        Ok(Self {
            domain_size,
            seed,
            inner,
        })
    }

    /// Map a rank to its permuted id
    ///
    /// # Errors
    ///
    /// Returns [`PermutationError::RankOutOfRange`] if `rank >= domain_size`.
    #[inline]
    pub fn map(&self, rank: u64) -> Result<u64, PermutationError> {
        if rank >= self.domain_size {
            return Err(PermutationError::RankOutOfRange {
                rank,
                domain_size: self.domain_size,
            });
        }
        Ok(match &self.inner {
            Inner::Shuffle(table) => table.get(rank),
            Inner::Feistel(network) => network.permute(rank),
        })
    }

    pub fn domain_size(&self) -> u64 {
        self.domain_size
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn kind(&self) -> PermutationKind {
        match self.inner {
            Inner::Shuffle(_) => PermutationKind::Shuffle,
            Inner::Feistel(_) => PermutationKind::Feistel,
        }
    }
}

impl fmt::Debug for PermutationGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermutationGenerator")
            .field("domain_size", &self.domain_size)
            .field("seed", &self.seed)
            .field("kind", &self.kind())
            .finish()
    }
}
