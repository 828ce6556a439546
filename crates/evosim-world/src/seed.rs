//! Deterministic seed derivation for the evosim simulator.
//!
//! A single root seed is split into independent child seeds with a
//! counter-based mixer (`splitmix64`). Every consumer of randomness owns its
//! own generator built from a derived seed, so no generator is ever shared
//! between two owners and a fixed root seed reproduces a run bit for bit.
//!
//! # Streams
//!
//! | Stream          | Domain | Index              |
//! |-----------------|--------|--------------------|
//! | Ecosystem       | 1      | 0                  |
//! | Attribute       | 2      | attribute index    |
//! | Trait column    | 3      | trait index        |
//! | Organism        | 4      | position in seed population |
//!
//! Generators are `ChaCha12`, whose output is stable across platforms and
//! crate releases.

use evosim_types::{AttributeKind, TraitKind};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Increment of the `splitmix64` sequence (the 64-bit golden ratio).
const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;

/// An independent random stream derived from the root seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedStream {
    /// The ecosystem's own stream: survival draws and reproducer shuffles.
    Ecosystem,
    /// The stream feeding one environment attribute process.
    Attribute(AttributeKind),
    /// The stream used to sample one trait column of the seed population.
    TraitColumn(TraitKind),
    /// The lineage seed of the n-th organism of the seed population.
    Organism(u64),
}

impl SeedStream {
    /// Return the `(domain, index)` pair mixed into the root seed.
    const fn key(self) -> (u64, u64) {
        match self {
            Self::Ecosystem => (1, 0),
            Self::Attribute(kind) => (2, kind.index()),
            Self::TraitColumn(kind) => (3, kind.index()),
            Self::Organism(index) => (4, index),
        }
    }
}

/// Root of the seed hierarchy for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedTree {
    /// The configured (or drawn) root seed.
    root: u64,
}

impl SeedTree {
    /// Create a seed tree from a root seed.
    pub const fn new(root: u64) -> Self {
        Self { root }
    }

    /// Return the root seed.
    pub const fn root(&self) -> u64 {
        self.root
    }

    /// Derive the child seed for a stream.
    pub const fn derive(&self, stream: SeedStream) -> u64 {
        let (domain, index) = stream.key();
        let domain_seed = splitmix64(self.root ^ domain.wrapping_mul(GOLDEN_GAMMA));
        splitmix64(domain_seed ^ splitmix64(index))
    }

    /// Build the generator for a stream.
    pub fn rng(&self, stream: SeedStream) -> ChaCha12Rng {
        rng_from_seed(self.derive(stream))
    }
}

/// Build a `ChaCha12` generator from a derived seed.
pub fn rng_from_seed(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

/// Combine two lineage seeds into the seed of a reproduction pair.
///
/// The combination is order-sensitive; pair order is itself deterministic
/// because it comes from the ecosystem's seeded shuffle.
pub const fn combine_seeds(first: u64, second: u64) -> u64 {
    splitmix64(first.wrapping_add(splitmix64(second ^ GOLDEN_GAMMA)))
}

/// One step of the `splitmix64` finalizer.
const fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
