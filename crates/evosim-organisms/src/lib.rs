//! Organisms, scoring, and reproduction for the evosim simulator.
//!
//! This crate contains the per-organism logic layer -- everything that
//! operates on organisms without owning the generation loop. It sits between
//! `evosim-types`/`evosim-world` and `evosim-core`, which orchestrates
//! generations.
//!
//! # Modules
//!
//! - [`config`] -- Crossover and mutation tunables ([`ReproductionConfig`])
//! - [`error`] -- Error types for organism operations ([`OrganismError`])
//! - [`organism`] -- Organisms, food requirement, fitness, survival test
//! - [`population`] -- Seed population sampling ([`TraitDistributions`])
//! - [`reproduction`] -- Reproduction pairs, crossover, and mutation

pub mod config;
pub mod error;
pub mod organism;
pub mod population;
pub mod reproduction;

// Re-export primary types at crate root for convenience.
pub use config::{DEFAULT_MUTATION_RANGE, ReproductionConfig};
pub use error::OrganismError;
pub use organism::{
    IN_RANGE_FITNESS, MAX_RESILIENCE_BONUS, OUT_OF_RANGE_FITNESS, Organism, Score,
};
pub use population::TraitDistributions;
pub use reproduction::{ReproductionPair, pair_fertility};
