//! Environment processes and randomness plumbing for the evosim simulator.
//!
//! This crate models the drifting ecosystem: each scalar environmental
//! quantity (temperature, hazard rate, food) is an [`AttributeProcess`] that
//! pre-generates a volatility-bounded walk from a truncated normal
//! distribution. It also owns the seed derivation scheme every other crate
//! uses to obtain independent, reproducible random streams.
//!
//! # Modules
//!
//! - [`attribute`] -- Attribute parameter resolution and the bounded random walk.
//! - [`distribution`] -- Truncated normal sampling via the inverse CDF.
//! - [`error`] -- Error types for attribute and distribution operations.
//! - [`seed`] -- Counter-based derivation of child seeds from a root seed.

pub mod attribute;
pub mod distribution;
pub mod error;
pub mod seed;

// Re-export primary types at crate root.
pub use attribute::{AttributeParams, AttributeProcess, bound_steps};
pub use distribution::TruncatedNormal;
pub use error::WorldError;
pub use seed::{SeedStream, SeedTree, combine_seeds, rng_from_seed};
