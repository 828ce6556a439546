//! Shared type definitions for the evosim evolution simulator.
//!
//! This crate is the single source of truth for the values that cross crate
//! boundaries: attribute and trait identifiers, the heritable trait record,
//! the per-generation environment snapshot, and the generation record handed
//! to reporting consumers. Types flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`enums`] -- Attribute and trait identifiers, simulation end reasons
//! - [`structs`] -- Heritable traits, environment conditions, generation records

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AttributeKind, SimulationEndReason, TraitKind};
pub use structs::{EnvironmentConditions, GenerationRecord, HeritableTraits};
