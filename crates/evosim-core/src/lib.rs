//! Ecosystem state, generation cycle, and orchestration for the evosim
//! simulator.
//!
//! This crate owns the generation loop that drives the simulation:
//! Environment, Scoring, Survival, Record, Admission, Pairing, and
//! Reproduction.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `evosim-config.yaml` into
//!   strongly-typed structs.
//! - [`ecosystem`] -- [`Ecosystem`] state machine, attribute processes, and
//!   the living population.
//! - [`generation`] -- The per-generation step.
//! - [`history`] -- Generation records and the column-oriented
//!   [`EvolutionTable`].
//! - [`runner`] -- The generation loop with halting and callbacks.
//! - [`stats`] -- Population statistics for generation records.
//!
//! [`Ecosystem`]: ecosystem::Ecosystem
//! [`EvolutionTable`]: history::EvolutionTable

pub mod config;
pub mod ecosystem;
pub mod generation;
pub mod history;
pub mod runner;
pub mod stats;

pub use config::{ConfigError, SimulationConfig};
pub use ecosystem::{Ecosystem, EcosystemError, EcosystemState};
pub use generation::{GenerationOutcome, GenerationSummary, run_generation};
pub use history::{EvolutionTable, GenerationHistory};
pub use runner::{
    GenerationCallback, NoOpCallback, RunnerError, SimulationResult, log_simulation_end,
    run_simulation,
};
