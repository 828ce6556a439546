//! Error types for the evosim-organisms crate.
//!
//! All operations that can fail return typed errors rather than panicking.

use evosim_types::TraitKind;

/// Errors that can occur while scoring, seeding, or reproducing organisms.
#[derive(Debug, thiserror::Error)]
pub enum OrganismError {
    /// The ecosystem's temperature support has no width, so the food
    /// requirement is undefined.
    #[error("ecosystem temperature span must be positive, got {span}")]
    DegenerateTemperatureSpan {
        /// `temperature.max_value - temperature.min_value`.
        span: f64,
    },

    /// A survival test was run on an organism that has not been scored.
    #[error("organism has not been scored for the current generation")]
    NotScored,

    /// A trait distribution is missing from the seed population parameters.
    #[error("required trait {0} was not found in the trait distributions")]
    MissingTrait(TraitKind),

    /// Reproduction parameters failed validation.
    #[error("invalid reproduction parameters: {reason}")]
    InvalidReproduction {
        /// Description of the rejected parameter.
        reason: String,
    },

    /// Building a trait distribution failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: evosim_world::WorldError,
    },
}
