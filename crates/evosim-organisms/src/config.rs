//! Configuration defaults for reproduction.
//!
//! The [`ReproductionConfig`] struct bundles the tunables of the crossover
//! operator so that callers (generation loop, tests) can override defaults.

use crate::error::OrganismError;

/// Default maximum relative deviation applied by a mutation.
pub const DEFAULT_MUTATION_RANGE: f64 = 0.1;

/// Configuration for crossover and mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReproductionConfig {
    /// Maximum relative deviation caused by a mutation (default: 0.1).
    ///
    /// A mutated trait is multiplied by a uniform draw from
    /// `[1 - mutation_range, 1 + mutation_range)`.
    pub mutation_range: f64,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            mutation_range: DEFAULT_MUTATION_RANGE,
        }
    }
}

impl ReproductionConfig {
    /// Check that the mutation range is a finite, non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::InvalidReproduction`] otherwise.
    pub fn validate(&self) -> Result<(), OrganismError> {
        if self.mutation_range.is_finite() && self.mutation_range >= 0.0 {
            Ok(())
        } else {
            Err(OrganismError::InvalidReproduction {
                reason: format!(
                    "mutation_range must be finite and non-negative, got {}",
                    self.mutation_range
                ),
            })
        }
    }
}
