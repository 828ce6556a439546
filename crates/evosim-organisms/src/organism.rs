//! Organisms and their per-generation scoring.
//!
//! An [`Organism`] carries immutable [`HeritableTraits`] and a lineage seed.
//! Once per generation the ecosystem scores it against the current
//! [`EnvironmentConditions`], producing a [`Score`] (food requirement and
//! fitness), and then runs the survival test with a fresh uniform draw.
//!
//! # Food Requirement
//!
//! ```text
//! food = (2 * temperature_range / ecosystem_span) * 3 * (0.5 + resilience) * (fertility / 2)
//! ```
//!
//! Broader tolerance, higher resilience, and higher fertility all make an
//! organism more expensive to sustain.
//!
//! # Fitness
//!
//! A base of 0.75 inside the tolerance band (0.25 outside), plus a resilience
//! bonus of `resilience - hazard_rate` clamped to `[0, 0.25]`. Fitness is the
//! survival probability and always lies in `[0.25, 1.0]`.

use evosim_types::{EnvironmentConditions, HeritableTraits};

use crate::error::OrganismError;

/// Base fitness when the temperature is inside the tolerance band.
pub const IN_RANGE_FITNESS: f64 = 0.75;

/// Base fitness when the temperature is outside the tolerance band.
pub const OUT_OF_RANGE_FITNESS: f64 = 0.25;

/// Largest resilience bonus added on top of the base fitness.
pub const MAX_RESILIENCE_BONUS: f64 = 0.25;

/// Multiplier applied to the tolerance coefficient.
const TOLERANCE_FOOD_FACTOR: f64 = 3.0;

/// Offset added to resilience in the food requirement.
const RESILIENCE_FOOD_OFFSET: f64 = 0.5;

/// Environment-dependent values computed for one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Food consumed if the organism is admitted for reproduction.
    pub food_requirement: f64,
    /// Survival probability in `[0.25, 1.0]`.
    pub fitness: f64,
}

/// A single organism of the population.
#[derive(Debug, Clone, PartialEq)]
pub struct Organism {
    /// Heritable genome.
    traits: HeritableTraits,
    /// Seed of this organism's own random stream.
    lineage_seed: u64,
    /// Score for the current generation, absent until scored.
    score: Option<Score>,
    /// Cleared by a failed survival test.
    survives: bool,
}

impl Organism {
    /// Create an unscored organism.
    pub const fn new(traits: HeritableTraits, lineage_seed: u64) -> Self {
        Self {
            traits,
            lineage_seed,
            score: None,
            survives: true,
        }
    }

    /// Heritable traits.
    pub const fn traits(&self) -> &HeritableTraits {
        &self.traits
    }

    /// Seed of this organism's own random stream.
    pub const fn lineage_seed(&self) -> u64 {
        self.lineage_seed
    }

    /// Compute the food requirement against the given environment.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::DegenerateTemperatureSpan`] if the
    /// ecosystem's temperature span is not positive.
    pub fn compute_food_requirement(
        &self,
        env: &EnvironmentConditions,
    ) -> Result<f64, OrganismError> {
        let span = env.temperature_span();
        if span.is_nan() || span <= 0.0 {
            return Err(OrganismError::DegenerateTemperatureSpan { span });
        }

        let tolerance_coefficient = 2.0 * self.traits.temperature_range / span;
        Ok(tolerance_coefficient
            * TOLERANCE_FOOD_FACTOR
            * (RESILIENCE_FOOD_OFFSET + self.traits.resilience)
            * (self.traits.fertility / 2.0))
    }

    /// Compute the fitness against the given environment.
    pub fn compute_fitness(&self, env: &EnvironmentConditions) -> f64 {
        let low = self.traits.temperature_ideal - self.traits.temperature_range;
        let high = self.traits.temperature_ideal + self.traits.temperature_range;
        let base = if (low..=high).contains(&env.temperature) {
            IN_RANGE_FITNESS
        } else {
            OUT_OF_RANGE_FITNESS
        };

        // `max`/`min` rather than `clamp`: a NaN difference yields no bonus.
        let bonus = (self.traits.resilience - env.hazard_rate)
            .max(0.0)
            .min(MAX_RESILIENCE_BONUS);
        base + bonus
    }

    /// Score the organism for the current generation.
    ///
    /// Resets the survival flag; [`Organism::survival_test`] decides it anew.
    ///
    /// # Errors
    ///
    /// Propagates [`Organism::compute_food_requirement`] failures.
    pub fn score(&mut self, env: &EnvironmentConditions) -> Result<Score, OrganismError> {
        let score = Score {
            food_requirement: self.compute_food_requirement(env)?,
            fitness: self.compute_fitness(env),
        };
        self.score = Some(score);
        self.survives = true;
        Ok(score)
    }

    /// Decide survival with a uniform draw from `[0, 1)`.
    ///
    /// The organism dies if its fitness is below the draw, so the survival
    /// probability equals the fitness.
    ///
    /// # Errors
    ///
    /// Returns [`OrganismError::NotScored`] if the organism has not been
    /// scored.
    pub fn survival_test(&mut self, draw: f64) -> Result<bool, OrganismError> {
        let score = self.score.ok_or(OrganismError::NotScored)?;
        if score.fitness < draw {
            self.survives = false;
        }
        Ok(self.survives)
    }

    /// Score for the current generation, if scored.
    pub const fn current_score(&self) -> Option<Score> {
        self.score
    }

    /// Fitness for the current generation, if scored.
    pub fn fitness(&self) -> Option<f64> {
        self.score.map(|s| s.fitness)
    }

    /// Food requirement for the current generation, if scored.
    pub fn food_requirement(&self) -> Option<f64> {
        self.score.map(|s| s.food_requirement)
    }

    /// Whether the organism passed its last survival test.
    pub const fn survives(&self) -> bool {
        self.survives
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn traits() -> HeritableTraits {
        HeritableTraits {
            temperature_ideal: 20.0,
            temperature_range: 5.0,
            resilience: 0.5,
            fertility: 2.0,
            mutation_chance: 0.1,
        }
    }

    fn env(temperature: f64, hazard_rate: f64) -> EnvironmentConditions {
        EnvironmentConditions {
            temperature,
            temperature_min: 0.0,
            temperature_max: 40.0,
            hazard_rate,
            food: 100.0,
        }
    }

    #[test]
    fn food_requirement_follows_formula() {
        let organism = Organism::new(traits(), 1);
        // (10 / 40) * 3 * (0.5 + 0.5) * (2 / 2) = 0.75
        let food = organism.compute_food_requirement(&env(20.0, 0.0)).unwrap();
        assert!((food - 0.75).abs() < 1e-12);
    }

    #[test]
    fn food_requirement_grows_with_costly_traits() {
        let base = Organism::new(traits(), 1)
            .compute_food_requirement(&env(20.0, 0.0))
            .unwrap();
        for tweak in [
            HeritableTraits { resilience: 0.9, ..traits() },
            HeritableTraits { fertility: 4.0, ..traits() },
            HeritableTraits { temperature_range: 8.0, ..traits() },
        ] {
            let food = Organism::new(tweak, 1)
                .compute_food_requirement(&env(20.0, 0.0))
                .unwrap();
            assert!(food > base, "{food} should exceed {base}");
        }
    }

    #[test]
    fn zero_temperature_span_is_a_domain_error() {
        let organism = Organism::new(traits(), 1);
        let flat = EnvironmentConditions {
            temperature_min: 20.0,
            temperature_max: 20.0,
            ..env(20.0, 0.0)
        };
        assert!(matches!(
            organism.compute_food_requirement(&flat),
            Err(OrganismError::DegenerateTemperatureSpan { .. })
        ));
    }

    #[test]
    fn fitness_inside_band_with_full_bonus() {
        let organism = Organism::new(traits(), 1);
        assert_eq!(organism.compute_fitness(&env(20.0, 0.0)), 1.0);
    }

    #[test]
    fn fitness_band_edges_are_inclusive() {
        let organism = Organism::new(traits(), 1);
        assert_eq!(organism.compute_fitness(&env(15.0, 0.5)), 0.75);
        assert_eq!(organism.compute_fitness(&env(25.0, 0.5)), 0.75);
    }

    #[test]
    fn fitness_outside_band_without_bonus() {
        let organism = Organism::new(traits(), 1);
        assert_eq!(organism.compute_fitness(&env(30.0, 0.9)), 0.25);
    }

    #[test]
    fn partial_bonus_is_difference() {
        let organism = Organism::new(traits(), 1);
        let fitness = organism.compute_fitness(&env(35.0, 0.4));
        assert!((fitness - 0.35).abs() < 1e-12);
    }

    #[test]
    fn fitness_always_within_bounds() {
        for resilience in [-1.0, 0.0, 0.1, 0.3, 2.0] {
            for hazard in [-0.5, 0.0, 0.2, 1.0] {
                for temperature in [-10.0, 15.0, 20.0, 50.0] {
                    let organism = Organism::new(HeritableTraits { resilience, ..traits() }, 1);
                    let fitness = organism.compute_fitness(&env(temperature, hazard));
                    assert!((0.25..=1.0).contains(&fitness), "fitness {fitness} out of bounds");
                }
            }
        }
    }

    #[test]
    fn survival_requires_score() {
        let mut organism = Organism::new(traits(), 1);
        assert!(matches!(organism.survival_test(0.5), Err(OrganismError::NotScored)));
    }

    #[test]
    fn survival_compares_fitness_with_draw() {
        let mut organism = Organism::new(traits(), 1);
        organism.score(&env(30.0, 1.0)).unwrap(); // fitness 0.25
        assert!(organism.survival_test(0.25).unwrap());
        assert!(!organism.survival_test(0.26).unwrap());
        assert!(!organism.survives());

        // Rescoring starts a new generation.
        organism.score(&env(20.0, 0.0)).unwrap();
        assert!(organism.survives());
        assert!(organism.survival_test(0.999).unwrap());
    }
}
