//! Core value structs shared across the evosim workspace.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AttributeKind, TraitKind};

// ---------------------------------------------------------------------------
// Heritable traits
// ---------------------------------------------------------------------------

/// The heritable genome of an organism.
///
/// Trait values are never modified after an organism is created; offspring
/// receive new values through crossover and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HeritableTraits {
    /// Temperature at the centre of the tolerance band.
    pub temperature_ideal: f64,
    /// Half-width of the tolerance band.
    pub temperature_range: f64,
    /// Resistance against the hazard rate.
    pub resilience: f64,
    /// Reproductive output.
    pub fertility: f64,
    /// Probability of mutating a crossed-over trait.
    pub mutation_chance: f64,
}

impl HeritableTraits {
    /// Build a trait set by evaluating `f` once per trait in [`TraitKind::ALL`]
    /// order. The call order is fixed so that random draws made inside `f`
    /// are reproducible.
    pub fn from_fn(mut f: impl FnMut(TraitKind) -> f64) -> Self {
        let temperature_ideal = f(TraitKind::TemperatureIdeal);
        let temperature_range = f(TraitKind::TemperatureRange);
        let resilience = f(TraitKind::Resilience);
        let fertility = f(TraitKind::Fertility);
        let mutation_chance = f(TraitKind::MutationChance);
        Self {
            temperature_ideal,
            temperature_range,
            resilience,
            fertility,
            mutation_chance,
        }
    }

    /// Return the value of a single trait.
    pub const fn get(&self, kind: TraitKind) -> f64 {
        match kind {
            TraitKind::TemperatureIdeal => self.temperature_ideal,
            TraitKind::TemperatureRange => self.temperature_range,
            TraitKind::Resilience => self.resilience,
            TraitKind::Fertility => self.fertility,
            TraitKind::MutationChance => self.mutation_chance,
        }
    }
}

// ---------------------------------------------------------------------------
// Environment snapshot
// ---------------------------------------------------------------------------

/// The environment as seen by organisms during one generation.
///
/// Built by the ecosystem after every attribute has been stepped to the
/// current generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentConditions {
    /// Current temperature.
    pub temperature: f64,
    /// Lower bound of the temperature process.
    pub temperature_min: f64,
    /// Upper bound of the temperature process.
    pub temperature_max: f64,
    /// Current hazard rate.
    pub hazard_rate: f64,
    /// Current food budget.
    pub food: f64,
}

impl EnvironmentConditions {
    /// Width of the ecosystem's temperature support.
    pub fn temperature_span(&self) -> f64 {
        self.temperature_max - self.temperature_min
    }

    /// Current value of the given attribute.
    pub const fn value(&self, kind: AttributeKind) -> f64 {
        match kind {
            AttributeKind::Temperature => self.temperature,
            AttributeKind::HazardRate => self.hazard_rate,
            AttributeKind::Food => self.food,
        }
    }
}

// ---------------------------------------------------------------------------
// Generation record
// ---------------------------------------------------------------------------

/// Summary of one executed generation.
///
/// Trait, food requirement, and fitness statistics are taken over every
/// organism scored in the generation, survivors and casualties alike.
/// Standard deviations are population standard deviations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GenerationRecord {
    /// Zero-based generation index.
    pub iteration: u32,
    /// Temperature during the generation.
    pub temperature: f64,
    /// Hazard rate during the generation.
    pub hazard_rate: f64,
    /// Food budget during the generation.
    pub available_food: f64,
    /// Number of organisms scored.
    pub number_organisms: u32,
    /// Mean ideal temperature.
    pub temperature_ideal_mean: f64,
    /// Standard deviation of the ideal temperature.
    pub temperature_ideal_std: f64,
    /// Mean tolerance half-width.
    pub temperature_range_mean: f64,
    /// Standard deviation of the tolerance half-width.
    pub temperature_range_std: f64,
    /// Mean resilience.
    pub resilience_mean: f64,
    /// Standard deviation of resilience.
    pub resilience_std: f64,
    /// Mean fertility.
    pub fertility_mean: f64,
    /// Standard deviation of fertility.
    pub fertility_std: f64,
    /// Mean mutation chance.
    pub mutation_chance_mean: f64,
    /// Standard deviation of the mutation chance.
    pub mutation_chance_std: f64,
    /// Mean food requirement.
    pub food_requirement_mean: f64,
    /// Standard deviation of the food requirement.
    pub food_requirement_std: f64,
    /// Mean fitness.
    pub fitness_mean: f64,
    /// Standard deviation of fitness.
    pub fitness_std: f64,
}

impl GenerationRecord {
    /// Column names, in the order returned by [`GenerationRecord::values`].
    pub const COLUMNS: [&'static str; 19] = [
        "iteration",
        "temperature",
        "hazard_rate",
        "available_food",
        "number_organisms",
        "temperature_ideal_mean",
        "temperature_ideal_std",
        "temperature_range_mean",
        "temperature_range_std",
        "resilience_mean",
        "resilience_std",
        "fertility_mean",
        "fertility_std",
        "mutation_chance_mean",
        "mutation_chance_std",
        "food_requirement_mean",
        "food_requirement_std",
        "fitness_mean",
        "fitness_std",
    ];

    /// Every field as a float, aligned with [`GenerationRecord::COLUMNS`].
    pub fn values(&self) -> [f64; 19] {
        [
            f64::from(self.iteration),
            self.temperature,
            self.hazard_rate,
            self.available_food,
            f64::from(self.number_organisms),
            self.temperature_ideal_mean,
            self.temperature_ideal_std,
            self.temperature_range_mean,
            self.temperature_range_std,
            self.resilience_mean,
            self.resilience_std,
            self.fertility_mean,
            self.fertility_std,
            self.mutation_chance_mean,
            self.mutation_chance_std,
            self.food_requirement_mean,
            self.food_requirement_std,
            self.fitness_mean,
            self.fitness_std,
        ]
    }
}
