//! Population statistics for generation records.
//!
//! Standard deviations are population standard deviations (divisor `n`).
//! An empty population reports zero for every statistic.

use evosim_organisms::Organism;
use evosim_types::{EnvironmentConditions, GenerationRecord, TraitKind};

/// Mean and population standard deviation of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

/// Summarize a sample. Returns zeros for an empty sample.
#[allow(clippy::cast_precision_loss)]
pub fn summarize(values: &[f64]) -> Summary {
    if values.is_empty() {
        return Summary::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    Summary {
        mean,
        std: variance.sqrt(),
    }
}

/// Build the record for one generation from its conditions and the scored
/// population.
///
/// Unscored organisms contribute zero fitness and food requirement.
pub fn build_record(
    iteration: u32,
    conditions: &EnvironmentConditions,
    organisms: &[Organism],
) -> GenerationRecord {
    let column = |kind: TraitKind| -> Summary {
        let values: Vec<f64> = organisms.iter().map(|o| o.traits().get(kind)).collect();
        summarize(&values)
    };
    let food: Vec<f64> = organisms
        .iter()
        .map(|o| o.food_requirement().unwrap_or(0.0))
        .collect();
    let fitness: Vec<f64> = organisms
        .iter()
        .map(|o| o.fitness().unwrap_or(0.0))
        .collect();

    let temperature_ideal = column(TraitKind::TemperatureIdeal);
    let temperature_range = column(TraitKind::TemperatureRange);
    let resilience = column(TraitKind::Resilience);
    let fertility = column(TraitKind::Fertility);
    let mutation_chance = column(TraitKind::MutationChance);
    let food_requirement = summarize(&food);
    let fitness = summarize(&fitness);

    GenerationRecord {
        iteration,
        temperature: conditions.temperature,
        hazard_rate: conditions.hazard_rate,
        available_food: conditions.food,
        number_organisms: u32::try_from(organisms.len()).unwrap_or(u32::MAX),
        temperature_ideal_mean: temperature_ideal.mean,
        temperature_ideal_std: temperature_ideal.std,
        temperature_range_mean: temperature_range.mean,
        temperature_range_std: temperature_range.std,
        resilience_mean: resilience.mean,
        resilience_std: resilience.std,
        fertility_mean: fertility.mean,
        fertility_std: fertility.std,
        mutation_chance_mean: mutation_chance.mean,
        mutation_chance_std: mutation_chance.std,
        food_requirement_mean: food_requirement.mean,
        food_requirement_std: food_requirement.std,
        fitness_mean: fitness.mean,
        fitness_std: fitness.std,
    }
}
