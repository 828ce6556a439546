//! Generation callback that traces per-generation progress.

use evosim_core::{Ecosystem, GenerationCallback, GenerationSummary};
use tracing::debug;

/// Callback that logs a line per generation and tracks population extremes.
#[derive(Debug, Default)]
pub struct ProgressCallback {
    /// Largest population scored in any generation.
    pub peak_population: u32,
    /// Generations observed.
    pub generations: u32,
}

impl GenerationCallback for ProgressCallback {
    fn on_generation(&mut self, summary: &GenerationSummary, ecosystem: &Ecosystem) {
        self.peak_population = self.peak_population.max(summary.record.number_organisms);
        self.generations = self.generations.saturating_add(1);
        debug!(
            generation = summary.generation,
            population = summary.record.number_organisms,
            survivors = summary.survivors,
            admitted = summary.admitted,
            pairs = summary.pairs,
            offspring = summary.offspring,
            utilized_food = summary.utilized_food,
            state = %ecosystem.state(),
            "Generation progress"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use evosim_core::{SimulationConfig, run_simulation};

    use super::*;

    #[test]
    fn counts_generations_and_peak_population() {
        let config = SimulationConfig::default();
        let mut ecosystem = Ecosystem::from_config(&config, 5).unwrap();
        let distributions = config.trait_distributions().unwrap();
        ecosystem.initialize_organisms(&distributions, 30).unwrap();

        let mut callback = ProgressCallback::default();
        let result = run_simulation(&mut ecosystem, 6, &mut callback).unwrap();

        assert_eq!(
            usize::try_from(callback.generations).unwrap(),
            result.history.len()
        );
        let peak = result
            .records()
            .iter()
            .map(|r| r.number_organisms)
            .max()
            .unwrap();
        assert_eq!(callback.peak_population, peak);
    }
}
