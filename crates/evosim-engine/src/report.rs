//! JSON report written to stdout at the end of a run.

use evosim_core::{EvolutionTable, SimulationResult};
use evosim_types::SimulationEndReason;
use serde::Serialize;

/// Everything a run produces, in serializable form.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Root seed the run was derived from.
    pub root_seed: u64,
    /// Why the run stopped.
    pub end_reason: SimulationEndReason,
    /// Largest population scored in any generation.
    pub peak_population: u32,
    /// One column per record field, one row per generation.
    pub table: EvolutionTable,
}

impl RunReport {
    /// Materialize the table from a finished run.
    pub fn new(root_seed: u64, result: &SimulationResult, peak_population: u32) -> Self {
        Self {
            root_seed,
            end_reason: result.end_reason,
            peak_population,
            table: result.history.to_table(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use evosim_core::{Ecosystem, SimulationConfig};

    use super::*;

    #[test]
    fn report_serializes_table_and_reason() {
        let mut config = SimulationConfig::default();
        config.simulation.population_size = 20;
        let mut ecosystem = Ecosystem::from_config(&config, 42).unwrap();
        let distributions = config.trait_distributions().unwrap();
        ecosystem.initialize_organisms(&distributions, 20).unwrap();
        let result = ecosystem.simulate_evolution(4).unwrap();

        let report = RunReport::new(42, &result, 20);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json.get("root_seed").unwrap(), 42);
        assert!(json.get("end_reason").unwrap().get("kind").is_some());
        let columns = json
            .get("table")
            .unwrap()
            .get("columns")
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(columns.len(), evosim_types::GenerationRecord::COLUMNS.len());
    }
}
