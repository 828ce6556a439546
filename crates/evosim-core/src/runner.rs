//! Simulation loop runner.
//!
//! This module provides [`run_simulation`], which drives the generation loop
//! from an initialized ecosystem to one of two terminal states:
//!
//! - **Completed**: every requested generation ran
//! - **Halted**: a generation left fewer than two survivors
//!
//! The runner wraps the single-generation [`run_generation`] function and
//! adds the lifecycle checks, attribute sequence generation, and history
//! collection around it.
//!
//! [`run_generation`]: crate::generation::run_generation

use evosim_types::{GenerationRecord, SimulationEndReason};
use tracing::{info, warn};

use crate::ecosystem::{Ecosystem, EcosystemError, EcosystemState};
use crate::generation::{self, GenerationOutcome, GenerationSummary};
use crate::history::GenerationHistory;

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A generation failed, or the ecosystem was not ready to run.
    #[error("ecosystem error: {source}")]
    Ecosystem {
        /// The underlying ecosystem error.
        #[from]
        source: EcosystemError,
    },
}

/// Result of the simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// One record per executed generation.
    pub history: GenerationHistory,
    /// The last generation summary, if any generation ran.
    pub final_summary: Option<GenerationSummary>,
}

impl SimulationResult {
    /// The records of the executed generations.
    pub fn records(&self) -> &[GenerationRecord] {
        self.history.records()
    }
}

/// Callback invoked after each generation completes.
///
/// Implementations can use this to report progress or collect extra
/// diagnostics. The callback receives the generation summary and the
/// ecosystem after the generation's population replacement.
pub trait GenerationCallback {
    /// Called after a generation completes successfully.
    fn on_generation(&mut self, summary: &GenerationSummary, ecosystem: &Ecosystem);
}

/// A no-op generation callback.
pub struct NoOpCallback;

impl GenerationCallback for NoOpCallback {
    fn on_generation(&mut self, _summary: &GenerationSummary, _ecosystem: &Ecosystem) {}
}

/// Run the simulation for up to `generations` generations.
///
/// Generates a fresh `generations`-step sequence for every attribute, then
/// executes generations in order. Stops early, in the halted state, when a
/// generation leaves fewer than two survivors; that generation's record is
/// the last one in the history.
///
/// # Errors
///
/// Returns [`RunnerError::Ecosystem`] if the ecosystem is not
/// [`EcosystemState::Initialized`] or a generation fails.
pub fn run_simulation(
    ecosystem: &mut Ecosystem,
    generations: u32,
    callback: &mut dyn GenerationCallback,
) -> Result<SimulationResult, RunnerError> {
    ecosystem.require(EcosystemState::Initialized, "run the simulation")?;

    let steps = usize::try_from(generations).unwrap_or(usize::MAX);
    ecosystem.initialize_attribute_values(steps);
    ecosystem.state = EcosystemState::Running { generation: 0 };

    info!(
        generations,
        population = ecosystem.organisms().map_or(0, <[_]>::len),
        root_seed = ecosystem.root_seed(),
        "Simulation starting"
    );

    let mut history = GenerationHistory::with_capacity(steps);
    let mut final_summary: Option<GenerationSummary> = None;

    for generation in 0..generations {
        let summary = generation::run_generation(ecosystem, generation)?;
        history.push(summary.record.clone());
        callback.on_generation(&summary, ecosystem);

        if summary.outcome == GenerationOutcome::Halted {
            let end_reason = SimulationEndReason::Halted {
                generation,
                survivors: u32::try_from(summary.survivors).unwrap_or(u32::MAX),
            };
            return Ok(SimulationResult {
                end_reason,
                history,
                final_summary: Some(summary),
            });
        }

        info!(
            generation,
            temperature = summary.conditions.temperature,
            survivors = summary.survivors,
            offspring = summary.offspring,
            fitness_mean = summary.record.fitness_mean,
            "Generation complete"
        );
        final_summary = Some(summary);
    }

    ecosystem.state = EcosystemState::Completed;
    Ok(SimulationResult {
        end_reason: SimulationEndReason::Completed { generations },
        history,
        final_summary,
    })
}

impl Ecosystem {
    /// Run the simulation without a callback and return its result.
    ///
    /// # Errors
    ///
    /// See [`run_simulation`].
    pub fn simulate_evolution(&mut self, generations: u32) -> Result<SimulationResult, RunnerError> {
        run_simulation(self, generations, &mut NoOpCallback)
    }
}

/// Log the simulation end sequence.
///
/// This should be called after [`run_simulation`] returns.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_generations = result.history.len(),
        final_offspring = result.final_summary.as_ref().map(|s| s.offspring),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            generation = summary.generation,
            survivors = summary.survivors,
            fitness_mean = summary.record.fitness_mean,
            fitness_std = summary.record.fitness_std,
            "Final generation summary"
        );
    } else {
        warn!("Simulation ended with no generations executed");
    }
}
