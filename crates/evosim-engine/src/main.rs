//! Engine binary for the evosim simulator.
//!
//! This is the main entry point that wires together configuration, the
//! ecosystem, and the generation loop, then writes the evolution table to
//! stdout as JSON. Logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `evosim-config.yaml` (or `EVOSIM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Resolve the root seed
//! 4. Build the ecosystem and sample the seed population
//! 5. Run the simulation loop
//! 6. Log the result and write the report

mod error;
mod progress;
mod report;

use std::io::Write as _;
use std::path::PathBuf;

use evosim_core::{Ecosystem, SimulationConfig, runner};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressCallback;
use crate::report::RunReport;

/// Environment variable naming an alternative config file.
const CONFIG_PATH_ENV: &str = "EVOSIM_CONFIG";

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "evosim-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step, the simulation, or the
/// report output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, loaded_from) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("evosim-engine starting");
    match loaded_from {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    // 3. Resolve the root seed.
    let root_seed = config.simulation.root_seed();
    info!(
        root_seed,
        seeded = config.simulation.random_seed.is_some(),
        population_size = config.simulation.population_size,
        generations = config.simulation.generations,
        "Run parameters resolved"
    );

    // 4. Build the ecosystem.
    let report = run(&config, root_seed)?;

    // 6. Write the report.
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &report).map_err(EngineError::from)?;
    writeln!(out)?;

    info!("evosim-engine shutdown complete");
    Ok(())
}

/// Build, seed, and run the ecosystem described by `config`.
fn run(config: &SimulationConfig, root_seed: u64) -> Result<RunReport, EngineError> {
    let mut ecosystem = Ecosystem::from_config(config, root_seed)?;
    let distributions = config.trait_distributions()?;
    ecosystem.initialize_organisms(&distributions, config.simulation.population_size)?;
    info!(
        population = config.simulation.population_size,
        "Seed population sampled"
    );

    // 5. Run the simulation.
    let mut callback = ProgressCallback::default();
    let result =
        runner::run_simulation(&mut ecosystem, config.simulation.generations, &mut callback)?;
    runner::log_simulation_end(&result);
    info!(
        generations_observed = callback.generations,
        peak_population = callback.peak_population,
        "Progress totals"
    );

    Ok(RunReport::new(root_seed, &result, callback.peak_population))
}

/// Load the simulation configuration.
///
/// Uses the path in `EVOSIM_CONFIG` if set, otherwise `evosim-config.yaml`
/// in the working directory. A missing default file means defaults; a
/// missing explicit file is an error.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(explicit);
        let config = SimulationConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = SimulationConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        Ok((SimulationConfig::default().with_env_overrides()?, None))
    }
}
