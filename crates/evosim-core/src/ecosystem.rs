//! The ecosystem: environment processes, the living population, and the
//! lifecycle state of a run.
//!
//! An [`Ecosystem`] moves through a fixed sequence of states:
//!
//! ```text
//! Configured --initialize_organisms--> Initialized --run--> Running
//!     Running --last generation--> Completed
//!     Running --fewer than two survivors--> Halted
//! ```
//!
//! `Completed` and `Halted` are terminal. The per-generation step lives in
//! [`generation`](crate::generation) and the loop in
//! [`runner`](crate::runner).

use std::collections::BTreeMap;
use std::fmt;

use evosim_organisms::{Organism, OrganismError, ReproductionConfig, TraitDistributions};
use evosim_types::{AttributeKind, EnvironmentConditions};
use evosim_world::{AttributeParams, AttributeProcess, SeedStream, SeedTree, WorldError};
use rand_chacha::ChaCha12Rng;
use tracing::{debug, info};

use crate::config::{ConfigError, SimulationConfig};

/// Errors raised by ecosystem construction and the generation step.
#[derive(Debug, thiserror::Error)]
pub enum EcosystemError {
    /// A required environment attribute was not configured.
    #[error("required attribute {0} was not found in the ecosystem attributes")]
    MissingAttribute(AttributeKind),

    /// The temperature support has no width, so food requirements are
    /// undefined.
    #[error("temperature max_value must exceed min_value, got span {span}")]
    DegenerateTemperatureSpan {
        /// `temperature.max_value - temperature.min_value`.
        span: f64,
    },

    /// An operation was attempted in a state that does not allow it.
    #[error("cannot {operation} while the ecosystem is {state}")]
    InvalidState {
        /// The operation that was rejected.
        operation: &'static str,
        /// The state the ecosystem was in.
        state: EcosystemState,
    },

    /// A population larger than the platform can index was requested.
    #[error("population size {size} is too large")]
    PopulationTooLarge {
        /// The requested size.
        size: u32,
    },

    /// Configuration could not be resolved.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// An attribute process failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Scoring or reproducing an organism failed.
    #[error("organism error: {source}")]
    Organism {
        /// The underlying organism error.
        #[from]
        source: OrganismError,
    },
}

/// Lifecycle state of an [`Ecosystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcosystemState {
    /// Attributes are configured; no population yet.
    Configured,
    /// A seed population is present; ready to run.
    Initialized,
    /// Generations are being executed.
    Running {
        /// The generation currently executing or last executed.
        generation: u32,
    },
    /// Every requested generation ran.
    Completed,
    /// The run stopped early because fewer than two organisms survived.
    Halted {
        /// The generation at which the run stopped.
        generation: u32,
    },
}

impl EcosystemState {
    /// Whether no further generations can run.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Halted { .. })
    }
}

impl fmt::Display for EcosystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => f.write_str("configured"),
            Self::Initialized => f.write_str("initialized"),
            Self::Running { generation } => write!(f, "running generation {generation}"),
            Self::Completed => f.write_str("completed"),
            Self::Halted { generation } => write!(f, "halted at generation {generation}"),
        }
    }
}

/// The three environment processes, one per [`AttributeKind`].
#[derive(Debug, Clone)]
pub struct Attributes {
    /// Temperature process.
    pub temperature: AttributeProcess,
    /// Hazard rate process.
    pub hazard_rate: AttributeProcess,
    /// Food budget process.
    pub food: AttributeProcess,
}

impl Attributes {
    /// Access the process for one attribute.
    pub const fn get(&self, kind: AttributeKind) -> &AttributeProcess {
        match kind {
            AttributeKind::Temperature => &self.temperature,
            AttributeKind::HazardRate => &self.hazard_rate,
            AttributeKind::Food => &self.food,
        }
    }

    const fn get_mut(&mut self, kind: AttributeKind) -> &mut AttributeProcess {
        match kind {
            AttributeKind::Temperature => &mut self.temperature,
            AttributeKind::HazardRate => &mut self.hazard_rate,
            AttributeKind::Food => &mut self.food,
        }
    }
}

/// A population of organisms living in a shared, changing environment.
#[derive(Debug, Clone)]
pub struct Ecosystem {
    /// Environment processes.
    pub(crate) attributes: Attributes,
    /// The current population, absent until initialized.
    pub(crate) organisms: Option<Vec<Organism>>,
    /// Food consumed by admitted reproducers in the current generation.
    pub(crate) utilized_food: f64,
    /// Lifecycle state.
    pub(crate) state: EcosystemState,
    /// Crossover and mutation parameters.
    pub(crate) reproduction: ReproductionConfig,
    /// Seed tree every stream of the run is derived from.
    pub(crate) seeds: SeedTree,
    /// Survival draws and pool shuffles.
    pub(crate) rng: ChaCha12Rng,
}

impl Ecosystem {
    /// Build an ecosystem from resolved attribute parameters.
    ///
    /// Every attribute in [`AttributeKind::ALL`] must be present. Each
    /// process gets its own stream derived from `root_seed`.
    ///
    /// # Errors
    ///
    /// Returns [`EcosystemError::MissingAttribute`] for an incomplete map,
    /// [`EcosystemError::DegenerateTemperatureSpan`] when the temperature
    /// bounds coincide or are inverted, and
    /// [`EcosystemError::Organism`] for invalid reproduction parameters.
    pub fn new(
        params: &BTreeMap<AttributeKind, AttributeParams>,
        reproduction: ReproductionConfig,
        root_seed: u64,
    ) -> Result<Self, EcosystemError> {
        reproduction.validate()?;
        let seeds = SeedTree::new(root_seed);

        let build = |kind: AttributeKind| -> Result<AttributeProcess, EcosystemError> {
            let resolved = params
                .get(&kind)
                .ok_or(EcosystemError::MissingAttribute(kind))?;
            Ok(AttributeProcess::new(
                kind,
                *resolved,
                seeds.derive(SeedStream::Attribute(kind)),
            )?)
        };
        let attributes = Attributes {
            temperature: build(AttributeKind::Temperature)?,
            hazard_rate: build(AttributeKind::HazardRate)?,
            food: build(AttributeKind::Food)?,
        };

        let span = attributes.temperature.max_value() - attributes.temperature.min_value();
        if span.is_nan() || span <= 0.0 {
            return Err(EcosystemError::DegenerateTemperatureSpan { span });
        }

        info!(root_seed, "Ecosystem configured");

        Ok(Self {
            attributes,
            organisms: None,
            utilized_food: 0.0,
            state: EcosystemState::Configured,
            reproduction,
            rng: seeds.rng(SeedStream::Ecosystem),
            seeds,
        })
    }

    /// Build an ecosystem from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcosystemError::Config`] if attribute or reproduction
    /// parameters cannot be resolved, plus every error of
    /// [`Ecosystem::new`].
    pub fn from_config(config: &SimulationConfig, root_seed: u64) -> Result<Self, EcosystemError> {
        let params = config.attribute_params()?;
        let reproduction = config.reproduction_config()?;
        Self::new(&params, reproduction, root_seed)
    }

    /// Sample a seed population of `n` organisms.
    ///
    /// # Errors
    ///
    /// Returns [`EcosystemError::InvalidState`] unless the ecosystem is
    /// [`EcosystemState::Configured`].
    pub fn initialize_organisms(
        &mut self,
        distributions: &TraitDistributions,
        n: u32,
    ) -> Result<(), EcosystemError> {
        let size = usize::try_from(n).map_err(|_overflow| EcosystemError::PopulationTooLarge { size: n })?;
        let organisms = distributions.sample_population(size, &self.seeds);
        self.set_organisms(organisms)
    }

    /// Install an explicit seed population.
    ///
    /// # Errors
    ///
    /// Returns [`EcosystemError::InvalidState`] unless the ecosystem is
    /// [`EcosystemState::Configured`].
    pub fn set_organisms(&mut self, organisms: Vec<Organism>) -> Result<(), EcosystemError> {
        self.require(EcosystemState::Configured, "initialize organisms")?;
        debug!(population = organisms.len(), "Seed population installed");
        self.organisms = Some(organisms);
        self.state = EcosystemState::Initialized;
        Ok(())
    }

    /// Generate a fresh `n`-step sequence for every attribute.
    pub fn initialize_attribute_values(&mut self, n: usize) {
        for kind in AttributeKind::ALL {
            self.attributes.get_mut(kind).generate_sequence(n);
        }
    }

    /// Advance every attribute to step `index` and return the resulting
    /// conditions.
    ///
    /// # Errors
    ///
    /// Returns [`EcosystemError::World`] if `index` is past the end of a
    /// generated sequence.
    pub fn step_attributes(&mut self, index: usize) -> Result<EnvironmentConditions, EcosystemError> {
        let temperature = self.attributes.temperature.step_to(index)?;
        let hazard_rate = self.attributes.hazard_rate.step_to(index)?;
        let food = self.attributes.food.step_to(index)?;
        Ok(EnvironmentConditions {
            temperature,
            temperature_min: self.attributes.temperature.min_value(),
            temperature_max: self.attributes.temperature.max_value(),
            hazard_rate,
            food,
        })
    }

    /// Conditions at the last step, absent before the first step.
    pub fn conditions(&self) -> Option<EnvironmentConditions> {
        Some(EnvironmentConditions {
            temperature: self.attributes.temperature.current_value()?,
            temperature_min: self.attributes.temperature.min_value(),
            temperature_max: self.attributes.temperature.max_value(),
            hazard_rate: self.attributes.hazard_rate.current_value()?,
            food: self.attributes.food.current_value()?,
        })
    }

    /// The environment processes.
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The current population, absent until initialized.
    pub fn organisms(&self) -> Option<&[Organism]> {
        self.organisms.as_deref()
    }

    /// Food consumed by admitted reproducers in the generation in progress.
    ///
    /// Zero between generations; the per-generation total is reported in
    /// [`GenerationSummary::utilized_food`](crate::generation::GenerationSummary::utilized_food).
    pub const fn utilized_food(&self) -> f64 {
        self.utilized_food
    }

    /// Lifecycle state.
    pub const fn state(&self) -> EcosystemState {
        self.state
    }

    /// Crossover and mutation parameters.
    pub const fn reproduction(&self) -> &ReproductionConfig {
        &self.reproduction
    }

    /// Root seed of the run.
    pub const fn root_seed(&self) -> u64 {
        self.seeds.root()
    }

    /// Check the state before an operation.
    pub(crate) fn require(
        &self,
        expected: EcosystemState,
        operation: &'static str,
    ) -> Result<(), EcosystemError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EcosystemError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}
