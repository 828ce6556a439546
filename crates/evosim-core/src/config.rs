//! Configuration loading and typed config structures for the evosim simulator.
//!
//! The canonical configuration lives in `evosim-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, provides a
//! loader, and resolves optional fields into fully specified parameters in a
//! single pure step before a run starts.

use std::collections::BTreeMap;
use std::path::Path;

use evosim_organisms::{OrganismError, ReproductionConfig, TraitDistributions};
use evosim_types::{AttributeKind, TraitKind};
use evosim_world::{AttributeParams, TruncatedNormal, WorldError};
use rand::Rng;
use serde::Deserialize;
use tracing::warn;

/// Environment variable that overrides `simulation.random_seed`.
pub const RANDOM_SEED_ENV: &str = "EVOSIM_RANDOM_SEED";

/// Errors that can occur when loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment variable override could not be parsed.
    #[error("invalid value {value:?} for {variable}")]
    InvalidOverride {
        /// The environment variable.
        variable: &'static str,
        /// The rejected value.
        value: String,
    },

    /// An attribute's parameters failed validation.
    #[error("invalid parameters for attribute {attribute}: {source}")]
    Attribute {
        /// The attribute whose parameters were rejected.
        attribute: AttributeKind,
        /// The underlying world error.
        source: WorldError,
    },

    /// A trait's distribution parameters failed validation.
    #[error("invalid distribution for trait {trait_kind}: {source}")]
    TraitDistribution {
        /// The trait whose distribution was rejected.
        trait_kind: TraitKind,
        /// The underlying world error.
        source: WorldError,
    },

    /// The trait distributions are incomplete or reproduction parameters
    /// are invalid.
    #[error("organism config error: {source}")]
    Organism {
        /// The underlying organism error.
        #[from]
        source: OrganismError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `evosim-config.yaml`. Every section has
/// defaults, so an empty file describes a runnable simulation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Run length, population size, and seed.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Environment attribute parameters keyed by attribute name.
    #[serde(default = "default_environment")]
    pub environment: BTreeMap<String, AttributeConfig>,

    /// Seed population trait distributions keyed by trait name.
    #[serde(default = "default_organisms")]
    pub organisms: BTreeMap<String, TraitDistributionConfig>,

    /// Crossover and mutation parameters.
    #[serde(default)]
    pub reproduction: ReproductionSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulation: RunConfig::default(),
            environment: default_environment(),
            organisms: default_organisms(),
            reproduction: ReproductionSection::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// The `EVOSIM_RANDOM_SEED` environment variable overrides
    /// `simulation.random_seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if the override is not a `u64`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)?.with_env_overrides()
    }

    /// Apply environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `EVOSIM_RANDOM_SEED` is
    /// set but is not a `u64`.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        self.simulation.apply_env_overrides()?;
        Ok(self)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Resolve every known environment attribute into validated parameters.
    ///
    /// Unknown keys are ignored with a warning. Missing attributes are not
    /// reported here; the ecosystem rejects an incomplete set when it is
    /// constructed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Attribute`] if an attribute's parameters are
    /// invalid.
    pub fn attribute_params(&self) -> Result<BTreeMap<AttributeKind, AttributeParams>, ConfigError> {
        let mut params = BTreeMap::new();
        for (name, attribute) in &self.environment {
            let Some(kind) = AttributeKind::from_name(name) else {
                warn!(attribute = name, "Ignoring unknown environment attribute");
                continue;
            };
            let resolved = attribute
                .resolve()
                .map_err(|source| ConfigError::Attribute {
                    attribute: kind,
                    source,
                })?;
            params.insert(kind, resolved);
        }
        Ok(params)
    }

    /// Build the seed population's trait distributions.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TraitDistribution`] for invalid parameters and
    /// [`ConfigError::Organism`] if any trait is missing.
    pub fn trait_distributions(&self) -> Result<TraitDistributions, ConfigError> {
        let mut distributions = BTreeMap::new();
        for (name, distribution) in &self.organisms {
            let Some(kind) = TraitKind::from_name(name) else {
                warn!(trait_name = name, "Ignoring unknown organism trait");
                continue;
            };
            let built = distribution
                .build()
                .map_err(|source| ConfigError::TraitDistribution {
                    trait_kind: kind,
                    source,
                })?;
            distributions.insert(kind, built);
        }
        Ok(TraitDistributions::new(distributions)?)
    }

    /// Reproduction parameters, validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Organism`] if the mutation range is invalid.
    pub fn reproduction_config(&self) -> Result<ReproductionConfig, ConfigError> {
        let config = ReproductionConfig {
            mutation_range: self.reproduction.mutation_range,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Run-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Number of organisms in the seed population.
    #[serde(default = "default_population_size")]
    pub population_size: u32,

    /// Number of generations to simulate.
    #[serde(default = "default_generations")]
    pub generations: u32,

    /// Root seed; drawn at random when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generations: default_generations(),
            random_seed: None,
        }
    }
}

impl RunConfig {
    /// Return the configured root seed, or draw one from the thread RNG.
    ///
    /// Callers should log the returned seed so that unseeded runs can be
    /// replayed.
    pub fn root_seed(&self) -> u64 {
        self.random_seed.unwrap_or_else(|| rand::rng().random())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = std::env::var(RANDOM_SEED_ENV) {
            let seed = value
                .trim()
                .parse::<u64>()
                .map_err(|_parse_error| ConfigError::InvalidOverride {
                    variable: RANDOM_SEED_ENV,
                    value: value.clone(),
                })?;
            self.random_seed = Some(seed);
        }
        Ok(())
    }
}

/// Parameters of one environment attribute.
///
/// `min_value` and `max_value` default to three standard deviations around
/// the mean and `volatility` defaults to `std`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AttributeConfig {
    /// Mean of the underlying normal.
    pub mean: f64,
    /// Standard deviation of the underlying normal.
    pub std: f64,
    /// Lower bound.
    #[serde(default)]
    pub min_value: Option<f64>,
    /// Upper bound.
    #[serde(default)]
    pub max_value: Option<f64>,
    /// Largest change between consecutive generations.
    #[serde(default)]
    pub volatility: Option<f64>,
}

impl AttributeConfig {
    /// Resolve defaults into validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidParameters`] for invalid values.
    pub fn resolve(&self) -> Result<AttributeParams, WorldError> {
        let params = AttributeParams::resolve(
            self.mean,
            self.std,
            self.min_value,
            self.max_value,
            self.volatility,
        )?;
        // Reject bad bounds here rather than when the ecosystem is built.
        TruncatedNormal::new(params.mean, params.std, params.min_value, params.max_value)?;
        Ok(params)
    }
}

/// Truncated normal parameters for one heritable trait.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TraitDistributionConfig {
    /// Mean of the underlying normal.
    pub mean: f64,
    /// Standard deviation of the underlying normal.
    pub std: f64,
    /// Lower bound.
    pub min_value: f64,
    /// Upper bound.
    pub max_value: f64,
}

impl TraitDistributionConfig {
    /// Build the sampling distribution.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidParameters`] for invalid values.
    pub fn build(&self) -> Result<TruncatedNormal, WorldError> {
        TruncatedNormal::new(self.mean, self.std, self.min_value, self.max_value)
    }
}

/// Reproduction configuration section.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ReproductionSection {
    /// Maximum relative deviation caused by a mutation.
    #[serde(default = "default_mutation_range")]
    pub mutation_range: f64,
}

impl Default for ReproductionSection {
    fn default() -> Self {
        Self {
            mutation_range: default_mutation_range(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_population_size() -> u32 {
    100
}

const fn default_generations() -> u32 {
    100
}

const fn default_mutation_range() -> f64 {
    evosim_organisms::DEFAULT_MUTATION_RANGE
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_environment() -> BTreeMap<String, AttributeConfig> {
    let mut m = BTreeMap::new();
    m.insert(
        "temperature".to_owned(),
        AttributeConfig {
            mean: 20.0,
            std: 5.0,
            min_value: None,
            max_value: None,
            volatility: Some(2.0),
        },
    );
    m.insert(
        "hazard_rate".to_owned(),
        AttributeConfig {
            mean: 0.3,
            std: 0.1,
            min_value: Some(0.0),
            max_value: Some(1.0),
            volatility: Some(0.05),
        },
    );
    m.insert(
        "food".to_owned(),
        AttributeConfig {
            mean: 50.0,
            std: 10.0,
            min_value: Some(0.0),
            max_value: None,
            volatility: Some(5.0),
        },
    );
    m
}

fn default_organisms() -> BTreeMap<String, TraitDistributionConfig> {
    let mut m = BTreeMap::new();
    m.insert(
        "temperature_ideal".to_owned(),
        TraitDistributionConfig {
            mean: 20.0,
            std: 5.0,
            min_value: 0.0,
            max_value: 40.0,
        },
    );
    m.insert(
        "temperature_range".to_owned(),
        TraitDistributionConfig {
            mean: 5.0,
            std: 2.0,
            min_value: 0.0,
            max_value: 15.0,
        },
    );
    m.insert(
        "resilience".to_owned(),
        TraitDistributionConfig {
            mean: 0.3,
            std: 0.1,
            min_value: 0.0,
            max_value: 1.0,
        },
    );
    m.insert(
        "fertility".to_owned(),
        TraitDistributionConfig {
            mean: 2.5,
            std: 1.0,
            min_value: 0.0,
            max_value: 6.0,
        },
    );
    m.insert(
        "mutation_chance".to_owned(),
        TraitDistributionConfig {
            mean: 0.1,
            std: 0.05,
            min_value: 0.0,
            max_value: 1.0,
        },
    );
    m
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.simulation.population_size, 100);
        assert_eq!(config.simulation.generations, 100);
        assert_eq!(config.environment.len(), 3);
        assert_eq!(config.organisms.len(), 5);
        assert_eq!(config.attribute_params().unwrap().len(), 3);
        assert!(config.trait_distributions().is_ok());
        assert!(config.reproduction_config().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
simulation:
  population_size: 40
  generations: 25
  random_seed: 1234

environment:
  temperature:
    mean: 15.0
    std: 3.0
    volatility: 1.0
  hazard_rate:
    mean: 0.2
    std: 0.05
    min_value: 0.0
    max_value: 0.5
  food:
    mean: 30.0
    std: 5.0

organisms:
  temperature_ideal: { mean: 15.0, std: 4.0, min_value: 0.0, max_value: 30.0 }
  temperature_range: { mean: 4.0, std: 1.0, min_value: 0.5, max_value: 10.0 }
  resilience: { mean: 0.25, std: 0.1, min_value: 0.0, max_value: 1.0 }
  fertility: { mean: 2.0, std: 0.5, min_value: 0.0, max_value: 5.0 }
  mutation_chance: { mean: 0.05, std: 0.02, min_value: 0.0, max_value: 1.0 }

reproduction:
  mutation_range: 0.2

logging:
  level: debug
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.simulation.population_size, 40);
        assert_eq!(config.simulation.generations, 25);
        assert_eq!(config.simulation.random_seed, Some(1234));
        assert_eq!(config.reproduction.mutation_range, 0.2);
        assert_eq!(config.logging.level, "debug");

        let params = config.attribute_params().unwrap();
        let temperature = params.get(&AttributeKind::Temperature).unwrap();
        assert_eq!(temperature.min_value, 6.0);
        assert_eq!(temperature.max_value, 24.0);
        assert_eq!(temperature.volatility, 1.0);
        let food = params.get(&AttributeKind::Food).unwrap();
        assert_eq!(food.volatility, 5.0);

        let distributions = config.trait_distributions().unwrap();
        let resilience = distributions.get(TraitKind::Resilience).unwrap();
        assert_eq!(resilience.mean(), 0.25);
        assert_eq!(resilience.std(), 0.1);
        assert_eq!(resilience.min_value(), 0.0);
        assert_eq!(resilience.max_value(), 1.0);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("simulation:\n  generations: 7\n").unwrap();
        assert_eq!(config.simulation.generations, 7);
        assert_eq!(config.simulation.population_size, 100);
        assert_eq!(config.environment.len(), 3);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn partial_environment_leaves_attributes_missing() {
        let yaml = "environment:\n  temperature: { mean: 20.0, std: 5.0 }\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        let params = config.attribute_params().unwrap();
        assert!(params.contains_key(&AttributeKind::Temperature));
        assert!(!params.contains_key(&AttributeKind::Food));
    }

    #[test]
    fn missing_trait_is_a_config_error() {
        let yaml = "organisms:\n  fertility: { mean: 2.0, std: 1.0, min_value: 0.0, max_value: 4.0 }\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(matches!(
            config.trait_distributions(),
            Err(ConfigError::Organism {
                source: OrganismError::MissingTrait(_)
            })
        ));
    }

    #[test]
    fn trait_distribution_requires_bounds() {
        let yaml = "organisms:\n  fertility: { mean: 2.0, std: 1.0 }\n";
        assert!(SimulationConfig::parse(yaml).is_err());
    }

    #[test]
    fn inverted_attribute_bounds_are_rejected() {
        let yaml = "environment:\n  food: { mean: 10.0, std: 1.0, min_value: 5.0, max_value: 1.0 }\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert!(matches!(
            config.attribute_params(),
            Err(ConfigError::Attribute {
                attribute: AttributeKind::Food,
                ..
            })
        ));
    }

    #[test]
    fn unknown_attribute_is_ignored() {
        let mut config = SimulationConfig::default();
        config.environment.insert(
            "humidity".to_owned(),
            AttributeConfig {
                mean: 1.0,
                std: 0.1,
                min_value: None,
                max_value: None,
                volatility: None,
            },
        );
        assert_eq!(config.attribute_params().unwrap().len(), 3);
    }

    #[test]
    fn negative_mutation_range_is_rejected() {
        let config = SimulationConfig::parse("reproduction:\n  mutation_range: -1.0\n").unwrap();
        assert!(config.reproduction_config().is_err());
    }

    #[test]
    fn explicit_seed_is_used() {
        let run = RunConfig {
            random_seed: Some(9),
            ..RunConfig::default()
        };
        assert_eq!(run.root_seed(), 9);
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("evosim-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
