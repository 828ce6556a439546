//! Enumeration types for the evosim simulator.

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Environment attributes
// ---------------------------------------------------------------------------

/// A scalar environmental quantity driven by its own bounded random walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AttributeKind {
    /// Ambient temperature, compared against each organism's tolerance band.
    Temperature,
    /// Hazard rate, subtracted from resilience when computing fitness.
    HazardRate,
    /// Food budget available for reproduction in a generation.
    Food,
}

impl AttributeKind {
    /// Every attribute an ecosystem requires, in derivation order.
    pub const ALL: [Self; 3] = [Self::Temperature, Self::HazardRate, Self::Food];

    /// The configuration key for this attribute.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::HazardRate => "hazard_rate",
            Self::Food => "food",
        }
    }

    /// Look up an attribute by its configuration key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Stable index used for seed derivation.
    pub const fn index(self) -> u64 {
        match self {
            Self::Temperature => 0,
            Self::HazardRate => 1,
            Self::Food => 2,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Heritable traits
// ---------------------------------------------------------------------------

/// One of the five heritable, real-valued organism traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TraitKind {
    /// Temperature at the centre of the organism's tolerance band.
    TemperatureIdeal,
    /// Half-width of the tolerance band around the ideal temperature.
    TemperatureRange,
    /// Resistance against the ecosystem hazard rate.
    Resilience,
    /// Reproductive output; a pair's offspring count is the rounded mean.
    Fertility,
    /// Probability that a crossed-over trait is mutated.
    MutationChance,
}

impl TraitKind {
    /// Every heritable trait, in crossover and sampling order.
    pub const ALL: [Self; 5] = [
        Self::TemperatureIdeal,
        Self::TemperatureRange,
        Self::Resilience,
        Self::Fertility,
        Self::MutationChance,
    ];

    /// The configuration key and column prefix for this trait.
    pub const fn name(self) -> &'static str {
        match self {
            Self::TemperatureIdeal => "temperature_ideal",
            Self::TemperatureRange => "temperature_range",
            Self::Resilience => "resilience",
            Self::Fertility => "fertility",
            Self::MutationChance => "mutation_chance",
        }
    }

    /// Look up a trait by its configuration key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Stable index used for seed derivation.
    pub const fn index(self) -> u64 {
        match self {
            Self::TemperatureIdeal => 0,
            Self::TemperatureRange => 1,
            Self::Resilience => 2,
            Self::Fertility => 3,
            Self::MutationChance => 4,
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Run outcome
// ---------------------------------------------------------------------------

/// Why a simulation run stopped.
///
/// Neither variant is an error: a halted run returns its (shorter) record
/// sequence normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SimulationEndReason {
    /// Every requested generation was executed.
    Completed {
        /// Number of generations executed.
        generations: u32,
    },
    /// Fewer than two organisms survived a generation.
    Halted {
        /// The generation in which the population collapsed.
        generation: u32,
        /// Number of survivors in that generation.
        survivors: u32,
    },
}

impl SimulationEndReason {
    /// Return `true` if the run stopped before the requested generation count.
    pub const fn is_halted(&self) -> bool {
        matches!(self, Self::Halted { .. })
    }
}
