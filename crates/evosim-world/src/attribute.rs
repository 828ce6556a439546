//! Environment attribute processes.
//!
//! An [`AttributeProcess`] drives one scalar environmental quantity across a
//! simulation run. The full sequence is generated up front: `n` independent
//! draws from a [`TruncatedNormal`] are turned into a first-order bounded
//! random walk by a correction pass, and the ecosystem steps through the
//! result one generation at a time.
//!
//! # Bounding Correction
//!
//! The first draw is kept as-is. Each later draw is accepted unmodified if it
//! lies within `volatility` of the previous corrected value; otherwise it is
//! pulled back to `previous ± volatility` in the direction of the draw. The
//! walk therefore never jumps by more than `volatility` between generations
//! and never leaves `[min_value, max_value]`.

use evosim_types::AttributeKind;
use rand_chacha::ChaCha12Rng;
use tracing::debug;

use crate::distribution::TruncatedNormal;
use crate::error::WorldError;
use crate::seed::rng_from_seed;

/// Number of standard deviations used for default bounds.
const DEFAULT_BOUND_STDS: f64 = 3.0;

/// Fully resolved parameters of an attribute process.
///
/// Produced once from configuration by [`AttributeParams::resolve`]; the
/// defaults are never re-derived during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeParams {
    /// Mean of the underlying normal.
    pub mean: f64,
    /// Standard deviation of the underlying normal.
    pub std: f64,
    /// Lower bound of every generated value.
    pub min_value: f64,
    /// Upper bound of every generated value.
    pub max_value: f64,
    /// Largest permitted change between consecutive generations.
    pub volatility: f64,
}

impl AttributeParams {
    /// Fill in defaults and validate.
    ///
    /// `min_value` and `max_value` default to `mean ∓ 3·std`; `volatility`
    /// defaults to `std`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidParameters`] for a negative or non-finite
    /// `volatility`; distribution checks are applied when the process is
    /// built.
    pub fn resolve(
        mean: f64,
        std: f64,
        min_value: Option<f64>,
        max_value: Option<f64>,
        volatility: Option<f64>,
    ) -> Result<Self, WorldError> {
        let min_value = min_value.unwrap_or_else(|| DEFAULT_BOUND_STDS.mul_add(-std, mean));
        let max_value = max_value.unwrap_or_else(|| DEFAULT_BOUND_STDS.mul_add(std, mean));
        let volatility = volatility.unwrap_or(std);

        if !volatility.is_finite() || volatility < 0.0 {
            return Err(WorldError::InvalidParameters {
                reason: format!("volatility must be finite and non-negative, got {volatility}"),
            });
        }

        Ok(Self {
            mean,
            std,
            min_value,
            max_value,
            volatility,
        })
    }
}

/// A pre-generated, volatility-bounded time series for one attribute.
#[derive(Debug, Clone)]
pub struct AttributeProcess {
    /// Which attribute this process drives.
    kind: AttributeKind,
    /// Resolved parameters.
    params: AttributeParams,
    /// Marginal distribution of the raw draws.
    distribution: TruncatedNormal,
    /// Stream owned by this process.
    rng: ChaCha12Rng,
    /// The generated walk, one value per generation.
    values: Vec<f64>,
    /// Value at the last step, absent before the first step.
    current_value: Option<f64>,
}

impl AttributeProcess {
    /// Build a process from resolved parameters and a derived seed.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidParameters`] if the distribution
    /// parameters are invalid.
    pub fn new(kind: AttributeKind, params: AttributeParams, seed: u64) -> Result<Self, WorldError> {
        let distribution =
            TruncatedNormal::new(params.mean, params.std, params.min_value, params.max_value)?;
        Ok(Self {
            kind,
            params,
            distribution,
            rng: rng_from_seed(seed),
            values: Vec::new(),
            current_value: None,
        })
    }

    /// Generate a fresh sequence of `n` values, replacing any previous one.
    ///
    /// Regenerating reuses the distribution but consumes new randomness from
    /// the process's own stream. The current-value pointer is cleared.
    pub fn generate_sequence(&mut self, n: usize) -> &[f64] {
        let raw = self.distribution.sample_n(&mut self.rng, n);
        let (min_value, max_value) = (self.params.min_value, self.params.max_value);
        let values: Vec<f64> = bound_steps(&raw, self.params.volatility)
            .into_iter()
            .map(|v| v.clamp(min_value, max_value))
            .collect();

        let corrected = raw
            .iter()
            .zip(&values)
            .filter(|(r, v)| r.to_bits() != v.to_bits())
            .count();
        debug!(
            attribute = %self.kind,
            length = n,
            corrected,
            volatility = self.params.volatility,
            "Attribute sequence generated"
        );

        self.values = values;
        self.current_value = None;
        &self.values
    }

    /// Move the current value to generation `index`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StepOutOfRange`] if `index` is outside the
    /// generated sequence.
    pub fn step_to(&mut self, index: usize) -> Result<f64, WorldError> {
        let value = self
            .values
            .get(index)
            .copied()
            .ok_or(WorldError::StepOutOfRange {
                attribute: self.kind,
                index,
                len: self.values.len(),
            })?;
        self.current_value = Some(value);
        Ok(value)
    }

    /// The attribute this process drives.
    pub const fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Lower bound of every generated value.
    pub const fn min_value(&self) -> f64 {
        self.params.min_value
    }

    /// Upper bound of every generated value.
    pub const fn max_value(&self) -> f64 {
        self.params.max_value
    }

    /// Largest permitted change between consecutive generations.
    pub const fn volatility(&self) -> f64 {
        self.params.volatility
    }

    /// Value at the last step, or `None` before the first step.
    pub const fn current_value(&self) -> Option<f64> {
        self.current_value
    }

    /// The generated sequence (empty before generation).
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Apply the bounding correction pass to a sequence of raw draws.
pub fn bound_steps(raw: &[f64], volatility: f64) -> Vec<f64> {
    let mut corrected: Vec<f64> = Vec::with_capacity(raw.len());
    for &value in raw {
        let next = match corrected.last() {
            None => value,
            Some(&previous) if (value - previous).abs() <= volatility => value,
            Some(&previous) if value > previous => previous + volatility,
            Some(&previous) => previous - volatility,
        };
        corrected.push(next);
    }
    corrected
}
