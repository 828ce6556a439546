//! Truncated normal sampling.
//!
//! The distribution is parameterised like a classic truncated normal: the
//! bounds are converted to standard-deviation units `a = (min - mean) / std`
//! and `b = (max - mean) / std`, and samples are drawn by inverse-transform
//! sampling on the standard normal restricted to `[a, b]`.
//!
//! When both bounds lie above the mean, sampling runs on the mirrored
//! interval through the survival function so that deep upper-tail windows
//! keep their precision. A zero standard deviation yields a degenerate
//! distribution that always returns the mean clamped into the bounds.

use rand::Rng;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::WorldError;

/// A normal distribution truncated to `[min_value, max_value]`.
#[derive(Debug, Clone)]
pub struct TruncatedNormal {
    /// Mean of the untruncated normal.
    mean: f64,
    /// Standard deviation of the untruncated normal.
    std: f64,
    /// Lower truncation bound.
    min_value: f64,
    /// Upper truncation bound.
    max_value: f64,
    /// Inverse-transform state, absent for the degenerate `std == 0` case.
    sampler: Option<InverseTransform>,
}

/// Precomputed probability window on the standard normal.
#[derive(Debug, Clone)]
struct InverseTransform {
    standard: Normal,
    /// Lower end of the probability window.
    p_low: f64,
    /// Upper end of the probability window.
    p_high: f64,
    /// Sample on the mirrored interval `[-b, -a]` and negate.
    mirrored: bool,
}

impl TruncatedNormal {
    /// Build a truncated normal distribution.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidParameters`] if any value is not finite,
    /// `std` is negative, or `min_value > max_value`.
    pub fn new(mean: f64, std: f64, min_value: f64, max_value: f64) -> Result<Self, WorldError> {
        if !(mean.is_finite() && std.is_finite() && min_value.is_finite() && max_value.is_finite()) {
            return Err(WorldError::InvalidParameters {
                reason: format!(
                    "parameters must be finite (mean {mean}, std {std}, min {min_value}, max {max_value})"
                ),
            });
        }
        if std < 0.0 {
            return Err(WorldError::InvalidParameters {
                reason: format!("std must be non-negative, got {std}"),
            });
        }
        if min_value > max_value {
            return Err(WorldError::InvalidParameters {
                reason: format!("min_value {min_value} exceeds max_value {max_value}"),
            });
        }

        let sampler = if std > 0.0 {
            let standard = Normal::new(0.0, 1.0).map_err(|source| WorldError::Distribution {
                reason: source.to_string(),
            })?;
            let a = (min_value - mean) / std;
            let b = (max_value - mean) / std;
            let mirrored = a > 0.0;
            let (p_low, p_high) = if mirrored {
                (standard.cdf(-b), standard.cdf(-a))
            } else {
                (standard.cdf(a), standard.cdf(b))
            };
            Some(InverseTransform {
                standard,
                p_low,
                p_high,
                mirrored,
            })
        } else {
            None
        };

        Ok(Self {
            mean,
            std,
            min_value,
            max_value,
            sampler,
        })
    }

    /// Draw one sample.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let Some(sampler) = &self.sampler else {
            return self.clamp(self.mean);
        };

        let u: f64 = rng.random();
        let p = (sampler.p_high - sampler.p_low)
            .mul_add(u, sampler.p_low)
            .clamp(0.0, 1.0);
        let z = sampler.standard.inverse_cdf(p);
        let z = if sampler.mirrored { -z } else { z };
        let value = self.std.mul_add(z, self.mean);

        if value.is_finite() {
            self.clamp(value)
        } else {
            // The window collapsed to a single point in the far tail.
            self.clamp(self.mean)
        }
    }

    /// Draw `n` independent samples.
    pub fn sample_n<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// Mean of the untruncated normal.
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Standard deviation of the untruncated normal.
    pub const fn std(&self) -> f64 {
        self.std
    }

    /// Lower truncation bound.
    pub const fn min_value(&self) -> f64 {
        self.min_value
    }

    /// Upper truncation bound.
    pub const fn max_value(&self) -> f64 {
        self.max_value
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_value, self.max_value)
    }
}
