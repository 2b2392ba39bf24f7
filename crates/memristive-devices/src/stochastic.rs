//! Device parameters that are either fixed or drawn from a distribution.
//!
//! A [`StochasticParameter`] is a description, not a value. Device models
//! resolve each parameter exactly once when a device is instantiated and
//! store the resulting `f64`; reading a device's parameters afterwards never
//! draws again. Instantiating a new device draws a fresh, independent sample
//! from that device's own stream.
//!
//! Bounds are enforced by clip-sampling: an out-of-range draw is clamped to
//! the nearest bound rather than rejected. This keeps the number of draws per
//! parameter fixed, which keeps sampling reproducible per stream, at the
//! cost of probability mass piling up on the bounds.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rng::ParameterSampler;

/// A fixed or sampled scalar parameter.
///
/// Deserializes from either a bare number or a tagged distribution:
///
/// ```
/// use memristive_devices::StochasticParameter;
///
/// let fixed: StochasticParameter = serde_json::from_str("50.0").unwrap();
/// assert_eq!(fixed, StochasticParameter::Fixed(50.0));
///
/// let normal: StochasticParameter =
///     serde_json::from_str(r#"{"normal": {"loc": 1000.0, "scale": 50.0, "min": 0.0}}"#).unwrap();
/// assert_eq!(normal.nominal(), 1000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StochasticParameter {
    /// Always resolves to the literal.
    Fixed(f64),
    /// A distribution to draw from.
    Sampled(Distribution),
}

/// Distribution families supported for device parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    /// Normal distribution, clipped to `[min, max]` when bounds are given.
    Normal {
        loc: f64,
        scale: f64,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// Uniform over `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// `loc * exp(scale * N(0, 1))`, clipped to `[min, max]` when bounds are given.
    ///
    /// `loc` is the median of the distribution.
    LogNormal {
        loc: f64,
        scale: f64,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
}

impl StochasticParameter {
    /// Normal distribution without bounds.
    pub fn normal(loc: f64, scale: f64) -> Self {
        StochasticParameter::Sampled(Distribution::Normal {
            loc,
            scale,
            min: None,
            max: None,
        })
    }

    /// Normal distribution clipped to `[min, max]`.
    pub fn normal_clipped(loc: f64, scale: f64, min: Option<f64>, max: Option<f64>) -> Self {
        StochasticParameter::Sampled(Distribution::Normal {
            loc,
            scale,
            min,
            max,
        })
    }

    /// Uniform distribution over `[low, high)`.
    pub fn uniform(low: f64, high: f64) -> Self {
        StochasticParameter::Sampled(Distribution::Uniform { low, high })
    }

    /// Central value of the parameter, used for nominal (population-level) figures.
    ///
    /// Fixed values return the literal, normal and log-normal return `loc`
    /// (clipped to the bounds), uniform returns the midpoint.
    pub fn nominal(&self) -> f64 {
        match self {
            StochasticParameter::Fixed(value) => *value,
            StochasticParameter::Sampled(Distribution::Normal { loc, min, max, .. })
            | StochasticParameter::Sampled(Distribution::LogNormal { loc, min, max, .. }) => {
                clip(*loc, *min, *max)
            }
            StochasticParameter::Sampled(Distribution::Uniform { low, high }) => 0.5 * (low + high),
        }
    }

    /// Check that the description itself is well formed.
    pub fn validate(&self, name: &'static str) -> Result<()> {
        let check_bounds = |min: &Option<f64>, max: &Option<f64>| -> Result<()> {
            if let (Some(lo), Some(hi)) = (min, max) {
                if lo > hi {
                    return Err(Error::InvalidParameter(format!(
                        "{}: min ({}) exceeds max ({})",
                        name, lo, hi
                    )));
                }
            }
            Ok(())
        };

        match self {
            StochasticParameter::Fixed(value) => {
                if !value.is_finite() {
                    return Err(Error::InvalidValue { name, value: *value });
                }
            }
            StochasticParameter::Sampled(Distribution::Normal {
                loc,
                scale,
                min,
                max,
            }) => {
                if !loc.is_finite() || !scale.is_finite() || *scale < 0.0 {
                    return Err(Error::InvalidValue { name, value: *scale });
                }
                check_bounds(min, max)?;
            }
            StochasticParameter::Sampled(Distribution::LogNormal {
                loc,
                scale,
                min,
                max,
            }) => {
                if !loc.is_finite() || *loc <= 0.0 {
                    return Err(Error::InvalidValue { name, value: *loc });
                }
                if !scale.is_finite() || *scale < 0.0 {
                    return Err(Error::InvalidValue { name, value: *scale });
                }
                check_bounds(min, max)?;
            }
            StochasticParameter::Sampled(Distribution::Uniform { low, high }) => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(Error::InvalidParameter(format!(
                        "{}: uniform bounds [{}, {}) are invalid",
                        name, low, high
                    )));
                }
            }
        }
        Ok(())
    }

    /// Draw a concrete value.
    ///
    /// Every call on a stochastic parameter consumes draws from `sampler`;
    /// callers store the result rather than calling this twice for the same
    /// device.
    pub fn resolve(&self, sampler: &mut ParameterSampler) -> f64 {
        match self {
            StochasticParameter::Fixed(value) => *value,
            StochasticParameter::Sampled(Distribution::Normal {
                loc,
                scale,
                min,
                max,
            }) => clip(loc + scale * sampler.next_gaussian(), *min, *max),
            StochasticParameter::Sampled(Distribution::LogNormal {
                loc,
                scale,
                min,
                max,
            }) => clip(loc * (scale * sampler.next_gaussian()).exp(), *min, *max),
            StochasticParameter::Sampled(Distribution::Uniform { low, high }) => {
                low + (high - low) * sampler.next_uniform()
            }
        }
    }
}

impl From<f64> for StochasticParameter {
    fn from(value: f64) -> Self {
        StochasticParameter::Fixed(value)
    }
}

fn clip(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let value = min.map_or(value, |lo| value.max(lo));
    max.map_or(value, |hi| value.min(hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_resolves_to_literal() {
        let p = StochasticParameter::Fixed(3.5);
        let mut sampler = ParameterSampler::new(1, 0);
        assert_eq!(p.resolve(&mut sampler), 3.5);
        assert_eq!(p.resolve(&mut sampler), 3.5);
    }

    #[test]
    fn test_normal_clip_sampling() {
        // Wide distribution with a tight lower bound: many draws land on it
        let p = StochasticParameter::normal_clipped(0.0, 10.0, Some(0.0), Some(5.0));
        let mut clipped_low = 0;
        for stream in 0..500 {
            let value = p.resolve(&mut ParameterSampler::new(11, stream));
            assert!((0.0..=5.0).contains(&value), "value {} escaped bounds", value);
            if value == 0.0 {
                clipped_low += 1;
            }
        }
        // Roughly half the mass sits below zero
        assert!(clipped_low > 150, "only {} draws clipped", clipped_low);
    }

    #[test]
    fn test_streams_are_independent_and_reproducible() {
        let p = StochasticParameter::normal(1000.0, 100.0);
        let a = p.resolve(&mut ParameterSampler::new(5, 0));
        let b = p.resolve(&mut ParameterSampler::new(5, 1));
        let a_again = p.resolve(&mut ParameterSampler::new(5, 0));
        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }

    #[test]
    fn test_uniform_range_and_nominal() {
        let p = StochasticParameter::uniform(2.0, 4.0);
        assert_eq!(p.nominal(), 3.0);
        for stream in 0..100 {
            let value = p.resolve(&mut ParameterSampler::new(3, stream));
            assert!((2.0..4.0).contains(&value));
        }
    }

    #[test]
    fn test_lognormal_positive() {
        let p = StochasticParameter::Sampled(Distribution::LogNormal {
            loc: 100.0,
            scale: 0.5,
            min: None,
            max: None,
        });
        assert!(p.validate("r_on").is_ok());
        for stream in 0..100 {
            assert!(p.resolve(&mut ParameterSampler::new(8, stream)) > 0.0);
        }
    }

    #[test]
    fn test_validate_rejects_bad_descriptions() {
        assert!(StochasticParameter::Fixed(f64::NAN).validate("x").is_err());
        assert!(StochasticParameter::normal(1.0, -1.0).validate("x").is_err());
        assert!(StochasticParameter::normal_clipped(1.0, 1.0, Some(2.0), Some(1.0))
            .validate("x")
            .is_err());
        assert!(StochasticParameter::uniform(3.0, 1.0).validate("x").is_err());
    }

    #[test]
    fn test_deserialize_forms() {
        let p: StochasticParameter = serde_json::from_str("0.5").unwrap();
        assert_eq!(p, StochasticParameter::Fixed(0.5));

        let p: StochasticParameter =
            serde_json::from_str(r#"{"uniform": {"low": 1.0, "high": 2.0}}"#).unwrap();
        assert_eq!(p, StochasticParameter::uniform(1.0, 2.0));
    }
}
