//! Column ADC: quantization of aggregated output currents.
//!
//! The full-scale range is derived from the currents observed in a read and
//! widened by the overflow rate, so every batch is converted with the same
//! number of levels regardless of its magnitude.

use memristive_devices::quantize_to_levels;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Quantization curve of the ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantMethod {
    /// Evenly spaced levels over the observed range widened by the overflow rate.
    #[default]
    Linear,
    /// Evenly spaced levels over exactly the observed range.
    MinMax,
    /// Sign-magnitude, power-of-two magnitudes below the widened peak.
    Log,
    /// Sign-magnitude, magnitudes evenly spaced in the log domain between the
    /// smallest and largest observed non-zero magnitude.
    LogMinMax,
    /// Evenly spaced levels in `tanh` space, denser around zero.
    Tanh,
}

impl QuantMethod {
    fn is_sign_magnitude(&self) -> bool {
        matches!(self, QuantMethod::Log | QuantMethod::LogMinMax)
    }
}

/// Full-scale range used for one conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcRange {
    pub low: f64,
    pub high: f64,
    /// Number of output codes.
    pub levels: u64,
}

impl AdcRange {
    pub fn span(&self) -> f64 {
        self.high - self.low
    }
}

/// Column analog-to-digital converter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adc {
    resolution: Option<u32>,
    overflow_rate: f64,
    method: QuantMethod,
}

impl Default for Adc {
    fn default() -> Self {
        Self {
            resolution: None,
            overflow_rate: 0.0,
            method: QuantMethod::Linear,
        }
    }
}

impl Adc {
    /// Largest supported bit width.
    pub const MAX_RESOLUTION: u32 = 32;

    /// Create an ADC. `resolution == None` disables quantization.
    pub fn new(resolution: Option<u32>, overflow_rate: f64, method: QuantMethod) -> Result<Self> {
        if let Some(bits) = resolution {
            let min_bits = if method.is_sign_magnitude() { 2 } else { 1 };
            if bits < min_bits || bits > Self::MAX_RESOLUTION {
                return Err(Error::Configuration(format!(
                    "ADC resolution must be between {} and {} bits for {:?}, got {}",
                    min_bits,
                    Self::MAX_RESOLUTION,
                    method,
                    bits
                )));
            }
        }
        if !(overflow_rate.is_finite() && overflow_rate >= 0.0) {
            return Err(Error::Configuration(format!(
                "ADC overflow rate must be finite and non-negative, got {}",
                overflow_rate
            )));
        }
        Ok(Self {
            resolution,
            overflow_rate,
            method,
        })
    }

    pub fn resolution(&self) -> Option<u32> {
        self.resolution
    }

    pub fn overflow_rate(&self) -> f64 {
        self.overflow_rate
    }

    pub fn method(&self) -> QuantMethod {
        self.method
    }

    pub fn is_enabled(&self) -> bool {
        self.resolution.is_some()
    }

    /// Quantize `currents` in place and return the full scale used.
    ///
    /// Returns `None` when the ADC is disabled or there is nothing to
    /// resolve (no values, or no spread for the linear curves).
    pub fn quantize(&self, currents: &mut DMatrix<f64>) -> Option<AdcRange> {
        let bits = self.resolution?;
        if currents.is_empty() {
            return None;
        }
        let levels = 1u64 << bits;
        match self.method {
            QuantMethod::Linear | QuantMethod::MinMax => self.quantize_linear(currents, levels),
            QuantMethod::Log | QuantMethod::LogMinMax => self.quantize_log(currents, bits),
            QuantMethod::Tanh => self.quantize_tanh(currents, levels),
        }
    }

    fn quantize_linear(&self, currents: &mut DMatrix<f64>, levels: u64) -> Option<AdcRange> {
        let (lo, hi) = currents
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        let span = hi - lo;
        if !(span > 0.0) {
            return None;
        }
        let margin = match self.method {
            QuantMethod::MinMax => 0.0,
            _ => 0.5 * span * self.overflow_rate,
        };
        let range = AdcRange {
            low: lo - margin,
            high: hi + margin,
            levels,
        };
        let n = levels as usize;
        currents.apply(|x| *x = quantize_to_levels(*x, range.low, range.high, n));
        Some(range)
    }

    fn quantize_log(&self, currents: &mut DMatrix<f64>, bits: u32) -> Option<AdcRange> {
        let magnitudes = currents.iter().map(|x| x.abs()).filter(|m| *m > 0.0);
        let (min_mag, max_mag) = magnitudes
            .fold((f64::INFINITY, 0.0f64), |(lo, hi), m| (lo.min(m), hi.max(m)));
        if max_mag <= 0.0 {
            return None;
        }
        // Levels per sign; zero is its own code
        let per_side = (1u64 << (bits - 1)) - 1;

        match self.method {
            QuantMethod::LogMinMax => {
                let (ln_lo, ln_hi) = (min_mag.ln(), max_mag.ln());
                let n = per_side as usize;
                currents.apply(|x| {
                    if *x != 0.0 {
                        let ln = if n < 2 {
                            ln_hi
                        } else {
                            quantize_to_levels(x.abs().ln(), ln_lo, ln_hi, n)
                        };
                        *x = x.signum() * ln.exp();
                    }
                });
                Some(AdcRange {
                    low: -max_mag,
                    high: max_mag,
                    levels: 2 * per_side + 1,
                })
            }
            _ => {
                let top = max_mag * (1.0 + self.overflow_rate);
                let deepest = (per_side - 1) as f64;
                currents.apply(|x| {
                    if *x != 0.0 {
                        let k = (top / x.abs()).log2().round().max(0.0);
                        *x = if k > deepest {
                            0.0
                        } else {
                            x.signum() * top * (-k).exp2()
                        };
                    }
                });
                Some(AdcRange {
                    low: -top,
                    high: top,
                    levels: 2 * per_side + 1,
                })
            }
        }
    }

    fn quantize_tanh(&self, currents: &mut DMatrix<f64>, levels: u64) -> Option<AdcRange> {
        let peak = currents.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        if peak <= 0.0 {
            return None;
        }
        let scale = peak * (1.0 + self.overflow_rate);
        let limit = 1.0f64.tanh();
        let n = levels as usize;
        currents.apply(|x| {
            let t = quantize_to_levels((*x / scale).tanh(), -limit, limit, n);
            *x = t.atanh() * scale;
        });
        Some(AdcRange {
            low: -scale,
            high: scale,
            levels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distinct(m: &DMatrix<f64>) -> usize {
        let mut values: Vec<f64> = m.iter().copied().collect();
        values.sort_by(|a, b| a.total_cmp(b));
        values.dedup();
        values.len()
    }

    fn ramp(n: usize) -> DMatrix<f64> {
        DMatrix::from_fn(n, 1, |i, _| -1e-3 + 3e-3 * i as f64 / (n - 1) as f64)
    }

    #[test]
    fn test_eight_bit_levels() {
        for method in [
            QuantMethod::Linear,
            QuantMethod::MinMax,
            QuantMethod::Log,
            QuantMethod::LogMinMax,
            QuantMethod::Tanh,
        ] {
            let adc = Adc::new(Some(8), 0.1, method).unwrap();
            let mut m = ramp(5000);
            adc.quantize(&mut m).unwrap();
            assert!(distinct(&m) <= 256, "{:?}: {} levels", method, distinct(&m));
            assert!(m.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn test_zero_overflow_full_scale_is_observed_span() {
        let adc = Adc::new(Some(4), 0.0, QuantMethod::Linear).unwrap();
        let mut m = ramp(100);
        let range = adc.quantize(&mut m).unwrap();
        assert!((range.low + 1e-3).abs() < 1e-15);
        assert!((range.high - 2e-3).abs() < 1e-15);
        assert!((range.span() - 3e-3).abs() < 1e-15);
        assert_eq!(range.levels, 16);
        // End points are representable
        assert!((m[(0, 0)] + 1e-3).abs() < 1e-15);
        assert!((m[(99, 0)] - 2e-3).abs() < 1e-15);
    }

    #[test]
    fn test_overflow_widens_range() {
        let adc = Adc::new(Some(4), 0.5, QuantMethod::Linear).unwrap();
        let range = adc.quantize(&mut ramp(10)).unwrap();
        assert!((range.span() - 1.5 * 3e-3).abs() < 1e-15);

        let minmax = Adc::new(Some(4), 0.5, QuantMethod::MinMax).unwrap();
        let range = minmax.quantize(&mut ramp(10)).unwrap();
        assert!((range.span() - 3e-3).abs() < 1e-15);
    }

    #[test]
    fn test_log_preserves_sign_and_zero() {
        let adc = Adc::new(Some(3), 0.0, QuantMethod::Log).unwrap();
        let mut m = DMatrix::from_row_slice(1, 4, &[-0.9, 0.0, 0.26, 1.0]);
        adc.quantize(&mut m).unwrap();
        // 3 magnitudes per side: 1, 1/2, 1/4
        assert_eq!(m[(0, 0)], -1.0);
        assert_eq!(m[(0, 1)], 0.0);
        assert_eq!(m[(0, 2)], 0.25);
        assert_eq!(m[(0, 3)], 1.0);
    }

    #[test]
    fn test_disabled_and_degenerate() {
        let mut m = ramp(10);
        let before = m.clone();
        assert!(Adc::default().quantize(&mut m).is_none());
        assert_eq!(m, before);

        let adc = Adc::new(Some(8), 0.0, QuantMethod::Linear).unwrap();
        let mut flat = DMatrix::from_element(2, 2, 1e-4);
        assert!(adc.quantize(&mut flat).is_none());
        assert_eq!(flat[(0, 0)], 1e-4);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(Adc::new(Some(0), 0.0, QuantMethod::Linear).is_err());
        assert!(Adc::new(Some(1), 0.0, QuantMethod::Log).is_err());
        assert!(Adc::new(Some(64), 0.0, QuantMethod::Linear).is_err());
        assert!(Adc::new(Some(8), -0.1, QuantMethod::Linear).is_err());
        assert!(Adc::new(None, 0.0, QuantMethod::Tanh).is_ok());
    }
}
