//! Endurance and retention drift.
//!
//! Both processes move a device's resistance towards a stable value once a
//! stress argument (write cycles for endurance, elapsed time for retention)
//! passes a threshold:
//!
//! ```text
//! threshold = p1 · exp(p2 · cell_size + p3 · T / T_threshold)
//! ```
//!
//! The temperature term is only present when both temperatures are given.
//! Devices are classified as LRS or HRS against the nominal mid resistance
//! and use the parameters of their class. How the resistance moves past the
//! threshold is chosen by [`OperationMode`] from a registered strategy table.

use memristive_crossbar::CrossbarMapping;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Drift process identifier stored on drifted devices.
pub const ENDURANCE_SOURCE: u8 = 0;
/// Drift process identifier stored on drifted devices.
pub const RETENTION_SOURCE: u8 = 1;

/// Shape of the resistance change once the threshold is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Jump to the stable resistance.
    #[default]
    Sudden,
    /// Power-law approach to the stable resistance.
    Gradual,
}

/// Resistance after drift from `r0` under stress `x`.
pub type DriftStrategy = fn(r0: f64, x: f64, threshold: f64, p0: f64, stable: f64) -> f64;

/// Strategies indexed by [`OperationMode`] discriminant.
const STRATEGIES: [(OperationMode, DriftStrategy); 2] = [
    (OperationMode::Sudden, sudden),
    (OperationMode::Gradual, gradual),
];

/// Look up the drift strategy registered for `mode`.
pub fn strategy(mode: OperationMode) -> DriftStrategy {
    STRATEGIES[mode as usize].1
}

fn sudden(r0: f64, x: f64, threshold: f64, _p0: f64, stable: f64) -> f64 {
    if x > threshold {
        stable
    } else {
        r0
    }
}

fn gradual(r0: f64, x: f64, threshold: f64, p0: f64, stable: f64) -> f64 {
    if x <= threshold {
        return r0;
    }
    if threshold <= 0.0 {
        return stable;
    }
    let drifted = r0 * (x / threshold).powf(p0);
    let (lo, hi) = if r0 <= stable { (r0, stable) } else { (stable, r0) };
    if drifted.is_finite() {
        drifted.clamp(lo, hi)
    } else {
        stable
    }
}

/// Parameters of a drift model.
///
/// `p_lrs` and `p_hrs` are `[p0, p1, p2, p3]`: `p0` is the gradual
/// exponent, `p1..p3` shape the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftParameters {
    pub operation_mode: OperationMode,
    pub p_lrs: [f64; 4],
    /// Resistance LRS devices drift to (Ω).
    pub stable_resistance_lrs: f64,
    pub p_hrs: [f64; 4],
    /// Resistance HRS devices drift to (Ω).
    pub stable_resistance_hrs: f64,
    /// Cell size (nm).
    pub cell_size: f64,
    /// Temperature (K).
    pub temperature: Option<f64>,
    /// Reference temperature (K).
    pub temperature_threshold: Option<f64>,
}

impl Default for DriftParameters {
    fn default() -> Self {
        Self {
            operation_mode: OperationMode::Sudden,
            p_lrs: [0.0; 4],
            stable_resistance_lrs: 100.0,
            p_hrs: [0.0; 4],
            stable_resistance_hrs: 1000.0,
            cell_size: 10.0,
            temperature: None,
            temperature_threshold: Some(298.0),
        }
    }
}

impl DriftParameters {
    pub fn with_mode(mut self, mode: OperationMode) -> Self {
        self.operation_mode = mode;
        self
    }

    pub fn with_lrs(mut self, p: [f64; 4], stable_resistance: f64) -> Self {
        self.p_lrs = p;
        self.stable_resistance_lrs = stable_resistance;
        self
    }

    pub fn with_hrs(mut self, p: [f64; 4], stable_resistance: f64) -> Self {
        self.p_hrs = p;
        self.stable_resistance_hrs = stable_resistance;
        self
    }

    pub fn with_temperature(mut self, temperature: f64, threshold: f64) -> Self {
        self.temperature = Some(temperature);
        self.temperature_threshold = Some(threshold);
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, r) in [
            ("stable_resistance_lrs", self.stable_resistance_lrs),
            ("stable_resistance_hrs", self.stable_resistance_hrs),
        ] {
            if !(r.is_finite() && r > 0.0) {
                return Err(Error::Configuration(format!("{} must be positive, got {}", name, r)));
            }
        }
        if self.p_lrs.iter().chain(&self.p_hrs).any(|p| !p.is_finite()) {
            return Err(Error::Configuration("drift coefficients must be finite".into()));
        }
        if !self.cell_size.is_finite() {
            return Err(Error::Configuration(format!(
                "cell_size must be finite, got {}",
                self.cell_size
            )));
        }
        if let (Some(_), Some(t_th)) = (self.temperature, self.temperature_threshold) {
            if !(t_th.is_finite() && t_th > 0.0) {
                return Err(Error::Configuration(format!(
                    "temperature_threshold must be positive, got {}",
                    t_th
                )));
            }
        }
        Ok(())
    }

    /// Stress threshold for coefficients `p`.
    pub fn threshold(&self, p: &[f64; 4]) -> f64 {
        let thermal = match (self.temperature, self.temperature_threshold) {
            (Some(t), Some(t_th)) => p[3] * t / t_th,
            _ => 0.0,
        };
        p[1] * (p[2] * self.cell_size + thermal).exp()
    }

    /// Resistance after drifting from `r0` under stress `x`.
    ///
    /// `r_mid` separates LRS (below) from HRS devices.
    pub fn drifted_resistance(&self, r0: f64, x: f64, r_mid: f64) -> f64 {
        let (p, stable) = if r0 < r_mid {
            (&self.p_lrs, self.stable_resistance_lrs)
        } else {
            (&self.p_hrs, self.stable_resistance_hrs)
        };
        strategy(self.operation_mode)(r0, x, self.threshold(p), p[0], stable)
    }

    /// Drift every healthy device of `mapping` under stress `x`.
    ///
    /// Drift is computed from the state a device had before the same
    /// process (`source`) was first applied, so re-applying overwrites the
    /// earlier result instead of compounding it. Returns the number of
    /// devices whose state changed.
    pub(crate) fn apply(&self, mapping: &mut CrossbarMapping, source: u8, x: f64) -> usize {
        let nominal = mapping.nominal_model();
        let r_mid = 0.5 * (nominal.r_on() + nominal.r_off());
        let parallel = mapping.parallel().clone();
        let counts = parallel.map_mut(mapping.tiles_mut(), |tile| {
            let mut changed = 0;
            for device in tile.devices_mut() {
                if device.fault().is_some() {
                    continue;
                }
                let baseline = device.drift_baseline(source);
                let model = device.model();
                let r = self.drifted_resistance(model.resistance(baseline), x, r_mid);
                let state = model.state_for_conductance(1.0 / r);
                if state != device.state() {
                    changed += 1;
                }
                device.apply_drift(source, state);
            }
            changed
        });
        counts.into_iter().sum()
    }
}

/// Check a stress argument (cycle count or time).
pub(crate) fn check_stress(name: &str, x: f64) -> Result<()> {
    if x.is_finite() && x >= 0.0 {
        Ok(())
    } else {
        Err(Error::Configuration(format!(
            "{} must be finite and non-negative, got {}",
            name, x
        )))
    }
}
