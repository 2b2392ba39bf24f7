//! Memristor physics: state bounds, state velocity and state → resistance maps.
//!
//! Each model is a resolved parameter set (plain `f64` fields) describing a
//! single physical device. Configuration counterparts (`*Config`) hold
//! [`StochasticParameter`]s and produce a resolved model per device.
//!
//! All models share the same conventions:
//! - the internal state `w` lives in `[w_min, w_max]`;
//! - `w_min` is the high-resistance bound (`r_off`), `w_max` the
//!   low-resistance bound (`r_on`), so conductance is monotonic non-decreasing
//!   in `w`;
//! - the state only moves when the applied voltage is above the positive
//!   (set) threshold, where it grows, or below the negative (reset)
//!   threshold, where it shrinks.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rng::ParameterSampler;
use crate::stochastic::StochasticParameter;

/// Resistance that varies linearly between `r_off` at `w_min` and `r_on` at `w_max`.
#[inline]
fn linear_resistance(w: f64, w_min: f64, w_max: f64, r_on: f64, r_off: f64) -> f64 {
    let x = ((w - w_min) / (w_max - w_min)).clamp(0.0, 1.0);
    r_off + (r_on - r_off) * x
}

/// Inverse of [`linear_resistance`], clamped to the physical bounds.
#[inline]
fn state_for_resistance(r: f64, w_min: f64, w_max: f64, r_on: f64, r_off: f64) -> f64 {
    let r = r.clamp(r_on, r_off);
    let x = (r_off - r) / (r_off - r_on);
    w_min + x * (w_max - w_min)
}

fn check_resistances(r_on: f64, r_off: f64) -> Result<()> {
    if !(r_on.is_finite() && r_on > 0.0) {
        return Err(Error::InvalidValue {
            name: "r_on",
            value: r_on,
        });
    }
    if !(r_off.is_finite() && r_off > r_on) {
        return Err(Error::InvalidParameter(format!(
            "r_off ({}) must exceed r_on ({})",
            r_off, r_on
        )));
    }
    Ok(())
}

fn check_thresholds(set: f64, reset: f64) -> Result<()> {
    if !(set >= 0.0) {
        return Err(Error::InvalidValue {
            name: "set threshold",
            value: set,
        });
    }
    if !(reset <= 0.0) {
        return Err(Error::InvalidValue {
            name: "reset threshold",
            value: reset,
        });
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidValue { name, value })
    }
}

// ============================================================================
// VTEAM
// ============================================================================

/// Voltage-controlled threshold adaptive memristor model.
///
/// ```text
///          ⎧ k_set   · (v / v_set   − 1)^alpha_set    v > v_set
/// dw/dt =  ⎨ 0                                        v_reset ≤ v ≤ v_set
///          ⎩ k_reset · (v / v_reset − 1)^alpha_reset  v < v_reset
/// ```
///
/// with `k_set > 0` and `k_reset < 0`. Resistance is linear in `w` between
/// `r_off` (`w = 0`) and `r_on` (`w = d`).
#[derive(Debug, Clone, PartialEq)]
pub struct Vteam {
    pub time_series_resolution: f64,
    pub r_on: f64,
    pub r_off: f64,
    /// Device thickness (m), the upper state bound.
    pub d: f64,
    pub k_set: f64,
    pub k_reset: f64,
    pub alpha_set: f64,
    pub alpha_reset: f64,
    pub v_set: f64,
    pub v_reset: f64,
}

impl Default for Vteam {
    fn default() -> Self {
        Self {
            time_series_resolution: 1e-10,
            r_on: 50.0,
            r_off: 1000.0,
            d: 3e-9,
            k_set: 5e-4,
            k_reset: -10.0,
            alpha_set: 1.0,
            alpha_reset: 3.0,
            v_set: 0.02,
            v_reset: -0.2,
        }
    }
}

impl Vteam {
    fn validate(&self) -> Result<()> {
        check_positive("time_series_resolution", self.time_series_resolution)?;
        check_resistances(self.r_on, self.r_off)?;
        check_positive("d", self.d)?;
        check_thresholds(self.v_set, self.v_reset)?;
        if self.k_set < 0.0 {
            return Err(Error::InvalidValue {
                name: "k_set",
                value: self.k_set,
            });
        }
        if self.k_reset > 0.0 {
            return Err(Error::InvalidValue {
                name: "k_reset",
                value: self.k_reset,
            });
        }
        Ok(())
    }

    fn dwdt(&self, _w: f64, voltage: f64) -> f64 {
        if voltage > self.v_set {
            self.k_set * (voltage / self.v_set - 1.0).powf(self.alpha_set)
        } else if voltage < self.v_reset {
            self.k_reset * (voltage / self.v_reset - 1.0).powf(self.alpha_reset)
        } else {
            0.0
        }
    }
}

/// VTEAM configuration with per-device parameter spreads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VteamConfig {
    pub time_series_resolution: f64,
    pub r_on: StochasticParameter,
    pub r_off: StochasticParameter,
    pub d: StochasticParameter,
    pub k_set: StochasticParameter,
    pub k_reset: StochasticParameter,
    pub alpha_set: StochasticParameter,
    pub alpha_reset: StochasticParameter,
    pub v_set: StochasticParameter,
    pub v_reset: StochasticParameter,
}

impl Default for VteamConfig {
    fn default() -> Self {
        let v = Vteam::default();
        Self {
            time_series_resolution: v.time_series_resolution,
            r_on: v.r_on.into(),
            r_off: v.r_off.into(),
            d: v.d.into(),
            k_set: v.k_set.into(),
            k_reset: v.k_reset.into(),
            alpha_set: v.alpha_set.into(),
            alpha_reset: v.alpha_reset.into(),
            v_set: v.v_set.into(),
            v_reset: v.v_reset.into(),
        }
    }
}

impl VteamConfig {
    fn resolve(&self, sampler: &mut ParameterSampler) -> Vteam {
        Vteam {
            time_series_resolution: self.time_series_resolution,
            r_on: self.r_on.resolve(sampler),
            r_off: self.r_off.resolve(sampler),
            d: self.d.resolve(sampler),
            k_set: self.k_set.resolve(sampler),
            k_reset: self.k_reset.resolve(sampler),
            alpha_set: self.alpha_set.resolve(sampler),
            alpha_reset: self.alpha_reset.resolve(sampler),
            v_set: self.v_set.resolve(sampler),
            v_reset: self.v_reset.resolve(sampler),
        }
    }

    fn parameters(&self) -> [(&'static str, &StochasticParameter); 9] {
        [
            ("r_on", &self.r_on),
            ("r_off", &self.r_off),
            ("d", &self.d),
            ("k_set", &self.k_set),
            ("k_reset", &self.k_reset),
            ("alpha_set", &self.alpha_set),
            ("alpha_reset", &self.alpha_reset),
            ("v_set", &self.v_set),
            ("v_reset", &self.v_reset),
        ]
    }
}

// ============================================================================
// Linear ion drift
// ============================================================================

/// Linear ion drift (HP) model with a Biolek window and write thresholds.
///
/// ```text
/// dw/dt = u_v · r_on / d · i(t) · f(w / d, i),   i = v / R(w)
/// f(x, i) = 1 − (x − stp(−i))^(2p)
/// ```
///
/// The Biolek window vanishes only at the boundary the current pushes
/// towards, so a device sitting on a bound can always be driven away from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearIonDrift {
    pub time_series_resolution: f64,
    /// Dopant mobility (m² s⁻¹ V⁻¹).
    pub u_v: f64,
    /// Device thickness (m).
    pub d: f64,
    pub r_on: f64,
    pub r_off: f64,
    /// Window exponent.
    pub p: f64,
    pub pos_write_threshold: f64,
    pub neg_write_threshold: f64,
}

impl Default for LinearIonDrift {
    fn default() -> Self {
        Self {
            time_series_resolution: 1e-4,
            u_v: 1e-14,
            d: 10e-9,
            r_on: 100.0,
            r_off: 16e3,
            p: 1.0,
            pos_write_threshold: 0.55,
            neg_write_threshold: -0.62,
        }
    }
}

impl LinearIonDrift {
    fn validate(&self) -> Result<()> {
        check_positive("time_series_resolution", self.time_series_resolution)?;
        check_resistances(self.r_on, self.r_off)?;
        check_positive("d", self.d)?;
        check_positive("u_v", self.u_v)?;
        check_positive("p", self.p)?;
        check_thresholds(self.pos_write_threshold, self.neg_write_threshold)
    }

    fn dwdt(&self, w: f64, voltage: f64) -> f64 {
        if voltage <= self.pos_write_threshold && voltage >= self.neg_write_threshold {
            return 0.0;
        }
        let current = voltage / linear_resistance(w, 0.0, self.d, self.r_on, self.r_off);
        let x = w / self.d;
        let stp = if current < 0.0 { 1.0 } else { 0.0 };
        let window = 1.0 - (x - stp).abs().powf(2.0 * self.p);
        self.u_v * self.r_on / self.d * current * window
    }
}

/// Linear ion drift configuration with per-device parameter spreads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearIonDriftConfig {
    pub time_series_resolution: f64,
    pub u_v: StochasticParameter,
    pub d: StochasticParameter,
    pub r_on: StochasticParameter,
    pub r_off: StochasticParameter,
    pub p: StochasticParameter,
    pub pos_write_threshold: StochasticParameter,
    pub neg_write_threshold: StochasticParameter,
}

impl Default for LinearIonDriftConfig {
    fn default() -> Self {
        let m = LinearIonDrift::default();
        Self {
            time_series_resolution: m.time_series_resolution,
            u_v: m.u_v.into(),
            d: m.d.into(),
            r_on: m.r_on.into(),
            r_off: m.r_off.into(),
            p: m.p.into(),
            pos_write_threshold: m.pos_write_threshold.into(),
            neg_write_threshold: m.neg_write_threshold.into(),
        }
    }
}

impl LinearIonDriftConfig {
    fn resolve(&self, sampler: &mut ParameterSampler) -> LinearIonDrift {
        LinearIonDrift {
            time_series_resolution: self.time_series_resolution,
            u_v: self.u_v.resolve(sampler),
            d: self.d.resolve(sampler),
            r_on: self.r_on.resolve(sampler),
            r_off: self.r_off.resolve(sampler),
            p: self.p.resolve(sampler),
            pos_write_threshold: self.pos_write_threshold.resolve(sampler),
            neg_write_threshold: self.neg_write_threshold.resolve(sampler),
        }
    }

    fn parameters(&self) -> [(&'static str, &StochasticParameter); 7] {
        [
            ("u_v", &self.u_v),
            ("d", &self.d),
            ("r_on", &self.r_on),
            ("r_off", &self.r_off),
            ("p", &self.p),
            ("pos_write_threshold", &self.pos_write_threshold),
            ("neg_write_threshold", &self.neg_write_threshold),
        ]
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// A resolved device model.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceModel {
    Vteam(Vteam),
    LinearIonDrift(LinearIonDrift),
}

impl DeviceModel {
    /// Check the resolved parameters for physical consistency.
    pub fn validate(&self) -> Result<()> {
        match self {
            DeviceModel::Vteam(m) => m.validate(),
            DeviceModel::LinearIonDrift(m) => m.validate(),
        }
    }

    /// Integration step (s).
    pub fn time_series_resolution(&self) -> f64 {
        match self {
            DeviceModel::Vteam(m) => m.time_series_resolution,
            DeviceModel::LinearIonDrift(m) => m.time_series_resolution,
        }
    }

    /// Physical state bounds `(w_min, w_max)`.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            DeviceModel::Vteam(m) => (0.0, m.d),
            DeviceModel::LinearIonDrift(m) => (0.0, m.d),
        }
    }

    /// Low-resistance-state resistance.
    pub fn r_on(&self) -> f64 {
        match self {
            DeviceModel::Vteam(m) => m.r_on,
            DeviceModel::LinearIonDrift(m) => m.r_on,
        }
    }

    /// High-resistance-state resistance.
    pub fn r_off(&self) -> f64 {
        match self {
            DeviceModel::Vteam(m) => m.r_off,
            DeviceModel::LinearIonDrift(m) => m.r_off,
        }
    }

    /// Positive voltage above which the state grows.
    pub fn set_threshold(&self) -> f64 {
        match self {
            DeviceModel::Vteam(m) => m.v_set,
            DeviceModel::LinearIonDrift(m) => m.pos_write_threshold,
        }
    }

    /// Negative voltage below which the state shrinks.
    pub fn reset_threshold(&self) -> f64 {
        match self {
            DeviceModel::Vteam(m) => m.v_reset,
            DeviceModel::LinearIonDrift(m) => m.neg_write_threshold,
        }
    }

    /// State velocity `dw/dt` at state `w` under `voltage`.
    ///
    /// May be non-finite for degenerate parameters (e.g. a zero threshold in
    /// a ratio); the integrator handles that case.
    pub fn dwdt(&self, w: f64, voltage: f64) -> f64 {
        match self {
            DeviceModel::Vteam(m) => m.dwdt(w, voltage),
            DeviceModel::LinearIonDrift(m) => m.dwdt(w, voltage),
        }
    }

    /// Resistance at state `w`.
    pub fn resistance(&self, w: f64) -> f64 {
        let (w_min, w_max) = self.bounds();
        linear_resistance(w, w_min, w_max, self.r_on(), self.r_off())
    }

    /// Conductance at state `w`, monotonic non-decreasing in `w`.
    pub fn conductance(&self, w: f64) -> f64 {
        1.0 / self.resistance(w)
    }

    /// State whose conductance is closest to `conductance`.
    pub fn state_for_conductance(&self, conductance: f64) -> f64 {
        let (w_min, w_max) = self.bounds();
        if conductance <= 0.0 || !conductance.is_finite() {
            return if conductance.is_infinite() { w_max } else { w_min };
        }
        state_for_resistance(1.0 / conductance, w_min, w_max, self.r_on(), self.r_off())
    }

    /// `(g_off, g_on)` conductance range.
    pub fn conductance_range(&self) -> (f64, f64) {
        (1.0 / self.r_off(), 1.0 / self.r_on())
    }
}

/// Configuration of the device model used for every device of a crossbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelConfig {
    Vteam(VteamConfig),
    LinearIonDrift(LinearIonDriftConfig),
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::Vteam(VteamConfig::default())
    }
}

impl ModelConfig {
    /// Check every parameter description and the nominal model.
    pub fn validate(&self) -> Result<()> {
        let resolution = match self {
            ModelConfig::Vteam(c) => {
                for (name, p) in c.parameters() {
                    p.validate(name)?;
                }
                c.time_series_resolution
            }
            ModelConfig::LinearIonDrift(c) => {
                for (name, p) in c.parameters() {
                    p.validate(name)?;
                }
                c.time_series_resolution
            }
        };
        check_positive("time_series_resolution", resolution)?;
        self.nominal().validate()
    }

    /// Model built from the central value of every parameter.
    pub fn nominal(&self) -> DeviceModel {
        match self {
            ModelConfig::Vteam(c) => DeviceModel::Vteam(Vteam {
                time_series_resolution: c.time_series_resolution,
                r_on: c.r_on.nominal(),
                r_off: c.r_off.nominal(),
                d: c.d.nominal(),
                k_set: c.k_set.nominal(),
                k_reset: c.k_reset.nominal(),
                alpha_set: c.alpha_set.nominal(),
                alpha_reset: c.alpha_reset.nominal(),
                v_set: c.v_set.nominal(),
                v_reset: c.v_reset.nominal(),
            }),
            ModelConfig::LinearIonDrift(c) => DeviceModel::LinearIonDrift(LinearIonDrift {
                time_series_resolution: c.time_series_resolution,
                u_v: c.u_v.nominal(),
                d: c.d.nominal(),
                r_on: c.r_on.nominal(),
                r_off: c.r_off.nominal(),
                p: c.p.nominal(),
                pos_write_threshold: c.pos_write_threshold.nominal(),
                neg_write_threshold: c.neg_write_threshold.nominal(),
            }),
        }
    }

    /// Draw one device's parameters.
    ///
    /// Every call draws fresh samples from `sampler`; the result is
    /// validated so a pathological draw (e.g. `r_off ≤ r_on`) is reported
    /// instead of producing a device with inverted behaviour.
    pub fn resolve(&self, sampler: &mut ParameterSampler) -> Result<DeviceModel> {
        let model = match self {
            ModelConfig::Vteam(c) => DeviceModel::Vteam(c.resolve(sampler)),
            ModelConfig::LinearIonDrift(c) => DeviceModel::LinearIonDrift(c.resolve(sampler)),
        };
        model.validate()?;
        Ok(model)
    }
}
