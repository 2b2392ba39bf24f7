//! Voltage signals used to drive devices through time.
//!
//! Programming pulses, hysteresis sweeps and read voltages are all expressed
//! as a [`Waveform`] evaluated at the integrator's sample times.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// A time-varying voltage signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Waveform {
    /// Constant value.
    Dc { value: f64 },

    /// Trapezoidal pulse train.
    ///
    /// - v1: Base value
    /// - v2: Pulsed value
    /// - td: Delay before the first pulse
    /// - tr: Rise time
    /// - tf: Fall time
    /// - pw: Pulse width (at v2)
    /// - per: Period (0 for a single pulse)
    Pulse {
        v1: f64,
        v2: f64,
        td: f64,
        tr: f64,
        tf: f64,
        pw: f64,
        per: f64,
    },

    /// Sinusoid `vo + va * sin(2π·freq·t + phase)` (phase in degrees).
    Sin {
        vo: f64,
        va: f64,
        freq: f64,
        phase: f64,
    },
}

impl Waveform {
    /// Constant waveform.
    pub fn dc(value: f64) -> Self {
        Waveform::Dc { value }
    }

    /// Single rectangular pulse of `amplitude` lasting `width`, starting at t = 0.
    pub fn square_pulse(amplitude: f64, width: f64) -> Self {
        Waveform::Pulse {
            v1: 0.0,
            v2: amplitude,
            td: 0.0,
            tr: 0.0,
            tf: 0.0,
            pw: width,
            per: 0.0,
        }
    }

    /// Zero-offset sinusoid, the usual hysteresis sweep.
    pub fn sin(amplitude: f64, freq: f64) -> Self {
        Waveform::Sin {
            vo: 0.0,
            va: amplitude,
            freq,
            phase: 0.0,
        }
    }

    /// Evaluate the waveform at a given time.
    pub fn value_at(&self, time: f64) -> f64 {
        match self {
            Waveform::Dc { value } => *value,
            Waveform::Pulse {
                v1,
                v2,
                td,
                tr,
                tf,
                pw,
                per,
            } => eval_pulse(*v1, *v2, *td, *tr, *tf, *pw, *per, time),
            Waveform::Sin {
                vo,
                va,
                freq,
                phase,
            } => vo + va * (2.0 * PI * freq * time + phase * PI / 180.0).sin(),
        }
    }

    /// Sample the waveform at `k * dt` for `k in 0..steps`.
    pub fn sample(&self, dt: f64, steps: usize) -> Vec<f64> {
        (0..steps).map(|k| self.value_at(k as f64 * dt)).collect()
    }
}

/// Evaluate a pulse waveform at time t.
#[allow(clippy::too_many_arguments)]
fn eval_pulse(v1: f64, v2: f64, td: f64, tr: f64, tf: f64, pw: f64, per: f64, t: f64) -> f64 {
    if t < td {
        return v1;
    }

    let t_rel = if per > 0.0 { (t - td) % per } else { t - td };

    if t_rel < tr {
        v1 + (v2 - v1) * t_rel / tr
    } else if t_rel < tr + pw {
        v2
    } else if t_rel < tr + pw + tf {
        v2 - (v2 - v1) * (t_rel - tr - pw) / tf
    } else {
        v1
    }
}
