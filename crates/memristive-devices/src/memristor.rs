//! A single memristive device: identity, internal state and its integrator.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{DeviceModel, ModelConfig};
use crate::rng::{splitmix64, ParameterSampler};
use crate::waveforms::Waveform;

/// Which array of a device pair a device belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

/// Position of a device within the crossbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId {
    /// Index of the owning tile in the mapping.
    pub tile: u32,
    /// Row within the tile.
    pub row: u32,
    /// Column within the tile.
    pub col: u32,
    pub polarity: Polarity,
}

impl DeviceId {
    pub fn new(tile: u32, row: u32, col: u32, polarity: Polarity) -> Self {
        Self {
            tile,
            row,
            col,
            polarity,
        }
    }

    /// Random stream identifying this device.
    ///
    /// Each coordinate is folded into a SplitMix64 chain, so every index
    /// uses its full width and no field can spill into another.
    pub fn stream(&self) -> u64 {
        let polarity = match self.polarity {
            Polarity::Positive => 0u64,
            Polarity::Negative => 1u64,
        };
        [self.tile as u64, self.row as u64, self.col as u64, polarity]
            .into_iter()
            .fold(0, |hash, index| splitmix64(hash ^ index))
    }
}

/// Permanent stuck-at fault of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fault {
    /// Stuck at the low-resistance bound.
    StuckLrs,
    /// Stuck at the high-resistance bound.
    StuckHrs,
    /// Never electroformed; behaves as a high-resistance stuck device.
    Unformed,
}

/// Which drift process last moved a device, and the state it started from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftRecord {
    /// Caller-defined identifier of the drift process (e.g. endurance, retention).
    pub source: u8,
    /// Device state before that process was first applied.
    pub baseline_state: f64,
}

/// Result of a single integration step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Normal update (possibly clamped at a physical bound).
    Integrated,
    /// The velocity was not finite; the state was clamped to a bound.
    Clamped,
    /// The device is faulted and did not move.
    Stuck,
}

/// Upper bound on the number of integration steps a single call may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBudget(pub u64);

impl Default for StepBudget {
    fn default() -> Self {
        StepBudget(10_000_000)
    }
}

impl StepBudget {
    /// Number of steps needed to cover `duration` with step `dt`, checked against the budget.
    pub fn steps_for(&self, duration: f64, dt: f64) -> Result<usize> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(Error::InvalidValue {
                name: "duration",
                value: duration,
            });
        }
        // Shave a relative epsilon so exact multiples of dt do not gain a step
        let steps = (duration / dt * (1.0 - 1e-12)).ceil();
        if !steps.is_finite() || steps > self.0 as f64 {
            return Err(Error::StepBudgetExceeded {
                steps: if steps.is_finite() { steps as u64 } else { u64::MAX },
                budget: self.0,
            });
        }
        Ok((steps as usize).max(1))
    }
}

/// A memristor with resolved parameters and internal state.
#[derive(Debug, Clone)]
pub struct Memristor {
    id: DeviceId,
    model: DeviceModel,
    state: f64,
    fault: Option<Fault>,
    drift: Option<DriftRecord>,
    iv_curve: Option<IvCurve>,
}

impl Memristor {
    /// Create a pristine device from an already resolved model.
    pub fn new(id: DeviceId, model: DeviceModel) -> Result<Self> {
        model.validate()?;
        let (w_min, _) = model.bounds();
        Ok(Self {
            id,
            model,
            state: w_min,
            fault: None,
            drift: None,
            iv_curve: None,
        })
    }

    /// Draw this device's parameters from `config` and create it pristine.
    ///
    /// The device samples from its own stream under `seed`, so instantiation
    /// order does not matter.
    pub fn instantiate(id: DeviceId, config: &ModelConfig, seed: u64) -> Result<Self> {
        let mut sampler = ParameterSampler::new(seed, id.stream());
        Self::new(id, config.resolve(&mut sampler)?)
    }

    /// Explicit resample: a new pristine device at the same position with
    /// parameters drawn afresh under `seed`. This device is untouched.
    pub fn resample(&self, config: &ModelConfig, seed: u64) -> Result<Self> {
        Self::instantiate(self.id, config, seed)
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Resolved model parameters. Reading them never resamples.
    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    /// Internal state `w`.
    pub fn state(&self) -> f64 {
        self.state
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn drift(&self) -> Option<DriftRecord> {
        self.drift
    }

    /// Whether faults or drift have permanently altered this device.
    pub fn is_altered(&self) -> bool {
        self.fault.is_some() || self.drift.is_some()
    }

    pub fn iv_curve(&self) -> Option<&IvCurve> {
        self.iv_curve.as_ref()
    }

    /// Current conductance `g(w)`; faulted devices return their fault conductance.
    pub fn conductance(&self) -> f64 {
        let (g_off, g_on) = self.model.conductance_range();
        match self.fault {
            Some(Fault::StuckLrs) => g_on,
            Some(Fault::StuckHrs) | Some(Fault::Unformed) => g_off,
            None => self.model.conductance(self.state),
        }
    }

    /// Conductance snapped to one of `levels` evenly spaced values between
    /// this device's off and on conductances.
    ///
    /// Idempotent: quantizing a level returns the same level.
    pub fn quantized_conductance(&self, levels: usize) -> f64 {
        let (g_off, g_on) = self.model.conductance_range();
        quantize_to_levels(self.conductance(), g_off, g_on, levels)
    }

    /// Move the state directly to the value closest to `conductance`.
    ///
    /// Idealized instantaneous write. Ignored for faulted devices.
    pub fn set_conductance(&mut self, conductance: f64) {
        if self.fault.is_none() {
            self.state = self.model.state_for_conductance(conductance);
        }
    }

    /// Overwrite the internal state, clamped to the physical bounds.
    pub fn set_state(&mut self, state: f64) {
        if self.fault.is_none() {
            let (w_min, w_max) = self.model.bounds();
            self.state = state.clamp(w_min, w_max);
        }
    }

    /// Mark the device as permanently faulted. Faults are terminal: an
    /// already faulted device keeps its first fault.
    pub fn apply_fault(&mut self, fault: Fault) -> bool {
        if self.fault.is_some() {
            return false;
        }
        let (w_min, w_max) = self.model.bounds();
        self.state = match fault {
            Fault::StuckLrs => w_max,
            Fault::StuckHrs | Fault::Unformed => w_min,
        };
        self.fault = Some(fault);
        true
    }

    /// State a drift by process `source` should be computed from.
    ///
    /// This is the baseline stored when the same process was last applied, or the current state
    /// when a different (or no) process was applied before.
    pub fn drift_baseline(&self, source: u8) -> f64 {
        match self.drift {
            Some(record) if record.source == source => record.baseline_state,
            _ => self.state,
        }
    }

    /// Apply a drifted state produced by process `source`. Faulted devices are unaffected.
    pub fn apply_drift(&mut self, source: u8, drifted_state: f64) {
        if self.fault.is_some() {
            return;
        }
        let baseline_state = self.drift_baseline(source);
        let (w_min, w_max) = self.model.bounds();
        self.state = drifted_state.clamp(w_min, w_max);
        self.drift = Some(DriftRecord {
            source,
            baseline_state,
        });
    }

    pub fn set_iv_curve(&mut self, curve: Option<IvCurve>) {
        self.iv_curve = curve;
    }

    /// Current at `voltage` from the characterized I/V curve.
    ///
    /// The curve is scaled by the ratio of the present conductance to the
    /// conductance at sweep time, so later drift or writes still show up.
    /// `None` when the device has no curve or has since become faulty.
    pub fn characterized_current(&self, voltage: f64) -> Option<f64> {
        if self.fault.is_some() {
            return None;
        }
        let curve = self.iv_curve.as_ref()?;
        let current = curve.current(voltage);
        Some(match curve.swept_conductance() {
            Some(g) if g > 0.0 => current * (self.conductance() / g),
            _ => current,
        })
    }

    /// Integrate one step of length `dt` under `voltage`.
    pub fn step(&mut self, voltage: f64, dt: f64) -> StepOutcome {
        if self.fault.is_some() {
            return StepOutcome::Stuck;
        }
        let (w_min, w_max) = self.model.bounds();
        let velocity = self.model.dwdt(self.state, voltage);

        if !velocity.is_finite() {
            let bound = if voltage > 0.0 { w_max } else { w_min };
            log::warn!(
                "non-finite state velocity for device {:?} at {} V, clamping state to {:e}",
                self.id,
                voltage,
                bound
            );
            self.state = bound;
            return StepOutcome::Clamped;
        }

        let next = self.state + velocity * dt;
        self.state = if next.is_finite() {
            next.clamp(w_min, w_max)
        } else if velocity > 0.0 {
            w_max
        } else {
            w_min
        };
        StepOutcome::Integrated
    }

    /// Drive the device with one sample per integration step and return the
    /// current drawn during each step.
    ///
    /// The current of a step is evaluated before that step's state update.
    pub fn simulate_samples(&mut self, samples: &[f64]) -> Vec<f64> {
        let dt = self.model.time_series_resolution();
        let mut clamped = 0usize;
        let currents = samples
            .iter()
            .map(|&voltage| {
                let current = voltage * self.conductance();
                if self.step(voltage, dt) == StepOutcome::Clamped {
                    clamped += 1;
                }
                current
            })
            .collect();
        if clamped > 0 {
            log::debug!("{} of {} steps clamped for device {:?}", clamped, samples.len(), self.id);
        }
        currents
    }

    /// Drive the device with `signal` for `duration` seconds.
    ///
    /// The signal is sampled at `k * dt` for `k in 0..ceil(duration / dt)`,
    /// with `dt` the model's time series resolution. The call is rejected
    /// before integrating if the duration is not positive or the step count
    /// exceeds `budget`. Integration is deterministic.
    pub fn simulate(
        &mut self,
        signal: &Waveform,
        duration: f64,
        budget: StepBudget,
    ) -> Result<Vec<f64>> {
        let dt = self.model.time_series_resolution();
        let steps = budget.steps_for(duration, dt)?;
        Ok(self.simulate_samples(&signal.sample(dt, steps)))
    }

    /// Characterize the device's I/V response with a sinusoidal sweep.
    ///
    /// The sweep runs on a copy of the device, so this device's state is
    /// untouched. Samples are averaged into `bins` voltage bins spanning
    /// `[-amplitude, amplitude]`; the curve always passes through the origin.
    pub fn characterize(
        &self,
        duration: f64,
        amplitude: f64,
        frequency: f64,
        bins: usize,
        budget: StepBudget,
    ) -> Result<IvCurve> {
        if !(amplitude.is_finite() && amplitude > 0.0) {
            return Err(Error::InvalidValue {
                name: "sweep_voltage_signal_amplitude",
                value: amplitude,
            });
        }
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(Error::InvalidValue {
                name: "sweep_voltage_signal_frequency",
                value: frequency,
            });
        }
        if bins < 2 {
            return Err(Error::InvalidParameter(format!(
                "characterization needs at least 2 bins, got {}",
                bins
            )));
        }

        let dt = self.model.time_series_resolution();
        let steps = budget.steps_for(duration, dt)?;
        let voltages = Waveform::sin(amplitude, frequency).sample(dt, steps);
        let mut swept = self.clone();
        let currents = swept.simulate_samples(&voltages);

        let mut curve = IvCurve::from_samples(&voltages, &currents, amplitude, bins);
        curve.swept_conductance = Some(self.conductance());
        Ok(curve)
    }
}

/// Snap `value` to one of `levels` evenly spaced points in `[low, high]`.
pub fn quantize_to_levels(value: f64, low: f64, high: f64, levels: usize) -> f64 {
    if levels < 2 || high <= low {
        return value;
    }
    let step = (high - low) / (levels - 1) as f64;
    let index = ((value - low) / step).round().clamp(0.0, (levels - 1) as f64);
    low + index * step
}

/// Tabulated current/voltage response of a device.
#[derive(Debug, Clone, PartialEq)]
pub struct IvCurve {
    /// Strictly increasing voltages.
    voltages: Vec<f64>,
    currents: Vec<f64>,
    /// Conductance of the device when it was swept.
    swept_conductance: Option<f64>,
}

impl IvCurve {
    /// Bin-average `(voltage, current)` samples over `[-amplitude, amplitude]`.
    ///
    /// Empty bins are dropped and the origin is pinned to zero current.
    pub fn from_samples(voltages: &[f64], currents: &[f64], amplitude: f64, bins: usize) -> Self {
        let width = 2.0 * amplitude / bins as f64;
        let mut sums = vec![(0.0f64, 0.0f64, 0usize); bins];
        for (&v, &i) in voltages.iter().zip(currents) {
            let idx = (((v + amplitude) / width).floor() as isize).clamp(0, bins as isize - 1) as usize;
            sums[idx].0 += v;
            sums[idx].1 += i;
            sums[idx].2 += 1;
        }

        let mut points: Vec<(f64, f64)> = sums
            .into_iter()
            .filter(|(_, _, n)| *n > 0)
            .map(|(v, i, n)| (v / n as f64, i / n as f64))
            .filter(|(v, _)| *v != 0.0)
            .collect();
        points.push((0.0, 0.0));
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|a, b| a.0 == b.0);

        Self {
            voltages: points.iter().map(|p| p.0).collect(),
            currents: points.iter().map(|p| p.1).collect(),
            swept_conductance: None,
        }
    }

    pub fn voltages(&self) -> &[f64] {
        &self.voltages
    }

    pub fn currents(&self) -> &[f64] {
        &self.currents
    }

    pub fn swept_conductance(&self) -> Option<f64> {
        self.swept_conductance
    }

    /// Current at `voltage` by linear interpolation.
    ///
    /// Outside the characterized range the chord conductance of the nearest
    /// end point is used.
    pub fn current(&self, voltage: f64) -> f64 {
        let n = self.voltages.len();
        if n == 1 {
            return self.currents[0];
        }
        let first = self.voltages[0];
        let last = self.voltages[n - 1];
        if voltage <= first {
            return if first != 0.0 {
                self.currents[0] / first * voltage
            } else {
                0.0
            };
        }
        if voltage >= last {
            return if last != 0.0 {
                self.currents[n - 1] / last * voltage
            } else {
                0.0
            };
        }
        let upper = self.voltages.partition_point(|&v| v < voltage);
        if self.voltages[upper] == voltage {
            return self.currents[upper];
        }
        let (v0, v1) = (self.voltages[upper - 1], self.voltages[upper]);
        let (i0, i1) = (self.currents[upper - 1], self.currents[upper]);
        i0 + (i1 - i0) * (voltage - v0) / (v1 - v0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearIonDrift, Vteam};

    fn vteam() -> Memristor {
        Memristor::new(
            DeviceId::new(0, 0, 0, Polarity::Positive),
            DeviceModel::Vteam(Vteam::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_pristine_is_high_resistance() {
        let m = vteam();
        assert_eq!(m.state(), 0.0);
        assert!((m.conductance() - 1.0 / 1000.0).abs() < 1e-15);
        assert!(!m.is_altered());
    }

    #[test]
    fn test_zero_voltage_never_changes_conductance() {
        let mut m = vteam();
        m.set_conductance(0.01);
        let before = m.conductance();
        for dt in [1e-12, 1e-10, 1e-3, 1.0] {
            m.step(0.0, dt);
            assert_eq!(m.conductance(), before);
        }
    }

    #[test]
    fn test_step_respects_bounds() {
        let mut m = vteam();
        for _ in 0..100 {
            m.step(5.0, 1e-6);
            assert!(m.state() <= 3e-9);
        }
        assert_eq!(m.state(), 3e-9);
        for _ in 0..100 {
            m.step(-5.0, 1e-6);
            assert!(m.state() >= 0.0);
        }
        assert_eq!(m.state(), 0.0);
    }

    #[test]
    fn test_simulate_deterministic_trajectory() {
        let mut a = vteam();
        let mut b = vteam();
        let signal = Waveform::dc(1.0);
        let ia = a.simulate(&signal, 1e-8, StepBudget::default()).unwrap();
        let ib = b.simulate(&signal, 1e-8, StepBudget::default()).unwrap();
        assert_eq!(ia, ib);
        assert_eq!(a.state(), b.state());
        assert_eq!(ia.len(), 100);

        // Exact VTEAM trajectory: constant velocity k_set·(v/v_set − 1) above threshold
        let velocity = 5e-4 * (1.0 / 0.02 - 1.0);
        let expected = velocity * 1e-10 * 100.0;
        assert!((a.state() - expected).abs() < 1e-20, "state {} vs {}", a.state(), expected);
    }

    #[test]
    fn test_simulate_rejects_bad_durations() {
        let mut m = vteam();
        let signal = Waveform::dc(1.0);
        assert!(m.simulate(&signal, 0.0, StepBudget::default()).is_err());
        assert!(m.simulate(&signal, -1.0, StepBudget::default()).is_err());
        assert!(m.simulate(&signal, f64::NAN, StepBudget::default()).is_err());
        // 1 s at 0.1 ns resolution is 1e10 steps
        assert!(matches!(
            m.simulate(&signal, 1.0, StepBudget::default()),
            Err(Error::StepBudgetExceeded { .. })
        ));
        assert_eq!(m.state(), 0.0);
    }

    #[test]
    fn test_non_finite_velocity_clamps_to_bound() {
        let model = Vteam {
            v_set: 0.0,
            ..Vteam::default()
        };
        let mut m = Memristor::new(
            DeviceId::new(0, 0, 0, Polarity::Positive),
            DeviceModel::Vteam(model),
        )
        .unwrap();
        assert_eq!(m.step(0.5, 1e-10), StepOutcome::Clamped);
        assert_eq!(m.state(), 3e-9);
        assert!(m.conductance().is_finite());
    }

    #[test]
    fn test_faulted_device_is_stuck() {
        let mut m = vteam();
        assert!(m.apply_fault(Fault::StuckLrs));
        assert!(!m.apply_fault(Fault::StuckHrs));
        assert_eq!(m.fault(), Some(Fault::StuckLrs));
        assert_eq!(m.step(-5.0, 1e-6), StepOutcome::Stuck);
        m.set_conductance(1e-3);
        assert!((m.conductance() - 1.0 / 50.0).abs() < 1e-15);
        assert!(m.is_altered());
    }

    #[test]
    fn test_drift_baseline_overwrites_same_source() {
        let mut m = vteam();
        m.set_state(1e-9);
        m.apply_drift(0, 2e-9);
        assert_eq!(m.drift_baseline(0), 1e-9);
        assert_eq!(m.drift_baseline(1), 2e-9);
        m.apply_drift(0, 1.5e-9);
        assert_eq!(m.drift().unwrap().baseline_state, 1e-9);
        assert_eq!(m.state(), 1.5e-9);
    }

    #[test]
    fn test_quantize_to_levels_idempotent() {
        for value in [0.0, 0.1, 0.26, 0.5, 0.74, 1.0, 1.3] {
            let q = quantize_to_levels(value, 0.0, 1.0, 5);
            assert_eq!(quantize_to_levels(q, 0.0, 1.0, 5), q);
            assert!([0.0, 0.25, 0.5, 0.75, 1.0].contains(&q), "{} -> {}", value, q);
        }
    }

    #[test]
    fn test_characterize_leaves_device_untouched() {
        let mut m = Memristor::new(
            DeviceId::new(0, 0, 0, Polarity::Positive),
            DeviceModel::LinearIonDrift(LinearIonDrift::default()),
        )
        .unwrap();
        m.set_conductance(1e-3);
        let before = m.state();
        let curve = m.characterize(1.0, 1.0, 1.0, 41, StepBudget::default()).unwrap();
        assert_eq!(m.state(), before);
        assert_eq!(curve.current(0.0), 0.0);
        assert!(curve.current(0.5) > 0.0);
        assert!(curve.current(-0.5) < 0.0);
    }

    #[test]
    fn test_iv_curve_interpolation() {
        let curve = IvCurve::from_samples(&[-1.0, -0.5, 0.5, 1.0], &[-2.0, -1.0, 1.0, 2.0], 1.0, 4);
        assert!((curve.current(0.25) - 0.5).abs() < 1e-12);
        assert!((curve.current(0.75) - 1.5).abs() < 1e-12);
        // Extrapolate with the end chord conductance
        assert!((curve.current(2.0) - 4.0).abs() < 1e-12);
        assert!((curve.current(-2.0) + 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_resample_draws_new_parameters() {
        use crate::model::VteamConfig;
        use crate::stochastic::StochasticParameter;

        let config = ModelConfig::Vteam(VteamConfig {
            r_off: StochasticParameter::normal(1000.0, 50.0),
            ..VteamConfig::default()
        });
        let id = DeviceId::new(0, 1, 2, Polarity::Positive);
        let mut original = Memristor::instantiate(id, &config, 1).unwrap();
        original.set_state(1e-9);

        let fresh = original.resample(&config, 2).unwrap();
        assert_eq!(fresh.id(), id);
        assert_eq!(fresh.state(), 0.0);
        assert_ne!(fresh.model().r_off(), original.model().r_off());
        assert_eq!(original.state(), 1e-9);
        assert_eq!(
            original.resample(&config, 1).unwrap().model(),
            original.model()
        );
    }

    #[test]
    fn test_instantiate_reproducible() {
        let config = ModelConfig::default();
        let id = DeviceId::new(3, 4, 5, Polarity::Negative);
        let a = Memristor::instantiate(id, &config, 1).unwrap();
        let b = Memristor::instantiate(id, &config, 1).unwrap();
        assert_eq!(a.model(), b.model());
        assert_ne!(
            id.stream(),
            DeviceId::new(3, 4, 5, Polarity::Positive).stream()
        );
    }

    #[test]
    fn test_streams_distinct_for_large_indices() {
        let p = Polarity::Positive;
        let origin = DeviceId::new(0, 0, 0, p).stream();
        // Tile indices past 2^15 and rows past 2^24
        assert_ne!(DeviceId::new(1 << 15, 0, 0, p).stream(), origin);
        assert_ne!(
            DeviceId::new(0, 1 << 24, 0, p).stream(),
            DeviceId::new(1, 0, 0, p).stream()
        );
        assert_ne!(
            DeviceId::new(0, 0, 1 << 24, p).stream(),
            DeviceId::new(0, 1, 0, p).stream()
        );
        assert_ne!(
            DeviceId::new(0, 3, 7, p).stream(),
            DeviceId::new(0, 7, 3, p).stream()
        );
    }

    #[test]
    fn test_characterized_current_follows_conductance() {
        let mut m = Memristor::new(
            DeviceId::new(0, 0, 0, Polarity::Positive),
            DeviceModel::LinearIonDrift(LinearIonDrift::default()),
        )
        .unwrap();
        assert_eq!(m.characterized_current(0.5), None);

        m.set_conductance(1e-3);
        let curve = m.characterize(1.0, 1.0, 1.0, 41, StepBudget::default()).unwrap();
        assert_eq!(curve.swept_conductance(), Some(m.conductance()));
        m.set_iv_curve(Some(curve.clone()));
        assert_eq!(m.characterized_current(0.5), Some(curve.current(0.5)));

        // Drift moves the state after the sweep; the curve scales with it
        let g_swept = m.conductance();
        let drifted = m.model().state_for_conductance(2e-3);
        m.apply_drift(1, drifted);
        let ratio = m.conductance() / g_swept;
        assert!(ratio > 1.5);
        let current = m.characterized_current(0.5).unwrap();
        assert!((current - curve.current(0.5) * ratio).abs() < 1e-12 * current.abs().max(1.0));

        m.apply_fault(Fault::StuckHrs);
        assert_eq!(m.characterized_current(0.5), None);
    }
}
