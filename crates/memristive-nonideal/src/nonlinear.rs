//! Non-linear I/V response during reads.

use memristive_crossbar::{CrossbarMapping, NonLinearRead};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bins of a characterized I/V curve over `[-amplitude, amplitude]`.
pub const CHARACTERIZATION_BINS: usize = 64;

/// How reads account for the devices' non-linear response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonLinear {
    /// Integrate every device at its row voltage during each read.
    Simulated,
    /// Characterize each device once with a sinusoidal sweep, then
    /// interpolate its I/V curve during reads.
    Characterized {
        /// Sweep length (s).
        sweep_duration: f64,
        /// Sweep amplitude (V).
        sweep_voltage_signal_amplitude: f64,
        /// Sweep frequency (Hz).
        sweep_voltage_signal_frequency: f64,
    },
}

impl NonLinear {
    pub fn validate(&self) -> Result<()> {
        if let NonLinear::Characterized {
            sweep_duration,
            sweep_voltage_signal_amplitude,
            sweep_voltage_signal_frequency,
        } = *self
        {
            for (name, value) in [
                ("sweep_duration", sweep_duration),
                ("sweep_voltage_signal_amplitude", sweep_voltage_signal_amplitude),
                ("sweep_voltage_signal_frequency", sweep_voltage_signal_frequency),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(Error::Configuration(format!(
                        "{} must be positive, got {}",
                        name, value
                    )));
                }
            }
        }
        Ok(())
    }

    /// Install the response on `mapping`, characterizing devices if needed.
    ///
    /// Returns the number of characterized devices.
    pub(crate) fn apply(&self, mapping: &mut CrossbarMapping) -> Result<usize> {
        let characterized = match *self {
            NonLinear::Simulated => {
                mapping.read_config_mut().nonlinear = Some(NonLinearRead::Simulated);
                0
            }
            NonLinear::Characterized {
                sweep_duration,
                sweep_voltage_signal_amplitude,
                sweep_voltage_signal_frequency,
            } => {
                let budget = mapping.step_budget();
                let parallel = mapping.parallel().clone();
                let results = parallel.map_mut(mapping.tiles_mut(), |tile| -> Result<usize> {
                    let mut count = 0;
                    for device in tile.devices_mut() {
                        let curve = device.characterize(
                            sweep_duration,
                            sweep_voltage_signal_amplitude,
                            sweep_voltage_signal_frequency,
                            CHARACTERIZATION_BINS,
                            budget,
                        )?;
                        device.set_iv_curve(Some(curve));
                        count += 1;
                    }
                    Ok(count)
                });
                let mut total = 0;
                for result in results {
                    total += result?;
                }
                mapping.read_config_mut().nonlinear = Some(NonLinearRead::Characterized);
                total
            }
        };
        Ok(characterized)
    }
}
