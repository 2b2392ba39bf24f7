//! The read path: input encoding, per-tile Ohm's-law products, cross-tile
//! reduction and ADC conversion.

use memristive_devices::{Memristor, Polarity};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::adc::AdcRange;
use crate::error::{Error, Result};
use crate::mapping::CrossbarMapping;
use crate::scheme::Scheme;
use crate::tile::Tile;

/// Non-linear device response used during reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonLinearRead {
    /// Each read integrates every device for one time step at its row
    /// voltage. Reads are destructive.
    Simulated,
    /// Currents are interpolated from each device's characterized I/V curve.
    Characterized,
}

/// Read-time transforms installed on a mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadConfig {
    /// Number of evenly spaced conductance states per device.
    pub finite_states: Option<usize>,
    pub nonlinear: Option<NonLinearRead>,
}

impl ReadConfig {
    /// Conductance of `device` as seen by a read.
    pub fn conductance(&self, device: &Memristor) -> f64 {
        match self.finite_states {
            Some(levels) => device.quantized_conductance(levels),
            None => device.conductance(),
        }
    }

    /// Current through `device` at `voltage`, without advancing its state.
    ///
    /// Characterized curves are bypassed for devices that have since
    /// become faulty, and scaled for devices whose conductance moved.
    pub fn current(&self, device: &Memristor, voltage: f64) -> f64 {
        let characterized = match self.nonlinear {
            Some(NonLinearRead::Characterized) => device.characterized_current(voltage),
            _ => None,
        };
        characterized.unwrap_or_else(|| voltage * self.conductance(device))
    }
}

/// Result of one read.
#[derive(Debug, Clone)]
pub struct ReadOutput {
    /// Column currents (A), `batch × out_features`, after the ADC.
    pub currents: DMatrix<f64>,
    /// Currents rescaled to weight space, comparable to the ideal layer output.
    pub outputs: DMatrix<f64>,
    /// Input-to-voltage scale (V per input unit).
    pub voltage_scale: f64,
    /// ADC full scale, when the ADC converted anything.
    pub adc_range: Option<AdcRange>,
}

/// Per-tile read context shared by every tile.
struct TileRead<'a> {
    voltages: &'a DMatrix<f64>,
    read: &'a ReadConfig,
    scheme: Scheme,
    reference_conductance: f64,
}

impl TileRead<'_> {
    /// Voltages on the tile's rows, zero on padded rows.
    fn row_voltages(&self, tile: &Tile) -> DMatrix<f64> {
        let (r0, _) = tile.origin();
        let (ar, _) = tile.active_shape();
        let (rows, _) = tile.shape();
        DMatrix::from_fn(self.voltages.nrows(), rows, |b, r| {
            if r < ar {
                self.voltages[(b, r0 + r)]
            } else {
                0.0
            }
        })
    }

    /// Current drawn by the single-column reference cells, per batch row.
    fn reference_currents(&self, v: &DMatrix<f64>) -> Vec<f64> {
        v.row_iter()
            .map(|row| row.sum() * self.reference_conductance)
            .collect()
    }

    /// Linear read: `I = V · (G+ − G−)` over the full tile.
    fn linear(&self, tile: &Tile) -> DMatrix<f64> {
        let v = self.row_voltages(tile);
        let conductance = |d: &Memristor| self.read.conductance(d);
        let positive = tile.conductance_matrix_with(Polarity::Positive, conductance);
        match self.scheme {
            Scheme::DoubleColumn => {
                let negative = tile.conductance_matrix_with(Polarity::Negative, conductance);
                &v * (positive - negative)
            }
            Scheme::SingleColumn => {
                let mut currents = &v * positive;
                self.subtract_reference(tile, &v, &mut currents);
                currents
            }
        }
    }

    /// Device-by-device read through [`ReadConfig::current`].
    fn per_device(&self, tile: &Tile) -> DMatrix<f64> {
        let v = self.row_voltages(tile);
        let (_, ac) = tile.active_shape();
        let mut currents = DMatrix::zeros(v.nrows(), tile.shape().1);
        for (polarity, sign) in [(Polarity::Positive, 1.0), (Polarity::Negative, -1.0)] {
            let Some(devices) = tile.array(polarity) else {
                continue;
            };
            for (k, device) in devices.iter().enumerate() {
                let (r, c) = (k / ac, k % ac);
                for b in 0..v.nrows() {
                    currents[(b, c)] += sign * self.read.current(device, v[(b, r)]);
                }
            }
        }
        if self.scheme == Scheme::SingleColumn {
            self.subtract_reference(tile, &v, &mut currents);
        }
        currents
    }

    /// Simulated read: every device draws current and integrates one step
    /// per batch sample.
    fn simulated(&self, tile: &mut Tile) -> DMatrix<f64> {
        let v = self.row_voltages(tile);
        let (_, ac) = tile.active_shape();
        let mut currents = DMatrix::zeros(v.nrows(), tile.shape().1);
        for b in 0..v.nrows() {
            for (polarity, sign) in [(Polarity::Positive, 1.0), (Polarity::Negative, -1.0)] {
                let Some(devices) = tile.array_mut(polarity) else {
                    continue;
                };
                for (k, device) in devices.iter_mut().enumerate() {
                    let (r, c) = (k / ac, k % ac);
                    let voltage = v[(b, r)];
                    currents[(b, c)] += sign * voltage * self.read.conductance(device);
                    let dt = device.model().time_series_resolution();
                    device.step(voltage, dt);
                }
            }
        }
        if self.scheme == Scheme::SingleColumn {
            self.subtract_reference(tile, &v, &mut currents);
        }
        currents
    }

    fn subtract_reference(&self, tile: &Tile, v: &DMatrix<f64>, currents: &mut DMatrix<f64>) {
        let (_, ac) = tile.active_shape();
        for (b, reference) in self.reference_currents(v).into_iter().enumerate() {
            for c in 0..ac {
                currents[(b, c)] -= reference;
            }
        }
    }
}

impl CrossbarMapping {
    /// Evaluate the crossbar on `inputs` (`batch × in_features`).
    ///
    /// Inputs are encoded linearly into `[-V_max, V_max]` by their peak
    /// magnitude. Takes `&mut self` because simulated non-linear reads
    /// advance device state; clone the mapping first to keep a baseline.
    pub fn read(&mut self, inputs: &DMatrix<f64>) -> Result<ReadOutput> {
        let (rows, cols) = self.grid.logical_shape();
        if inputs.ncols() != rows {
            return Err(Error::DimensionMismatch {
                what: "input",
                expected: rows,
                actual: inputs.ncols(),
            });
        }
        if let Some(bad) = inputs.iter().find(|x| !x.is_finite()) {
            return Err(Error::Configuration(format!("non-finite input {}", bad)));
        }

        let batch = inputs.nrows();
        let peak = inputs.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
        let voltage_scale = if peak > 0.0 {
            self.max_input_voltage / peak
        } else {
            0.0
        };
        let voltages = inputs * voltage_scale;

        let read_config = self.read_config.clone();
        let context = TileRead {
            voltages: &voltages,
            read: &read_config,
            scheme: self.scheme(),
            reference_conductance: self.scale().reference_conductance(),
        };
        let parallel = self.parallel.clone();
        let partials = match read_config.nonlinear {
            Some(NonLinearRead::Simulated) => {
                parallel.map_mut(&mut self.tiles, |tile| context.simulated(tile))
            }
            Some(NonLinearRead::Characterized) => {
                parallel.map(&self.tiles, |tile| context.per_device(tile))
            }
            None => parallel.map(&self.tiles, |tile| context.linear(tile)),
        };

        // An all-zero layer has no conductance swing, so nothing a device
        // draws (faulted or not) carries weight: its columns read zero.
        let per_weight = self.conductance_per_weight();
        let mut currents = DMatrix::zeros(batch, cols);
        if per_weight.is_some() {
            for (tile, partial) in self.tiles.iter().zip(&partials) {
                let (_, c0) = tile.origin();
                let (_, ac) = tile.active_shape();
                for b in 0..batch {
                    for c in 0..ac {
                        currents[(b, c0 + c)] += partial[(b, c)];
                    }
                }
            }
        }

        let adc_range = self.adc.quantize(&mut currents);
        let outputs = match per_weight {
            Some(per_weight) if voltage_scale > 0.0 => &currents / (voltage_scale * per_weight),
            _ => DMatrix::zeros(batch, cols),
        };
        log::debug!(
            "Read batch of {} through {} tiles (scale {:.3e} V/unit)",
            batch,
            self.tiles.len(),
            voltage_scale
        );

        Ok(ReadOutput {
            currents,
            outputs,
            voltage_scale,
            adc_range,
        })
    }
}
