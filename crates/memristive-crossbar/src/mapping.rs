//! Mapping a weight tensor onto tiles of memristive devices.

use memristive_devices::{DeviceModel, Memristor, ModelConfig, Polarity, StepBudget};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::adc::{Adc, QuantMethod};
use crate::error::{Error, Result};
use crate::parallel::ParallelConfig;
use crate::programming::{ProgrammingReport, ProgrammingRoutine};
use crate::read::ReadConfig;
use crate::scheme::{ConductanceScale, Scheme};
use crate::tile::{Tile, TileGrid};
use crate::weights::WeightTensor;

/// Crossbar configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossbarConfig {
    /// Device model and per-device parameter spreads.
    pub memristor_model: ModelConfig,
    /// Tile `(rows, cols)`; `None` maps the whole matrix onto a single tile.
    pub tile_shape: Option<(usize, usize)>,
    pub scheme: Scheme,
    /// Peak read voltage (V) the inputs are encoded into.
    pub max_input_voltage: f64,
    /// ADC bit width; `None` disables output quantization.
    pub adc_resolution: Option<u32>,
    /// Fraction of the observed output span added as ADC headroom.
    pub adc_overflow_rate: f64,
    pub quant_method: QuantMethod,
    /// Whether every cell has an access transistor (1T1R). Without it the
    /// array is 1R and must be programmed with half-select pulses.
    pub transistor: bool,
    /// Pulse programming routine; `None` writes target conductances directly.
    pub programming_routine: Option<ProgrammingRoutine>,
    /// Quantile of `|w|` mapped to the full conductance swing (p_l).
    pub weight_retention: f64,
    pub step_budget: StepBudget,
    pub parallel: ParallelConfig,
}

impl Default for CrossbarConfig {
    fn default() -> Self {
        Self {
            memristor_model: ModelConfig::default(),
            tile_shape: Some((128, 128)),
            scheme: Scheme::DoubleColumn,
            max_input_voltage: 0.3,
            adc_resolution: None,
            adc_overflow_rate: 0.0,
            quant_method: QuantMethod::Linear,
            transistor: true,
            programming_routine: None,
            weight_retention: 1.0,
            step_budget: StepBudget::default(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl CrossbarConfig {
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.memristor_model = model;
        self
    }

    pub fn with_tile_shape(mut self, tile_shape: Option<(usize, usize)>) -> Self {
        self.tile_shape = tile_shape;
        self
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_adc(mut self, resolution: Option<u32>, overflow_rate: f64, method: QuantMethod) -> Self {
        self.adc_resolution = resolution;
        self.adc_overflow_rate = overflow_rate;
        self.quant_method = method;
        self
    }

    pub fn with_transistor(mut self, transistor: bool) -> Self {
        self.transistor = transistor;
        self
    }

    pub fn with_programming(mut self, routine: Option<ProgrammingRoutine>) -> Self {
        self.programming_routine = routine;
        self
    }

    pub fn with_weight_retention(mut self, p: f64) -> Self {
        self.weight_retention = p;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the configuration before any device is created.
    pub fn validate(&self) -> Result<()> {
        self.memristor_model.validate()?;
        if let Some((tr, tc)) = self.tile_shape {
            if tr == 0 || tc == 0 {
                return Err(Error::Configuration(format!(
                    "tile shape must be non-zero, got ({}, {})",
                    tr, tc
                )));
            }
        }
        if !(self.max_input_voltage.is_finite() && self.max_input_voltage > 0.0) {
            return Err(Error::Configuration(format!(
                "max_input_voltage must be positive, got {}",
                self.max_input_voltage
            )));
        }
        if !(self.weight_retention > 0.0 && self.weight_retention <= 1.0) {
            return Err(Error::Configuration(format!(
                "weight_retention must be in (0, 1], got {}",
                self.weight_retention
            )));
        }
        self.adc()?;
        match &self.programming_routine {
            Some(routine) => routine.validate()?,
            None if !self.transistor => {
                return Err(Error::Configuration(
                    "a 1R crossbar (transistor = false) requires a programming routine".into(),
                ))
            }
            None => {}
        }
        Ok(())
    }

    fn adc(&self) -> Result<Adc> {
        Adc::new(self.adc_resolution, self.adc_overflow_rate, self.quant_method)
    }
}

/// Whether a non-ideality changed device state or only alters reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    /// Device state was mutated; compounds with later reads.
    Permanent,
    /// Applied during reads only.
    ReadTime,
}

/// Ledger entry for a non-ideality applied to a mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedNonIdeality {
    pub kind: String,
    pub persistence: Persistence,
    /// Devices changed by the transform (zero for read-time transforms).
    pub devices_affected: usize,
}

/// Weights mapped onto a population of memristive devices.
#[derive(Debug, Clone)]
pub struct CrossbarMapping {
    pub(crate) grid: TileGrid,
    pub(crate) tiles: Vec<Tile>,
    weight_shape: Vec<usize>,
    scheme: Scheme,
    scale: ConductanceScale,
    nominal_model: DeviceModel,
    pub(crate) max_input_voltage: f64,
    pub(crate) adc: Adc,
    pub(crate) read_config: ReadConfig,
    pub(crate) parallel: ParallelConfig,
    step_budget: StepBudget,
    programming: ProgrammingReport,
    applied: Vec<AppliedNonIdeality>,
}

/// Map `weights` onto a new crossbar.
///
/// Devices are instantiated from `config.memristor_model` with parameters
/// drawn under `seed`, then written to their target conductances either
/// directly or with the configured programming routine.
pub fn map(weights: &WeightTensor, config: &CrossbarConfig, seed: u64) -> Result<CrossbarMapping> {
    config.validate()?;
    let matrix = weights.to_crossbar_matrix();
    let (rows, cols) = matrix.shape();
    let tile_shape = config.tile_shape.unwrap_or((rows, cols));
    let grid = TileGrid::new(rows, cols, tile_shape)?;

    let nominal_model = config.memristor_model.nominal();
    let (g_off, g_on) = nominal_model.conductance_range();
    let scale = ConductanceScale {
        g_off,
        g_on,
        weight_reference: weight_reference(weights.data(), config.weight_retention),
    };

    let writer = TileWriter {
        matrix: &matrix,
        scheme: config.scheme,
        scale,
        routine: config.programming_routine.as_ref(),
        half_select: !config.transistor,
        budget: config.step_budget,
    };
    let indices: Vec<usize> = (0..grid.tile_count()).collect();
    let built = config.parallel.map(&indices, |&index| -> Result<(Tile, ProgrammingReport)> {
        let mut tile = Tile::new(&grid, index, config.scheme, &config.memristor_model, seed)?;
        let report = writer.write(&mut tile)?;
        Ok((tile, report))
    });

    let mut tiles = Vec::with_capacity(indices.len());
    let mut programming = ProgrammingReport::default();
    for result in built {
        let (tile, report) = result?;
        tiles.push(tile);
        programming.merge(report);
    }

    if !programming.all_converged() {
        log::warn!(
            "{} of {} devices did not converge to their target conductance",
            programming.warnings.len(),
            programming.devices
        );
    }
    log::info!(
        "Mapped {}x{} crossbar onto {} tiles of {:?} ({:?}, w_ref = {:.4e})",
        rows,
        cols,
        tiles.len(),
        tile_shape,
        config.scheme,
        scale.weight_reference
    );

    Ok(CrossbarMapping {
        grid,
        tiles,
        weight_shape: weights.shape().to_vec(),
        scheme: config.scheme,
        scale,
        nominal_model,
        max_input_voltage: config.max_input_voltage,
        adc: config.adc()?,
        read_config: ReadConfig::default(),
        parallel: config.parallel.clone(),
        step_budget: config.step_budget,
        programming,
        applied: Vec::new(),
    })
}

/// The `p`-quantile of `|w|`; `p = 1` gives the largest magnitude.
fn weight_reference(weights: &[f64], p: f64) -> f64 {
    let mut magnitudes: Vec<f64> = weights.iter().map(|w| w.abs()).collect();
    if magnitudes.is_empty() {
        return 0.0;
    }
    magnitudes.sort_by(|a, b| a.total_cmp(b));
    let n = magnitudes.len();
    let rank = ((p * n as f64).ceil() as usize).clamp(1, n);
    magnitudes[rank - 1]
}

/// Writes target conductances into a freshly created tile.
struct TileWriter<'a> {
    matrix: &'a DMatrix<f64>,
    scheme: Scheme,
    scale: ConductanceScale,
    routine: Option<&'a ProgrammingRoutine>,
    half_select: bool,
    budget: StepBudget,
}

impl TileWriter<'_> {
    fn write(&self, tile: &mut Tile) -> Result<ProgrammingReport> {
        let (r0, c0) = tile.origin();
        let (ar, ac) = tile.active_shape();
        let mut report = ProgrammingReport::default();

        for polarity in [Polarity::Positive, Polarity::Negative] {
            let targets: Vec<f64> = (0..ar * ac)
                .map(|k| {
                    let weight = self.matrix[(r0 + k / ac, c0 + k % ac)];
                    let (positive, negative) = self.scheme.targets(weight, &self.scale);
                    match polarity {
                        Polarity::Positive => positive,
                        Polarity::Negative => negative.unwrap_or(self.scale.g_off),
                    }
                })
                .collect();
            let Some(devices) = tile.array_mut(polarity) else {
                continue;
            };

            match self.routine {
                Some(routine) => {
                    report.merge(routine.program_array(
                        devices,
                        ac,
                        &targets,
                        self.half_select,
                        self.budget,
                    )?);
                }
                None => {
                    for (device, &target) in devices.iter_mut().zip(&targets) {
                        device.set_conductance(target);
                    }
                }
            }
        }
        Ok(report)
    }
}

impl CrossbarMapping {
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Mutable tiles, for transforms that alter device state.
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Every device of every tile.
    pub fn devices(&self) -> impl Iterator<Item = &Memristor> {
        self.tiles.iter().flat_map(Tile::devices)
    }

    pub fn device_count(&self) -> usize {
        self.tiles.iter().map(Tile::device_count).sum()
    }

    /// Shape of the mapped weight tensor.
    pub fn weight_shape(&self) -> &[usize] {
        &self.weight_shape
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn scale(&self) -> &ConductanceScale {
        &self.scale
    }

    /// Conductance per unit weight, `None` for an all-zero tensor.
    pub fn conductance_per_weight(&self) -> Option<f64> {
        self.scheme.conductance_per_weight(&self.scale)
    }

    /// Model built from the nominal device parameters.
    pub fn nominal_model(&self) -> &DeviceModel {
        &self.nominal_model
    }

    pub fn max_input_voltage(&self) -> f64 {
        self.max_input_voltage
    }

    pub fn adc(&self) -> &Adc {
        &self.adc
    }

    pub fn read_config(&self) -> &ReadConfig {
        &self.read_config
    }

    pub fn read_config_mut(&mut self) -> &mut ReadConfig {
        &mut self.read_config
    }

    pub fn parallel(&self) -> &ParallelConfig {
        &self.parallel
    }

    pub fn step_budget(&self) -> StepBudget {
        self.step_budget
    }

    pub fn programming_report(&self) -> &ProgrammingReport {
        &self.programming
    }

    /// Non-idealities applied so far, in order.
    pub fn applied(&self) -> &[AppliedNonIdeality] {
        &self.applied
    }

    pub fn record(&mut self, entry: AppliedNonIdeality) {
        self.applied.push(entry);
    }

    /// Weights currently realized by the devices, as seen by a linear read.
    ///
    /// Read-time conductance quantization is included. An all-zero mapping
    /// realizes all-zero weights whatever its devices read.
    pub fn effective_weights(&self) -> Result<WeightTensor> {
        let (rows, cols) = self.grid.logical_shape();
        let mut data = vec![0.0; rows * cols];
        if let Some(per_weight) = self.conductance_per_weight() {
            let g_ref = self.scale.reference_conductance();
            for tile in &self.tiles {
                let (r0, c0) = tile.origin();
                let (ar, ac) = tile.active_shape();
                for r in 0..ar {
                    for c in 0..ac {
                        let g = |polarity| {
                            tile.device(r, c, polarity)
                                .map(|d| self.read_config.conductance(d))
                        };
                        let positive = g(Polarity::Positive);
                        let delta = match (self.scheme, positive, g(Polarity::Negative)) {
                            (Scheme::DoubleColumn, Some(gp), Some(gn)) => gp - gn,
                            (_, Some(gp), _) => gp - g_ref,
                            _ => 0.0,
                        };
                        data[(c0 + c) * rows + (r0 + r)] = delta / per_weight;
                    }
                }
            }
        }
        WeightTensor::new(self.weight_shape.clone(), data)
    }
}
