//! Simulation report: deviation from the ideal layer and device statistics.

use memristive::{
    AppliedNonIdeality, CrossbarMapping, DMatrix, PopulationStatistics, ReadOutput, WeightTensor,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorSummary {
    pub rmse: f64,
    pub max_abs: f64,
    /// `‖actual − ideal‖ / ‖ideal‖`, absent when the ideal is all zero.
    pub relative: Option<f64>,
}

impl ErrorSummary {
    fn between<'a>(actual: impl Iterator<Item = &'a f64>, ideal: impl Iterator<Item = &'a f64>) -> Self {
        let (mut count, mut sq, mut max_abs, mut ideal_sq) = (0usize, 0.0, 0.0f64, 0.0);
        for (a, i) in actual.zip(ideal) {
            let d = a - i;
            count += 1;
            sq += d * d;
            max_abs = max_abs.max(d.abs());
            ideal_sq += i * i;
        }
        let rmse = if count > 0 { (sq / count as f64).sqrt() } else { 0.0 };
        let relative = (ideal_sq > 0.0).then(|| (sq / ideal_sq).sqrt());
        Self {
            rmse,
            max_abs,
            relative,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProgrammingSummary {
    pub devices: usize,
    pub converged: usize,
    pub total_pulses: u64,
    pub warnings: usize,
}

#[derive(Debug, Serialize)]
pub struct PopulationSummary {
    pub devices: usize,
    pub conductance_min: f64,
    pub conductance_max: f64,
    pub conductance_mean: f64,
    pub conductance_std_dev: f64,
    pub stuck_lrs: usize,
    pub stuck_hrs: usize,
    pub unformed: usize,
    pub drifted: usize,
    /// `(bin center, count)` pairs.
    pub histogram: Vec<(f64, usize)>,
}

impl From<PopulationStatistics> for PopulationSummary {
    fn from(stats: PopulationStatistics) -> Self {
        let histogram = (0..stats.histogram.counts.len())
            .map(|i| (stats.histogram.bin_center(i), stats.histogram.counts[i]))
            .collect();
        Self {
            devices: stats.devices,
            conductance_min: stats.conductance.min,
            conductance_max: stats.conductance.max,
            conductance_mean: stats.conductance.mean,
            conductance_std_dev: stats.conductance.std_dev,
            stuck_lrs: stats.stuck_lrs,
            stuck_hrs: stats.stuck_hrs,
            unformed: stats.unformed,
            drifted: stats.drifted,
            histogram,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub weight_shape: Vec<usize>,
    pub grid_shape: (usize, usize),
    pub tiles: usize,
    pub devices: usize,
    pub batch: usize,
    pub voltage_scale: f64,
    /// ADC full scale `(low, high, levels)`.
    pub adc_range: Option<(f64, f64, u64)>,
    pub programming: Option<ProgrammingSummary>,
    pub applied: Vec<AppliedNonIdeality>,
    pub output_error: ErrorSummary,
    pub weight_error: ErrorSummary,
    pub population: PopulationSummary,
}

impl Report {
    pub fn new(
        weights: &WeightTensor,
        mapping: &CrossbarMapping,
        ideal: &DMatrix<f64>,
        output: &ReadOutput,
        effective: &WeightTensor,
        statistics: PopulationStatistics,
    ) -> Self {
        let programming = mapping.programming_report();
        let programming = (programming.devices > 0).then(|| ProgrammingSummary {
            devices: programming.devices,
            converged: programming.converged,
            total_pulses: programming.total_pulses,
            warnings: programming.warnings.len(),
        });

        Self {
            weight_shape: weights.shape().to_vec(),
            grid_shape: mapping.grid().grid_shape(),
            tiles: mapping.tiles().len(),
            devices: mapping.device_count(),
            batch: output.outputs.nrows(),
            voltage_scale: output.voltage_scale,
            adc_range: output.adc_range.map(|r| (r.low, r.high, r.levels)),
            programming,
            applied: mapping.applied().to_vec(),
            output_error: ErrorSummary::between(output.outputs.iter(), ideal.iter()),
            weight_error: ErrorSummary::between(effective.data().iter(), weights.data().iter()),
            population: statistics.into(),
        }
    }

    pub fn print(&self) {
        println!("Crossbar Mapping");
        println!("================");
        println!();
        println!("Weights:        {:?}", self.weight_shape);
        println!(
            "Tiles:          {} ({} x {})",
            self.tiles, self.grid_shape.0, self.grid_shape.1
        );
        println!("Devices:        {}", self.devices);
        if let Some(p) = &self.programming {
            println!(
                "Programming:    {}/{} converged, {} pulses",
                p.converged, p.devices, p.total_pulses
            );
            if p.warnings > 0 {
                eprintln!(
                    "Warning: {} devices did not reach their target conductance",
                    p.warnings
                );
            }
        }
        println!();

        if !self.applied.is_empty() {
            println!("{:<28}{:>12}{:>12}", "Non-ideality", "Persistence", "Affected");
            println!("{}", "-".repeat(52));
            for entry in &self.applied {
                println!(
                    "{:<28}{:>12}{:>12}",
                    entry.kind,
                    format!("{:?}", entry.persistence),
                    entry.devices_affected
                );
            }
            println!();
        }

        println!("Read ({} samples)", self.batch);
        println!("Voltage scale:  {:.4e} V/unit", self.voltage_scale);
        if let Some((low, high, levels)) = self.adc_range {
            println!("ADC range:      [{:.4e}, {:.4e}] A, {} levels", low, high, levels);
        }
        print_error("Output error", &self.output_error);
        print_error("Weight error", &self.weight_error);
        println!();

        let pop = &self.population;
        println!("Device Population");
        println!("-----------------");
        println!(
            "Conductance:    mean {:.4e} S, std {:.4e} S, range [{:.4e}, {:.4e}] S",
            pop.conductance_mean, pop.conductance_std_dev, pop.conductance_min, pop.conductance_max
        );
        println!(
            "Faults:         {} stuck LRS, {} stuck HRS, {} unformed",
            pop.stuck_lrs, pop.stuck_hrs, pop.unformed
        );
        println!("Drifted:        {}", pop.drifted);
        println!();

        let peak = pop.histogram.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
        for (center, count) in &pop.histogram {
            let bar = "#".repeat(count * 40 / peak);
            println!("{:>12.4e} {:>8} {}", center, count, bar);
        }
    }
}

fn print_error(label: &str, error: &ErrorSummary) {
    let relative = error
        .relative
        .map_or_else(|| "n/a".to_string(), |r| format!("{:.4e}", r));
    println!(
        "{:<16}rmse {:.4e}, max {:.4e}, relative {}",
        format!("{}:", label),
        error.rmse,
        error.max_abs,
        relative
    );
}
