//! Population statistics of device conductances.
//!
//! This module summarizes a mapped device population:
//! - Reduction operations (min, max, mean, variance, std dev)
//! - Histogram computation for distribution analysis
//! - Counts of faulted and drifted devices
//!
//! Per-tile accumulators are computed in parallel and merged, so the
//! summary costs one pass over the population.
//!
//! # Example
//!
//! ```
//! use memristive_crossbar::{map, CrossbarConfig, WeightTensor};
//! use memristive_nonideal::statistics::PopulationStatistics;
//!
//! let weights = WeightTensor::linear(2, 2, vec![0.5, -0.5, 1.0, 0.0]).unwrap();
//! let mapping = map(&weights, &CrossbarConfig::default(), 0).unwrap();
//!
//! let stats = PopulationStatistics::collect(&mapping, 10);
//! assert_eq!(stats.devices, 8);
//! println!("mean conductance = {:.3e} S", stats.conductance.mean);
//! ```

use memristive_crossbar::CrossbarMapping;
use memristive_devices::Fault;

/// Summary statistics of a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population variance.
    pub variance: f64,
    pub std_dev: f64,
    pub sum: f64,
}

impl Statistics {
    /// Create statistics from raw moments.
    pub fn from_moments(count: usize, sum: f64, sum_sq: f64, min: f64, max: f64) -> Self {
        let mean = if count > 0 { sum / count as f64 } else { 0.0 };
        let variance = if count > 0 {
            (sum_sq / count as f64) - mean * mean
        } else {
            0.0
        };
        // Clamp to avoid negative variance from floating-point errors
        let variance = variance.max(0.0);

        Self {
            count,
            min,
            max,
            mean,
            variance,
            std_dev: variance.sqrt(),
            sum,
        }
    }

    #[inline]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Coefficient of variation (std_dev / mean), if mean != 0.
    #[inline]
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        if self.mean.abs() > f64::EPSILON {
            Some(self.std_dev / self.mean.abs())
        } else {
            None
        }
    }
}

impl Default for Statistics {
    fn default() -> Self {
        StatisticsAccumulator::new().finalize()
    }
}

/// Accumulator for incremental statistics, mergeable across threads.
#[derive(Debug, Clone, Copy)]
pub struct StatisticsAccumulator {
    count: usize,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Merge another accumulator into this one.
    #[inline]
    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn finalize(&self) -> Statistics {
        Statistics::from_moments(self.count, self.sum, self.sum_sq, self.min, self.max)
    }
}

impl Default for StatisticsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<f64> for StatisticsAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        for value in iter {
            acc.add(value);
        }
        acc
    }
}

/// Histogram of values over a fixed range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Counts per bin, from `min` to `max`.
    pub counts: Vec<usize>,
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub total_count: usize,
}

impl Histogram {
    /// Bin `values` into `num_bins` bins over `[min, max]`.
    ///
    /// Values outside the range are clamped to the first or last bin. A
    /// degenerate range is widened around its value.
    pub fn new<I>(values: I, num_bins: usize, min: f64, max: f64) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let num_bins = num_bins.max(1);
        let (min, max) = if max > min {
            (min, max)
        } else {
            let pad = if min.abs() > 0.0 { 0.5 * min.abs() } else { 0.5 };
            (min - pad, min + pad)
        };
        let bin_width = (max - min) / num_bins as f64;

        let mut histogram = Self {
            counts: vec![0; num_bins],
            min,
            max,
            bin_width,
            total_count: 0,
        };
        for value in values {
            let idx = histogram.bin_index(value);
            histogram.counts[idx] += 1;
            histogram.total_count += 1;
        }
        histogram
    }

    pub fn bin_index(&self, value: f64) -> usize {
        let idx = ((value - self.min) / self.bin_width).floor() as isize;
        idx.clamp(0, (self.counts.len() - 1) as isize) as usize
    }

    pub fn bin_center(&self, bin_idx: usize) -> f64 {
        self.min + (bin_idx as f64 + 0.5) * self.bin_width
    }

    /// Fraction of values in a bin.
    pub fn bin_fraction(&self, bin_idx: usize) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.counts[bin_idx] as f64 / self.total_count as f64
        }
    }

    /// Bin with the most values.
    pub fn mode_bin(&self) -> usize {
        self.counts
            .iter()
            .enumerate()
            .max_by_key(|(_, &c)| c)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// Per-tile partial summary.
#[derive(Debug, Clone, Copy, Default)]
struct TileSummary {
    conductance: StatisticsAccumulator,
    stuck_lrs: usize,
    stuck_hrs: usize,
    unformed: usize,
    drifted: usize,
}

impl TileSummary {
    fn merge(&mut self, other: &Self) {
        self.conductance.merge(&other.conductance);
        self.stuck_lrs += other.stuck_lrs;
        self.stuck_hrs += other.stuck_hrs;
        self.unformed += other.unformed;
        self.drifted += other.drifted;
    }
}

/// Summary of a mapped device population.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationStatistics {
    pub devices: usize,
    /// Read conductances (read-time quantization included).
    pub conductance: Statistics,
    pub histogram: Histogram,
    pub stuck_lrs: usize,
    pub stuck_hrs: usize,
    pub unformed: usize,
    pub drifted: usize,
}

impl PopulationStatistics {
    /// Summarize `mapping` with a conductance histogram of `num_bins` bins
    /// spanning the nominal conductance range.
    pub fn collect(mapping: &CrossbarMapping, num_bins: usize) -> Self {
        let read = mapping.read_config();
        let partials = mapping.parallel().map(mapping.tiles(), |tile| {
            let mut summary = TileSummary::default();
            for device in tile.devices() {
                summary.conductance.add(read.conductance(device));
                match device.fault() {
                    Some(Fault::StuckLrs) => summary.stuck_lrs += 1,
                    Some(Fault::StuckHrs) => summary.stuck_hrs += 1,
                    Some(Fault::Unformed) => summary.unformed += 1,
                    None => {}
                }
                if device.drift().is_some() {
                    summary.drifted += 1;
                }
            }
            summary
        });
        let mut total = TileSummary::default();
        for partial in &partials {
            total.merge(partial);
        }

        let scale = mapping.scale();
        let histogram = Histogram::new(
            mapping.devices().map(|d| read.conductance(d)),
            num_bins,
            scale.g_off,
            scale.g_on,
        );

        Self {
            devices: total.conductance.count,
            conductance: total.conductance.finalize(),
            histogram,
            stuck_lrs: total.stuck_lrs,
            stuck_hrs: total.stuck_hrs,
            unformed: total.unformed,
            drifted: total.drifted,
        }
    }

    pub fn faulted(&self) -> usize {
        self.stuck_lrs + self.stuck_hrs + self.unformed
    }
}
