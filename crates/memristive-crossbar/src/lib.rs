//! Crossbar mapping and read-out for memristive weight arrays.
//!
//! This crate provides:
//! - Tiling of flattened layer weights onto fixed-size crossbar tiles
//! - Single- and double-column weight representation schemes
//! - Pulse programming of devices, including 1R half-select disturbance
//! - A parallel read path with a configurable column ADC
//!
//! ```
//! use memristive_crossbar::{map, CrossbarConfig, WeightTensor};
//! use nalgebra::DMatrix;
//!
//! let weights = WeightTensor::linear(2, 3, vec![0.5, -0.5, 1.0, 0.0, 0.25, -1.0]).unwrap();
//! let mut mapping = map(&weights, &CrossbarConfig::default(), 42).unwrap();
//!
//! let inputs = DMatrix::from_row_slice(1, 3, &[1.0, 0.5, -1.0]);
//! let out = mapping.read(&inputs).unwrap();
//! let ideal = weights.ideal_forward(&inputs).unwrap();
//! assert!((out.outputs[(0, 0)] - ideal[(0, 0)]).abs() < 1e-9);
//! ```

pub mod adc;
pub mod error;
pub mod mapping;
pub mod parallel;
pub mod programming;
pub mod read;
pub mod scheme;
pub mod tile;
pub mod weights;

pub use adc::{Adc, AdcRange, QuantMethod};
pub use error::{Error, Result};
pub use mapping::{map, AppliedNonIdeality, CrossbarConfig, CrossbarMapping, Persistence};
pub use parallel::ParallelConfig;
pub use programming::{
    ConvergenceWarning, DeviceProgramming, NaiveProgramming, ProgrammingReport,
    ProgrammingRoutine,
};
pub use read::{NonLinearRead, ReadConfig, ReadOutput};
pub use scheme::{ConductanceScale, Scheme};
pub use tile::{Tile, TileGrid};
pub use weights::WeightTensor;
