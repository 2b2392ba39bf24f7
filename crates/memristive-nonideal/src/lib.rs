//! Device non-idealities for memristive crossbars.
//!
//! This crate provides composable transforms over a mapped device population:
//! - Stuck-at faults, including devices that never electroformed
//! - Endurance and retention drift with pluggable drift strategies
//! - Read-time quantization to a finite number of conductance states
//! - Simulated or characterized non-linear I/V response during reads
//!
//! Transforms are applied by a [`NonIdealityEngine`] strictly in the order
//! given. Faults and drift mutate device state permanently; finite states and
//! non-linear response only change how devices are read.
//!
//! # Usage
//!
//! ```
//! use memristive_crossbar::{map, CrossbarConfig, WeightTensor};
//! use memristive_nonideal::{DeviceFaults, NonIdeality, NonIdealityEngine};
//!
//! let weights = WeightTensor::linear(4, 4, vec![0.25; 16]).unwrap();
//! let mapping = map(&weights, &CrossbarConfig::default(), 1).unwrap();
//!
//! let engine = NonIdealityEngine::new(7);
//! let faulty = engine
//!     .apply(
//!         mapping.clone(),
//!         &[
//!             NonIdeality::DeviceFaults(DeviceFaults::new(0.1, 0.1, 0.05)),
//!             NonIdeality::FiniteConductanceStates { conductance_states: 16 },
//!         ],
//!     )
//!     .unwrap();
//! assert_eq!(faulty.applied().len(), 2);
//! assert!(mapping.applied().is_empty());
//! ```

pub mod drift;
mod engine;
mod error;
mod faults;
mod finite_states;
mod nonlinear;
pub mod statistics;

pub use drift::{DriftParameters, DriftStrategy, OperationMode};
pub use engine::{NonIdeality, NonIdealityEngine};
pub use error::{Error, Result};
pub use faults::DeviceFaults;
pub use nonlinear::{NonLinear, CHARACTERIZATION_BINS};
pub use statistics::{Histogram, PopulationStatistics, Statistics, StatisticsAccumulator};
