//! Memristor device models for crossbar simulation.
//!
//! This crate provides:
//! - Device physics: VTEAM and linear ion drift state models
//! - A per-device integrator with bounded, deterministic stepping
//! - Stochastic (per-device sampled) model parameters
//! - A stateless, seedable random source for reproducible populations
//! - Voltage waveforms for programming, reads and hysteresis sweeps
//!
//! ```
//! use memristive_devices::{DeviceId, Memristor, ModelConfig, Polarity, StepBudget, Waveform};
//!
//! let id = DeviceId::new(0, 0, 0, Polarity::Positive);
//! let mut device = Memristor::instantiate(id, &ModelConfig::default(), 42).unwrap();
//! let g0 = device.conductance();
//!
//! // A set pulse above threshold increases the conductance
//! device.simulate(&Waveform::dc(1.0), 1e-8, StepBudget::default()).unwrap();
//! assert!(device.conductance() > g0);
//! ```

pub mod error;
pub mod memristor;
pub mod model;
pub mod rng;
pub mod stochastic;
pub mod waveforms;

pub use error::{Error, Result};
pub use memristor::{
    quantize_to_levels, DeviceId, DriftRecord, Fault, IvCurve, Memristor, Polarity, StepBudget,
    StepOutcome,
};
pub use model::{
    DeviceModel, LinearIonDrift, LinearIonDriftConfig, ModelConfig, Vteam, VteamConfig,
};
pub use rng::ParameterSampler;
pub use stochastic::{Distribution, StochasticParameter};
pub use waveforms::Waveform;
