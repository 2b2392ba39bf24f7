//! # Memristive
//!
//! Simulation of neural network weights deployed on memristive crossbars.
//!
//! Memristive provides:
//! - VTEAM and linear ion drift device models with stochastic parameters
//! - Tiling of layer weights onto crossbars in single- or double-column form
//! - Pulse programming of devices, including 1R half-select disturbance
//! - Column ADC quantization on the read path
//! - Device faults, endurance and retention drift, finite conductance
//!   states and non-linear I/V response
//!
//! ## Quick Start
//!
//! ```rust
//! use memristive::prelude::*;
//!
//! let weights = WeightTensor::linear(2, 4, vec![0.5, -0.25, 1.0, 0.0, -1.0, 0.75, 0.1, -0.3]).unwrap();
//! let config = CrossbarConfig::default().with_adc(Some(8), 0.0, QuantMethod::Linear);
//! let mapping = map(&weights, &config, 42).unwrap();
//!
//! let mut mapping = NonIdealityEngine::new(7)
//!     .apply(
//!         mapping,
//!         &[NonIdeality::DeviceFaults(DeviceFaults::new(0.05, 0.05, 0.0))],
//!     )
//!     .unwrap();
//!
//! let inputs = DMatrix::from_row_slice(1, 4, &[1.0, -0.5, 0.25, 0.0]);
//! let out = mapping.read(&inputs).unwrap();
//! assert_eq!(out.outputs.shape(), (1, 2));
//! ```

// Re-export component crates
pub use memristive_crossbar as crossbar;
pub use memristive_devices as devices;
pub use memristive_nonideal as nonideal;

// ============================================================================
// Convenient re-exports from memristive_devices
// ============================================================================

pub use memristive_devices::{
    DeviceId,
    DeviceModel,
    // Errors
    Error as DeviceError,
    Fault,
    IvCurve,
    LinearIonDrift,
    LinearIonDriftConfig,
    // Devices
    Memristor,
    ModelConfig,
    ParameterSampler,
    Polarity,
    StepBudget,
    // Stochastic parameters
    StochasticParameter,
    Vteam,
    VteamConfig,
    Waveform,
};

// ============================================================================
// Convenient re-exports from memristive_crossbar
// ============================================================================

pub use memristive_crossbar::{
    // Read path
    Adc,
    AppliedNonIdeality,
    // Mapping
    CrossbarConfig,
    CrossbarMapping,
    // Errors
    Error as CrossbarError,
    // Programming
    NaiveProgramming,
    ParallelConfig,
    Persistence,
    ProgrammingReport,
    ProgrammingRoutine,
    QuantMethod,
    ReadOutput,
    Scheme,
    WeightTensor,
    map,
};

// ============================================================================
// Convenient re-exports from memristive_nonideal
// ============================================================================

pub use memristive_nonideal::{
    DeviceFaults,
    DriftParameters,
    // Errors
    Error as NonIdealError,
    NonIdeality,
    // Engine
    NonIdealityEngine,
    NonLinear,
    OperationMode,
    // Reporting
    PopulationStatistics,
};

/// Re-export of nalgebra's dynamic matrix type.
pub use nalgebra::DMatrix;

/// Prelude module containing commonly used types.
///
/// ```rust
/// use memristive::prelude::*;
/// ```
pub mod prelude {
    // Devices
    pub use crate::{Memristor, ModelConfig, StepBudget, StochasticParameter, VteamConfig};

    // Mapping and reads
    pub use crate::{
        CrossbarConfig, CrossbarMapping, NaiveProgramming, ProgrammingRoutine, QuantMethod,
        Scheme, WeightTensor, map,
    };

    // Non-idealities
    pub use crate::{DeviceFaults, DriftParameters, NonIdeality, NonIdealityEngine, NonLinear};

    // Common external types
    pub use crate::DMatrix;
}
