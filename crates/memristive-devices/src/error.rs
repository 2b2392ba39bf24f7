//! Error types for memristive-devices.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid device parameter: {0}")]
    InvalidParameter(String),

    #[error("parameter {name} has invalid value: {value}")]
    InvalidValue { name: &'static str, value: f64 },

    #[error("simulation of {steps} steps exceeds the step budget of {budget}")]
    StepBudgetExceeded { steps: u64, budget: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
