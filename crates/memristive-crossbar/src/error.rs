//! Error types for memristive-crossbar.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid {what} dimensions: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid weight shape: {0}")]
    InvalidShape(String),

    #[error("device error: {0}")]
    Device(#[from] memristive_devices::Error),
}

impl Error {
    /// Whether the error is a shape error (as opposed to a configuration error).
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Error::DimensionMismatch { .. } | Error::InvalidShape(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
