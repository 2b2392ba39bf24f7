//! Error types for memristive-nonideal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("crossbar error: {0}")]
    Crossbar(#[from] memristive_crossbar::Error),

    #[error("device error: {0}")]
    Device(#[from] memristive_devices::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
