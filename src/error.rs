//! Errors for the fallible edges of the crate.
//!
//! The simulation itself never fails; only loading configuration and touching
//! the persistence file can.

use thiserror::Error;

/// Errors raised while loading or validating [`crate::Tuning`].
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Errors raised by file-backed persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage format error: {0}")]
    Parse(#[from] serde_json::Error),
}
