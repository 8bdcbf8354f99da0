//! Sensor error types

use crate::core::SensorKind;
use thiserror::Error;

/// Errors raised by sensor sources and the components built on them
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    /// The device does not provide a channel the estimator needs
    #[error("sensor channel {kind:?} is not available on {source_name}")]
    MissingChannel { kind: SensorKind, source_name: String },
    /// The source stopped delivering samples
    #[error("sensor source {source_name} is disconnected")]
    Disconnected { source_name: String },
}

/// Result type for sensor operations
pub type SensorResult<T> = Result<T, SensorError>;
