//! Sensor source interface

use crate::core::{RawSample, SensorKind};
use crate::hardware::SensorResult;

/// A device exposing raw 3-axis sensor channels.
///
/// The estimator only queries channel availability; replay and tests also
/// pull queued samples through [`SensorSource::read_sample`].
pub trait SensorSource {
    /// Human-readable name, used in errors and logs
    fn name(&self) -> &str;

    /// Whether the device provides this channel
    fn has_channel(&self, kind: SensorKind) -> bool;

    /// Next pending sample, `Ok(None)` when nothing is queued
    fn read_sample(&mut self) -> SensorResult<Option<RawSample>>;

    /// Both channels needed for an attitude are present
    fn supports_attitude(&self) -> bool {
        self.has_channel(SensorKind::Magnetic) && self.has_channel(SensorKind::Gravity)
    }
}
