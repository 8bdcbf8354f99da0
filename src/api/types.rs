use crate::core::{GeoPoint, RelativeGeometry};
use crate::hardware::SensorError;
use crate::utils::config::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Sensor unavailable or disconnected
    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),
    /// Invalid configuration
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// Scenario or catalog input could not be read
    #[error("input error: {message}")]
    Input { message: String },
    /// Invalid request parameters
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

/// A device location report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    /// Acquisition time in milliseconds since the Unix epoch
    pub timestamp_ms: u64,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, altitude: f64, timestamp_ms: u64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            timestamp_ms,
        }
    }

    /// The observer standing at this fix
    pub fn to_observer(&self) -> GeoPoint {
        GeoPoint::new("Observer", self.latitude, self.longitude, self.altitude)
    }
}

/// What a location update did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationUpdate {
    /// Fix too old, ignored
    Stale,
    /// Observer moved less than the recalculation distance
    Unchanged,
    /// Relative geometry recomputed from the points already loaded
    Rebuilt,
    /// Catalog queried again around the observer, then recomputed
    Reloaded,
}

/// A target placed on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPoint {
    pub point: GeoPoint,
    pub geometry: RelativeGeometry,
    pub x_px: f64,
    pub y_px: f64,
}

impl ProjectedPoint {
    /// Text drawn next to the marker: name, distance, bearing and vertical angle
    pub fn label(&self) -> String {
        format!(
            "{}; {:.0}m; {:.1}° {:.1}°",
            self.point.name(),
            self.geometry.distance,
            self.geometry.bearing,
            self.geometry.vertical_angle
        )
    }
}
