//! Geo-referenced AR overlay engine
//!
//! Fuses magnetometer and accelerometer samples into a device attitude,
//! computes the geometry of points of interest relative to the observer and
//! projects the visible ones onto a camera view.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod hardware;
pub mod api;

// Re-export commonly used types
pub use crate::core::{
    Attitude, GeoPoint, RawSample, RelativeGeometry, ScreenRotation, SensorKind, Sensitivity, ViewportSpec,
    EARTH_MEAN_RADIUS_M, GRAVITY_SMOOTHING_FACTOR, MAGNETIC_SMOOTHING_FACTOR,
};
pub use crate::algorithms::{bearing, distance, distance_3d, project, vertical_angle, AzimuthIndex, BoundingBox, ViewWindow};
pub use crate::processing::{OrientationEstimator, RelativeGeometryCache};
pub use crate::hardware::{MockSensorSource, SensorError, SensorSource};
pub use crate::utils::{ConfigError, ConfigurationManager, EngineConfig};
pub use crate::api::{
    ApiError, ApiResult, InMemoryCatalog, LocationFix, LocationUpdate, OverlaySession, PointCatalog, ProjectedPoint,
    Scenario,
};
