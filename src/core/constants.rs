//! Physical constants and engine defaults

/// Earth mean radius in meters
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 semi-major axis (meters)
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS84 semi-minor axis (meters)
pub const WGS84_SEMI_MINOR_AXIS_M: f64 = 6_356_752.3142;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = (WGS84_SEMI_MAJOR_AXIS_M - WGS84_SEMI_MINOR_AXIS_M) / WGS84_SEMI_MAJOR_AXIS_M;

/// Exponential smoothing factor applied to magnetometer samples
pub const MAGNETIC_SMOOTHING_FACTOR: f64 = 0.4;

/// Exponential smoothing factor applied to accelerometer samples
pub const GRAVITY_SMOOTHING_FACTOR: f64 = 0.1;

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Default horizontal camera angle of view (degrees)
pub const DEFAULT_HORIZONTAL_FOV_DEG: f64 = 54.8;

/// Default vertical camera angle of view (degrees)
pub const DEFAULT_VERTICAL_FOV_DEG: f64 = 42.5;
