//! Core data types for the overlay engine

use crate::algorithms::geodesy::{normalize_latitude, normalize_longitude};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Geo-referenced point of interest.
///
/// Latitude and longitude are always kept in their normalized ranges; the
/// constructor, the setters and deserialization all wrap out-of-range input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GeoPointRecord")]
pub struct GeoPoint {
    id: Option<u64>,
    name: String,
    description: Option<String>,
    latitude: f64,
    longitude: f64,
    altitude: f64,
}

/// Unnormalized wire form of a point, as supplied by a catalog
#[derive(Deserialize)]
struct GeoPointRecord {
    #[serde(default)]
    id: Option<u64>,
    name: String,
    #[serde(default)]
    description: Option<String>,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    altitude: f64,
}

impl From<GeoPointRecord> for GeoPoint {
    fn from(record: GeoPointRecord) -> Self {
        let mut point = GeoPoint::new(record.name, record.latitude, record.longitude, record.altitude);
        point.id = record.id;
        point.description = record.description;
        point
    }
}

impl GeoPoint {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            latitude: normalize_latitude(latitude),
            longitude: normalize_longitude(longitude),
            altitude,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Latitude in degrees, within [-90, 90]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees, within [-180, 180]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Altitude above sea level in meters
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_latitude(&mut self, latitude: f64) {
        self.latitude = normalize_latitude(latitude);
    }

    pub fn set_longitude(&mut self, longitude: f64) {
        self.longitude = normalize_longitude(longitude);
    }

    pub fn set_altitude(&mut self, altitude: f64) {
        self.altitude = altitude;
    }

    /// A point is usable when it is named and not sitting on the null
    /// location (0°, 0°, 0 m) that unfilled catalog rows default to.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !(self.latitude == 0.0 && self.longitude == 0.0 && self.altitude == 0.0)
    }
}

/// Device orientation snapshot, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Attitude {
    /// Clockwise from north, within [0, 360)
    pub heading: f64,
    /// -90 when the camera points at the horizon with the top edge up
    pub pitch: f64,
    /// Left/right tilt
    pub roll: f64,
}

impl Attitude {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self { heading, pitch, roll }
    }
}

/// Sensor channel a raw sample comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Magnetometer (geomagnetic field vector)
    Magnetic,
    /// Accelerometer (gravity vector)
    Gravity,
}

/// One raw 3-axis sensor reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub kind: SensorKind,
    pub values: Vector3<f64>,
}

impl RawSample {
    pub fn new(kind: SensorKind, values: Vector3<f64>) -> Self {
        Self { kind, values }
    }

    pub fn magnetic(x: f64, y: f64, z: f64) -> Self {
        Self::new(SensorKind::Magnetic, Vector3::new(x, y, z))
    }

    pub fn gravity(x: f64, y: f64, z: f64) -> Self {
        Self::new(SensorKind::Gravity, Vector3::new(x, y, z))
    }
}

/// Quarter-turn rotation of the screen relative to the device's natural orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScreenRotation {
    #[default]
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl ScreenRotation {
    /// Map a rotation in degrees (0, 90, 180 or 270) to the enum
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(ScreenRotation::Rotation0),
            90 => Some(ScreenRotation::Rotation90),
            180 => Some(ScreenRotation::Rotation180),
            270 => Some(ScreenRotation::Rotation270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            ScreenRotation::Rotation0 => 0,
            ScreenRotation::Rotation90 => 90,
            ScreenRotation::Rotation180 => 180,
            ScreenRotation::Rotation270 => 270,
        }
    }
}

/// View size and camera angles of view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSpec {
    pub width_px: f64,
    pub height_px: f64,
    pub horizontal_fov_deg: f64,
    pub vertical_fov_deg: f64,
}

impl ViewportSpec {
    pub fn new(width_px: f64, height_px: f64, horizontal_fov_deg: f64, vertical_fov_deg: f64) -> Self {
        Self {
            width_px,
            height_px,
            horizontal_fov_deg,
            vertical_fov_deg,
        }
    }
}

/// Minimum change in degrees, per component, before a new attitude is emitted
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sensitivity {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Sensitivity {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self { heading, pitch, roll }
    }

    /// Same threshold on all three components
    pub fn uniform(degrees: f64) -> Self {
        Self::new(degrees, degrees, degrees)
    }
}

/// Position of a target as seen from the observer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeGeometry {
    /// Degrees clockwise from north, within [0, 360)
    pub bearing: f64,
    /// Horizontal surface distance in meters
    pub distance: f64,
    /// Degrees above (+) or below (-) the horizontal plane
    pub vertical_angle: f64,
}
