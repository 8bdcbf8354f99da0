use crate::core::GeoPoint;
use log::debug;
use std::collections::HashSet;
use thiserror::Error;

/// Largest accepted camera angle of view in degrees
pub const MAX_CAMERA_ANGLE_DEG: f64 = 360.0;

/// Why a catalog point was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointRejection {
    #[error("point has no name")]
    BlankName,
    #[error("point '{name}' sits on the null location")]
    NullLocation { name: String },
    #[error("point '{name}' has a non-finite coordinate")]
    NonFiniteCoordinate { name: String },
    #[error("duplicate point id {id}")]
    DuplicateId { id: u64 },
}

/// Outcome of validating a batch of catalog points
#[derive(Debug, Clone, Default)]
pub struct PointValidationResult {
    pub valid_points: Vec<GeoPoint>,
    pub rejected_points: Vec<(GeoPoint, PointRejection)>,
}

/// Filters catalog rows that cannot be placed on screen
#[derive(Debug, Clone, Default)]
pub struct PointValidator {
    seen_ids: HashSet<u64>,
}

impl PointValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check one point. Ids are remembered, so a second point with the same
    /// id is rejected.
    pub fn validate_point(&mut self, point: &GeoPoint) -> Result<(), PointRejection> {
        if point.name().trim().is_empty() {
            return Err(PointRejection::BlankName);
        }
        if !(point.latitude().is_finite() && point.longitude().is_finite() && point.altitude().is_finite()) {
            return Err(PointRejection::NonFiniteCoordinate {
                name: point.name().to_string(),
            });
        }
        if !point.is_valid() {
            return Err(PointRejection::NullLocation {
                name: point.name().to_string(),
            });
        }
        if let Some(id) = point.id() {
            if !self.seen_ids.insert(id) {
                return Err(PointRejection::DuplicateId { id });
            }
        }
        Ok(())
    }

    /// Split a batch into usable and rejected points, keeping input order
    pub fn validate_points(&mut self, points: Vec<GeoPoint>) -> PointValidationResult {
        let mut result = PointValidationResult::default();

        for point in points {
            match self.validate_point(&point) {
                Ok(()) => result.valid_points.push(point),
                Err(reason) => {
                    debug!("Rejected catalog point: {}", reason);
                    result.rejected_points.push((point, reason));
                }
            }
        }

        result
    }

    /// Forget the ids seen so far
    pub fn clear_history(&mut self) {
        self.seen_ids.clear();
    }
}

/// A camera angle of view is usable when it is within (0, 360] degrees
pub fn is_valid_camera_angle(angle_deg: f64) -> bool {
    angle_deg > 0.0 && angle_deg <= MAX_CAMERA_ANGLE_DEG
}
