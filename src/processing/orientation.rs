//! Attitude from gravity and geomagnetic field vectors
//!
//! Device frame: x to the right of the screen, y towards the top edge, z out
//! of the screen towards the user. World frame: x east, y north, z up.

use crate::algorithms::geodesy::normalize_bearing;
use crate::core::{Attitude, ScreenRotation, STANDARD_GRAVITY};
use nalgebra::{Matrix3, Vector3};

/// Gravity norms below this fraction of g squared count as free fall
const FREE_FALL_RATIO: f64 = 0.01;

/// Minimum norm of east = field × gravity, below which the field is
/// treated as parallel to gravity
const MIN_EAST_NORM: f64 = 0.1;

/// Yaw/pitch/roll straight out of the rotation matrix, before any screen
/// rotation correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawOrientation {
    pub azimuth: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Device-to-world rotation matrix from gravity and geomagnetic readings.
///
/// Rows are the world east, north and up axes expressed in device
/// coordinates. `None` when the device is in free fall or the field is
/// (nearly) parallel to gravity.
pub fn rotation_matrix(gravity: &Vector3<f64>, geomagnetic: &Vector3<f64>) -> Option<Matrix3<f64>> {
    let free_fall = FREE_FALL_RATIO * STANDARD_GRAVITY * STANDARD_GRAVITY;
    if !(gravity.norm_squared() >= free_fall) {
        return None;
    }

    let east = geomagnetic.cross(gravity);
    let east_norm = east.norm();
    if !(east_norm >= MIN_EAST_NORM) {
        return None;
    }

    let east = east / east_norm;
    let up = gravity.normalize();
    let north = up.cross(&east);

    Some(Matrix3::from_rows(&[
        east.transpose(),
        north.transpose(),
        up.transpose(),
    ]))
}

/// Yaw/pitch/roll in degrees of a device-to-world rotation matrix
pub fn decompose(rotation: &Matrix3<f64>) -> RawOrientation {
    RawOrientation {
        azimuth: rotation[(0, 1)].atan2(rotation[(1, 1)]).to_degrees(),
        pitch: (-rotation[(2, 1)]).clamp(-1.0, 1.0).asin().to_degrees(),
        roll: (-rotation[(2, 0)]).atan2(rotation[(2, 2)]).to_degrees(),
    }
}

/// Device attitude as seen through a screen in the given rotation.
///
/// Axes are swapped and signs flipped per quarter turn. In the two portrait
/// rotations, a roll past ±90° means the device is more upside-down than
/// sideways: pitch and roll are folded to their supplementary angles, and
/// the heading flips when the folded pitch reaches ±90°.
pub fn remap_for_screen(raw: &RawOrientation, rotation: ScreenRotation) -> Attitude {
    let (offset, pitch, roll, fold) = match rotation {
        ScreenRotation::Rotation0 => (0.0, raw.pitch, raw.roll, true),
        ScreenRotation::Rotation90 => (90.0, raw.roll, -raw.pitch, false),
        ScreenRotation::Rotation180 => (180.0, -raw.pitch, -raw.roll, true),
        ScreenRotation::Rotation270 => (270.0, -raw.roll, raw.pitch, false),
    };

    let mut heading = raw.azimuth + offset;
    let (mut pitch, mut roll) = (pitch, roll);

    if fold {
        if roll >= 90.0 || roll <= -90.0 {
            pitch = supplementary(pitch);
            roll = supplementary(roll);
        }
        if pitch >= 90.0 || pitch <= -90.0 {
            heading += 180.0;
        }
    }

    Attitude::new(normalize_bearing(heading), pitch, roll)
}

/// Full pipeline from smoothed readings to a screen-corrected attitude
pub fn attitude_from_vectors(
    gravity: &Vector3<f64>,
    geomagnetic: &Vector3<f64>,
    rotation: ScreenRotation,
) -> Option<Attitude> {
    let matrix = rotation_matrix(gravity, geomagnetic)?;
    Some(remap_for_screen(&decompose(&matrix), rotation))
}

fn supplementary(angle: f64) -> f64 {
    if angle > 0.0 {
        180.0 - angle
    } else {
        -180.0 - angle
    }
}
