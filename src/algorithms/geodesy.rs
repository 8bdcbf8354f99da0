//! Geodesic relationships between geographic points
//!
//! Pure functions used by every other stage of the overlay pipeline:
//! - latitude / longitude / bearing normalization
//! - ellipsoidal surface distance and initial bearing (WGS84, Vincenty inverse)
//! - vertical angle from an observer to a target
//! - degree / meter conversions and search boxes on the mean-radius sphere
//!
//! Every function is total over finite input. NaN and infinities propagate.

use crate::core::{
    GeoPoint, RelativeGeometry, EARTH_MEAN_RADIUS_M, WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS_M,
    WGS84_SEMI_MINOR_AXIS_M,
};
use std::cmp::Ordering;
use std::f64::consts::PI;

/// Maximum Vincenty iterations before accepting the current estimate
const VINCENTY_MAX_ITERATIONS: usize = 20;

/// Relative convergence threshold on lambda
const VINCENTY_CONVERGENCE: f64 = 1e-12;

/// Wrap a latitude into [-90, 90].
///
/// The value is first reduced modulo 360, then folded across the poles: just
/// past +90 continues down the opposite meridian (91 → 89, 181 → -1,
/// 271 → -89).
pub fn normalize_latitude(latitude: f64) -> f64 {
    let l = latitude % 360.0;
    if l.is_nan() {
        return l;
    }

    if (-90.0..=90.0).contains(&l) {
        l
    } else if l > 90.0 && l < 180.0 {
        90.0 - l % 90.0
    } else if (l > 180.0 && l < 270.0) || (l < -180.0 && l > -270.0) {
        -l % 90.0
    } else if l > 270.0 && l < 360.0 {
        -90.0 + l % 90.0
    } else if l < -90.0 && l > -180.0 {
        -90.0 - l % 90.0
    } else if l < -270.0 && l > -360.0 {
        90.0 + l % 90.0
    } else if l == 270.0 {
        -90.0
    } else if l == -270.0 {
        90.0
    } else {
        // ±180
        0.0
    }
}

/// Wrap a longitude into [-180, 180] (181 → -179, -361 → -1).
pub fn normalize_longitude(longitude: f64) -> f64 {
    let l = longitude % 360.0;

    if l > 180.0 {
        l - 360.0
    } else if l < -180.0 {
        l + 360.0
    } else {
        l
    }
}

/// Wrap any angle into [0, 360).
pub fn normalize_bearing(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed smallest difference `to - from`, within [-180, 180).
pub fn signed_angle_difference(from: f64, to: f64) -> f64 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Great-circle distance on the mean-radius sphere for a difference in
/// latitude or longitude, always positive.
pub fn degrees_to_meters(degrees: f64) -> f64 {
    (degrees * 2.0 * PI * EARTH_MEAN_RADIUS_M / 360.0).abs()
}

/// Difference in latitude or longitude spanned by a great-circle distance.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters * 360.0 / (2.0 * PI * EARTH_MEAN_RADIUS_M)
}

/// Horizontal surface distance in meters between two points.
///
/// Altitude is ignored. The pair is evaluated in a canonical order so the
/// result is bit-for-bit symmetric.
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let (first, second) = match compare_coordinates(a, b) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };
    vincenty_inverse(first, second).distance
}

/// Straight-line distance including the altitude difference.
pub fn distance_3d(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let surface = distance(a, b);
    let height_difference = b.altitude() - a.altitude();
    (surface * surface + height_difference * height_difference).sqrt()
}

/// Initial bearing from `a` to `b` in degrees clockwise from true north,
/// within [0, 360).
///
/// Coincident points yield 0. Nearly antipodal points have no well defined
/// shortest path and may yield any value.
pub fn bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    normalize_bearing(vincenty_inverse(a, b).initial_bearing)
}

/// Angle in degrees above (+) or below (-) the horizontal plane at `a` under
/// which `b` is seen, within [-90, 90].
///
/// With no horizontal separation the target is straight up (+90, also for an
/// equal altitude) or straight down (-90).
pub fn vertical_angle(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let horizontal = distance(a, b);
    let height_difference = b.altitude() - a.altitude();

    if horizontal == 0.0 {
        if height_difference >= 0.0 {
            90.0
        } else {
            -90.0
        }
    } else {
        (height_difference / horizontal).atan().to_degrees()
    }
}

/// Bearing, surface distance and vertical angle of `target` seen from `observer`
pub fn relative_geometry(observer: &GeoPoint, target: &GeoPoint) -> RelativeGeometry {
    RelativeGeometry {
        bearing: bearing(observer, target),
        distance: distance(observer, target),
        vertical_angle: vertical_angle(observer, target),
    }
}

/// Latitude/longitude rectangle used to pre-filter a catalog around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    /// West edge; greater than `max_longitude` when the box crosses the antimeridian
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Box enclosing every point within `radius_m` of `center`.
    pub fn around(center: &GeoPoint, radius_m: f64) -> Self {
        let latitude_span = meters_to_degrees(radius_m.abs());
        let min_latitude = (center.latitude() - latitude_span).max(-90.0);
        let max_latitude = (center.latitude() + latitude_span).min(90.0);

        // Meridians converge towards the poles
        let longitude_span = latitude_span / center.latitude().to_radians().cos();
        let (min_longitude, max_longitude) = if !longitude_span.is_finite()
            || longitude_span >= 180.0
            || min_latitude <= -90.0
            || max_latitude >= 90.0
        {
            (-180.0, 180.0)
        } else {
            (
                normalize_longitude(center.longitude() - longitude_span),
                normalize_longitude(center.longitude() + longitude_span),
            )
        };

        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.min_longitude > self.max_longitude
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        let latitude_ok = point.latitude() >= self.min_latitude && point.latitude() <= self.max_latitude;
        let longitude_ok = if self.crosses_antimeridian() {
            point.longitude() >= self.min_longitude || point.longitude() <= self.max_longitude
        } else {
            point.longitude() >= self.min_longitude && point.longitude() <= self.max_longitude
        };
        latitude_ok && longitude_ok
    }
}

/// Result of the inverse geodesic problem
#[derive(Debug, Clone, Copy)]
struct InverseSolution {
    distance: f64,
    initial_bearing: f64,
}

fn compare_coordinates(a: &GeoPoint, b: &GeoPoint) -> Ordering {
    a.latitude()
        .total_cmp(&b.latitude())
        .then(a.longitude().total_cmp(&b.longitude()))
}

/// Vincenty's inverse formula on the WGS84 ellipsoid.
///
/// Iteration stops after a fixed budget; nearly antipodal pairs, where the
/// method does not converge, keep the last estimate.
fn vincenty_inverse(from: &GeoPoint, to: &GeoPoint) -> InverseSolution {
    let a = WGS84_SEMI_MAJOR_AXIS_M;
    let b = WGS84_SEMI_MINOR_AXIS_M;
    let f = WGS84_FLATTENING;
    let a_sq_minus_b_sq_over_b_sq = (a * a - b * b) / (b * b);

    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let big_l = (to.longitude() - from.longitude()).to_radians();

    let u1 = ((1.0 - f) * lat1.tan()).atan();
    let u2 = ((1.0 - f) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();
    let cos_u1_cos_u2 = cos_u1 * cos_u2;
    let sin_u1_sin_u2 = sin_u1 * sin_u2;

    let mut sigma = 0.0;
    let mut delta_sigma = 0.0;
    let mut big_a = 1.0;
    let mut sin_lambda = 0.0;
    let mut cos_lambda = 1.0;
    let mut lambda = big_l;

    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let lambda_orig = lambda;
        (sin_lambda, cos_lambda) = lambda.sin_cos();

        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        let cos_sigma = sin_u1_sin_u2 + cos_u1_cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = if sin_sigma == 0.0 {
            0.0
        } else {
            cos_u1_cos_u2 * sin_lambda / sin_sigma
        };
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sm = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1_sin_u2 / cos_sq_alpha
        };

        let u_squared = cos_sq_alpha * a_sq_minus_b_sq_over_b_sq;
        big_a = 1.0 + (u_squared / 16384.0) * (4096.0 + u_squared * (-768.0 + u_squared * (320.0 - 175.0 * u_squared)));
        let big_b = (u_squared / 1024.0) * (256.0 + u_squared * (-128.0 + u_squared * (74.0 - 47.0 * u_squared)));
        let big_c = (f / 16.0) * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let cos_2sm_sq = cos_2sm * cos_2sm;

        delta_sigma = big_b
            * sin_sigma
            * (cos_2sm
                + (big_b / 4.0)
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sm_sq)
                        - (big_b / 6.0) * cos_2sm * (-3.0 + 4.0 * sin_sigma * sin_sigma) * (-3.0 + 4.0 * cos_2sm_sq)));

        lambda = big_l
            + (1.0 - big_c) * f * sin_alpha * (sigma + big_c * sin_sigma * (cos_2sm + big_c * cos_sigma * (-1.0 + 2.0 * cos_2sm_sq)));

        if (lambda - lambda_orig).abs() <= VINCENTY_CONVERGENCE * lambda.abs() {
            break;
        }
    }

    let distance = b * big_a * (sigma - delta_sigma);
    let initial_bearing = (cos_u2 * sin_lambda)
        .atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda)
        .to_degrees();

    InverseSolution {
        distance,
        initial_bearing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUARTER_CIRCUMFERENCE: f64 = 2.0 * PI * EARTH_MEAN_RADIUS_M / 4.0;
    const HALF_CIRCUMFERENCE: f64 = 2.0 * PI * EARTH_MEAN_RADIUS_M / 2.0;

    fn assert_within_percent(actual: f64, expected: f64, percent: f64) {
        let tolerance = expected.abs() * percent / 100.0;
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} within {}%, got {}",
            expected,
            percent,
            actual
        );
    }

    #[test]
    fn test_normalize_latitude_table() {
        let table = [
            (12.123456789, 12.123456789),
            (0.0, 0.0),
            (90.0, 90.0),
            (-90.0, -90.0),
            (180.0, 0.0),
            (-180.0, 0.0),
            (270.0, -90.0),
            (-270.0, 90.0),
            (360.0, 0.0),
            (-360.0, 0.0),
            (1.0, 1.0),
            (91.0, 89.0),
            (179.0, 1.0),
            (181.0, -1.0),
            (269.0, -89.0),
            (271.0, -89.0),
            (359.0, -1.0),
            (361.0, 1.0),
            (-1.0, -1.0),
            (-91.0, -89.0),
            (-179.0, -1.0),
            (-181.0, 1.0),
            (-269.0, 89.0),
            (-271.0, 89.0),
            (-359.0, 1.0),
            (-361.0, -1.0),
            (3600.0, 0.0),
            (3650.5, 50.5),
            (3550.0, -50.0),
        ];

        for (input, expected) in table {
            assert_eq!(normalize_latitude(input), expected, "normalize_latitude({})", input);
        }
    }

    #[test]
    fn test_normalize_longitude_table() {
        let table = [
            (123.456789, 123.456789),
            (0.0, 0.0),
            (90.0, 90.0),
            (-90.0, -90.0),
            (180.0, 180.0),
            (-180.0, -180.0),
            (270.0, -90.0),
            (-270.0, 90.0),
            (360.0, 0.0),
            (-360.0, 0.0),
            (181.0, -179.0),
            (359.0, -1.0),
            (361.0, 1.0),
            (-181.0, 179.0),
            (-361.0, -1.0),
            (3600.0, 0.0),
            (3780.0, 180.0),
            (3781.0, -179.0),
            (3550.0, -50.0),
        ];

        for (input, expected) in table {
            assert_eq!(normalize_longitude(input), expected, "normalize_longitude({})", input);
        }
    }

    #[test]
    fn test_normalization_is_periodic() {
        for value in [-271.0, -91.0, -1.0, 0.0, 33.0, 91.0, 181.0, 271.0] {
            for k in -3..=3 {
                let shifted = value + 360.0 * k as f64;
                assert_eq!(normalize_latitude(shifted), normalize_latitude(value));
                assert_eq!(normalize_longitude(shifted), normalize_longitude(value));
            }
        }
    }

    #[test]
    fn test_normalization_propagates_nan() {
        assert!(normalize_latitude(f64::NAN).is_nan());
        assert!(normalize_longitude(f64::INFINITY).is_nan());
    }

    #[test]
    fn test_normalize_bearing() {
        assert_eq!(normalize_bearing(0.0), 0.0);
        assert_eq!(normalize_bearing(360.0), 0.0);
        assert_eq!(normalize_bearing(-90.0), 270.0);
        assert_eq!(normalize_bearing(725.0), 5.0);
        assert_eq!(normalize_bearing(-1e-20), 0.0);
    }

    #[test]
    fn test_signed_angle_difference_wraps() {
        assert_eq!(signed_angle_difference(350.0, 10.0), 20.0);
        assert_eq!(signed_angle_difference(10.0, 350.0), -20.0);
        assert_eq!(signed_angle_difference(0.0, 180.0), -180.0);
    }

    #[test]
    fn test_degrees_meters_conversions() {
        assert_eq!(degrees_to_meters(0.0), 0.0);
        assert_within_percent(degrees_to_meters(1.0), 111_195.0, 0.1);
        assert_within_percent(degrees_to_meters(-1.0), 111_195.0, 0.1);
        assert_within_percent(degrees_to_meters(90.0), QUARTER_CIRCUMFERENCE, 0.001);
        assert_within_percent(degrees_to_meters(-180.0), HALF_CIRCUMFERENCE, 0.001);

        assert_eq!(meters_to_degrees(0.0), 0.0);
        assert_within_percent(meters_to_degrees(QUARTER_CIRCUMFERENCE), 90.0, 0.001);
        assert_within_percent(meters_to_degrees(222_390.0), 2.0, 0.1);
    }

    #[test]
    fn test_distance_reference_values() {
        let origin = GeoPoint::new("Point 0", 0.0, 0.0, 0.0);

        let north_pole = GeoPoint::new("North pole", 90.0, 0.0, 0.0);
        assert_within_percent(distance(&origin, &north_pole), QUARTER_CIRCUMFERENCE, 3.0);

        let south_pole = GeoPoint::new("South pole", -90.0, 0.0, 0.0);
        assert_within_percent(distance(&origin, &south_pole), QUARTER_CIRCUMFERENCE, 3.0);

        let antipode = GeoPoint::new("Antipode", 0.0, -180.0, 0.0);
        assert_within_percent(distance(&origin, &antipode), HALF_CIRCUMFERENCE, 3.0);

        let same = GeoPoint::new("Point 0 again", 360.0, 360.0, 0.0);
        assert!(distance(&origin, &same).abs() < 1.0);
    }

    #[test]
    fn test_distance_between_landmarks() {
        let home = GeoPoint::new("Home", 45.1916626, 5.7385538, 245.0);
        let rachais = GeoPoint::new("Mont Rachais", 45.2417, 5.7436, 1046.0);
        let mont_blanc = GeoPoint::new("Mont Blanc", 45.8326, 6.8652, 4810.0);

        assert_within_percent(distance(&home, &rachais), 5578.0, 3.0);
        assert_within_percent(distance(&home, &mont_blanc), 113_100.0, 3.0);
        assert_within_percent(distance_3d(&home, &rachais), 5635.0, 3.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let points = [
            GeoPoint::new("a", 0.0, 0.0, 0.0),
            GeoPoint::new("b", 45.1916626, 5.7385538, 245.0),
            GeoPoint::new("c", -33.9, 151.2, 10.0),
            GeoPoint::new("d", 89.5, -179.9, 0.0),
            GeoPoint::new("e", 0.0, 180.0, 0.0),
        ];

        for a in &points {
            for b in &points {
                assert_eq!(distance(a, b), distance(b, a));
                assert_eq!(distance_3d(a, b), distance_3d(b, a));
            }
        }
    }

    #[test]
    fn test_distance_3d_vertical_only() {
        let top = GeoPoint::new("Top", 45.1916626, 5.7385538, 245.0);
        let cellar = GeoPoint::new("Cellar", 45.1916626, 5.7385538, -100.0);

        assert_eq!(distance(&top, &cellar), 0.0);
        assert!((distance_3d(&top, &cellar) - 345.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoPoint::new("Origin", 10.0, 10.0, 0.0);
        let north = GeoPoint::new("N", 11.0, 10.0, 0.0);
        let south = GeoPoint::new("S", 9.0, 10.0, 0.0);
        let east = GeoPoint::new("E", 10.0, 11.0, 0.0);
        let west = GeoPoint::new("W", 10.0, 9.0, 0.0);
        let tolerance = 360.0 * 0.03;

        assert!(bearing(&origin, &north) < tolerance || bearing(&origin, &north) > 360.0 - tolerance);
        assert!((bearing(&origin, &south) - 180.0).abs() < tolerance);
        assert!((bearing(&origin, &east) - 90.0).abs() < tolerance);
        assert!((bearing(&origin, &west) - 270.0).abs() < tolerance);
    }

    #[test]
    fn test_bearing_on_equator_is_exact() {
        let origin = GeoPoint::new("Origin", 0.0, 0.0, 0.0);

        assert_eq!(bearing(&origin, &GeoPoint::new("N", 1.0, 0.0, 0.0)), 0.0);
        assert_eq!(bearing(&origin, &GeoPoint::new("S", -1.0, 0.0, 0.0)), 180.0);
        assert!((bearing(&origin, &GeoPoint::new("E", 0.0, 1.0, 0.0)) - 90.0).abs() < 1e-9);
        assert!((bearing(&origin, &GeoPoint::new("W", 0.0, -1.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_range() {
        let origin = GeoPoint::new("Origin", 45.0, 5.0, 0.0);
        for step in 0..36 {
            let angle = (step as f64 * 10.0).to_radians();
            let target = GeoPoint::new("t", 45.0 + 0.1 * angle.cos(), 5.0 + 0.1 * angle.sin(), 0.0);
            let result = bearing(&origin, &target);
            assert!((0.0..360.0).contains(&result));
        }
    }

    #[test]
    fn test_vertical_angle_sign_convention() {
        let ground = GeoPoint::new("Ground", 45.0, 5.0, 0.0);
        let above = GeoPoint::new("Above", 45.0, 5.0, 100.0);
        let below = GeoPoint::new("Below", 45.0, 5.0, -100.0);
        let level = GeoPoint::new("Level", 45.01, 5.0, 0.0);

        assert_eq!(vertical_angle(&ground, &above), 90.0);
        assert_eq!(vertical_angle(&ground, &below), -90.0);
        assert_eq!(vertical_angle(&ground, &ground), 90.0);
        assert_eq!(vertical_angle(&ground, &level), 0.0);
    }

    #[test]
    fn test_vertical_angle_antisymmetric_in_elevation() {
        let low = GeoPoint::new("Low", 45.1916626, 5.7385538, 245.0);
        let high = GeoPoint::new("High", 45.2417, 5.7436, 1046.0);

        let up = vertical_angle(&low, &high);
        let down = vertical_angle(&high, &low);

        assert!(up > 0.0 && up < 90.0);
        assert_eq!(up, -down);
    }

    #[test]
    fn test_bounding_box_contains_nearby_points() {
        let center = GeoPoint::new("Center", 45.0, 5.0, 0.0);
        let bbox = BoundingBox::around(&center, 10_000.0);

        assert!(bbox.contains(&center));
        assert!(bbox.contains(&GeoPoint::new("Near", 45.05, 5.05, 0.0)));
        assert!(!bbox.contains(&GeoPoint::new("Far", 46.0, 5.0, 0.0)));
        assert!(!bbox.crosses_antimeridian());
    }

    #[test]
    fn test_bounding_box_across_antimeridian() {
        let center = GeoPoint::new("Fiji", -17.0, 179.99, 0.0);
        let bbox = BoundingBox::around(&center, 10_000.0);

        assert!(bbox.crosses_antimeridian());
        assert!(bbox.contains(&GeoPoint::new("East side", -17.0, -179.98, 0.0)));
        assert!(!bbox.contains(&GeoPoint::new("Elsewhere", -17.0, 0.0, 0.0)));
    }

    #[test]
    fn test_bounding_box_near_pole_covers_all_longitudes() {
        let center = GeoPoint::new("Pole", 89.99, 0.0, 0.0);
        let bbox = BoundingBox::around(&center, 10_000.0);

        assert_eq!(bbox.min_longitude, -180.0);
        assert_eq!(bbox.max_longitude, 180.0);
        assert!(bbox.contains(&GeoPoint::new("Other side", 89.995, 180.0, 0.0)));
    }
}
