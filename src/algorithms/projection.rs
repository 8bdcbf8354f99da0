//! Screen projection of targets seen from the observer
//!
//! A target given by its bearing and vertical angle is mapped into the pixel
//! space of a camera view with a known angle of view, then rotated around the
//! view center to compensate for the device roll.
//!
//! Window edges are exclusive on both axes. A viewport with a zero, negative
//! or non-finite angle of view shows nothing.

use crate::algorithms::geodesy::{normalize_bearing, signed_angle_difference};
use crate::core::{Attitude, ViewportSpec};
use nalgebra::{Point2, Rotation2};

/// Visible angular window for one attitude and viewport.
///
/// Built once per frame and reused for every target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    heading: f64,
    half_horizontal_fov: f64,
    vertical_top: f64,
    vertical_bottom: f64,
    roll: f64,
    viewport: ViewportSpec,
}

impl ViewWindow {
    /// `None` when nothing can be visible: degenerate angle of view, empty
    /// viewport or non-finite attitude.
    pub fn new(attitude: &Attitude, viewport: &ViewportSpec) -> Option<Self> {
        let fov_usable = |fov: f64| fov.is_finite() && fov > 0.0;
        let size_usable = |size: f64| size.is_finite() && size > 0.0;

        if !fov_usable(viewport.horizontal_fov_deg)
            || !fov_usable(viewport.vertical_fov_deg)
            || !size_usable(viewport.width_px)
            || !size_usable(viewport.height_px)
        {
            return None;
        }
        if !(attitude.heading.is_finite() && attitude.pitch.is_finite() && attitude.roll.is_finite()) {
            return None;
        }

        // Device upright with the camera on the horizon reports pitch -90
        let vertical_center = -attitude.pitch - 90.0;
        let half_vertical_fov = viewport.vertical_fov_deg / 2.0;

        Some(Self {
            heading: normalize_bearing(attitude.heading),
            half_horizontal_fov: viewport.horizontal_fov_deg / 2.0,
            vertical_top: vertical_center + half_vertical_fov,
            vertical_bottom: vertical_center - half_vertical_fov,
            roll: attitude.roll,
            viewport: *viewport,
        })
    }

    /// Left edge of the azimuth window, within [0, 360)
    pub fn left_bearing(&self) -> f64 {
        normalize_bearing(self.heading - self.half_horizontal_fov)
    }

    /// Right edge of the azimuth window, within [0, 360)
    pub fn right_bearing(&self) -> f64 {
        normalize_bearing(self.heading + self.half_horizontal_fov)
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Half the horizontal angle of view
    pub fn half_width(&self) -> f64 {
        self.half_horizontal_fov
    }

    pub fn contains_bearing(&self, bearing: f64) -> bool {
        signed_angle_difference(self.heading, bearing).abs() < self.half_horizontal_fov
    }

    pub fn contains_vertical_angle(&self, vertical_angle: f64) -> bool {
        vertical_angle > self.vertical_bottom && vertical_angle < self.vertical_top
    }

    /// Pixel position of a target, origin at the top-left corner.
    pub fn project(&self, bearing: f64, vertical_angle: f64) -> Option<(f64, f64)> {
        if !self.contains_bearing(bearing) || !self.contains_vertical_angle(vertical_angle) {
            return None;
        }

        let ViewportSpec {
            width_px,
            height_px,
            horizontal_fov_deg,
            vertical_fov_deg,
        } = self.viewport;

        let offset = signed_angle_difference(self.heading, bearing);
        let raw = Point2::new(
            width_px / 2.0 + offset * width_px / horizontal_fov_deg,
            (self.vertical_top - vertical_angle) * height_px / vertical_fov_deg,
        );

        let center = Point2::new(width_px / 2.0, height_px / 2.0);
        let rotated = center + Rotation2::new((-self.roll).to_radians()) * (raw - center);

        let on_screen = (0.0..=width_px).contains(&rotated.x) && (0.0..=height_px).contains(&rotated.y);
        on_screen.then_some((rotated.x, rotated.y))
    }
}

/// Project a single target; see [`ViewWindow::project`].
pub fn project(attitude: &Attitude, viewport: &ViewportSpec, bearing: f64, vertical_angle: f64) -> Option<(f64, f64)> {
    ViewWindow::new(attitude, viewport)?.project(bearing, vertical_angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn viewport() -> ViewportSpec {
        ViewportSpec::new(1000.0, 800.0, 60.0, 40.0)
    }

    /// Upright device, camera on the horizon
    fn level(heading: f64) -> Attitude {
        Attitude::new(heading, -90.0, 0.0)
    }

    #[test]
    fn test_center_of_view_maps_to_viewport_center() {
        let (x, y) = project(&level(120.0), &viewport(), 120.0, 0.0).unwrap();

        assert_approx_eq!(x, 500.0, 1e-9);
        assert_approx_eq!(y, 400.0, 1e-9);
    }

    #[test]
    fn test_linear_mapping_inside_window() {
        let (x, y) = project(&level(0.0), &viewport(), 15.0, 10.0).unwrap();

        // 15° of a 60° view, 10° of a 40° view
        assert_approx_eq!(x, 750.0, 1e-9);
        assert_approx_eq!(y, 200.0, 1e-9);
    }

    #[test]
    fn test_right_edge_is_excluded() {
        let attitude = level(100.0);

        assert!(project(&attitude, &viewport(), 130.0, 0.0).is_none());
        assert!(project(&attitude, &viewport(), 129.0, 0.0).is_some());
        assert!(project(&attitude, &viewport(), 70.0, 0.0).is_none());
        assert!(project(&attitude, &viewport(), 71.0, 0.0).is_some());
    }

    #[test]
    fn test_vertical_edges_are_excluded() {
        let attitude = level(0.0);

        assert!(project(&attitude, &viewport(), 0.0, 20.0).is_none());
        assert!(project(&attitude, &viewport(), 0.0, -20.0).is_none());
        assert!(project(&attitude, &viewport(), 0.0, 19.0).is_some());
    }

    #[test]
    fn test_zero_fov_shows_nothing() {
        let no_horizontal = ViewportSpec::new(1000.0, 800.0, 0.0, 40.0);
        let no_vertical = ViewportSpec::new(1000.0, 800.0, 60.0, 0.0);
        let negative = ViewportSpec::new(1000.0, 800.0, -60.0, 40.0);

        for bearing in [0.0, 0.5, 180.0, 359.9] {
            assert!(project(&level(0.0), &no_horizontal, bearing, 0.0).is_none());
            assert!(project(&level(0.0), &no_vertical, bearing, 0.0).is_none());
            assert!(project(&level(0.0), &negative, bearing, 0.0).is_none());
        }
    }

    #[test]
    fn test_window_wrapping_below_zero() {
        // Window [-20, 40]
        let attitude = level(10.0);

        let (x, _) = project(&attitude, &viewport(), 350.0, 0.0).unwrap();
        assert_approx_eq!(x, 500.0 - 20.0 * 1000.0 / 60.0, 1e-9);
        assert!(project(&attitude, &viewport(), 339.0, 0.0).is_none());
    }

    #[test]
    fn test_window_wrapping_above_360() {
        // Window [320, 380]
        let attitude = level(350.0);

        let (x, _) = project(&attitude, &viewport(), 10.0, 0.0).unwrap();
        assert_approx_eq!(x, 500.0 + 20.0 * 1000.0 / 60.0, 1e-9);
        assert!(project(&attitude, &viewport(), 21.0, 0.0).is_none());
        assert!(project(&attitude, &viewport(), 325.0, 0.0).is_some());
    }

    #[test]
    fn test_target_straight_up_with_device_facing_up() {
        // Window centered at +90
        let attitude = Attitude::new(0.0, -180.0, 0.0);

        let (x, y) = project(&attitude, &viewport(), 0.0, 90.0).unwrap();

        assert_approx_eq!(x, 500.0, 1e-9);
        assert_approx_eq!(y, 400.0, 1e-9);
    }

    #[test]
    fn test_roll_rotates_around_center() {
        let attitude = Attitude::new(0.0, -90.0, 90.0);

        // 6° right of center is 100 px right before the roll correction
        let (x, y) = project(&attitude, &viewport(), 6.0, 0.0).unwrap();

        assert_approx_eq!(x, 500.0, 1e-9);
        assert_approx_eq!(y, 300.0, 1e-9);
    }

    #[test]
    fn test_rotation_out_of_bounds_is_rejected() {
        let attitude = Attitude::new(0.0, -90.0, 90.0);

        // 29° right is ~483 px from the center, beyond the 400 px half height once rotated
        assert!(project(&attitude, &viewport(), 29.0, 0.0).is_none());
    }

    #[test]
    fn test_view_window_edges() {
        let window = ViewWindow::new(&level(10.0), &viewport()).unwrap();

        assert_approx_eq!(window.left_bearing(), 340.0, 1e-9);
        assert_approx_eq!(window.right_bearing(), 40.0, 1e-9);
        assert_approx_eq!(window.half_width(), 30.0, 1e-9);
        assert!(window.contains_bearing(355.0));
        assert!(!window.contains_bearing(40.0));
    }

    #[test]
    fn test_non_finite_attitude_shows_nothing() {
        let attitude = Attitude::new(f64::NAN, -90.0, 0.0);
        assert!(ViewWindow::new(&attitude, &viewport()).is_none());
    }
}
