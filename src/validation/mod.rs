//! Input validation for catalog points and camera parameters

pub mod data;

pub use data::{is_valid_camera_angle, PointRejection, PointValidationResult, PointValidator};
