//! Geometric algorithms of the overlay pipeline

pub mod azimuth_index;
pub mod geodesy;
pub mod projection;

pub use azimuth_index::AzimuthIndex;
pub use geodesy::{bearing, distance, distance_3d, vertical_angle, BoundingBox};
pub use projection::{project, ViewWindow};
