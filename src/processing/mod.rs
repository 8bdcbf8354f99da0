//! Sensor fusion and per-observer processing

pub mod cache;
pub mod compass;
pub mod orientation;
pub mod smoothing;

pub use cache::RelativeGeometryCache;
pub use compass::{AttitudeCallback, EstimatorState, ListenerHandle, OrientationEstimator, SmoothingFactors};
pub use orientation::{attitude_from_vectors, decompose, remap_for_screen, rotation_matrix, RawOrientation};
pub use smoothing::ExponentialSmoother;
