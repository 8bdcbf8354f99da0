//! Sensor abstraction layer
//!
//! Describes the raw sensor channels a device exposes. The orientation
//! estimator checks availability against it at construction.

pub mod error;
pub mod mock;
pub mod sensor;

pub use error::{SensorError, SensorResult};
pub use mock::MockSensorSource;
pub use sensor::SensorSource;
