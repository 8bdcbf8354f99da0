//! Configuration utilities

pub mod config;

pub use config::{CameraConfig, CompassConfig, ConfigError, ConfigurationManager, EngineConfig, SessionConfig};
