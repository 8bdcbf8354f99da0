use crate::core::{
    Sensitivity, ViewportSpec, DEFAULT_HORIZONTAL_FOV_DEG, DEFAULT_VERTICAL_FOV_DEG, GRAVITY_SMOOTHING_FACTOR,
    MAGNETIC_SMOOTHING_FACTOR,
};
use crate::processing::compass::SmoothingFactors;
use crate::validation::data::is_valid_camera_angle;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Engine-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Orientation estimator tuning
    pub compass: CompassConfig,
    /// Camera angles of view
    pub camera: CameraConfig,
    /// Location update thresholds of the overlay session
    pub session: SessionConfig,
}

/// Orientation estimator tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompassConfig {
    /// Smoothing factor of the magnetometer channel (0 < α ≤ 1)
    pub magnetic_smoothing: f64,
    /// Smoothing factor of the accelerometer channel (0 < α ≤ 1)
    pub gravity_smoothing: f64,
    /// Minimum heading change before a new attitude is emitted (degrees)
    pub heading_sensitivity_deg: f64,
    /// Minimum pitch change before a new attitude is emitted (degrees)
    pub pitch_sensitivity_deg: f64,
    /// Minimum roll change before a new attitude is emitted (degrees)
    pub roll_sensitivity_deg: f64,
}

/// Camera angles of view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub horizontal_fov_deg: f64,
    pub vertical_fov_deg: f64,
}

/// Location update thresholds of the overlay session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Observer movement that triggers a recomputation of the index (meters)
    pub recalculation_distance_m: f64,
    /// Observer movement that triggers a catalog reload (meters)
    pub reload_distance_m: f64,
    /// Radius of the catalog query around the observer (meters)
    pub search_radius_m: f64,
    /// Location fixes older than this are ignored (milliseconds)
    pub max_fix_age_ms: u64,
}

impl Default for CompassConfig {
    fn default() -> Self {
        Self {
            magnetic_smoothing: MAGNETIC_SMOOTHING_FACTOR,
            gravity_smoothing: GRAVITY_SMOOTHING_FACTOR,
            heading_sensitivity_deg: 1.0,
            pitch_sensitivity_deg: 1.0,
            roll_sensitivity_deg: 1.0,
        }
    }
}

impl CompassConfig {
    pub fn sensitivity(&self) -> Sensitivity {
        Sensitivity::new(
            self.heading_sensitivity_deg,
            self.pitch_sensitivity_deg,
            self.roll_sensitivity_deg,
        )
    }

    pub fn smoothing(&self) -> SmoothingFactors {
        SmoothingFactors {
            magnetic: self.magnetic_smoothing,
            gravity: self.gravity_smoothing,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            horizontal_fov_deg: DEFAULT_HORIZONTAL_FOV_DEG,
            vertical_fov_deg: DEFAULT_VERTICAL_FOV_DEG,
        }
    }
}

impl CameraConfig {
    /// Viewport of the given size seen through this camera
    pub fn viewport(&self, width_px: f64, height_px: f64) -> ViewportSpec {
        ViewportSpec::new(width_px, height_px, self.horizontal_fov_deg, self.vertical_fov_deg)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recalculation_distance_m: 10.0,
            reload_distance_m: 500.0,
            search_radius_m: 10_000.0,
            max_fix_age_ms: 180_000,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("I/O error: {message}")]
    IoError { message: String },
    /// JSON serialization/deserialization error
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Configuration validation result
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether configuration is valid
    pub is_valid: bool,
    /// Validation errors
    pub errors: Vec<ConfigError>,
    /// Validation warnings
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// First error, when invalid
    fn into_error(self) -> Option<ConfigError> {
        self.errors.into_iter().next()
    }
}

/// Loads, validates, adjusts and saves the engine configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigurationManager {
    /// Current configuration
    config: EngineConfig,
    /// Configuration file path
    config_file_path: Option<String>,
    /// Whether configuration has been modified
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a configuration manager with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration after validation
    pub fn update_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        if let Some(error) = Self::validate_config(&config).into_error() {
            return Err(error);
        }
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: EngineConfig = serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to parse config file '{}': {}", path_str, e),
        })?;

        let validation = Self::validate_config(&config);
        for warning in &validation.warnings {
            warn!("{}: {}", path_str, warning);
        }
        if let Some(error) = validation.into_error() {
            return Err(error);
        }

        info!("Configuration loaded from {}", path_str);
        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| ConfigError::SerializationError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        info!("Configuration saved to {}", path_str);
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = self.config_file_path.clone() {
            self.save_to_file(path)
        } else {
            Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            })
        }
    }

    /// Check if configuration has been modified since last save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Update the camera angles of view, returning the previous ones
    pub fn set_camera_angles(
        &mut self,
        horizontal_fov_deg: f64,
        vertical_fov_deg: f64,
    ) -> Result<(f64, f64), ConfigError> {
        for (parameter, value) in [
            ("horizontal_fov_deg", horizontal_fov_deg),
            ("vertical_fov_deg", vertical_fov_deg),
        ] {
            if !is_valid_camera_angle(value) {
                return Err(invalid_camera_angle(parameter, value));
            }
        }

        let previous = (self.config.camera.horizontal_fov_deg, self.config.camera.vertical_fov_deg);
        self.config.camera.horizontal_fov_deg = horizontal_fov_deg;
        self.config.camera.vertical_fov_deg = vertical_fov_deg;
        self.is_modified = true;
        Ok(previous)
    }

    /// Update the compass sensitivity, returning the previous one
    pub fn set_compass_sensitivity(&mut self, sensitivity: Sensitivity) -> Result<Sensitivity, ConfigError> {
        for (parameter, value) in [
            ("heading_sensitivity_deg", sensitivity.heading),
            ("pitch_sensitivity_deg", sensitivity.pitch),
            ("roll_sensitivity_deg", sensitivity.roll),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                    reason: "Sensitivity must be a finite, non-negative angle".to_string(),
                });
            }
        }

        let previous = self.config.compass.sensitivity();
        self.config.compass.heading_sensitivity_deg = sensitivity.heading;
        self.config.compass.pitch_sensitivity_deg = sensitivity.pitch;
        self.config.compass.roll_sensitivity_deg = sensitivity.roll;
        self.is_modified = true;
        Ok(previous)
    }

    /// Validate a complete configuration
    pub fn validate_config(config: &EngineConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let compass = &config.compass;
        for (parameter, value) in [
            ("magnetic_smoothing", compass.magnetic_smoothing),
            ("gravity_smoothing", compass.gravity_smoothing),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                errors.push(ConfigError::InvalidParameter {
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                    reason: "Smoothing factor must be within (0, 1]".to_string(),
                });
            }
        }
        for (parameter, value) in [
            ("heading_sensitivity_deg", compass.heading_sensitivity_deg),
            ("pitch_sensitivity_deg", compass.pitch_sensitivity_deg),
            ("roll_sensitivity_deg", compass.roll_sensitivity_deg),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                errors.push(ConfigError::InvalidParameter {
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                    reason: "Sensitivity must be a finite, non-negative angle".to_string(),
                });
            } else if value > 45.0 {
                warnings.push(format!("{} of {}° will make the overlay feel frozen", parameter, value));
            }
        }

        let camera = &config.camera;
        for (parameter, value) in [
            ("horizontal_fov_deg", camera.horizontal_fov_deg),
            ("vertical_fov_deg", camera.vertical_fov_deg),
        ] {
            if !is_valid_camera_angle(value) {
                errors.push(invalid_camera_angle(parameter, value));
            }
        }

        let session = &config.session;
        for (parameter, value) in [
            ("recalculation_distance_m", session.recalculation_distance_m),
            ("reload_distance_m", session.reload_distance_m),
            ("search_radius_m", session.search_radius_m),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                errors.push(ConfigError::InvalidParameter {
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                    reason: "Distance must be positive".to_string(),
                });
            }
        }
        if session.max_fix_age_ms == 0 {
            errors.push(ConfigError::InvalidParameter {
                parameter: "max_fix_age_ms".to_string(),
                value: "0".to_string(),
                reason: "Every location fix would be considered stale".to_string(),
            });
        }
        if session.search_radius_m <= session.reload_distance_m {
            warnings.push("Search radius not larger than reload distance; points may be missing between reloads".to_string());
        }
        if session.recalculation_distance_m > session.reload_distance_m {
            warnings.push("Recalculation distance larger than reload distance".to_string());
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

fn invalid_camera_angle(parameter: &str, value: f64) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: "Camera angle of view must be within (0, 360] degrees".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        let validation = ConfigurationManager::validate_config(&config);

        assert!(validation.is_valid);
        assert!(validation.warnings.is_empty());
        assert_eq!(config.camera.horizontal_fov_deg, 54.8);
        assert_eq!(config.camera.vertical_fov_deg, 42.5);
        assert_eq!(config.session.max_fix_age_ms, 180_000);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let mut config = EngineConfig::default();
        config.compass.gravity_smoothing = 0.0;
        config.camera.vertical_fov_deg = 400.0;
        config.session.reload_distance_m = -1.0;

        let validation = ConfigurationManager::validate_config(&config);

        assert!(!validation.is_valid);
        assert_eq!(validation.errors.len(), 3);
    }

    #[test]
    fn test_update_config_rejects_invalid() {
        let mut manager = ConfigurationManager::new();
        let mut config = EngineConfig::default();
        config.compass.heading_sensitivity_deg = f64::NAN;

        assert!(manager.update_config(config).is_err());
        assert!(!manager.is_modified());
    }

    #[test]
    fn test_config_file_round_trip() {
        let mut manager = ConfigurationManager::new();
        manager.set_camera_angles(60.0, 45.0).unwrap();
        assert!(manager.is_modified());

        let file = NamedTempFile::new().unwrap();
        manager.save_to_file(file.path()).unwrap();
        assert!(!manager.is_modified());

        let loaded = ConfigurationManager::from_file(file.path()).unwrap();
        assert_eq!(loaded.config(), manager.config());
        assert_eq!(loaded.config().camera.horizontal_fov_deg, 60.0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "session": {{ "search_radius_m": 2500.0 }} }}"#).unwrap();

        let manager = ConfigurationManager::from_file(file.path()).unwrap();

        assert_eq!(manager.config().session.search_radius_m, 2500.0);
        assert_eq!(manager.config().session.reload_distance_m, 500.0);
        assert_eq!(manager.config().compass, CompassConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "camera": {{ "horizontal_fov_deg": 0.0 }} }}"#).unwrap();

        let result = ConfigurationManager::from_file(file.path());

        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { ref parameter, .. }) if parameter == "horizontal_fov_deg"
        ));
    }

    #[test]
    fn test_malformed_file_is_a_serialization_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let result = ConfigurationManager::from_file(file.path());

        assert!(matches!(result, Err(ConfigError::SerializationError { .. })));
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut manager = ConfigurationManager::new();
        assert!(matches!(manager.save(), Err(ConfigError::IoError { .. })));
    }

    #[test]
    fn test_runtime_adjustments() {
        let mut manager = ConfigurationManager::new();

        let previous = manager.set_compass_sensitivity(Sensitivity::uniform(3.0)).unwrap();
        assert_eq!(previous, Sensitivity::uniform(1.0));
        assert_eq!(manager.config().compass.sensitivity(), Sensitivity::uniform(3.0));

        assert!(manager.set_compass_sensitivity(Sensitivity::new(-1.0, 0.0, 0.0)).is_err());
        assert!(manager.set_camera_angles(0.0, 40.0).is_err());
        assert_eq!(manager.config().camera, CameraConfig::default());
    }

    #[test]
    fn test_camera_viewport() {
        let viewport = CameraConfig::default().viewport(1080.0, 1920.0);

        assert_eq!(viewport.width_px, 1080.0);
        assert_eq!(viewport.horizontal_fov_deg, 54.8);
    }
}
