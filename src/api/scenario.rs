//! Scenario replay
//!
//! A scenario bundles one location fix, a point catalog and a recorded
//! stream of raw sensor samples. Replaying it runs the whole pipeline and
//! yields one frame per emitted attitude.

use crate::api::session::{InMemoryCatalog, OverlaySession};
use crate::api::types::{ApiError, ApiResult, LocationFix, LocationUpdate, ProjectedPoint};
use crate::core::{Attitude, GeoPoint, RawSample, ScreenRotation, SensorKind};
use crate::hardware::{MockSensorSource, SensorSource};
use crate::processing::OrientationEstimator;
use crate::utils::config::{ConfigurationManager, EngineConfig};
use log::info;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration from a JSON file, or the defaults without one
pub fn load_config(path: Option<&Path>) -> ApiResult<EngineConfig> {
    match path {
        Some(path) => Ok(ConfigurationManager::from_file(path)?.config().clone()),
        None => Ok(EngineConfig::default()),
    }
}

/// One recorded sensor sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub kind: SensorKind,
    pub values: [f64; 3],
}

impl From<SampleRecord> for RawSample {
    fn from(record: SampleRecord) -> Self {
        RawSample::new(record.kind, Vector3::from(record.values))
    }
}

/// Screen size in pixels; angles of view come from the configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width_px: f64,
    pub height_px: f64,
}

/// Recorded session input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub location: LocationFix,
    /// Replay clock; defaults to the fix timestamp
    #[serde(default)]
    pub now_ms: Option<u64>,
    /// Screen rotation in degrees: 0, 90, 180 or 270
    #[serde(default)]
    pub screen_rotation_deg: u16,
    pub screen: ScreenSize,
    pub points: Vec<GeoPoint>,
    pub samples: Vec<SampleRecord>,
}

/// Output for one emitted attitude
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub attitude: Attitude,
    pub points: Vec<ProjectedPoint>,
}

/// Result of a replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub location_update: LocationUpdate,
    pub frames: Vec<Frame>,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> ApiResult<Self> {
        serde_json::from_str(json).map_err(|e| ApiError::Input {
            message: format!("Failed to parse scenario: {}", e),
        })
    }

    /// Run the scenario through the estimator, the session and the projector
    pub fn replay(&self, config: &EngineConfig) -> ApiResult<ScenarioReport> {
        let rotation = ScreenRotation::from_degrees(self.screen_rotation_deg).ok_or_else(|| {
            ApiError::InvalidRequest {
                reason: format!("unsupported screen rotation {}°", self.screen_rotation_deg),
            }
        })?;
        let viewport = config.camera.viewport(self.screen.width_px, self.screen.height_px);

        let mut source = MockSensorSource::new().with_name("scenario");
        source.push_samples(self.samples.iter().copied().map(RawSample::from));

        let estimator = OrientationEstimator::with_smoothing(&source, config.compass.smoothing())?;
        let mut session = OverlaySession::with_config(
            InMemoryCatalog::new(self.points.clone()),
            config.session.clone(),
        );

        let now_ms = self.now_ms.unwrap_or(self.location.timestamp_ms);
        let location_update = session.update_location(&self.location, now_ms);

        estimator.start(config.compass.sensitivity());
        let attitudes = estimator.process_source(&mut source, rotation)?;
        estimator.stop();

        let frames: Vec<Frame> = attitudes
            .into_iter()
            .map(|attitude| Frame {
                attitude,
                points: session.visible_points(&attitude, &viewport),
            })
            .collect();

        info!(
            "Replayed {} samples from {}: {} frames",
            self.samples.len(),
            source.name(),
            frames.len()
        );

        Ok(ScenarioReport {
            location_update,
            frames,
        })
    }
}
