//! Orientation estimator
//!
//! Fuses smoothed magnetic and gravity samples into a screen-corrected
//! attitude and notifies listeners when it moved by more than the configured
//! sensitivity.

use crate::algorithms::geodesy::signed_angle_difference;
use crate::core::{
    Attitude, RawSample, ScreenRotation, SensorKind, Sensitivity, GRAVITY_SMOOTHING_FACTOR,
    MAGNETIC_SMOOTHING_FACTOR,
};
use crate::hardware::{SensorError, SensorSource};
use crate::processing::orientation::attitude_from_vectors;
use crate::processing::smoothing::ExponentialSmoother;
use log::{debug, info, trace, warn};
use parking_lot::{Mutex, ReentrantMutex};
use std::collections::HashMap;
use std::sync::Arc;

/// Callback invoked with every emitted attitude
pub type AttitudeCallback = Box<dyn Fn(Attitude) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(Attitude) + Send + Sync>;

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u32);

impl ListenerHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Lifecycle state of the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorState {
    Stopped,
    Running,
}

/// Smoothing factors of the two sensor channels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFactors {
    pub magnetic: f64,
    pub gravity: f64,
}

impl Default for SmoothingFactors {
    fn default() -> Self {
        Self {
            magnetic: MAGNETIC_SMOOTHING_FACTOR,
            gravity: GRAVITY_SMOOTHING_FACTOR,
        }
    }
}

/// Everything mutated while processing a sample
struct EstimatorInner {
    state: EstimatorState,
    sensitivity: Sensitivity,
    magnetic: ExponentialSmoother,
    gravity: ExponentialSmoother,
    last_emitted: Option<Attitude>,
    samples_processed: u64,
}

impl EstimatorInner {
    fn exceeds_sensitivity(&self, attitude: &Attitude) -> bool {
        let last = match self.last_emitted {
            Some(last) => last,
            None => return true,
        };

        signed_angle_difference(last.heading, attitude.heading).abs() >= self.sensitivity.heading
            || (attitude.pitch - last.pitch).abs() >= self.sensitivity.pitch
            || (attitude.roll - last.roll).abs() >= self.sensitivity.roll
    }
}

/// Compass: turns raw sensor samples into device attitudes.
///
/// Shareable across threads. Processing, lifecycle changes and reads of the
/// last attitude are serialized by one lock; listeners run after it is
/// released. A processing step holds the delivery guard until its listeners
/// have returned, and `stop` waits on that guard.
pub struct OrientationEstimator {
    delivery: ReentrantMutex<()>,
    inner: Mutex<EstimatorInner>,
    listeners: Mutex<HashMap<ListenerHandle, SharedCallback>>,
    listener_counter: Mutex<u32>,
}

impl OrientationEstimator {
    /// Create an estimator for a device.
    ///
    /// Fails when the device lacks a magnetometer or an accelerometer.
    pub fn new<S: SensorSource + ?Sized>(source: &S) -> Result<Self, SensorError> {
        Self::with_smoothing(source, SmoothingFactors::default())
    }

    pub fn with_smoothing<S: SensorSource + ?Sized>(
        source: &S,
        smoothing: SmoothingFactors,
    ) -> Result<Self, SensorError> {
        for kind in [SensorKind::Magnetic, SensorKind::Gravity] {
            if !source.has_channel(kind) {
                warn!("Orientation estimator unavailable: {} has no {:?} channel", source.name(), kind);
                return Err(SensorError::MissingChannel {
                    kind,
                    source_name: source.name().to_string(),
                });
            }
        }

        debug!(
            "Orientation estimator created for {} (magnetic α={}, gravity α={})",
            source.name(),
            smoothing.magnetic,
            smoothing.gravity
        );

        Ok(Self {
            delivery: ReentrantMutex::new(()),
            inner: Mutex::new(EstimatorInner {
                state: EstimatorState::Stopped,
                sensitivity: Sensitivity::default(),
                magnetic: ExponentialSmoother::new(smoothing.magnetic),
                gravity: ExponentialSmoother::new(smoothing.gravity),
                last_emitted: None,
                samples_processed: 0,
            }),
            listeners: Mutex::new(HashMap::new()),
            listener_counter: Mutex::new(0),
        })
    }

    /// Start (or re-arm) emission with the given thresholds
    pub fn start(&self, sensitivity: Sensitivity) {
        let mut inner = self.inner.lock();
        if inner.state == EstimatorState::Running {
            debug!("Orientation estimator re-armed with {:?}", sensitivity);
        } else {
            info!("Orientation estimator started with {:?}", sensitivity);
        }
        inner.state = EstimatorState::Running;
        inner.sensitivity = sensitivity;
    }

    /// Stop processing. Thresholds fall back to zero; smoothing state is kept.
    ///
    /// Returns once any in-flight processing step, listeners included, has
    /// finished.
    pub fn stop(&self) {
        let _delivery = self.delivery.lock();
        let mut inner = self.inner.lock();
        if inner.state == EstimatorState::Running {
            info!(
                "Orientation estimator stopped after {} samples",
                inner.samples_processed
            );
        }
        inner.state = EstimatorState::Stopped;
        inner.sensitivity = Sensitivity::default();
    }

    pub fn state(&self) -> EstimatorState {
        self.inner.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == EstimatorState::Running
    }

    /// Last attitude handed to listeners, `None` before the first emission
    pub fn last_attitude(&self) -> Option<Attitude> {
        self.inner.lock().last_emitted
    }

    pub fn samples_processed(&self) -> u64 {
        self.inner.lock().samples_processed
    }

    /// Feed one raw sample.
    ///
    /// Returns the new attitude when one is emitted. Nothing is emitted while
    /// stopped, until both channels have delivered a sample, when the
    /// readings are degenerate, or when no component moved by its threshold.
    pub fn process(&self, sample: &RawSample, rotation: ScreenRotation) -> Option<Attitude> {
        let _delivery = self.delivery.lock();
        let emitted = {
            let mut inner = self.inner.lock();
            if inner.state != EstimatorState::Running {
                trace!("Sample ignored while stopped");
                return None;
            }
            inner.samples_processed += 1;

            match sample.kind {
                SensorKind::Magnetic => {
                    inner.magnetic.update(&sample.values);
                }
                SensorKind::Gravity => {
                    inner.gravity.update(&sample.values);
                }
            }

            let (gravity, magnetic) = match (inner.gravity.value(), inner.magnetic.value()) {
                (Some(gravity), Some(magnetic)) => (gravity, magnetic),
                _ => return None,
            };

            let attitude = match attitude_from_vectors(&gravity, &magnetic, rotation) {
                Some(attitude) => attitude,
                None => {
                    trace!("Degenerate sensor readings, no attitude");
                    return None;
                }
            };

            if !inner.exceeds_sensitivity(&attitude) {
                return None;
            }
            inner.last_emitted = Some(attitude);
            attitude
        };

        trace!("Attitude emitted: {:?}", emitted);
        let listeners: Vec<SharedCallback> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            // A listener may have stopped the estimator
            if !self.is_running() {
                break;
            }
            listener(emitted);
        }
        Some(emitted)
    }

    /// Drain every pending sample of a source.
    ///
    /// Returns the attitudes emitted along the way.
    pub fn process_source<S: SensorSource + ?Sized>(
        &self,
        source: &mut S,
        rotation: ScreenRotation,
    ) -> Result<Vec<Attitude>, SensorError> {
        let mut emitted = Vec::new();
        while let Some(sample) = source.read_sample()? {
            if let Some(attitude) = self.process(&sample, rotation) {
                emitted.push(attitude);
            }
        }
        Ok(emitted)
    }

    pub fn register_listener(&self, listener: AttitudeCallback) -> ListenerHandle {
        let handle = {
            let mut counter = self.listener_counter.lock();
            *counter += 1;
            ListenerHandle(*counter)
        };
        self.listeners.lock().insert(handle, Arc::from(listener));
        debug!("Attitude listener {} registered", handle.id());
        handle
    }

    /// Returns `false` when the handle was not registered
    pub fn unregister_listener(&self, handle: ListenerHandle) -> bool {
        let removed = self.listeners.lock().remove(&handle).is_some();
        if removed {
            debug!("Attitude listener {} unregistered", handle.id());
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}
