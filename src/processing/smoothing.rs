//! Exponential smoothing of 3-axis sensor vectors

use nalgebra::Vector3;

/// First-order low-pass filter: `out = prev + alpha * (new - prev)`.
///
/// The first sample passes through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialSmoother {
    alpha: f64,
    state: Option<Vector3<f64>>,
}

impl ExponentialSmoother {
    /// `alpha` is clamped into [0, 1]; 1 disables smoothing.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            state: None,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Feed a sample and return the smoothed value
    pub fn update(&mut self, sample: &Vector3<f64>) -> Vector3<f64> {
        let next = match self.state {
            Some(previous) => previous + (sample - previous) * self.alpha,
            None => *sample,
        };
        self.state = Some(next);
        next
    }

    /// Current smoothed value, `None` before the first sample
    pub fn value(&self) -> Option<Vector3<f64>> {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}
