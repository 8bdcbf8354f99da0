//! Mock sensor source for testing and scenario replay

use crate::core::{RawSample, SensorKind};
use crate::hardware::{SensorError, SensorResult, SensorSource};
use std::collections::{HashSet, VecDeque};

/// In-memory sensor source fed with pre-recorded samples
#[derive(Debug, Clone)]
pub struct MockSensorSource {
    name: String,
    channels: HashSet<SensorKind>,
    queue: VecDeque<RawSample>,
    connected: bool,
    samples_delivered: u64,
}

impl Default for MockSensorSource {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            channels: [SensorKind::Magnetic, SensorKind::Gravity].into_iter().collect(),
            queue: VecDeque::new(),
            connected: true,
            samples_delivered: 0,
        }
    }
}

impl MockSensorSource {
    /// Source with both magnetic and gravity channels
    pub fn new() -> Self {
        Self::default()
    }

    /// Source exposing only the given channels
    pub fn with_channels(channels: &[SensorKind]) -> Self {
        Self {
            channels: channels.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue a sample. Samples for channels the source lacks are dropped.
    pub fn push_sample(&mut self, sample: RawSample) {
        if self.channels.contains(&sample.kind) {
            self.queue.push_back(sample);
        }
    }

    pub fn push_samples<I: IntoIterator<Item = RawSample>>(&mut self, samples: I) {
        for sample in samples {
            self.push_sample(sample);
        }
    }

    pub fn queued_sample_count(&self) -> usize {
        self.queue.len()
    }

    pub fn samples_delivered(&self) -> u64 {
        self.samples_delivered
    }

    /// Simulate the device going away
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn reconnect(&mut self) {
        self.connected = true;
    }
}

impl SensorSource for MockSensorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_channel(&self, kind: SensorKind) -> bool {
        self.channels.contains(&kind)
    }

    fn read_sample(&mut self) -> SensorResult<Option<RawSample>> {
        if !self.connected {
            return Err(SensorError::Disconnected {
                source_name: self.name.clone(),
            });
        }

        let sample = self.queue.pop_front();
        if sample.is_some() {
            self.samples_delivered += 1;
        }
        Ok(sample)
    }
}
