//! Bearing-ordered index of targets around an observer
//!
//! Points live in an arena and a separate array of `(bearing, arena slot)`
//! pairs is kept sorted, so targets sharing a bearing never overwrite each
//! other. Window queries wrap across north (0°/360°).

use crate::algorithms::geodesy::{bearing, normalize_bearing};
use crate::core::GeoPoint;

/// Sorted entry: bearing from the observer and slot in the arena
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexEntry {
    bearing: f64,
    slot: usize,
}

/// Targets ordered by their bearing from one observer
#[derive(Debug, Clone, Default)]
pub struct AzimuthIndex {
    points: Vec<GeoPoint>,
    entries: Vec<IndexEntry>,
}

impl AzimuthIndex {
    /// Compute the bearing of every target from `observer` and order them.
    pub fn build(observer: &GeoPoint, targets: &[GeoPoint]) -> Self {
        Self::from_bearings(
            targets
                .iter()
                .map(|target| (bearing(observer, target), target.clone())),
        )
    }

    /// Order targets whose bearings are already known.
    ///
    /// Bearings are wrapped into [0, 360). Equal bearings keep input order.
    pub fn from_bearings<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (f64, GeoPoint)>,
    {
        let mut points = Vec::new();
        let mut entries = Vec::new();

        for (slot, (raw_bearing, point)) in items.into_iter().enumerate() {
            entries.push(IndexEntry {
                bearing: normalize_bearing(raw_bearing),
                slot,
            });
            points.push(point);
        }

        entries.sort_by(|a, b| a.bearing.total_cmp(&b.bearing).then(a.slot.cmp(&b.slot)));

        Self { points, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a sorted position
    pub fn get(&self, position: usize) -> Option<(f64, &GeoPoint)> {
        self.entries
            .get(position)
            .map(|entry| (entry.bearing, &self.points[entry.slot]))
    }

    /// All entries in ascending bearing order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &GeoPoint)> + '_ {
        self.entries
            .iter()
            .map(move |entry| (entry.bearing, &self.points[entry.slot]))
    }

    /// Entries whose bearing lies within `center ± half_width` (inclusive),
    /// modulo 360.
    ///
    /// Results start at the window's left edge, so a window straddling north
    /// yields the entries just below 360° first, then those from 0° up.
    pub fn windowed(&self, center: f64, half_width: f64) -> Vec<(f64, &GeoPoint)> {
        if !(half_width >= 0.0) || !center.is_finite() {
            return Vec::new();
        }
        if half_width >= 180.0 {
            return self.iter().collect();
        }

        let low = normalize_bearing(center - half_width);
        let high = normalize_bearing(center + half_width);

        if low <= high {
            self.range(low, high).collect()
        } else {
            self.range(low, 360.0).chain(self.range(0.0, high)).collect()
        }
    }

    /// Entries with `low <= bearing <= high`
    fn range(&self, low: f64, high: f64) -> impl Iterator<Item = (f64, &GeoPoint)> + '_ {
        let start = self.entries.partition_point(|entry| entry.bearing < low);
        let end = self.entries.partition_point(|entry| entry.bearing <= high);
        self.entries[start..end.max(start)]
            .iter()
            .map(move |entry| (entry.bearing, &self.points[entry.slot]))
    }
}
