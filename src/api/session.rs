//! Overlay session
//!
//! Owns everything that depends on the observer location: the catalog
//! subset loaded around the observer, the bearing index and the geometry
//! cache. Location updates are throttled by distance so small GPS jitter
//! does not trigger recomputation.

use crate::algorithms::geodesy::{distance, signed_angle_difference, BoundingBox};
use crate::algorithms::{AzimuthIndex, ViewWindow};
use crate::api::types::{ApiError, ApiResult, LocationFix, LocationUpdate, ProjectedPoint};
use crate::core::{Attitude, GeoPoint, RelativeGeometry, ViewportSpec};
use crate::processing::RelativeGeometryCache;
use crate::utils::config::SessionConfig;
use crate::validation::PointValidator;
use log::{debug, info, warn};

/// Source of points of interest
pub trait PointCatalog {
    /// Points within roughly `radius_m` of `center`
    fn points_around(&self, center: &GeoPoint, radius_m: f64) -> Vec<GeoPoint>;
}

/// Catalog held in memory, filtered with a latitude/longitude box
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    points: Vec<GeoPoint>,
}

impl InMemoryCatalog {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Parse a JSON array of points
    pub fn from_json_str(json: &str) -> ApiResult<Self> {
        let points: Vec<GeoPoint> = serde_json::from_str(json).map_err(|e| ApiError::Input {
            message: format!("Failed to parse point catalog: {}", e),
        })?;
        Ok(Self::new(points))
    }

    pub fn add_point(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl PointCatalog for InMemoryCatalog {
    fn points_around(&self, center: &GeoPoint, radius_m: f64) -> Vec<GeoPoint> {
        let bounds = BoundingBox::around(center, radius_m);
        self.points
            .iter()
            .filter(|point| bounds.contains(point))
            .cloned()
            .collect()
    }
}

/// Per-observer state of the overlay
pub struct OverlaySession<C: PointCatalog> {
    catalog: C,
    config: SessionConfig,
    /// Location the index and cache were last computed from
    observer: Option<GeoPoint>,
    /// Location the catalog was last queried around
    reload_center: Option<GeoPoint>,
    points: Vec<GeoPoint>,
    index: AzimuthIndex,
    cache: RelativeGeometryCache,
}

impl<C: PointCatalog> OverlaySession<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_config(catalog, SessionConfig::default())
    }

    pub fn with_config(catalog: C, config: SessionConfig) -> Self {
        Self {
            catalog,
            config,
            observer: None,
            reload_center: None,
            points: Vec::new(),
            index: AzimuthIndex::default(),
            cache: RelativeGeometryCache::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn observer(&self) -> Option<&GeoPoint> {
        self.observer.as_ref()
    }

    /// Points currently loaded around the observer
    pub fn loaded_points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn index(&self) -> &AzimuthIndex {
        &self.index
    }

    /// (hits, misses) of the geometry cache
    pub fn cache_stats(&self) -> (usize, usize) {
        self.cache.get_stats()
    }

    /// Apply a new location fix.
    ///
    /// `now_ms` is the current time on the same clock as the fix timestamp.
    pub fn update_location(&mut self, fix: &LocationFix, now_ms: u64) -> LocationUpdate {
        let age_ms = now_ms.saturating_sub(fix.timestamp_ms);
        if age_ms > self.config.max_fix_age_ms {
            warn!("Ignoring location fix {} ms old", age_ms);
            return LocationUpdate::Stale;
        }

        let observer = fix.to_observer();
        let moved_beyond = |from: &Option<GeoPoint>, threshold: f64| {
            from.as_ref().map_or(true, |previous| distance(previous, &observer) > threshold)
        };

        if moved_beyond(&self.reload_center, self.config.reload_distance_m) {
            self.reload(&observer);
            self.rebuild(observer);
            LocationUpdate::Reloaded
        } else if moved_beyond(&self.observer, self.config.recalculation_distance_m) {
            self.rebuild(observer);
            LocationUpdate::Rebuilt
        } else {
            LocationUpdate::Unchanged
        }
    }

    /// Targets visible with the given attitude, left to right.
    pub fn visible_points(&mut self, attitude: &Attitude, viewport: &ViewportSpec) -> Vec<ProjectedPoint> {
        if self.observer.is_none() {
            return Vec::new();
        }
        let window = match ViewWindow::new(attitude, viewport) {
            Some(window) => window,
            None => return Vec::new(),
        };

        let mut visible: Vec<(f64, ProjectedPoint)> = Vec::new();
        for (bearing, point) in self.index.windowed(window.heading(), window.half_width()) {
            let geometry = match self.cache.get_or_compute(point) {
                Some(geometry) => geometry,
                None => continue,
            };
            if let Some((x_px, y_px)) = window.project(bearing, geometry.vertical_angle) {
                let offset = signed_angle_difference(window.heading(), bearing);
                visible.push((
                    offset,
                    ProjectedPoint {
                        point: point.clone(),
                        geometry,
                        x_px,
                        y_px,
                    },
                ));
            }
        }

        visible.sort_by(|a, b| a.0.total_cmp(&b.0));
        visible.into_iter().map(|(_, projected)| projected).collect()
    }

    /// Every loaded point with its geometry, nearest first
    pub fn points_by_distance(&mut self) -> Vec<(GeoPoint, RelativeGeometry)> {
        let mut entries: Vec<(GeoPoint, RelativeGeometry)> = Vec::with_capacity(self.points.len());
        for point in &self.points {
            if let Some(geometry) = self.cache.get_or_compute(point) {
                entries.push((point.clone(), geometry));
            }
        }
        entries.sort_by(|a, b| a.1.distance.total_cmp(&b.1.distance));
        entries
    }

    fn reload(&mut self, center: &GeoPoint) {
        let candidates = self.catalog.points_around(center, self.config.search_radius_m);
        let found = candidates.len();

        let result = PointValidator::new().validate_points(candidates);
        if !result.rejected_points.is_empty() {
            warn!("Dropped {} invalid catalog points", result.rejected_points.len());
        }

        info!(
            "Catalog reloaded around ({:.5}, {:.5}): {} points within {} m",
            center.latitude(),
            center.longitude(),
            found,
            self.config.search_radius_m
        );
        self.points = result.valid_points;
        self.reload_center = Some(center.clone());
    }

    fn rebuild(&mut self, observer: GeoPoint) {
        self.cache.set_observer(observer.clone());

        let mut entries = Vec::with_capacity(self.points.len());
        for point in &self.points {
            if let Some(geometry) = self.cache.get_or_compute(point) {
                entries.push((geometry.bearing, point.clone()));
            }
        }

        self.index = AzimuthIndex::from_bearings(entries);
        debug!("Azimuth index rebuilt with {} points", self.index.len());
        self.observer = Some(observer);
    }
}
