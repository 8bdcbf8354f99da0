use crate::algorithms::geodesy::relative_geometry;
use crate::core::{GeoPoint, RelativeGeometry};
use log::debug;
use std::collections::HashMap;

/// Cache of target geometry relative to one observer.
///
/// Entries are keyed by the stable point id. Points without an id are always
/// recomputed. Moving the observer drops every entry.
#[derive(Debug, Clone, Default)]
pub struct RelativeGeometryCache {
    /// Observer all cached entries were computed from
    observer: Option<GeoPoint>,
    /// Geometry by point id
    entries: HashMap<u64, RelativeGeometry>,
    /// Cache hit count for statistics
    hit_count: usize,
    /// Cache miss count for statistics
    miss_count: usize,
}

impl RelativeGeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache seeded with an observer
    pub fn for_observer(observer: GeoPoint) -> Self {
        Self {
            observer: Some(observer),
            ..Self::default()
        }
    }

    pub fn observer(&self) -> Option<&GeoPoint> {
        self.observer.as_ref()
    }

    /// Replace the observer. Entries are dropped unless the location is
    /// unchanged.
    pub fn set_observer(&mut self, observer: GeoPoint) {
        let unchanged = self.observer.as_ref().is_some_and(|current| {
            current.latitude() == observer.latitude()
                && current.longitude() == observer.longitude()
                && current.altitude() == observer.altitude()
        });
        if !unchanged {
            self.invalidate();
        }
        self.observer = Some(observer);
    }

    /// Drop every entry
    pub fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            debug!("Relative geometry cache invalidated ({} entries)", self.entries.len());
        }
        self.entries.clear();
    }

    /// Drop the entry of one point
    pub fn invalidate_point(&mut self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Cached geometry of a point, `None` when not computed yet
    pub fn get(&mut self, id: u64) -> Option<RelativeGeometry> {
        match self.entries.get(&id) {
            Some(&geometry) => {
                self.hit_count += 1;
                Some(geometry)
            }
            None => {
                self.miss_count += 1;
                None
            }
        }
    }

    /// Geometry of `target` from the current observer, computed on a miss.
    ///
    /// `None` when no observer is set.
    pub fn get_or_compute(&mut self, target: &GeoPoint) -> Option<RelativeGeometry> {
        let observer = self.observer.as_ref()?;

        let id = match target.id() {
            Some(id) => id,
            None => {
                self.miss_count += 1;
                return Some(relative_geometry(observer, target));
            }
        };

        if let Some(&geometry) = self.entries.get(&id) {
            self.hit_count += 1;
            return Some(geometry);
        }

        self.miss_count += 1;
        let geometry = relative_geometry(observer, target);
        self.entries.insert(id, geometry);
        Some(geometry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses)
    pub fn get_stats(&self) -> (usize, usize) {
        (self.hit_count, self.miss_count)
    }

    pub fn hit_ratio(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::geodesy::{bearing, distance};

    fn observer() -> GeoPoint {
        GeoPoint::new("Home", 45.1916626, 5.7385538, 220.0)
    }

    fn summit() -> GeoPoint {
        GeoPoint::new("Mont Rachais", 45.2417, 5.7436, 1046.0).with_id(1)
    }

    #[test]
    fn test_no_observer_computes_nothing() {
        let mut cache = RelativeGeometryCache::new();

        assert_eq!(cache.get_or_compute(&summit()), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_second_lookup_hits() {
        let mut cache = RelativeGeometryCache::for_observer(observer());

        let first = cache.get_or_compute(&summit()).unwrap();
        let second = cache.get_or_compute(&summit()).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.get_stats(), (1, 1));
        assert_eq!(cache.hit_ratio(), 0.5);
        assert_eq!(first.bearing, bearing(&observer(), &summit()));
        assert_eq!(first.distance, distance(&observer(), &summit()));
        assert!(first.vertical_angle > 0.0);
    }

    #[test]
    fn test_moving_observer_invalidates() {
        let mut cache = RelativeGeometryCache::for_observer(observer());
        let before = cache.get_or_compute(&summit()).unwrap();

        cache.set_observer(GeoPoint::new("Elsewhere", 45.3, 5.7, 200.0));
        assert!(cache.is_empty());

        let after = cache.get_or_compute(&summit()).unwrap();
        assert_ne!(before.bearing, after.bearing);
    }

    #[test]
    fn test_same_observer_keeps_entries() {
        let mut cache = RelativeGeometryCache::for_observer(observer());
        cache.get_or_compute(&summit());

        cache.set_observer(observer());

        assert_eq!(cache.len(), 1);
        assert!(cache.get(1).is_some());
    }

    #[test]
    fn test_points_without_id_are_not_cached() {
        let mut cache = RelativeGeometryCache::for_observer(observer());
        let anonymous = GeoPoint::new("Anonymous", 45.2, 5.8, 300.0);

        assert!(cache.get_or_compute(&anonymous).is_some());
        assert!(cache.get_or_compute(&anonymous).is_some());

        assert!(cache.is_empty());
        assert_eq!(cache.get_stats(), (0, 2));
    }

    #[test]
    fn test_invalidate_point() {
        let mut cache = RelativeGeometryCache::for_observer(observer());
        cache.get_or_compute(&summit());

        assert!(cache.invalidate_point(1));
        assert!(!cache.invalidate_point(1));
        assert_eq!(cache.get(1), None);
    }
}
