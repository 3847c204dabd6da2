//! Resolution hints from the last successful route response.
//!
//! The service hands back one opaque token per requested location plus a
//! checksum for the whole set. Sending them with the next request lets the
//! server skip re-snapping unchanged locations. Hints are advisory: a stale
//! or mismatched hint makes the server fall back to full resolution.

use std::collections::HashMap;

use crate::geo::GeoPoint;

/// Cache key for a location: `"lat,lng"` in shortest round-trip form.
pub fn location_key(location: GeoPoint) -> String {
    format!("{},{}", location.lat, location.lng)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintCache {
    checksum: Option<i64>,
    locations: HashMap<String, String>,
}

impl HintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.checksum = None;
        self.locations.clear();
    }

    /// Replaces the whole cache with a fresh hint set.
    pub fn record<I>(&mut self, checksum: Option<i64>, hints: I)
    where
        I: IntoIterator<Item = (GeoPoint, String)>,
    {
        let locations = hints
            .into_iter()
            .map(|(location, hint)| (location_key(location), hint))
            .collect();
        *self = Self {
            checksum,
            locations,
        };
    }

    pub fn lookup(&self, location: GeoPoint) -> Option<&str> {
        self.locations.get(&location_key(location)).map(String::as_str)
    }

    pub fn checksum(&self) -> Option<i64> {
        self.checksum
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_key_format() {
        assert_eq!(location_key(GeoPoint::new(0.0, 1.5)), "0,1.5");
        assert_eq!(location_key(GeoPoint::new(36.1147, -115.1728)), "36.1147,-115.1728");
    }

    #[test]
    fn test_record_then_lookup() {
        let a = GeoPoint::new(1.0, 2.0);
        let mut cache = HintCache::new();
        cache.record(Some(5), [(a, "h1".to_string())]);

        assert_eq!(cache.lookup(a), Some("h1"));
        assert_eq!(cache.lookup(GeoPoint::new(2.0, 1.0)), None);
        assert_eq!(cache.checksum(), Some(5));
    }

    #[test]
    fn test_record_replaces_everything() {
        let a = GeoPoint::new(1.0, 2.0);
        let b = GeoPoint::new(3.0, 4.0);
        let mut cache = HintCache::new();
        cache.record(Some(5), [(a, "h1".to_string())]);
        cache.record(Some(9), [(b, "h2".to_string())]);

        assert_eq!(cache.lookup(a), None);
        assert_eq!(cache.lookup(b), Some("h2"));
        assert_eq!(cache.checksum(), Some(9));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = HintCache::new();
        cache.record(Some(5), [(GeoPoint::new(1.0, 2.0), "h1".to_string())]);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.checksum(), None);
    }

    #[test]
    fn test_later_duplicate_in_record_wins() {
        let a = GeoPoint::new(1.0, 2.0);
        let mut cache = HintCache::new();
        cache.record(None, [(a, "first".to_string()), (a, "second".to_string())]);
        assert_eq!(cache.lookup(a), Some("second"));
    }
}
