//! Geographic primitives shared by the router and the route line.
//!
//! Distances are great-circle (haversine) distances, not planar ones,
//! so nearest-point searches behave the same near the poles as at the
//! equator.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: GeoPoint) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();

        EARTH_RADIUS_M * c
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl From<GeoPoint> for (f64, f64) {
    fn from(point: GeoPoint) -> Self {
        (point.lat, point.lng)
    }
}

/// Axis-aligned lat/lng rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    /// Smallest bounds covering every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_same_point() {
        let p = GeoPoint::new(36.1, -115.1);
        assert!(p.distance_to(p) < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_distance_known() {
        // Las Vegas (36.17, -115.14) to Los Angeles (34.05, -118.24)
        // Actual distance ~370 km
        let dist = GeoPoint::new(36.17, -115.14).distance_to(GeoPoint::new(34.05, -118.24));
        assert!(
            dist > 350_000.0 && dist < 400_000.0,
            "LV to LA should be ~370km, got {}",
            dist
        );
    }

    #[test]
    fn test_distance_symmetric() {
        let a = GeoPoint::new(36.1, -115.1);
        let b = GeoPoint::new(36.2, -115.2);
        assert!((a.distance_to(b) - b.distance_to(a)).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_degree_shrinks_with_latitude() {
        let equator = GeoPoint::new(0.0, 0.0).distance_to(GeoPoint::new(0.0, 1.0));
        let north = GeoPoint::new(60.0, 0.0).distance_to(GeoPoint::new(60.0, 1.0));
        assert!(north < equator * 0.6);
    }

    #[test]
    fn test_bounds_from_points() {
        let bounds = GeoBounds::from_points([
            GeoPoint::new(1.0, 5.0),
            GeoPoint::new(-2.0, 3.0),
            GeoPoint::new(0.5, 7.0),
        ])
        .unwrap();
        assert_eq!(bounds.south_west, GeoPoint::new(-2.0, 3.0));
        assert_eq!(bounds.north_east, GeoPoint::new(1.0, 7.0));
        assert!(bounds.contains(GeoPoint::new(0.0, 4.0)));
        assert!(!bounds.contains(GeoPoint::new(0.0, 8.0)));
        assert_eq!(bounds.center(), GeoPoint::new(-0.5, 5.0));
    }

    #[test]
    fn test_bounds_empty() {
        assert!(GeoBounds::from_points(Vec::new()).is_none());
    }
}
