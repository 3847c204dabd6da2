//! Real Las Vegas locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap via Overpass API.
//! These are real, routable locations that work with OSRM Nevada data.

use routing_machine::geo::GeoPoint;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

pub const STRIP: &[Location] = &[
    Location::new("MGM Grand", 36.1023654, -115.1688720),
    Location::new("Bellagio", 36.1126, -115.1767),
    Location::new("Caesars Palace", 36.1162, -115.1745),
    Location::new("Wynn Las Vegas", 36.1263781, -115.1658180),
];

pub const DOWNTOWN: &[Location] = &[
    Location::new("Fremont Street", 36.1707, -115.1440),
    Location::new("Golden Nugget", 36.1700, -115.1453),
];

pub fn strip_points() -> Vec<GeoPoint> {
    STRIP.iter().map(Location::point).collect()
}
