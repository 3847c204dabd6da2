//! Nearest-point lookups over a route's geometry.
//!
//! Built once per route. Each waypoint is mapped to the geometry point
//! closest to it, which is what lets a pointer on the path be turned into
//! an insertion slot in the waypoint list.

use crate::geo::GeoPoint;
use crate::route::Route;

#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometryIndex {
    geometry: Vec<GeoPoint>,
    waypoint_indices: Vec<usize>,
}

impl RouteGeometryIndex {
    pub fn new(route: &Route) -> Self {
        Self::from_parts(route.geometry.clone(), &route.waypoints)
    }

    /// Waypoints that cannot be placed (empty geometry) are left out.
    pub fn from_parts(geometry: Vec<GeoPoint>, waypoints: &[GeoPoint]) -> Self {
        let waypoint_indices = waypoints
            .iter()
            .filter_map(|wp| closest_in(&geometry, *wp))
            .collect();

        Self {
            geometry,
            waypoint_indices,
        }
    }

    /// Index of the geometry point closest to `location`.
    ///
    /// The scan runs from the last point to the first and only moves on a
    /// strictly smaller distance, so among equally close points the one
    /// with the highest index wins. `None` for an empty geometry.
    pub fn closest_point(&self, location: GeoPoint) -> Option<usize> {
        closest_in(&self.geometry, location)
    }

    /// Geometry index of each waypoint, in waypoint order.
    pub fn waypoint_indices(&self) -> &[usize] {
        &self.waypoint_indices
    }

    /// Position of the last waypoint whose geometry index is at or before
    /// `geometry_index`. `None` means the slot precedes every waypoint.
    pub fn nearest_waypoint_at_or_before(&self, geometry_index: usize) -> Option<usize> {
        self.waypoint_indices
            .iter()
            .rposition(|&wp_index| wp_index <= geometry_index)
    }

    pub fn geometry(&self) -> &[GeoPoint] {
        &self.geometry
    }
}

fn closest_in(geometry: &[GeoPoint], location: GeoPoint) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, point) in geometry.iter().enumerate().rev() {
        let d = location.distance_to(*point);
        if best.is_none_or(|(_, min)| d < min) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}
