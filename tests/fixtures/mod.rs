//! Test fixtures for routing-machine.
//!
//! Provides:
//! - A transport that records requests and answers them on demand
//! - A map surface that records what was drawn
//! - Canned `viaroute` responses
//! - Real Las Vegas locations (from OpenStreetMap)

#![allow(dead_code)]

pub mod las_vegas_locations;

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::{Value, json};

use routing_machine::error::RoutingError;
use routing_machine::geo::{GeoBounds, GeoPoint};
use routing_machine::line::PathStyle;
use routing_machine::polyline;
use routing_machine::traits::{LayerId, MapSurface, Transport};
use routing_machine::transport::{Reply, RequestId};

// ============================================================================
// Transport
// ============================================================================

/// Records every dispatched URL and holds the reply until a test answers it.
#[derive(Default)]
pub struct MockTransport {
    sent: RefCell<Vec<(String, Option<Reply>)>>,
}

impl MockTransport {
    pub fn urls(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn request_count(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn request_id(&self, n: usize) -> RequestId {
        self.sent.borrow()[n]
            .1
            .as_ref()
            .expect("request already answered")
            .request()
    }

    /// Answers the `n`th dispatched request with `payload`.
    pub fn respond(&self, n: usize, payload: Value) {
        self.take(n).deliver(Ok(payload));
    }

    pub fn fail(&self, n: usize, error: RoutingError) {
        self.take(n).deliver(Err(error));
    }

    fn take(&self, n: usize) -> Reply {
        self.sent.borrow_mut()[n]
            .1
            .take()
            .expect("request already answered")
    }
}

impl Transport for MockTransport {
    fn send(&self, url: String, reply: Reply) {
        self.sent.borrow_mut().push((url, Some(reply)));
    }
}

// ============================================================================
// Map surface
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Polyline { points: Vec<GeoPoint>, style: PathStyle },
    Marker { at: GeoPoint, draggable: bool },
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_id: u64,
    pub layers: BTreeMap<LayerId, Layer>,
    pub fitted: Vec<GeoBounds>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polylines(&self) -> Vec<(LayerId, Vec<GeoPoint>)> {
        self.layers
            .iter()
            .filter_map(|(id, layer)| match layer {
                Layer::Polyline { points, .. } => Some((*id, points.clone())),
                Layer::Marker { .. } => None,
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<(LayerId, GeoPoint, bool)> {
        self.layers
            .iter()
            .filter_map(|(id, layer)| match layer {
                Layer::Marker { at, draggable } => Some((*id, *at, *draggable)),
                Layer::Polyline { .. } => None,
            })
            .collect()
    }

    fn insert(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, layer);
        id
    }
}

impl MapSurface for RecordingSurface {
    fn add_polyline(&mut self, points: &[GeoPoint], style: &PathStyle) -> LayerId {
        self.insert(Layer::Polyline {
            points: points.to_vec(),
            style: style.clone(),
        })
    }

    fn set_polyline_points(&mut self, layer: LayerId, new_points: &[GeoPoint]) {
        if let Some(Layer::Polyline { points, .. }) = self.layers.get_mut(&layer) {
            *points = new_points.to_vec();
        }
    }

    fn add_marker(&mut self, at: GeoPoint, draggable: bool) -> LayerId {
        self.insert(Layer::Marker { at, draggable })
    }

    fn set_marker_position(&mut self, layer: LayerId, position: GeoPoint) {
        if let Some(Layer::Marker { at, .. }) = self.layers.get_mut(&layer) {
            *at = position;
        }
    }

    fn remove_layer(&mut self, layer: LayerId) {
        self.layers.remove(&layer);
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.fitted.push(bounds);
    }
}

// ============================================================================
// Responses
// ============================================================================

pub fn route_response(geometry: &[GeoPoint], total_distance: f64, hints: &[&str], checksum: i64) -> Value {
    json!({
        "status": 0,
        "route_name": ["Las Vegas Boulevard"],
        "route_geometry": polyline::encode(geometry, 6),
        "route_instructions": [
            ["10", "Las Vegas Boulevard", total_distance, 0, 60, "1km", "N", 0.0, 1],
            ["15", "", 0, geometry.len().saturating_sub(1), 0, "0m", "N", 0.0, 1]
        ],
        "route_summary": {"total_distance": total_distance, "total_time": 60},
        "via_points": geometry.first().map(|p| vec![[p.lat, p.lng]]).unwrap_or_default(),
        "alternative_geometries": [],
        "alternative_names": [],
        "alternative_instructions": [],
        "alternative_summaries": [],
        "hint_data": {"checksum": checksum, "locations": hints},
    })
}

pub fn error_response(status: i64, message: &str) -> Value {
    json!({"status": status, "message": message})
}

/// Evenly spaced points along the equator, 0.01 degrees apart.
pub fn straight_geometry(n: usize) -> Vec<GeoPoint> {
    (0..n).map(|i| GeoPoint::new(0.0, i as f64 * 0.01)).collect()
}
