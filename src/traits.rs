//! Seams to the outside world.
//!
//! The core never talks to a network stack or a map widget directly.
//! Hosts implement these traits for their own transport and rendering.

use crate::geo::{GeoBounds, GeoPoint};
use crate::line::PathStyle;
use crate::transport::Reply;

/// Sends a GET-style request and delivers the JSON payload later.
///
/// `send` must not block on the response. Whatever thread the work runs
/// on, the result goes back through `reply`; the router picks it up on
/// its own thread in `RoutingClient::poll`.
pub trait Transport {
    fn send(&self, url: String, reply: Reply);
}

/// Handle to something drawn on a [`MapSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// The drawing capabilities the route line needs from a map.
///
/// Input arrives separately as `MapInput` values, already resolved to
/// geographic coordinates by the host.
pub trait MapSurface {
    fn add_polyline(&mut self, points: &[GeoPoint], style: &PathStyle) -> LayerId;

    fn set_polyline_points(&mut self, layer: LayerId, points: &[GeoPoint]);

    fn add_marker(&mut self, at: GeoPoint, draggable: bool) -> LayerId;

    fn set_marker_position(&mut self, layer: LayerId, at: GeoPoint);

    fn remove_layer(&mut self, layer: LayerId);

    fn fit_bounds(&mut self, bounds: GeoBounds);
}
