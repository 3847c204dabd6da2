//! routing-machine core
//!
//! Multi-waypoint route planning against an OSRM `viaroute` service:
//! request building with resolution hints, polyline decoding, and the
//! interactive route line that turns drags and clicks on the path into
//! waypoint edits.

pub mod controller;
pub mod error;
pub mod events;
pub mod geo;
pub mod geometry_index;
pub mod hints;
pub mod line;
pub mod osrm;
pub mod polyline;
pub mod route;
pub mod traits;
pub mod transport;
