//! Interactive route line.
//!
//! Draws a route's geometry and waypoints on a [`MapSurface`] and turns
//! pointer input into waypoint change requests. The line never edits the
//! waypoint list itself; it reports [`LineEvent`]s and whoever owns the
//! list decides what to do with them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::events::{Emitter, ListenerId};
use crate::geo::{GeoBounds, GeoPoint};
use crate::geometry_index::RouteGeometryIndex;
use crate::route::Route;
use crate::traits::{LayerId, MapSurface};

/// Stroke used to draw a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub color: String,
    pub opacity: f64,
    pub weight: f64,
}

impl PathStyle {
    pub fn new(color: impl Into<String>, opacity: f64, weight: f64) -> Self {
        Self {
            color: color.into(),
            opacity,
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineOptions {
    /// One polyline per style, drawn in order (casing first).
    pub styles: Vec<PathStyle>,
    /// Stroke for the insertion preview segment.
    pub drag_style: PathStyle,
    pub draggable_waypoints: bool,
    /// Pressing on the path starts inserting a waypoint.
    pub add_waypoints: bool,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            styles: vec![
                PathStyle::new("black", 0.15, 7.0),
                PathStyle::new("white", 0.8, 4.0),
                PathStyle::new("orange", 1.0, 2.0),
            ],
            drag_style: PathStyle::new("orange", 1.0, 3.0),
            draggable_waypoints: true,
            add_waypoints: true,
        }
    }
}

/// Pointer input forwarded by the host map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapInput {
    MarkerDragStart { marker: LayerId, location: GeoPoint },
    MarkerDrag { marker: LayerId, location: GeoPoint },
    MarkerDragEnd { marker: LayerId, location: GeoPoint },
    PathPointerDown { path: LayerId, location: GeoPoint },
    PointerMove { location: GeoPoint },
    PointerUp { location: GeoPoint },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEvent {
    WaypointDragStart { index: usize, location: GeoPoint },
    WaypointDrag { index: usize, location: GeoPoint },
    WaypointDragEnd { index: usize, location: GeoPoint },
    /// A new waypoint should go right after `after_index`;
    /// `None` means before the first waypoint.
    WaypointAdded {
        after_index: Option<usize>,
        location: GeoPoint,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging,
}

#[derive(Debug, Clone)]
struct WaypointMarker {
    layer: LayerId,
    state: DragState,
}

/// Transient visuals of an insertion gesture. The slot is fixed when the
/// gesture starts.
#[derive(Debug, Clone)]
struct PendingInsertion {
    after_index: Option<usize>,
    marker: LayerId,
    preview: LayerId,
    preview_points: Vec<GeoPoint>,
    pointer_slot: usize,
}

#[derive(Debug)]
pub struct InteractiveRouteLine {
    route: Arc<Route>,
    index: RouteGeometryIndex,
    options: LineOptions,
    paths: Vec<LayerId>,
    markers: Vec<WaypointMarker>,
    insertion: Option<PendingInsertion>,
    events: Emitter<LineEvent>,
}

impl InteractiveRouteLine {
    pub fn new(route: Arc<Route>, options: LineOptions) -> Self {
        let index = RouteGeometryIndex::new(&route);
        Self {
            route,
            index,
            options,
            paths: Vec::new(),
            markers: Vec::new(),
            insertion: None,
            events: Emitter::new(),
        }
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn index(&self) -> &RouteGeometryIndex {
        &self.index
    }

    pub fn options(&self) -> &LineOptions {
        &self.options
    }

    pub fn bounds(&self) -> Option<GeoBounds> {
        self.route.bounds()
    }

    pub fn is_rendered(&self) -> bool {
        !self.paths.is_empty() || !self.markers.is_empty()
    }

    pub fn path_layers(&self) -> &[LayerId] {
        &self.paths
    }

    pub fn marker_layers(&self) -> Vec<LayerId> {
        self.markers.iter().map(|m| m.layer).collect()
    }

    pub fn drag_state(&self, waypoint: usize) -> Option<DragState> {
        self.markers.get(waypoint).map(|m| m.state)
    }

    pub fn is_inserting(&self) -> bool {
        self.insertion.is_some()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LineEvent) + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Draws the path (one polyline per style) and a marker per waypoint.
    /// Anything this line drew before is removed first.
    pub fn add_to<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        self.remove_from(surface);

        for style in &self.options.styles {
            self.paths.push(surface.add_polyline(&self.route.geometry, style));
        }

        for waypoint in &self.route.waypoints {
            let layer = surface.add_marker(*waypoint, self.options.draggable_waypoints);
            self.markers.push(WaypointMarker {
                layer,
                state: DragState::Idle,
            });
        }
    }

    /// Removes every layer this line drew, transient ones included.
    pub fn remove_from<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        for layer in self.paths.drain(..) {
            surface.remove_layer(layer);
        }
        for marker in self.markers.drain(..) {
            surface.remove_layer(marker.layer);
        }
        if let Some(insertion) = self.insertion.take() {
            surface.remove_layer(insertion.marker);
            surface.remove_layer(insertion.preview);
        }
    }

    pub fn handle_input<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        input: MapInput,
    ) -> Option<LineEvent> {
        let event = match input {
            MapInput::MarkerDragStart { marker, location } => {
                self.drag_transition(marker, DragState::Idle, DragState::Dragging)
                    .map(|index| LineEvent::WaypointDragStart { index, location })
            }
            MapInput::MarkerDrag { marker, location } => self
                .drag_transition(marker, DragState::Dragging, DragState::Dragging)
                .map(|index| LineEvent::WaypointDrag { index, location }),
            MapInput::MarkerDragEnd { marker, location } => self
                .drag_transition(marker, DragState::Dragging, DragState::Idle)
                .map(|index| LineEvent::WaypointDragEnd { index, location }),
            MapInput::PathPointerDown { path, location } => {
                self.begin_insertion(surface, path, location);
                None
            }
            MapInput::PointerMove { location } => {
                self.track_insertion(surface, location);
                None
            }
            MapInput::PointerUp { location } => self.finish_insertion(surface, location),
        };

        if let Some(event) = &event {
            self.events.emit(event);
        }
        event
    }

    fn drag_transition(&mut self, layer: LayerId, from: DragState, to: DragState) -> Option<usize> {
        if !self.options.draggable_waypoints {
            return None;
        }
        let index = self.markers.iter().position(|m| m.layer == layer)?;
        let marker = &mut self.markers[index];
        if marker.state != from {
            tracing::debug!(waypoint = index, state = ?marker.state, "ignoring out-of-order drag input");
            return None;
        }
        marker.state = to;
        Some(index)
    }

    fn begin_insertion<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        path: LayerId,
        location: GeoPoint,
    ) {
        if !self.options.add_waypoints || self.insertion.is_some() || !self.paths.contains(&path) {
            return;
        }
        let Some(geometry_index) = self.index.closest_point(location) else {
            return;
        };
        let after_index = self.index.nearest_waypoint_at_or_before(geometry_index);

        let waypoints = &self.route.waypoints;
        let previous = after_index.and_then(|i| waypoints.get(i)).copied();
        let next = waypoints.get(after_index.map_or(0, |i| i + 1)).copied();

        let mut preview_points = Vec::with_capacity(3);
        preview_points.extend(previous);
        let pointer_slot = preview_points.len();
        preview_points.push(location);
        preview_points.extend(next);

        tracing::debug!(geometry_index, ?after_index, "starting waypoint insertion");
        let marker = surface.add_marker(location, false);
        let preview = surface.add_polyline(&preview_points, &self.options.drag_style);
        self.insertion = Some(PendingInsertion {
            after_index,
            marker,
            preview,
            preview_points,
            pointer_slot,
        });
    }

    fn track_insertion<S: MapSurface + ?Sized>(&mut self, surface: &mut S, location: GeoPoint) {
        let Some(insertion) = self.insertion.as_mut() else {
            return;
        };
        insertion.preview_points[insertion.pointer_slot] = location;
        surface.set_marker_position(insertion.marker, location);
        surface.set_polyline_points(insertion.preview, &insertion.preview_points);
    }

    fn finish_insertion<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        location: GeoPoint,
    ) -> Option<LineEvent> {
        let insertion = self.insertion.take()?;
        surface.remove_layer(insertion.marker);
        surface.remove_layer(insertion.preview);

        Some(LineEvent::WaypointAdded {
            after_index: insertion.after_index,
            location,
        })
    }
}
