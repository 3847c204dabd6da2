//! Glue between the waypoint list, the router and the route line.
//!
//! Single-threaded and clock-driven: the host forwards map input to
//! [`RouteController::handle_input`] and calls [`RouteController::poll`]
//! from its event loop with the current time. `poll` fires the debounced
//! re-route once drag activity has settled and applies any responses
//! that have arrived.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::events::{Emitter, ListenerId};
use crate::geo::GeoPoint;
use crate::line::{InteractiveRouteLine, LineEvent, LineOptions, MapInput};
use crate::osrm::{RouterEvent, RoutingClient};
use crate::route::Route;
use crate::traits::{MapSurface, Transport};
use crate::transport::RequestId;

/// Coalesces a burst of triggers into one action after a quiet period.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)starts the timer from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True exactly once per schedule, at the first call at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerOptions {
    /// Quiet period after the last waypoint drag before re-routing.
    pub reroute_delay_ms: u64,
    /// Zoom the map to each newly selected route.
    pub fit_bounds: bool,
    pub line: LineOptions,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            reroute_delay_ms: 1000,
            fit_bounds: true,
            line: LineOptions::default(),
        }
    }
}

pub struct RouteController<T> {
    router: RoutingClient<T>,
    options: ControllerOptions,
    waypoints: Vec<GeoPoint>,
    routes: Vec<Arc<Route>>,
    selected: Option<usize>,
    line: Option<InteractiveRouteLine>,
    reroute: Debounce,
    line_events: Emitter<LineEvent>,
}

impl<T: Transport> RouteController<T> {
    /// Requests a route straight away when `waypoints` is non-empty.
    pub fn new(router: RoutingClient<T>, waypoints: Vec<GeoPoint>, options: ControllerOptions) -> Self {
        let reroute = Debounce::new(Duration::from_millis(options.reroute_delay_ms));
        let mut controller = Self {
            router,
            options,
            waypoints,
            routes: Vec::new(),
            selected: None,
            line: None,
            reroute,
            line_events: Emitter::new(),
        };
        if !controller.waypoints.is_empty() {
            controller.request_route();
        }
        controller
    }

    pub fn router(&self) -> &RoutingClient<T> {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut RoutingClient<T> {
        &mut self.router
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn waypoints(&self) -> &[GeoPoint] {
        &self.waypoints
    }

    /// Alternatives from the last route response, primary first.
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_route(&self) -> Option<&Arc<Route>> {
        self.selected.and_then(|i| self.routes.get(i))
    }

    pub fn line(&self) -> Option<&InteractiveRouteLine> {
        self.line.as_ref()
    }

    pub fn reroute_pending(&self) -> bool {
        self.reroute.is_pending()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&RouterEvent) + 'static,
    {
        self.router.subscribe(listener)
    }

    /// Waypoint events from whichever line is current.
    pub fn subscribe_line<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LineEvent) + 'static,
    {
        self.line_events.subscribe(listener)
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<GeoPoint>) -> RequestId {
        self.waypoints = waypoints;
        self.request_route()
    }

    /// `Vec::splice` on the waypoint list followed by a re-route. Out of
    /// range bounds are clamped. Returns the removed waypoints.
    pub fn splice_waypoints<I>(&mut self, start: usize, delete_count: usize, insert: I) -> Vec<GeoPoint>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let start = start.min(self.waypoints.len());
        let end = start.saturating_add(delete_count).min(self.waypoints.len());
        let removed = self.waypoints.splice(start..end, insert).collect();
        self.request_route();
        removed
    }

    /// Shows alternative `index` on the map, replacing the current line.
    pub fn select_alternative<S: MapSurface + ?Sized>(&mut self, surface: &mut S, index: usize) -> bool {
        let Some(route) = self.routes.get(index).cloned() else {
            return false;
        };

        if let Some(mut old) = self.line.take() {
            old.remove_from(surface);
        }

        let mut line = InteractiveRouteLine::new(route, self.options.line.clone());
        line.add_to(surface);
        if self.options.fit_bounds {
            if let Some(bounds) = line.bounds() {
                surface.fit_bounds(bounds);
            }
        }

        self.line = Some(line);
        self.selected = Some(index);
        true
    }

    pub fn handle_input<S: MapSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        input: MapInput,
        now: Instant,
    ) -> Option<LineEvent> {
        let event = self.line.as_mut()?.handle_input(surface, input)?;

        match event {
            LineEvent::WaypointDragStart { .. } => {}
            LineEvent::WaypointDrag { index, location }
            | LineEvent::WaypointDragEnd { index, location } => {
                if let Some(waypoint) = self.waypoints.get_mut(index) {
                    *waypoint = location;
                    self.reroute.schedule(now);
                }
            }
            LineEvent::WaypointAdded {
                after_index,
                location,
            } => {
                let at = after_index.map_or(0, |i| i + 1);
                self.splice_waypoints(at, 0, [location]);
            }
        }

        self.line_events.emit(&event);
        Some(event)
    }

    /// Fires a due re-route, then applies every response that has arrived.
    /// An error leaves the current line as it is.
    pub fn poll<S: MapSurface + ?Sized>(&mut self, surface: &mut S, now: Instant) -> Vec<RouterEvent> {
        if self.reroute.fire(now) {
            self.router.route(&self.waypoints);
        }

        let events = self.router.poll();
        for event in &events {
            match event {
                RouterEvent::RouteFound { routes, .. } => {
                    self.routes = routes.iter().cloned().map(Arc::new).collect();
                    self.select_alternative(surface, 0);
                }
                RouterEvent::Error { status, .. } => {
                    tracing::debug!(status, "keeping current route after service error");
                }
                RouterEvent::Failed { .. } => {}
            }
        }
        events
    }

    pub fn remove_from<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(mut line) = self.line.take() {
            line.remove_from(surface);
        }
    }

    fn request_route(&mut self) -> RequestId {
        self.reroute.cancel();
        self.router.route(&self.waypoints)
    }
}

impl<T> std::fmt::Debug for RouteController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteController")
            .field("router", &self.router)
            .field("waypoints", &self.waypoints)
            .field("routes", &self.routes.len())
            .field("selected", &self.selected)
            .field("reroute", &self.reroute)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_fires_once_after_delay() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(1000));
        debounce.schedule(start);

        assert!(!debounce.fire(start + Duration::from_millis(999)));
        assert!(debounce.fire(start + Duration::from_millis(1000)));
        assert!(!debounce.fire(start + Duration::from_millis(5000)));
    }

    #[test]
    fn test_debounce_restarts_on_schedule() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(1000));
        debounce.schedule(start);
        debounce.schedule(start + Duration::from_millis(800));

        assert!(!debounce.fire(start + Duration::from_millis(1200)));
        assert!(debounce.fire(start + Duration::from_millis(1800)));
    }

    #[test]
    fn test_debounce_cancel() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(10));
        debounce.schedule(start);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.fire(start + Duration::from_secs(1)));
    }

    #[test]
    fn test_options_default() {
        let options = ControllerOptions::default();
        assert_eq!(options.reroute_delay_ms, 1000);
        assert!(options.fit_bounds);
        assert!(options.line.add_waypoints);
        assert_eq!(options.line.styles.len(), 3);
    }
}
