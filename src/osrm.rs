//! OSRM `viaroute` client.
//!
//! Requests are fire-and-forget: `route` dispatches through the
//! [`Transport`] and returns immediately with a [`RequestId`]. Completed
//! responses are picked up by `poll`, decoded into [`Route`]s and
//! announced as [`RouterEvent`]s. Nothing cancels an in-flight request
//! when a newer one is issued.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RoutingError;
use crate::events::{Emitter, ListenerId};
use crate::geo::GeoPoint;
use crate::hints::{HintCache, location_key};
use crate::polyline::{self, DEFAULT_PRECISION};
use crate::route::{Maneuver, Route, RouteSummary};
use crate::traits::Transport;
use crate::transport::{Completion, Reply, RequestId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub service_url: String,
    /// Decimal digits preserved by the encoded geometries.
    pub geometry_precision: u32,
    pub timeout_secs: u64,
    /// Drop a response if a later-issued one has already been applied.
    pub discard_stale_responses: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            service_url: "http://router.project-osrm.org/viaroute".to_string(),
            geometry_precision: DEFAULT_PRECISION,
            timeout_secs: 10,
            discard_stale_responses: false,
        }
    }
}

#[derive(Debug)]
pub enum RouterEvent {
    /// Primary route first, then the alternatives.
    RouteFound { request: RequestId, routes: Vec<Route> },
    /// The service answered with a non-zero status.
    Error {
        request: RequestId,
        status: i64,
        message: String,
    },
    /// No usable answer: transport failure or an unparseable payload.
    Failed {
        request: RequestId,
        error: RoutingError,
    },
}

impl RouterEvent {
    pub fn request(&self) -> RequestId {
        match self {
            Self::RouteFound { request, .. }
            | Self::Error { request, .. }
            | Self::Failed { request, .. } => *request,
        }
    }
}

pub struct RoutingClient<T> {
    config: RouterConfig,
    transport: T,
    hints: HintCache,
    pending: HashMap<RequestId, Vec<GeoPoint>>,
    next_request: u64,
    last_applied: Option<RequestId>,
    completions: Receiver<Completion>,
    completion_sender: Sender<Completion>,
    events: Emitter<RouterEvent>,
}

impl<T: Transport> RoutingClient<T> {
    pub fn new(config: RouterConfig, transport: T) -> Self {
        let (completion_sender, completions) = mpsc::channel();
        Self {
            config,
            transport,
            hints: HintCache::new(),
            pending: HashMap::new(),
            next_request: 0,
            last_applied: None,
            completions,
            completion_sender,
            events: Emitter::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn hints(&self) -> &HintCache {
        &self.hints
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Most recently issued request, if any.
    pub fn latest_request(&self) -> Option<RequestId> {
        self.next_request.checked_sub(1).map(RequestId)
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&RouterEvent) + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Dispatches a route request for `waypoints` and returns without waiting.
    pub fn route(&mut self, waypoints: &[GeoPoint]) -> RequestId {
        let request = RequestId(self.next_request);
        self.next_request += 1;

        let url = self.request_url(waypoints);
        tracing::debug!(request = request.0, waypoints = waypoints.len(), "dispatching route request");

        self.pending.insert(request, waypoints.to_vec());
        let reply = Reply::new(request, self.completion_sender.clone());
        self.transport.send(url, reply);
        request
    }

    /// `instructions=true`, then `loc` per waypoint, each followed by its
    /// cached `hint` when there is one, then the cached `checksum`.
    pub fn request_url(&self, waypoints: &[GeoPoint]) -> String {
        let mut params = vec!["instructions=true".to_string()];
        for waypoint in waypoints {
            params.push(format!("loc={}", location_key(*waypoint)));
            if let Some(hint) = self.hints.lookup(*waypoint) {
                params.push(format!("hint={}", hint));
            }
        }
        if let Some(checksum) = self.hints.checksum() {
            params.push(format!("checksum={}", checksum));
        }

        format!("{}?{}", self.config.service_url, params.join("&"))
    }

    /// Processes every completion that has arrived so far, in arrival order.
    pub fn poll(&mut self) -> Vec<RouterEvent> {
        let mut events = Vec::new();
        loop {
            match self.completions.try_recv() {
                Ok((request, result)) => {
                    if let Some(event) = self.complete(request, result) {
                        events.push(event);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Applies a response payload for `request` directly.
    ///
    /// Returns `None` when the request is unknown or the response is stale
    /// and stale responses are being discarded.
    pub fn handle_response(&mut self, request: RequestId, payload: Value) -> Option<RouterEvent> {
        self.complete(request, Ok(payload))
    }

    fn complete(
        &mut self,
        request: RequestId,
        result: Result<Value, RoutingError>,
    ) -> Option<RouterEvent> {
        let Some(waypoints) = self.pending.remove(&request) else {
            tracing::warn!(request = request.0, "response for unknown request");
            return None;
        };

        if self.config.discard_stale_responses
            && self.last_applied.is_some_and(|applied| applied > request)
        {
            tracing::debug!(request = request.0, "discarding stale route response");
            return None;
        }

        let event = match result.and_then(|payload| self.apply(&waypoints, payload)) {
            Ok(routes) => {
                self.last_applied = Some(request);
                RouterEvent::RouteFound { request, routes }
            }
            Err(RoutingError::Service { status, message }) => {
                tracing::debug!(request = request.0, status, "routing service error");
                RouterEvent::Error {
                    request,
                    status,
                    message,
                }
            }
            Err(error) => {
                tracing::warn!(request = request.0, error = %error, "route request failed");
                RouterEvent::Failed { request, error }
            }
        };

        self.events.emit(&event);
        Some(event)
    }

    fn apply(&mut self, waypoints: &[GeoPoint], payload: Value) -> Result<Vec<Route>, RoutingError> {
        let response: ViaRouteResponse = serde_json::from_value(payload)?;
        if response.status != 0 {
            return Err(RoutingError::Service {
                status: response.status,
                message: response.message.unwrap_or_default(),
            });
        }

        let routes = response.routes(waypoints, self.config.geometry_precision)?;
        self.save_hints(response.hint_data, waypoints);
        Ok(routes)
    }

    fn save_hints(&mut self, hint_data: Option<HintData>, waypoints: &[GeoPoint]) {
        let Some(hint_data) = hint_data else {
            self.hints.clear();
            return;
        };

        // Walk backwards so that for repeated coordinates the earliest
        // waypoint's hint is the one kept.
        let hints = hint_data
            .locations
            .into_iter()
            .enumerate()
            .rev()
            .filter_map(|(i, hint)| waypoints.get(i).map(|wp| (*wp, hint)));
        self.hints.record(hint_data.checksum, hints);
    }
}

impl<T> std::fmt::Debug for RoutingClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingClient")
            .field("config", &self.config)
            .field("hints", &self.hints)
            .field("pending", &self.pending.len())
            .field("next_request", &self.next_request)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ViaRouteResponse {
    status: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    route_name: Vec<String>,
    #[serde(default)]
    route_geometry: Option<String>,
    #[serde(default)]
    route_instructions: Vec<Value>,
    #[serde(default)]
    route_summary: RouteSummary,
    #[serde(default)]
    via_points: Vec<(f64, f64)>,
    #[serde(default)]
    alternative_geometries: Vec<String>,
    #[serde(default)]
    alternative_names: Vec<Vec<String>>,
    #[serde(default)]
    alternative_instructions: Vec<Vec<Value>>,
    #[serde(default)]
    alternative_summaries: Vec<RouteSummary>,
    #[serde(default)]
    hint_data: Option<HintData>,
}

#[derive(Debug, Deserialize)]
struct HintData {
    #[serde(default)]
    checksum: Option<i64>,
    #[serde(default)]
    locations: Vec<String>,
}

impl ViaRouteResponse {
    fn routes(&self, waypoints: &[GeoPoint], precision: u32) -> Result<Vec<Route>, RoutingError> {
        let geometry = self
            .route_geometry
            .as_deref()
            .ok_or_else(|| RoutingError::MalformedResponse("missing route_geometry".to_string()))?;
        let via_points: Vec<GeoPoint> = self.via_points.iter().copied().map(GeoPoint::from).collect();

        let assemble = |name: Vec<String>, encoded: &str, instructions: &[Value], summary: RouteSummary| Route {
            name,
            geometry: polyline::decode(encoded, precision),
            instructions: instructions.iter().map(Maneuver::from_record).collect(),
            summary,
            waypoints: waypoints.to_vec(),
            via_points: via_points.clone(),
        };

        let mut routes = vec![assemble(
            self.route_name.clone(),
            geometry,
            &self.route_instructions,
            self.route_summary,
        )];

        for (i, encoded) in self.alternative_geometries.iter().enumerate() {
            routes.push(assemble(
                self.alternative_names.get(i).cloned().unwrap_or_default(),
                encoded,
                self.alternative_instructions.get(i).map(Vec::as_slice).unwrap_or_default(),
                self.alternative_summaries.get(i).copied().unwrap_or_default(),
            ));
        }

        Ok(routes)
    }
}
