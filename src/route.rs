//! Decoded routes and their maneuver records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geo::{GeoBounds, GeoPoint};

/// Totals for a whole route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Meters.
    pub total_distance: f64,
    /// Seconds.
    pub total_time: f64,
}

/// One routing alternative for an ordered waypoint list.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub name: Vec<String>,
    pub geometry: Vec<GeoPoint>,
    pub instructions: Vec<Maneuver>,
    pub summary: RouteSummary,
    /// The waypoints this route was requested for.
    pub waypoints: Vec<GeoPoint>,
    /// Waypoints as snapped onto the road network by the service.
    pub via_points: Vec<GeoPoint>,
}

impl Route {
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.geometry.iter().copied())
    }

    /// Fewer than two geometry points.
    pub fn is_degenerate(&self) -> bool {
        self.geometry.len() < 2
    }
}

/// Maneuver type carried in the first field of an instruction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnKind {
    NoTurn,
    GoStraight,
    SlightRight,
    Right,
    SharpRight,
    UTurn,
    SharpLeft,
    Left,
    SlightLeft,
    ReachViaPoint,
    HeadOn,
    EnterRoundabout,
    LeaveRoundabout,
    StayOnRoundabout,
    StartAtEndOfStreet,
    ReachedDestination,
    EnterAgainstAllowedDirection,
    LeaveAgainstAllowedDirection,
    Unknown(u32),
}

impl TurnKind {
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::NoTurn,
            1 => Self::GoStraight,
            2 => Self::SlightRight,
            3 => Self::Right,
            4 => Self::SharpRight,
            5 => Self::UTurn,
            6 => Self::SharpLeft,
            7 => Self::Left,
            8 => Self::SlightLeft,
            9 => Self::ReachViaPoint,
            10 => Self::HeadOn,
            11 => Self::EnterRoundabout,
            12 => Self::LeaveRoundabout,
            13 => Self::StayOnRoundabout,
            14 => Self::StartAtEndOfStreet,
            15 => Self::ReachedDestination,
            16 => Self::EnterAgainstAllowedDirection,
            17 => Self::LeaveAgainstAllowedDirection,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "N" => Self::N,
            "NE" => Self::NE,
            "E" => Self::E,
            "SE" => Self::SE,
            "S" => Self::S,
            "SW" => Self::SW,
            "W" => Self::W,
            "NW" => Self::NW,
            _ => return None,
        })
    }
}

/// A single turn-by-turn record:
/// `[turn-exit, road name, meters, geometry index, seconds, length text, compass, azimuth, ...]`.
///
/// Records are parsed leniently; missing or mistyped fields fall back to
/// defaults so a single odd record never sinks a whole route.
#[derive(Debug, Clone, PartialEq)]
pub struct Maneuver {
    pub turn: TurnKind,
    /// Roundabout exit ordinal, when the turn code carries one.
    pub exit: Option<u32>,
    pub road_name: String,
    pub distance: f64,
    /// Index into the route geometry where the maneuver starts.
    pub position: usize,
    pub time: f64,
    pub length_text: String,
    pub direction: Option<CompassDirection>,
    pub azimuth: f64,
}

impl Maneuver {
    pub fn from_record(record: &Value) -> Self {
        let field = |i: usize| record.get(i);
        let (turn, exit) = field(0).map(parse_turn).unwrap_or((TurnKind::NoTurn, None));

        Self {
            turn,
            exit,
            road_name: field(1).and_then(Value::as_str).unwrap_or_default().to_string(),
            distance: field(2).and_then(Value::as_f64).unwrap_or(0.0),
            position: field(3).and_then(Value::as_u64).unwrap_or(0) as usize,
            time: field(4).and_then(Value::as_f64).unwrap_or(0.0),
            length_text: field(5).and_then(Value::as_str).unwrap_or_default().to_string(),
            direction: field(6).and_then(Value::as_str).and_then(CompassDirection::from_code),
            azimuth: field(7).and_then(Value::as_f64).unwrap_or(0.0),
        }
    }
}

fn parse_turn(value: &Value) -> (TurnKind, Option<u32>) {
    match value {
        Value::Number(n) => (
            TurnKind::from_code(n.as_u64().unwrap_or(0) as u32),
            None,
        ),
        Value::String(s) => {
            let mut parts = s.splitn(2, '-');
            let code = parts
                .next()
                .and_then(|c| c.trim().parse::<u32>().ok())
                .unwrap_or(0);
            let exit = parts.next().and_then(|e| e.trim().parse::<u32>().ok());
            (TurnKind::from_code(code), exit)
        }
        _ => (TurnKind::NoTurn, None),
    }
}
