//! Encoded polyline codec for route geometries.
//!
//! The routing service ships geometries as delta-coded strings: every
//! coordinate is a zig-zag encoded signed delta from the previous point,
//! split into 5-bit groups with `0x20` as the continuation bit and offset
//! by 63 into printable ASCII. Decoding happens once, at the boundary,
//! and the rest of the crate works with [`GeoPoint`]s.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Precision used by the routing service unless configured otherwise.
pub const DEFAULT_PRECISION: u32 = 6;

const CHAR_OFFSET: u8 = 63;
const MAX_CHAR: u8 = 126;
const CONTINUATION: i64 = 0x20;
const CHUNK_MASK: i64 = 0x1f;
/// Largest shift that still leaves room for a 5-bit chunk in an `i64`.
const MAX_SHIFT: u32 = 55;

/// Decodes an encoded polyline into points.
///
/// `precision` is the number of decimal digits preserved by the encoding.
/// Malformed or truncated input never fails: decoding stops at the first
/// bad value and the points completed so far are returned.
pub fn decode(encoded: &str, precision: u32) -> Vec<GeoPoint> {
    let scale = 10f64.powi(-(precision as i32));
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        let Some(dlat) = next_delta(bytes, &mut index) else {
            tracing::warn!(offset = index, "malformed polyline, truncating geometry");
            break;
        };
        let Some(dlng) = next_delta(bytes, &mut index) else {
            tracing::warn!(offset = index, "malformed polyline, truncating geometry");
            break;
        };
        lat = lat.wrapping_add(dlat);
        lng = lng.wrapping_add(dlng);
        points.push(GeoPoint::new(lat as f64 * scale, lng as f64 * scale));
    }

    points
}

/// Encodes points with the same alphabet, offset and zig-zag scheme as [`decode`].
pub fn encode(points: &[GeoPoint], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut out = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for point in points {
        let lat = (point.lat * factor).round() as i64;
        let lng = (point.lng * factor).round() as i64;
        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = *bytes.get(*index)?;
        *index += 1;
        if !(CHAR_OFFSET..=MAX_CHAR).contains(&byte) || shift > MAX_SHIFT {
            return None;
        }
        let chunk = i64::from(byte - CHAR_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        if chunk < CONTINUATION {
            break;
        }
    }

    Some(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = ((delta << 1) ^ (delta >> 63)) as u64;
    while value >= CONTINUATION as u64 {
        let chunk = (CONTINUATION as u64 | (value & CHUNK_MASK as u64)) as u8;
        out.push(char::from(chunk + CHAR_OFFSET));
        value >>= 5;
    }
    out.push(char::from(value as u8 + CHAR_OFFSET));
}

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<GeoPoint>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn decode(encoded: &str, precision: u32) -> Self {
        Self::new(decode(encoded, precision))
    }

    pub fn encode(&self, precision: u32) -> String {
        encode(&self.points, precision)
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<GeoPoint> {
        self.points
    }
}
