//! Area, distance and midpoint queries over geographic input.
//!
//! Each call builds its own `LocalFrame`; results are in feet / square feet.

use crate::planar;
use crate::project::{GeoPoint, LocalFrame, FEET_PER_METER, SQ_FT_PER_SQ_M};

/// Unsigned boundary area in square feet. Degenerate input (<3 points) → 0.
///
/// Self-intersecting boundaries are accepted; the shoelace value is returned as-is.
pub fn area_sq_ft(boundary: &[GeoPoint]) -> f64 {
    if boundary.len() < 3 {
        return 0.0;
    }
    let Some(frame) = LocalFrame::centered_on(boundary) else {
        return 0.0;
    };
    planar::area(&frame.ring_to_planar(boundary)) * SQ_FT_PER_SQ_M
}

/// Planar distance in feet, measured in a frame anchored at the chord midpoint.
pub fn distance_ft(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let frame = LocalFrame::new(midpoint(p1, p2));
    (frame.to_planar(p2) - frame.to_planar(p1)).norm() * FEET_PER_METER
}

/// Arithmetic mean of the endpoints in degrees (chord midpoint, not geodesic).
#[inline]
pub fn midpoint(p1: GeoPoint, p2: GeoPoint) -> GeoPoint {
    GeoPoint::new((p1.lat + p2.lat) * 0.5, (p1.lng + p2.lng) * 0.5)
}
