//! Projection adapter: geographic degrees ↔ local planar meters.
//!
//! Model
//! - Equirectangular tangent approximation around a fixed anchor. North is `+y`,
//!   east is `+x`; longitude deltas are scaled by `cos(anchor.lat)`.
//! - The frame is a value: it depends only on its anchor, never on a viewport.
//!   One layout pass builds exactly one frame and routes every conversion
//!   through it.
//! - Intended for site-scale polygons (sub-kilometer). Errors grow with distance
//!   from the anchor; this is not a geodesic.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// WGS84 equatorial radius (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
pub const FEET_PER_METER: f64 = 1.0 / 0.3048;
pub const METERS_PER_FOOT: f64 = 0.3048;
pub const SQ_FT_PER_SQ_M: f64 = FEET_PER_METER * FEET_PER_METER;

/// Smallest longitude scale we accept; keeps the frame invertible at the poles.
const MIN_COS_LAT: f64 = 1e-9;

/// Geographic point in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Local planar frame anchored at a geographic point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalFrame {
    anchor: GeoPoint,
    m_per_deg_lat: f64,
    m_per_deg_lng: f64,
}

impl LocalFrame {
    pub fn new(anchor: GeoPoint) -> Self {
        let m_per_deg = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;
        let cos_lat = anchor.lat.clamp(-90.0, 90.0).to_radians().cos().max(MIN_COS_LAT);
        Self {
            anchor,
            m_per_deg_lat: m_per_deg,
            m_per_deg_lng: m_per_deg * cos_lat,
        }
    }

    /// Frame anchored at the vertex mean of `points`. `None` if `points` is empty.
    pub fn centered_on(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (lat, lng) = points
            .iter()
            .fold((0.0, 0.0), |(a, b), p| (a + p.lat, b + p.lng));
        Some(Self::new(GeoPoint::new(lat / n, lng / n)))
    }

    #[inline]
    pub fn anchor(&self) -> GeoPoint {
        self.anchor
    }

    /// Geographic → planar meters relative to the anchor.
    #[inline]
    pub fn to_planar(&self, p: GeoPoint) -> Vector2<f64> {
        let dlng = wrap_lng(p.lng - self.anchor.lng);
        Vector2::new(
            dlng * self.m_per_deg_lng,
            (p.lat - self.anchor.lat) * self.m_per_deg_lat,
        )
    }

    /// Planar meters → geographic. Inverse of `to_planar`.
    #[inline]
    pub fn to_geo(&self, v: Vector2<f64>) -> GeoPoint {
        GeoPoint::new(
            self.anchor.lat + v.y / self.m_per_deg_lat,
            wrap_lng(self.anchor.lng + v.x / self.m_per_deg_lng),
        )
    }

    pub fn ring_to_planar(&self, ring: &[GeoPoint]) -> Vec<Vector2<f64>> {
        ring.iter().map(|p| self.to_planar(*p)).collect()
    }

    pub fn ring_to_geo(&self, ring: &[Vector2<f64>]) -> Vec<GeoPoint> {
        ring.iter().map(|v| self.to_geo(*v)).collect()
    }
}

/// Reduce a longitude (or longitude delta) into [-180, 180).
#[inline]
pub(crate) fn wrap_lng(x: f64) -> f64 {
    if (-180.0..180.0).contains(&x) {
        x
    } else {
        (x + 180.0).rem_euclid(360.0) - 180.0
    }
}
