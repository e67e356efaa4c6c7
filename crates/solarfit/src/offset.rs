//! Inward polygon offset (setback).
//!
//! Model
//! - Every edge is shifted by `distance` along its inward normal (the side of the
//!   interior, chosen from the ring's winding). Consecutive shifted edges are
//!   intersected as infinite lines (miter join) to produce the new vertices.
//! - Edges whose shifted segment runs against their original direction have
//!   been consumed by the setback. Edge lengths are linear in the offset, so
//!   the edge that reached zero length first is dropped and the joins are
//!   recomputed, until no edge is inverted (edge events of a straight skeleton,
//!   exact for convex rings; split events of concave rings are not modelled).
//!   Adjacent shifted edges that end up antiparallel close a strip narrower
//!   than twice the setback (a wing of an L or U). Only the edge that walls the
//!   strip alone is dropped; the other one still bounds the body of the ring
//!   and is rejoined to the edge beyond the strip.
//! - Clamp rule: at a reflex vertex whose miter point lies farther than
//!   `miter_limit × distance` from the vertex, the miter is replaced by a square
//!   cap: each shifted edge is extended by `distance` past its shifted endpoint
//!   and the two extension ends are joined.
//! - Collapse: fewer than 3 surviving edges, zero area, a winding flip, or an
//!   area no smaller than the input yield an empty ring.
//!
//! Winding and vertex order of the input are preserved; vertex `i` of the result
//! is the join at input vertex `i` as long as no edge was dropped.

use nalgebra::Vector2;
use tracing::{debug, trace};

use crate::cfg::LayoutCfg;
use crate::planar::{dedup_ring, signed_area};
use crate::project::{GeoPoint, LocalFrame, METERS_PER_FOOT};

const PARALLEL_EPS: f64 = 1e-12;

/// Shifted edge line: `base + normal * t + s * dir`, with `dir` unit length.
#[derive(Clone, Copy, Debug)]
struct OffsetEdge {
    base: Vector2<f64>,
    dir: Vector2<f64>,
    normal: Vector2<f64>,
    /// Index of the source vertex (edge start) in the cleaned ring.
    src: usize,
}

impl OffsetEdge {
    #[inline]
    fn origin(&self, t: f64) -> Vector2<f64> {
        self.base + self.normal * t
    }
}

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Intersection of two shifted edge lines at offset `t`.
///
/// Collinear continuations join at the projection of the next origin; `None`
/// for antiparallel lines.
fn miter(prev: &OffsetEdge, next: &OffsetEdge, t: f64) -> Option<Vector2<f64>> {
    let den = cross(prev.dir, next.dir);
    let (po, no) = (prev.origin(t), next.origin(t));
    if den.abs() < PARALLEL_EPS {
        if prev.dir.dot(&next.dir) < 0.0 {
            return None;
        }
        return Some(po + prev.dir * (no - po).dot(&prev.dir));
    }
    let s = cross(no - po, next.dir) / den;
    Some(po + prev.dir * s)
}

/// Inset a planar ring (meters) by `distance` meters.
///
/// Negative or non-finite distances are clamped to zero; zero returns the input unchanged.
pub fn inset_planar(ring: &[Vector2<f64>], distance: f64, cfg: &LayoutCfg) -> Vec<Vector2<f64>> {
    let d = if distance.is_finite() {
        distance.max(0.0)
    } else {
        0.0
    };
    if d == 0.0 {
        return ring.to_vec();
    }
    let pts = drop_collinear(&dedup_ring(ring, cfg.eps), cfg.eps);
    if pts.len() < 3 {
        debug!(vertices = pts.len(), "inset: degenerate ring");
        return Vec::new();
    }
    let a0 = signed_area(&pts);
    if a0.abs() <= cfg.eps {
        debug!("inset: zero-area ring");
        return Vec::new();
    }
    let sign = a0.signum();
    let n = pts.len();
    let mut edges: Vec<OffsetEdge> = (0..n)
        .filter_map(|i| {
            let p = pts[i];
            let q = pts[(i + 1) % n];
            let dir = (q - p).try_normalize(0.0)?;
            let left = Vector2::new(-dir.y, dir.x);
            Some(OffsetEdge {
                base: p,
                dir,
                normal: left * sign,
                src: i,
            })
        })
        .collect();

    loop {
        let m = edges.len();
        if m < 3 {
            debug!(setback = d, "inset: setback consumed the ring");
            return Vec::new();
        }

        // Antiparallel neighbours: the strip between them has closed.
        if let Some(k) = (0..m).find(|&k| miter(&edges[(k + m - 1) % m], &edges[k], d).is_none()) {
            let gone = closed_strip_edge(&edges, k, d);
            trace!(edge = edges[gone].src, "inset: strip closed");
            edges.remove(gone);
            continue;
        }

        // Earliest edge event: the edge whose length reaches zero first on the way to `d`.
        let mut first: Option<(usize, f64)> = None;
        for k in 0..m {
            let prev = &edges[(k + m - 1) % m];
            let cur = &edges[k];
            let next = &edges[(k + 1) % m];
            let (Some(s0), Some(e0), Some(sd), Some(ed)) = (
                miter(prev, cur, 0.0),
                miter(cur, next, 0.0),
                miter(prev, cur, d),
                miter(cur, next, d),
            ) else {
                continue;
            };
            let len0 = (e0 - s0).dot(&cur.dir);
            let len_d = (ed - sd).dot(&cur.dir);
            if len_d < -cfg.eps {
                let t = if len0 <= 0.0 { 0.0 } else { d * len0 / (len0 - len_d) };
                if first.map_or(true, |(_, best)| t < best) {
                    first = Some((k, t));
                }
            }
        }
        if let Some((k, t)) = first {
            trace!(edge = edges[k].src, at = t, "inset: edge consumed");
            edges.remove(k);
            continue;
        }

        let mut out = Vec::with_capacity(m + 2);
        for k in 0..m {
            push_join(&mut out, &edges[(k + m - 1) % m], &edges[k], &pts, sign, d, cfg);
        }
        let out = dedup_ring(&out, cfg.eps);
        let a1 = signed_area(&out);
        if out.len() < 3 || a1.abs() <= cfg.eps || a1.signum() != sign || a1.abs() >= a0.abs() {
            debug!(setback = d, area = a1, "inset: collapsed");
            return Vec::new();
        }
        return out;
    }
}

/// Which of the antiparallel pair `(k - 1, k)` the closed strip consumes.
///
/// The strip tip is where the pair used to meet; the edge whose far join lies
/// closer to the tip is the strip wall and goes. The other edge keeps bounding
/// the rest of the ring and is rejoined past the strip.
fn closed_strip_edge(edges: &[OffsetEdge], k: usize, d: f64) -> usize {
    let m = edges.len();
    let prev = (k + m - 1) % m;
    let (before, after) = (&edges[(prev + m - 1) % m], &edges[(k + 1) % m]);
    // `dir` of the later edge points away from the tip.
    let axis = edges[k].dir;
    let reach = |p: Option<Vector2<f64>>| p.map_or(f64::NEG_INFINITY, |p| p.dot(&axis));
    let prev_reach = reach(miter(before, &edges[prev], d));
    let next_reach = reach(miter(&edges[k], after, d));
    if next_reach >= prev_reach {
        prev
    } else {
        k
    }
}

/// Push the join vertex (or the two square-cap vertices) between `prev` and `next`.
fn push_join(
    out: &mut Vec<Vector2<f64>>,
    prev: &OffsetEdge,
    next: &OffsetEdge,
    pts: &[Vector2<f64>],
    sign: f64,
    d: f64,
    cfg: &LayoutCfg,
) {
    let Some(point) = miter(prev, next, d) else {
        return;
    };
    // Clamp only true input vertices (neighbours in the cleaned ring) that turn reflex.
    let n = pts.len();
    let adjacent = (prev.src + 1) % n == next.src;
    let reflex = sign * cross(prev.dir, next.dir) < 0.0;
    if adjacent && reflex {
        let corner = pts[next.src];
        if (point - corner).norm() > cfg.miter_limit.max(1.0) * d {
            out.push(corner + prev.normal * d + prev.dir * d);
            out.push(corner + next.normal * d - next.dir * d);
            return;
        }
    }
    out.push(point);
}

/// Remove vertices whose neighbours continue in the same direction.
fn drop_collinear(ring: &[Vector2<f64>], eps: f64) -> Vec<Vector2<f64>> {
    let mut pts = ring.to_vec();
    loop {
        let n = pts.len();
        if n < 3 {
            return pts;
        }
        let hit = (0..n).find(|&i| {
            let a = pts[(i + n - 1) % n];
            let b = pts[i];
            let c = pts[(i + 1) % n];
            let u = b - a;
            let v = c - b;
            cross(u, v).abs() <= eps * u.norm() * v.norm() && u.dot(&v) > 0.0
        });
        match hit {
            Some(i) => {
                pts.remove(i);
            }
            None => return pts,
        }
    }
}

/// Inset a geographic boundary by `distance_ft` feet.
///
/// Returns the input unchanged for a zero setback and an empty ring when the
/// setback consumes the boundary.
pub fn inset(boundary: &[GeoPoint], distance_ft: f64) -> Vec<GeoPoint> {
    inset_with_cfg(boundary, distance_ft, &LayoutCfg::default())
}

pub fn inset_with_cfg(boundary: &[GeoPoint], distance_ft: f64, cfg: &LayoutCfg) -> Vec<GeoPoint> {
    if !(distance_ft > 0.0) {
        return boundary.to_vec();
    }
    let Some(frame) = LocalFrame::centered_on(boundary) else {
        return Vec::new();
    };
    let ring = frame.ring_to_planar(boundary);
    frame.ring_to_geo(&inset_planar(&ring, distance_ft * METERS_PER_FOOT, cfg))
}
