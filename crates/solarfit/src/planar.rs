//! Planar ring primitives (meters, local frame).
//!
//! Conventions
//! - A ring is an implicitly closed `&[Vector2<f64>]`; the last vertex connects
//!   back to the first. Rings are never repeated-closed (`first != last`).
//! - Positive signed area means counterclockwise winding.
//! - Self-intersecting rings are not detected; every function here is still
//!   defined on them but the result carries no geometric meaning.

use nalgebra::Vector2;

/// Shoelace sum `0.5 * Σ (x_i y_{i+1} − x_{i+1} y_i)`. Zero for fewer than 3 points.
pub fn signed_area(ring: &[Vector2<f64>]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        acc += p.x * q.y - q.x * p.y;
    }
    0.5 * acc
}

#[inline]
pub fn area(ring: &[Vector2<f64>]) -> f64 {
    signed_area(ring).abs()
}

/// Area centroid; falls back to the vertex mean for zero-area rings.
pub fn centroid(ring: &[Vector2<f64>]) -> Option<Vector2<f64>> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len();
    let mut a = 0.0;
    let mut c = Vector2::zeros();
    for i in 0..n {
        let p = ring[i];
        let q = ring[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        a += cross;
        c += (p + q) * cross;
    }
    a *= 0.5;
    if a.abs() < 1e-18 {
        let sum: Vector2<f64> = ring.iter().sum();
        return Some(sum / n as f64);
    }
    Some(c / (6.0 * a))
}

/// Axis-aligned bounds `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>,
}

impl Bounds2 {
    pub fn of(points: &[Vector2<f64>]) -> Option<Self> {
        let first = *points.first()?;
        let mut b = Self {
            min: first,
            max: first,
        };
        for p in &points[1..] {
            b.min = b.min.inf(p);
            b.max = b.max.sup(p);
        }
        Some(b)
    }

    #[inline]
    pub fn extent(&self) -> Vector2<f64> {
        self.max - self.min
    }
}

/// Drop consecutive duplicates (within `tol`), including a repeated closing vertex.
pub fn dedup_ring(ring: &[Vector2<f64>], tol: f64) -> Vec<Vector2<f64>> {
    let mut out: Vec<Vector2<f64>> = Vec::with_capacity(ring.len());
    for p in ring {
        if out.last().is_some_and(|q| (p - q).norm() <= tol) {
            continue;
        }
        out.push(*p);
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= tol {
        out.pop();
    }
    out
}

/// Distance from `p` to the closed segment `[a, b]`.
pub fn dist_to_segment(p: Vector2<f64>, a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 <= 0.0 {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Whether `p` lies within `eps` of any ring edge.
pub fn on_boundary(p: Vector2<f64>, ring: &[Vector2<f64>], eps: f64) -> bool {
    let n = ring.len();
    (0..n).any(|i| dist_to_segment(p, ring[i], ring[(i + 1) % n]) <= eps)
}

/// Even-odd (crossing number) containment.
///
/// Boundary policy: points within `eps` of an edge are outside. Footprint
/// clipping and label side selection both rely on this rule.
pub fn contains_eps(p: Vector2<f64>, ring: &[Vector2<f64>], eps: f64) -> bool {
    let n = ring.len();
    if n < 3 || on_boundary(p, ring, eps) {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// `contains_eps` with the default boundary tolerance.
#[inline]
pub fn contains(p: Vector2<f64>, ring: &[Vector2<f64>]) -> bool {
    contains_eps(p, ring, crate::cfg::EPS)
}
