//! Edge-length labels for drawn boundaries.
//!
//! Each edge gets its length in feet and an anchor just outside the polygon,
//! next to the edge midpoint. The outside side is found with the containment
//! test, so labels never sit on top of the shape's interior.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::cfg::LayoutCfg;
use crate::measure::{distance_ft, midpoint};
use crate::planar::contains_eps;
use crate::project::{GeoPoint, LocalFrame};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeLabel {
    /// Index of the edge start vertex; the last edge closes back to vertex 0.
    pub edge_index: usize,
    pub length_ft: f64,
    pub text: String,
    pub anchor: GeoPoint,
}

/// One label per non-degenerate edge, closing edge included.
pub fn edge_labels(boundary: &[GeoPoint], cfg: &LayoutCfg) -> Vec<EdgeLabel> {
    let n = boundary.len();
    if n < 2 {
        return Vec::new();
    }
    let Some(frame) = LocalFrame::centered_on(boundary) else {
        return Vec::new();
    };
    let ring = frame.ring_to_planar(boundary);
    // A two-point "ring" has a single edge; don't label it twice.
    let edges = if n == 2 { 1 } else { n };
    let mut out = Vec::with_capacity(edges);
    for i in 0..edges {
        let (a, b) = (boundary[i], boundary[(i + 1) % n]);
        let (pa, pb) = (ring[i], ring[(i + 1) % n]);
        let Some(dir) = (pb - pa).try_normalize(cfg.eps) else {
            continue;
        };
        let length_ft = distance_ft(a, b);
        let mid = frame.to_planar(midpoint(a, b));
        let left = Vector2::new(-dir.y, dir.x) * cfg.label_offset_m;
        let (l, r) = (mid + left, mid - left);
        // Prefer whichever side tests outside; left when both do.
        let side = if contains_eps(l, &ring, cfg.eps) && !contains_eps(r, &ring, cfg.eps) {
            r
        } else {
            l
        };
        out.push(EdgeLabel {
            edge_index: i,
            length_ft,
            text: format!("{length_ft:.1} ft"),
            anchor: frame.to_geo(side),
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planar::contains;
    use crate::project::METERS_PER_FOOT;
    use nalgebra::vector;

    fn square(frame: &LocalFrame, side_ft: f64) -> Vec<GeoPoint> {
        let s = side_ft * METERS_PER_FOOT;
        frame.ring_to_geo(&[
            vector![0.0, 0.0],
            vector![s, 0.0],
            vector![s, s],
            vector![0.0, s],
        ])
    }

    #[test]
    fn labels_sit_outside_for_both_windings() {
        let frame = LocalFrame::new(GeoPoint::new(45.0, 7.0));
        let ccw = square(&frame, 50.0);
        let mut cw = ccw.clone();
        cw.reverse();
        for ring in [ccw, cw] {
            let planar = frame.ring_to_planar(&ring);
            let labels = edge_labels(&ring, &LayoutCfg::default());
            assert_eq!(labels.len(), 4);
            for l in &labels {
                assert!(!contains(frame.to_planar(l.anchor), &planar));
                assert!((l.length_ft - 50.0).abs() < 0.01);
                assert_eq!(l.text, "50.0 ft");
            }
        }
    }

    #[test]
    fn concave_edge_label_avoids_interior() {
        let frame = LocalFrame::new(GeoPoint::new(0.0, 0.0));
        // U-shape: the notch floor (edge 4) has interior below it and the notch above.
        let ring = frame.ring_to_geo(&[
            vector![0.0, 0.0],
            vector![30.0, 0.0],
            vector![30.0, 30.0],
            vector![20.0, 30.0],
            vector![20.0, 10.0],
            vector![10.0, 10.0],
            vector![10.0, 30.0],
            vector![0.0, 30.0],
        ]);
        let planar = frame.ring_to_planar(&ring);
        let labels = edge_labels(&ring, &LayoutCfg::default());
        assert_eq!(labels.len(), 8);
        let floor = &labels[4];
        let p = frame.to_planar(floor.anchor);
        assert!(p.y > 10.0);
        assert!(!contains(p, &planar));
    }

    #[test]
    fn degenerate_inputs() {
        let cfg = LayoutCfg::default();
        assert!(edge_labels(&[], &cfg).is_empty());
        assert!(edge_labels(&[GeoPoint::new(1.0, 1.0)], &cfg).is_empty());
        let dup = [GeoPoint::new(1.0, 1.0), GeoPoint::new(1.0, 1.0)];
        assert!(edge_labels(&dup, &cfg).is_empty());
        let seg = [GeoPoint::new(1.0, 1.0), GeoPoint::new(1.0001, 1.0)];
        assert_eq!(edge_labels(&seg, &cfg).len(), 1);
    }
}
