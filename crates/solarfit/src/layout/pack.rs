//! Grid packing of module frames into the buildable region.
//!
//! Frames
//! - Planar meters throughout. The region is projected once, in a frame
//!   anchored at its centroid, then rotated into grid coordinates `(u, v)`:
//!   `v` runs along the azimuth (row pitch direction), `u` runs across rows,
//!   increasing to the right when facing the azimuth.
//! - The rotation has determinant +1, so containment, winding and areas carry
//!   over unchanged between planar and grid coordinates.
//!
//! Grid
//! - The region's grid-space bounding box is cut into `n_u × n_v` cells of
//!   `pitch_u × pitch_v`; each cell holds one frame, centered in the cell, so
//!   the spacing of a cell is split evenly around its frame. Leftover margin of
//!   the box is placed per `Alignment`.
//! - Grids above `LayoutCfg::max_frames` candidates keep only the leading rows
//!   and flag the result `truncated`.
//! - A frame survives only if every corner of every module in it is strictly
//!   inside the region and no region edge crosses a module edge. Surviving
//!   frames are emitted row by row (`v` ascending), left to right.

use nalgebra::Vector2;
use tracing::{debug, warn};

use super::types::{Alignment, LayoutResult, Module, Orientation, RackingType, Segment};
use crate::cfg::LayoutCfg;
use crate::offset::inset_planar;
use crate::planar::{self, contains_eps, dedup_ring, Bounds2};
use crate::project::{GeoPoint, LocalFrame, METERS_PER_FOOT, SQ_FT_PER_SQ_M};

/// Tilt ceiling; keeps `cos(tilt)` away from zero.
const MAX_TILT_DEG: f64 = 89.0;

/// Setback-offset boundary in a planar frame anchored at its own centroid.
#[derive(Clone, Debug)]
pub struct BuildableRegion {
    pub frame: LocalFrame,
    pub ring: Vec<Vector2<f64>>,
}

impl BuildableRegion {
    pub fn area_sq_ft(&self) -> f64 {
        planar::area(&self.ring) * SQ_FT_PER_SQ_M
    }

    pub fn to_geo(&self) -> Vec<GeoPoint> {
        self.frame.ring_to_geo(&self.ring)
    }
}

/// Finite and non-negative, else zero.
#[inline]
fn clamp_len(x: f64) -> f64 {
    if x.is_finite() {
        x.max(0.0)
    } else {
        0.0
    }
}

/// Reduce into [0, 360). Non-finite input falls back to due south.
pub fn resolve_azimuth(azimuth: f64) -> f64 {
    if !azimuth.is_finite() {
        return 180.0;
    }
    let a = azimuth.rem_euclid(360.0);
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Apply the setback and re-anchor at the region centroid. `None` when nothing is left.
pub fn buildable_region(segment: &Segment, cfg: &LayoutCfg) -> Option<BuildableRegion> {
    let boundary = &segment.boundary;
    if boundary.len() < 3 || boundary.iter().any(|p| !p.is_finite()) {
        debug!(vertices = boundary.len(), "buildable region: degenerate boundary");
        return None;
    }
    let outline = LocalFrame::centered_on(boundary)?;
    let ring = outline.ring_to_planar(boundary);
    let setback = clamp_len(segment.setback) * METERS_PER_FOOT;
    let inner = dedup_ring(&inset_planar(&ring, setback, cfg), cfg.eps);
    if inner.len() < 3 || planar::area(&inner) <= cfg.eps {
        debug!(setback_m = setback, "buildable region: empty");
        return None;
    }
    let center = planar::centroid(&inner)?;
    let frame = LocalFrame::new(outline.to_geo(center));
    let ring = inner
        .iter()
        .map(|p| frame.to_planar(outline.to_geo(*p)))
        .collect();
    Some(BuildableRegion { frame, ring })
}

/// Frame and cell dimensions in meters.
#[derive(Clone, Copy, Debug)]
struct GridSpec {
    /// Module footprint across the row / along the pitch direction (plan view).
    across: f64,
    depth: f64,
    spacing: f64,
    up: usize,
    wide: usize,
    frame_w: f64,
    frame_d: f64,
    pitch_u: f64,
    pitch_v: f64,
}

impl GridSpec {
    fn new(segment: &Segment, module: &Module, cfg: &LayoutCfg) -> Self {
        let (across_ft, depth_ft) = match segment.orientation {
            Orientation::Portrait => (module.width, module.length),
            Orientation::Landscape => (module.length, module.width),
        };
        let across = across_ft * METERS_PER_FOOT;
        let slope_depth = depth_ft * METERS_PER_FOOT;
        let tilt = match segment.racking_type {
            RackingType::Flat => 0.0,
            RackingType::FixedTilt | RackingType::FlushMount => {
                clamp_len(segment.module_tilt).min(MAX_TILT_DEG).to_radians()
            }
        };
        let spacing = clamp_len(segment.module_spacing) * METERS_PER_FOOT;
        let row_spacing = clamp_len(segment.row_spacing) * METERS_PER_FOOT;
        let frame_spacing = clamp_len(segment.frame_spacing) * METERS_PER_FOOT;
        let up = segment.frame_size_up.max(1) as usize;
        let wide = segment.frame_size_wide.max(1) as usize;

        let depth = slope_depth * tilt.cos();
        let frame_w = wide as f64 * across + (wide - 1) as f64 * spacing;
        let frame_d = up as f64 * depth + (up - 1) as f64 * spacing;
        // Rise of the frame's back edge over a sun at the design elevation.
        let clearance = match segment.racking_type {
            RackingType::FixedTilt => {
                let slope_len = up as f64 * slope_depth + (up - 1) as f64 * spacing;
                slope_len * tilt.sin() / cfg.sun_elevation_rad().tan()
            }
            RackingType::Flat | RackingType::FlushMount => 0.0,
        };
        let floor = cfg.pitch_floor();
        Self {
            across,
            depth,
            spacing,
            up,
            wide,
            frame_w,
            frame_d,
            pitch_u: (frame_w + spacing + frame_spacing).max(floor),
            pitch_v: (frame_d + clearance + row_spacing).max(floor),
        }
    }

    /// Module rectangles `(min, max)` of a frame whose min corner is `origin`.
    fn modules(&self, origin: Vector2<f64>) -> impl Iterator<Item = (Vector2<f64>, Vector2<f64>)> + '_ {
        (0..self.up).flat_map(move |r| {
            (0..self.wide).map(move |c| {
                let lo = origin
                    + Vector2::new(
                        c as f64 * (self.across + self.spacing),
                        r as f64 * (self.depth + self.spacing),
                    );
                (lo, lo + Vector2::new(self.across, self.depth))
            })
        })
    }
}

/// Number of cells that fit in `extent` and the leftover margin.
fn cells(extent: f64, pitch: f64, eps: f64) -> (usize, f64) {
    let n = ((extent + eps) / pitch).floor().max(0.0);
    let n = if n.is_finite() { n as usize } else { 0 };
    (n, (extent - n as f64 * pitch).max(0.0))
}

#[inline]
fn orient(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Proper crossing of segments `[a, b]` and `[c, d]` (endpoints strictly on opposite sides).
fn segments_cross(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>, d: Vector2<f64>) -> bool {
    let o1 = orient(a, b, c);
    let o2 = orient(a, b, d);
    let o3 = orient(c, d, a);
    let o4 = orient(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

fn rect_corners(lo: Vector2<f64>, hi: Vector2<f64>) -> [Vector2<f64>; 4] {
    [
        lo,
        Vector2::new(hi.x, lo.y),
        hi,
        Vector2::new(lo.x, hi.y),
    ]
}

fn rect_fits(lo: Vector2<f64>, hi: Vector2<f64>, region: &[Vector2<f64>], eps: f64) -> bool {
    let corners = rect_corners(lo, hi);
    if !corners.iter().all(|p| contains_eps(*p, region, eps)) {
        return false;
    }
    let n = region.len();
    (0..n).all(|i| {
        let (a, b) = (region[i], region[(i + 1) % n]);
        (0..4).all(|k| !segments_cross(a, b, corners[k], corners[(k + 1) % 4]))
    })
}

/// Pack with default configuration.
pub fn pack(segment: &Segment, module: &Module) -> LayoutResult {
    pack_with_cfg(segment, module, &LayoutCfg::default())
}

/// Pack module frames into the segment's buildable region.
///
/// Never fails: degenerate boundaries, collapsed setbacks and zero-size modules
/// all produce an empty result carrying the resolved azimuth.
pub fn pack_with_cfg(segment: &Segment, module: &Module, cfg: &LayoutCfg) -> LayoutResult {
    let azimuth = resolve_azimuth(segment.azimuth);
    if module.is_degenerate() {
        debug!(width = module.width, length = module.length, "pack: degenerate module");
        return LayoutResult::empty(azimuth);
    }
    let Some(region) = buildable_region(segment, cfg) else {
        return LayoutResult::empty(azimuth);
    };
    let grid = GridSpec::new(segment, module, cfg);

    let (s, c) = azimuth.to_radians().sin_cos();
    let col_axis = Vector2::new(c, -s);
    let row_axis = Vector2::new(s, c);
    let to_grid = |p: &Vector2<f64>| Vector2::new(p.dot(&col_axis), p.dot(&row_axis));
    let from_grid = |q: Vector2<f64>| col_axis * q.x + row_axis * q.y;

    let ring_uv: Vec<Vector2<f64>> = region.ring.iter().map(to_grid).collect();
    let Some(bounds) = Bounds2::of(&ring_uv) else {
        return LayoutResult::empty(azimuth);
    };
    let extent = bounds.extent();
    let (n_u, left_u) = cells(extent.x, grid.pitch_u, cfg.eps);
    let (mut n_v, left_v) = cells(extent.y, grid.pitch_v, cfg.eps);
    if n_u == 0 || n_v == 0 {
        debug!(n_u, n_v, "pack: region smaller than one frame");
        return LayoutResult::empty(azimuth);
    }
    let max_frames = cfg.max_frames.max(1);
    let truncated = n_u.saturating_mul(n_v) > max_frames;
    if truncated {
        let rows = (max_frames / n_u).max(1);
        warn!(
            n_u,
            n_v,
            rows,
            max_frames,
            "pack: candidate grid exceeds max_frames, trailing rows dropped"
        );
        n_v = rows;
    }
    let n_u = n_u.min(max_frames);

    let shift_u = match segment.alignment {
        Alignment::Left => 0.0,
        Alignment::Right => left_u,
        Alignment::Center | Alignment::Top | Alignment::Bottom => 0.5 * left_u,
    };
    let shift_v = match segment.alignment {
        Alignment::Top => 0.0,
        Alignment::Bottom => left_v,
        Alignment::Center | Alignment::Left | Alignment::Right => 0.5 * left_v,
    };
    let start = bounds.min
        + Vector2::new(
            shift_u + 0.5 * (grid.pitch_u - grid.frame_w),
            shift_v + 0.5 * (grid.pitch_v - grid.frame_d),
        );

    let mut footprints = Vec::new();
    let mut frames_placed = 0usize;
    for j in 0..n_v {
        for i in 0..n_u {
            let origin = start + Vector2::new(i as f64 * grid.pitch_u, j as f64 * grid.pitch_v);
            if !grid
                .modules(origin)
                .all(|(lo, hi)| rect_fits(lo, hi, &ring_uv, cfg.eps))
            {
                continue;
            }
            frames_placed += 1;
            for (lo, hi) in grid.modules(origin) {
                let quad: Vec<GeoPoint> = rect_corners(lo, hi)
                    .iter()
                    .map(|q| region.frame.to_geo(from_grid(*q)))
                    .collect();
                footprints.push(quad);
            }
        }
    }

    let count = footprints.len();
    let nameplate = count as f64 * clamp_len(module.wattage) / 1000.0;
    debug!(
        boundary_vertices = segment.boundary.len(),
        region_vertices = region.ring.len(),
        pitch_u_m = grid.pitch_u,
        pitch_v_m = grid.pitch_v,
        candidates = n_u * n_v,
        frames = frames_placed,
        modules = count,
        "pack"
    );
    LayoutResult {
        footprints,
        count,
        nameplate,
        resolved_azimuth: azimuth,
        truncated,
    }
}

/// Plan-view area of one placed module footprint, square feet.
pub fn footprint_area_sq_ft(segment: &Segment, module: &Module) -> f64 {
    if module.is_degenerate() {
        return 0.0;
    }
    let g = GridSpec::new(segment, module, &LayoutCfg::default());
    g.across * g.depth * SQ_FT_PER_SQ_M
}
