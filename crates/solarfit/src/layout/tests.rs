use super::*;
use crate::cfg::LayoutCfg;
use crate::measure::area_sq_ft;
use crate::offset::inset;
use crate::planar::contains_eps;
use crate::project::{GeoPoint, LocalFrame, METERS_PER_FOOT};
use crate::sample::{draw_site, ReplayToken, SiteCfg};
use nalgebra::{vector, Vector2};
use proptest::prelude::*;

const MODULE: Module = Module {
    width: 3.25,
    length: 6.5,
    wattage: 400.0,
};

fn frame() -> LocalFrame {
    LocalFrame::new(GeoPoint::new(40.0, -105.0))
}

/// Feet → geographic via the test frame.
fn ring_ft(points: &[(f64, f64)]) -> Vec<GeoPoint> {
    let planar: Vec<Vector2<f64>> = points
        .iter()
        .map(|&(x, y)| vector![x, y] * METERS_PER_FOOT)
        .collect();
    frame().ring_to_geo(&planar)
}

fn square_ft(side: f64) -> Vec<GeoPoint> {
    ring_ft(&[(0.0, 0.0), (side, 0.0), (side, side), (0.0, side)])
}

fn scenario() -> Segment {
    Segment {
        boundary: square_ft(100.0),
        racking_type: RackingType::Flat,
        orientation: Orientation::Portrait,
        row_spacing: 2.0,
        module_spacing: 0.5,
        setback: 0.0,
        azimuth: 180.0,
        frame_size_up: 1,
        frame_size_wide: 1,
        ..Segment::default()
    }
}

/// Footprint corners in test-frame feet.
fn corners_ft(layout: &LayoutResult) -> Vec<Vec<Vector2<f64>>> {
    let f = frame();
    layout
        .footprints
        .iter()
        .map(|quad| {
            quad.iter()
                .map(|p| f.to_planar(*p) / METERS_PER_FOOT)
                .collect()
        })
        .collect()
}

fn extreme(layout: &LayoutResult, pick: impl Fn(&Vector2<f64>) -> f64, max: bool) -> f64 {
    let vals = corners_ft(layout).into_iter().flatten().map(|p| pick(&p));
    if max {
        vals.fold(f64::NEG_INFINITY, f64::max)
    } else {
        vals.fold(f64::INFINITY, f64::min)
    }
}

#[test]
fn hundred_foot_square_matches_bounding_box_count() {
    let layout = pack(&scenario(), &MODULE);
    let expected = (100.0f64 / (3.25 + 0.5)).floor() * (100.0f64 / (6.5 + 2.0)).floor();
    assert_eq!(layout.count, expected as usize);
    assert_eq!(layout.count, 286);
    assert_eq!(layout.footprints.len(), layout.count);
    assert!(layout.footprints.iter().all(|q| q.len() == 4));
    assert!((layout.nameplate - 114.4).abs() < 1e-9);
    assert_eq!(layout.resolved_azimuth, 180.0);
}

#[test]
fn footprints_are_module_sized_and_inside() {
    let layout = pack(&scenario(), &MODULE);
    let boundary: Vec<Vector2<f64>> = vec![
        vector![0.0, 0.0],
        vector![100.0, 0.0],
        vector![100.0, 100.0],
        vector![0.0, 100.0],
    ];
    for quad in corners_ft(&layout) {
        let w = (quad[1] - quad[0]).norm();
        let h = (quad[2] - quad[1]).norm();
        assert!((w - 3.25).abs() < 1e-3, "width {w}");
        assert!((h - 6.5).abs() < 1e-3, "depth {h}");
        assert!(quad.iter().all(|p| contains_eps(*p, &boundary, 1e-6)));
    }
}

#[test]
fn two_point_boundary_is_empty() {
    let seg = Segment {
        boundary: square_ft(100.0)[..2].to_vec(),
        ..scenario()
    };
    assert_eq!(area_sq_ft(&seg.boundary), 0.0);
    let layout = pack(&seg, &MODULE);
    assert_eq!(layout.count, 0);
    assert_eq!(layout.nameplate, 0.0);
    assert!(layout.footprints.is_empty());
}

#[test]
fn half_width_setback_empties_region_and_layout() {
    let seg = Segment {
        setback: 50.0,
        ..scenario()
    };
    assert!(inset(&seg.boundary, seg.setback).is_empty());
    assert!(buildable_region(&seg, &LayoutCfg::default()).is_none());
    assert_eq!(pack(&seg, &MODULE).count, 0);
}

#[test]
fn setback_shrinks_buildable_area() {
    let seg = Segment {
        setback: 10.0,
        ..scenario()
    };
    let layout = pack(&seg, &MODULE);
    // 80 ft square: floor(80 / 3.75) × floor(80 / 8.5)
    assert_eq!(layout.count, 21 * 9);
}

#[test]
fn degenerate_module_yields_empty_layout() {
    for m in [
        Module { width: 0.0, ..MODULE },
        Module { length: 0.0, ..MODULE },
        Module { width: f64::NAN, ..MODULE },
    ] {
        let layout = pack(&scenario(), &m);
        assert!(layout.is_empty());
        assert_eq!(layout.resolved_azimuth, 180.0);
    }
}

#[test]
fn azimuth_is_normalized_and_rotates_grid() {
    let east = pack(
        &Segment {
            azimuth: 90.0,
            ..scenario()
        },
        &MODULE,
    );
    let wrapped = pack(
        &Segment {
            azimuth: 450.0,
            ..scenario()
        },
        &MODULE,
    );
    assert_eq!(east, wrapped);
    assert_eq!(east.count, 286);
    // Rows now run north-south: module depth lies along x.
    let quad = &corners_ft(&east)[0];
    assert!(((quad[1] - quad[0]).norm() - 3.25).abs() < 1e-3);
    assert!(((quad[1] - quad[0]).y.abs() - 3.25).abs() < 1e-3);

    assert_eq!(resolve_azimuth(-90.0), 270.0);
    assert_eq!(resolve_azimuth(360.0), 0.0);
    assert_eq!(resolve_azimuth(f64::NAN), 180.0);
}

#[test]
fn landscape_swaps_dimensions() {
    let seg = Segment {
        orientation: Orientation::Landscape,
        ..scenario()
    };
    // floor(100 / 7.0) × floor(100 / 5.25)
    assert_eq!(pack(&seg, &MODULE).count, 14 * 19);
}

#[test]
fn tilted_racking_pitch() {
    let tilted = Segment {
        racking_type: RackingType::FixedTilt,
        module_tilt: 20.0,
        ..scenario()
    };
    // pitch = 6.5 cos20 + 6.5 sin20 / tan25 + 2 ≈ 12.88 ft → 7 rows
    assert_eq!(pack(&tilted, &MODULE).count, 26 * 7);

    let flush = Segment {
        racking_type: RackingType::FlushMount,
        ..tilted.clone()
    };
    // pitch = 6.5 cos20 + 2 ≈ 8.11 ft → 12 rows
    assert_eq!(pack(&flush, &MODULE).count, 26 * 12);

    // Tilt is ignored on flat racking.
    let flat = Segment {
        racking_type: RackingType::Flat,
        ..tilted
    };
    assert_eq!(pack(&flat, &MODULE).count, 286);
}

#[test]
fn lower_sun_needs_wider_rows() {
    let seg = Segment {
        racking_type: RackingType::FixedTilt,
        module_tilt: 25.0,
        ..scenario()
    };
    let high = pack_with_cfg(
        &seg,
        &MODULE,
        &LayoutCfg {
            min_sun_elevation_deg: 60.0,
            ..LayoutCfg::default()
        },
    );
    let low = pack_with_cfg(
        &seg,
        &MODULE,
        &LayoutCfg {
            min_sun_elevation_deg: 15.0,
            ..LayoutCfg::default()
        },
    );
    assert!(low.count < high.count);
}

#[test]
fn frames_place_whole_units() {
    let seg = Segment {
        frame_size_up: 2,
        frame_size_wide: 3,
        frame_spacing: 1.0,
        ..scenario()
    };
    let layout = pack(&seg, &MODULE);
    // frame 10.75 × 13.5 ft, pitch 12.25 × 15.5 ft → 8 × 6 frames
    assert_eq!(layout.count, 8 * 6 * 6);
    assert_eq!(layout.count % 6, 0);
}

#[test]
fn alignment_moves_leftover_margin() {
    let s = 100.0;
    let left = pack(
        &Segment {
            alignment: Alignment::Left,
            ..scenario()
        },
        &MODULE,
    );
    let right = pack(
        &Segment {
            alignment: Alignment::Right,
            ..scenario()
        },
        &MODULE,
    );
    let top = pack(
        &Segment {
            alignment: Alignment::Top,
            ..scenario()
        },
        &MODULE,
    );
    let bottom = pack(
        &Segment {
            alignment: Alignment::Bottom,
            ..scenario()
        },
        &MODULE,
    );
    for l in [&left, &right, &top, &bottom] {
        assert_eq!(l.count, 286);
    }
    // Facing south, left is east (+x) and top is the back row (north, +y).
    // Half the cell spacing stays between the frame and the box edge.
    assert!((extreme(&left, |p| p.x, true) - (s - 0.25)).abs() < 1e-3);
    assert!((extreme(&right, |p| p.x, false) - 0.25).abs() < 1e-3);
    assert!((extreme(&top, |p| p.y, true) - (s - 1.0)).abs() < 1e-3);
    assert!((extreme(&bottom, |p| p.y, false) - 1.0).abs() < 1e-3);
}

#[test]
fn concave_notch_stays_empty() {
    let seg = Segment {
        boundary: ring_ft(&[
            (0.0, 0.0),
            (60.0, 0.0),
            (60.0, 60.0),
            (40.0, 60.0),
            (40.0, 20.0),
            (20.0, 20.0),
            (20.0, 60.0),
            (0.0, 60.0),
        ]),
        ..scenario()
    };
    let layout = pack(&seg, &MODULE);
    assert!(layout.count > 0);
    for quad in corners_ft(&layout) {
        let c: Vector2<f64> = quad.iter().sum::<Vector2<f64>>() / 4.0;
        let in_notch = c.x > 20.0 && c.x < 40.0 && c.y > 20.0;
        assert!(!in_notch, "module centered at {c:?} sits in the notch");
    }
}

#[test]
fn slit_crossing_a_module_rejects_it() {
    let seg = Segment {
        module_spacing: 0.3,
        boundary: ring_ft(&[
            (0.0, 0.0),
            (60.0, 0.0),
            (60.0, 60.0),
            (31.2, 60.0),
            (31.2, 5.0),
            (31.0, 5.0),
            (31.0, 60.0),
            (0.0, 60.0),
        ]),
        ..scenario()
    };
    let layout = pack(&seg, &MODULE);
    assert!(layout.count > 0);
    for quad in corners_ft(&layout) {
        let lo = quad.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let hi = quad.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        assert!(hi <= 31.0 + 1e-6 || lo >= 31.2 - 1e-6, "module spans the slit: {lo}..{hi}");
    }
}

#[test]
fn narrow_wing_does_not_erase_body() {
    // L-shape whose 10 ft wing closes under a 6 ft setback.
    let l = Segment {
        boundary: ring_ft(&[
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 40.0),
            (10.0, 40.0),
            (10.0, 100.0),
            (0.0, 100.0),
        ]),
        setback: 6.0,
        ..scenario()
    };
    let base = Segment {
        boundary: ring_ft(&[(0.0, 0.0), (100.0, 0.0), (100.0, 40.0), (0.0, 40.0)]),
        ..l.clone()
    };
    let region = buildable_region(&l, &LayoutCfg::default()).expect("body survives");
    assert!((region.area_sq_ft() - 88.0 * 28.0).abs() < 0.5);
    // 88 × 28 ft: floor(88 / 3.75) × floor(28 / 8.5)
    let count = pack(&l, &MODULE).count;
    assert_eq!(count, 23 * 3);
    assert_eq!(count, pack(&base, &MODULE).count);
}

#[test]
fn negative_spacing_is_clamped() {
    let clamped = pack(
        &Segment {
            row_spacing: -5.0,
            module_spacing: -1.0,
            setback: -3.0,
            ..scenario()
        },
        &MODULE,
    );
    let zero = pack(
        &Segment {
            row_spacing: 0.0,
            module_spacing: 0.0,
            setback: 0.0,
            ..scenario()
        },
        &MODULE,
    );
    assert_eq!(clamped, zero);
}

#[test]
fn tiny_modules_respect_frame_cap() {
    let cfg = LayoutCfg {
        max_frames: 1_000,
        ..LayoutCfg::default()
    };
    let tiny = Module {
        width: 0.01,
        length: 0.01,
        wattage: 1.0,
    };
    let layout = pack_with_cfg(&scenario(), &tiny, &cfg);
    assert!(layout.count > 0);
    assert!(layout.count <= 1_000);
    assert!(layout.truncated);
    assert!(!pack(&scenario(), &MODULE).truncated);
}

#[test]
fn summary_without_module_is_area_only() {
    let seg = Segment {
        setback: 10.0,
        ..scenario()
    };
    let cfg = LayoutCfg::default();
    let bare = summarize(&seg, None, &cfg);
    assert!((bare.area_sq_ft - 10_000.0).abs() < 1.0);
    assert!((bare.buildable_area_sq_ft - 6_400.0).abs() < 1.0);
    assert!(bare.layout.is_none());
    let full = summarize(&seg, Some(&MODULE), &cfg);
    assert_eq!(full.layout.map(|l| l.count), Some(189));
}

#[test]
fn batch_preserves_order() {
    let jobs = vec![
        LayoutJob {
            segment: scenario(),
            module: MODULE,
        },
        LayoutJob {
            segment: scenario(),
            module: Module {
                width: 0.0,
                ..MODULE
            },
        },
        LayoutJob {
            segment: Segment {
                orientation: Orientation::Landscape,
                ..scenario()
            },
            module: MODULE,
        },
    ];
    let counts: Vec<usize> = pack_batch(&jobs, &LayoutCfg::default())
        .iter()
        .map(|r| r.count)
        .collect();
    assert_eq!(counts, vec![286, 0, 266]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn packed_area_fits_and_repeats(
        seed in 0u64..500,
        azimuth in 0.0f64..360.0,
        setback in 0.0f64..10.0,
        tilt in 0.0f64..40.0,
    ) {
        let site = SiteCfg { radius_m: 20.0, convex: true, ..SiteCfg::default() };
        let seg = Segment {
            boundary: draw_site(site, ReplayToken { seed, index: 1 }),
            racking_type: RackingType::FixedTilt,
            module_tilt: tilt,
            azimuth,
            setback,
            row_spacing: 1.0,
            module_spacing: 0.25,
            ..Segment::default()
        };
        let cfg = LayoutCfg::default();
        let a = pack_with_cfg(&seg, &MODULE, &cfg);
        let b = pack_with_cfg(&seg, &MODULE, &cfg);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.count, a.footprints.len());
        match buildable_region(&seg, &cfg) {
            Some(region) => {
                let used = a.count as f64 * footprint_area_sq_ft(&seg, &MODULE);
                prop_assert!(used <= region.area_sq_ft() + 1e-6);
            }
            None => prop_assert_eq!(a.count, 0),
        }
    }
}
