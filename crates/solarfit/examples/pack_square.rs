//! Pack a 100 ft square at a few azimuths and racking types and print counts.
//!
//! Usage:
//!   cargo run -p solarfit --example pack_square
//!   cargo run -p solarfit --example pack_square -- 25
//!
//! The optional argument is the setback in feet.

use solarfit::layout::{pack, Module, RackingType, Segment};
use solarfit::measure::area_sq_ft;
use solarfit::project::{GeoPoint, LocalFrame, METERS_PER_FOOT};
use solarfit::Vec2;

fn main() {
    let setback: f64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0);
    let s = 100.0 * METERS_PER_FOOT;
    let boundary = LocalFrame::new(GeoPoint::new(39.74, -104.99)).ring_to_geo(&[
        Vec2::new(0.0, 0.0),
        Vec2::new(s, 0.0),
        Vec2::new(s, s),
        Vec2::new(0.0, s),
    ]);
    println!("area: {:.1} sq ft, setback {setback} ft", area_sq_ft(&boundary));
    let module = Module {
        width: 3.25,
        length: 6.5,
        wattage: 400.0,
    };
    for racking in [
        RackingType::Flat,
        RackingType::FlushMount,
        RackingType::FixedTilt,
    ] {
        for azimuth in [180.0, 135.0, 90.0] {
            let seg = Segment {
                boundary: boundary.clone(),
                racking_type: racking,
                module_tilt: 20.0,
                row_spacing: 2.0,
                module_spacing: 0.5,
                setback,
                azimuth,
                ..Segment::default()
            };
            let res = pack(&seg, &module);
            println!(
                "{racking:?} az={azimuth}: {} modules, {:.2} kW",
                res.count, res.nameplate
            );
        }
    }
}
