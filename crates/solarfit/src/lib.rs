//! Solar module layout geometry.
//!
//! Measure drawn roof/ground boundaries, inset them by a fire-code setback, and
//! pack rows of PV modules into what is left.
//!
//! Units
//! - Public inputs and outputs use geographic degrees and US customary units
//!   (feet, square feet, degrees, watts, kW).
//! - Internally all geometry runs in local planar frames in meters (`project`).
//!
//! API Policy
//! - Functions are pure and deterministic; degenerate input yields an empty or
//!   zero result, never a panic or error. `Segment::validate` exists for callers
//!   that want to reject bad configuration up front.

pub mod cfg;
pub mod label;
pub mod layout;
pub mod measure;
pub mod offset;
pub mod planar;
pub mod project;
pub mod sample;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::LayoutCfg;
pub use label::{edge_labels, EdgeLabel};
pub use layout::{pack, pack_batch, summarize, LayoutResult, Module, Segment};
pub use measure::{area_sq_ft, distance_ft, midpoint};
pub use offset::inset;
pub use planar::contains;
pub use project::GeoPoint;

// Planar geometry is expressed in nalgebra vectors throughout.
pub use nalgebra::Vector2 as Vec2;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::cfg::LayoutCfg;
    pub use crate::label::{edge_labels, EdgeLabel};
    pub use crate::layout::{
        buildable_region, pack, pack_batch, pack_with_cfg, summarize, Alignment, ConfigError,
        LayoutJob, LayoutResult, Module, Orientation, RackingType, Segment, SegmentSummary,
    };
    pub use crate::measure::{area_sq_ft, distance_ft, midpoint};
    pub use crate::offset::{inset, inset_with_cfg};
    pub use crate::planar::contains;
    pub use crate::project::{GeoPoint, LocalFrame, FEET_PER_METER, METERS_PER_FOOT};
    pub use crate::sample::{draw_site, ReplayToken, SiteCfg, VertexCount};
    pub use nalgebra::Vector2 as Vec2;
}
