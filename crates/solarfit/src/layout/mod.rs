//! Module layout: pack oriented, spaced, tilt-aware module frames into a segment.
//!
//! Purpose
//! - Turn a `Segment` (boundary + racking attributes) and a `Module` into a
//!   `LayoutResult`: module footprints in geographic coordinates, their count,
//!   and the nameplate capacity.
//!
//! Pipeline
//! - Setback inset of the boundary (`offset`) → buildable region re-anchored at
//!   its centroid (`project`) → grid in azimuth-aligned coordinates → frame
//!   clipping by containment (`planar`) → footprints back to degrees.
//! - Pure and deterministic: identical inputs give identical outputs. Inputs
//!   that cannot hold a module give an empty result, never an error.
//!
//! Row pitch
//! - `Flat`: `depth + rowSpacing`.
//! - `FlushMount`: `depth·cos(tilt) + rowSpacing`.
//! - `FixedTilt`: `depth·cos(tilt) + depth·sin(tilt)/tan(sun elevation) + rowSpacing`,
//!   the second term keeping the row behind out of the shadow of a sun at
//!   `LayoutCfg::min_sun_elevation_deg`.
//! - For frames deeper than one module, `depth` is the frame's total depth.

mod batch;
mod pack;
mod types;

pub use batch::{pack_batch, summarize};
pub use pack::{
    buildable_region, footprint_area_sq_ft, pack, pack_with_cfg, resolve_azimuth,
    BuildableRegion,
};
pub use types::{
    Alignment, ConfigError, LayoutJob, LayoutResult, Module, Orientation, RackingType, Segment,
    SegmentSummary,
};

#[cfg(test)]
mod tests;
