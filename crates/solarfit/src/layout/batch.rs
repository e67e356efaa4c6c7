//! Multi-segment entry points: parallel packing and per-segment summaries.

use rayon::prelude::*;
use tracing::debug;

use super::pack::{buildable_region, pack_with_cfg};
use super::types::{LayoutJob, LayoutResult, Module, Segment, SegmentSummary};
use crate::cfg::LayoutCfg;
use crate::measure::area_sq_ft;

/// Pack independent segments on the rayon pool. Output order matches `jobs`.
pub fn pack_batch(jobs: &[LayoutJob], cfg: &LayoutCfg) -> Vec<LayoutResult> {
    debug!(jobs = jobs.len(), "pack_batch");
    jobs.par_iter()
        .map(|job| pack_with_cfg(&job.segment, &job.module, cfg))
        .collect()
}

/// Area figures for a segment; the packer only runs when a module is assigned.
pub fn summarize(segment: &Segment, module: Option<&Module>, cfg: &LayoutCfg) -> SegmentSummary {
    SegmentSummary {
        area_sq_ft: area_sq_ft(&segment.boundary),
        buildable_area_sq_ft: buildable_region(segment, cfg)
            .map(|r| r.area_sq_ft())
            .unwrap_or(0.0),
        layout: module.map(|m| pack_with_cfg(segment, m, cfg)),
    }
}
