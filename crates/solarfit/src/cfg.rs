//! Tolerances and layout policy knobs.
//!
//! Policy
//! - Defaults are the constants below; callers override them through `LayoutCfg`.
//! - All lengths in this struct are meters (the planar frame unit).

use serde::{Deserialize, Serialize};

/// Boundary tolerance (meters) for containment and degeneracy checks.
pub(crate) const EPS: f64 = 1e-9;
/// Pitch floor (meters). Bounds grid iteration for misconfigured racking.
pub(crate) const MIN_PITCH_M: f64 = 0.05;
/// Design sun elevation for row shading clearance on tilted racking.
pub(crate) const MIN_SUN_ELEVATION_DEG: f64 = 25.0;
/// Miter length limit as a multiple of the setback distance.
pub(crate) const MITER_LIMIT: f64 = 4.0;
/// Perpendicular offset of edge labels from their edge.
pub(crate) const LABEL_OFFSET_M: f64 = 1.0;
/// Candidate frames per layout before the packer gives up on the grid.
pub(crate) const MAX_FRAMES: usize = 200_000;

/// Engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutCfg {
    pub eps: f64,
    pub min_pitch_m: f64,
    pub min_sun_elevation_deg: f64,
    pub miter_limit: f64,
    pub label_offset_m: f64,
    pub max_frames: usize,
}

impl Default for LayoutCfg {
    fn default() -> Self {
        Self {
            eps: EPS,
            min_pitch_m: MIN_PITCH_M,
            min_sun_elevation_deg: MIN_SUN_ELEVATION_DEG,
            miter_limit: MITER_LIMIT,
            label_offset_m: LABEL_OFFSET_M,
            max_frames: MAX_FRAMES,
        }
    }
}

impl LayoutCfg {
    /// Pitch floor, never below `eps` even if the caller zeroed it.
    #[inline]
    pub(crate) fn pitch_floor(&self) -> f64 {
        self.min_pitch_m.max(self.eps).max(f64::MIN_POSITIVE)
    }

    /// Sun elevation in radians, clamped to [1°, 90°].
    #[inline]
    pub(crate) fn sun_elevation_rad(&self) -> f64 {
        let deg = if self.min_sun_elevation_deg.is_finite() {
            self.min_sun_elevation_deg.clamp(1.0, 90.0)
        } else {
            MIN_SUN_ELEVATION_DEG
        };
        deg.to_radians()
    }
}
