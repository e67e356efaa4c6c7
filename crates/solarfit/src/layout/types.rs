//! Layout data model: segments, modules, results, and configuration checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::project::GeoPoint;

/// Selects the row pitch formula.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RackingType {
    /// Tilted racking on a level surface; rows get a shading clearance.
    FixedTilt,
    #[default]
    Flat,
    /// Modules parallel to a pitched roof; projected depth only, no clearance.
    FlushMount,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    /// Module length runs along the row pitch direction.
    #[default]
    Portrait,
    /// Module width runs along the row pitch direction.
    Landscape,
}

/// Where leftover margin goes when the grid does not tile the region exactly.
///
/// `left`/`right` act across rows (as seen facing the azimuth), `top`/`bottom`
/// along the pitch direction (`top` is the back row). The unnamed axis is centered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

/// A drawn boundary plus its racking configuration. Distances in feet, angles in degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Segment {
    /// Implicitly closed; vertex order is edge order.
    pub boundary: Vec<GeoPoint>,
    pub racking_type: RackingType,
    pub module_tilt: f64,
    pub orientation: Orientation,
    pub row_spacing: f64,
    pub module_spacing: f64,
    pub setback: f64,
    pub azimuth: f64,
    pub frame_size_up: u32,
    pub frame_size_wide: u32,
    pub frame_spacing: f64,
    pub alignment: Alignment,
    /// Viewer-only elevation attributes; the planar packer ignores them.
    pub surface_height: f64,
    pub racking_height: f64,
}

impl Default for Segment {
    fn default() -> Self {
        Self {
            boundary: Vec::new(),
            racking_type: RackingType::Flat,
            module_tilt: 0.0,
            orientation: Orientation::Portrait,
            row_spacing: 0.0,
            module_spacing: 0.0,
            setback: 0.0,
            azimuth: 180.0,
            frame_size_up: 1,
            frame_size_wide: 1,
            frame_spacing: 0.0,
            alignment: Alignment::Center,
            surface_height: 0.0,
            racking_height: 0.0,
        }
    }
}

/// Catalog module: dimensions in feet, wattage in watts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub width: f64,
    pub length: f64,
    pub wattage: f64,
}

/// Packer output. Footprints are CCW geographic quads in placement order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub footprints: Vec<Vec<GeoPoint>>,
    pub count: usize,
    /// kW
    pub nameplate: f64,
    pub resolved_azimuth: f64,
    /// Rows past `LayoutCfg::max_frames` were not considered.
    #[serde(default)]
    pub truncated: bool,
}

impl LayoutResult {
    pub fn empty(resolved_azimuth: f64) -> Self {
        Self {
            footprints: Vec::new(),
            count: 0,
            nameplate: 0.0,
            resolved_azimuth,
            truncated: false,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// One unit of batch work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutJob {
    pub segment: Segment,
    pub module: Module,
}

/// Area figures for a segment plus its layout when a module is assigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    pub area_sq_ft: f64,
    pub buildable_area_sq_ft: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutResult>,
}

/// Caller-side configuration errors. The packer never returns these; it clamps.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be finite and positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("module tilt must lie in [0, 90) degrees, got {0}")]
    Tilt(f64),
    #[error("azimuth must be finite, got {0}")]
    Azimuth(f64),
    #[error("{field} must be at least 1")]
    FrameSize { field: &'static str },
    #[error("boundary point {index} is not finite")]
    Boundary { index: usize },
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

impl Segment {
    /// First configuration problem, if any. Boundary shape is not checked:
    /// short or collapsed boundaries are valid input that packs to nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(index) = self.boundary.iter().position(|p| !p.is_finite()) {
            return Err(ConfigError::Boundary { index });
        }
        non_negative("rowSpacing", self.row_spacing)?;
        non_negative("moduleSpacing", self.module_spacing)?;
        non_negative("frameSpacing", self.frame_spacing)?;
        non_negative("setback", self.setback)?;
        if !(self.module_tilt.is_finite() && (0.0..90.0).contains(&self.module_tilt)) {
            return Err(ConfigError::Tilt(self.module_tilt));
        }
        if !self.azimuth.is_finite() {
            return Err(ConfigError::Azimuth(self.azimuth));
        }
        if self.frame_size_up == 0 {
            return Err(ConfigError::FrameSize {
                field: "frameSizeUp",
            });
        }
        if self.frame_size_wide == 0 {
            return Err(ConfigError::FrameSize {
                field: "frameSizeWide",
            });
        }
        Ok(())
    }
}

impl Module {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("width", self.width)?;
        positive("length", self.length)?;
        positive("wattage", self.wattage)
    }

    /// Zero, negative, or non-finite dimensions: nothing can be placed.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.width > 0.0 && self.length.is_finite() && self.length > 0.0)
    }
}
