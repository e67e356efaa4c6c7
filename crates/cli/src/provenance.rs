//! Run record written next to layout results.
//!
//! `results.json` gets a `results.provenance.json` sibling naming the code
//! revision, the design file, the engine configuration, and per-segment module
//! totals, so a results file can be traced back to what produced it.

use anyhow::{Context, Result};
use serde::Serialize;
use solarfit::LayoutCfg;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Modules placed on one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentTotals {
    pub id: String,
    pub modules: usize,
    pub nameplate_kw: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRun {
    pub code_rev: String,
    pub solarfit_version: &'static str,
    pub design: String,
    pub design_bytes: u64,
    pub results: String,
    pub cfg: LayoutCfg,
    pub segments: Vec<SegmentTotals>,
    pub modules: usize,
    pub nameplate_kw: f64,
}

impl LayoutRun {
    pub fn new(design: &Path, design_bytes: u64, results: &Path, cfg: LayoutCfg) -> Self {
        Self {
            code_rev: code_rev(),
            solarfit_version: solarfit::VERSION,
            design: design.display().to_string(),
            design_bytes,
            results: results.display().to_string(),
            cfg,
            segments: Vec::new(),
            modules: 0,
            nameplate_kw: 0.0,
        }
    }

    pub fn add_segment(&mut self, id: &str, modules: usize, nameplate_kw: f64) {
        self.modules += modules;
        self.nameplate_kw += nameplate_kw;
        self.segments.push(SegmentTotals {
            id: id.to_string(),
            modules,
            nameplate_kw,
        });
    }

    /// Write the record beside `results`; returns its path.
    pub fn write_beside(&self, results: &Path) -> Result<PathBuf> {
        let path = sidecar_path(results);
        fs::write(&path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// `dir/results.json` → `dir/results.provenance.json`.
fn sidecar_path(results: &Path) -> PathBuf {
    results.with_extension("provenance.json")
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse`, else "unknown".
fn code_rev() -> String {
    option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty())
        .or_else(git_head)
        .unwrap_or_else(|| "unknown".to_string())
}

fn git_head() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let rev = String::from_utf8(output.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    #[test]
    fn sidecar_sits_beside_results() {
        assert_eq!(
            sidecar_path(Path::new("/tmp/run/results.json")),
            Path::new("/tmp/run/results.provenance.json")
        );
        assert_eq!(
            sidecar_path(Path::new("out/results")),
            Path::new("out/results.provenance.json")
        );
    }

    #[test]
    fn record_sums_segments_and_carries_cfg() {
        let dir = tempdir().unwrap();
        let results = dir.path().join("results.json");
        let cfg = LayoutCfg {
            max_frames: 500,
            ..LayoutCfg::default()
        };
        let mut run = LayoutRun::new(Path::new("design.json"), 42, &results, cfg);
        run.add_segment("roof", 286, 114.4);
        run.add_segment("yard", 0, 0.0);
        run.add_segment("carport", 14, 5.6);
        let path = run.write_beside(&results).unwrap();

        let doc: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(doc["design"], "design.json");
        assert_eq!(doc["designBytes"], 42);
        assert_eq!(doc["modules"], 300);
        assert!((doc["nameplateKw"].as_f64().unwrap() - 120.0).abs() < 1e-9);
        assert_eq!(doc["segments"].as_array().unwrap().len(), 3);
        assert_eq!(doc["segments"][2]["id"], "carport");
        assert_eq!(doc["cfg"]["maxFrames"], 500);
        assert_eq!(doc["solarfitVersion"], solarfit::VERSION);
        assert!(!doc["codeRev"].as_str().unwrap().is_empty());
    }
}
