use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use solarfit::layout::{summarize, Module, Segment, SegmentSummary};
use solarfit::{edge_labels, GeoPoint, LayoutCfg};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

#[derive(Parser)]
#[command(name = "solarfit")]
#[command(about = "Measure site boundaries and lay out solar modules")]
struct Cmd {
    /// Log at debug level (library diagnostics included)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Design sun elevation for fixed-tilt row clearance, degrees
    #[arg(long, global = true)]
    min_sun_elevation: Option<f64>,

    /// Cap on candidate frames per segment
    #[arg(long, global = true)]
    max_frames: Option<usize>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Pack every segment of a design file and write per-segment results
    Layout {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the area of a boundary in square feet
    Area {
        #[arg(long)]
        input: PathBuf,
    },
    /// Inset a boundary by a setback in feet
    Inset {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        setback: f64,
        /// Write the inset boundary here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print edge-length labels for a boundary
    Labels {
        #[arg(long)]
        input: PathBuf,
    },
}

/// Design file: a module catalog plus segments referring to it by name.
#[derive(Deserialize)]
struct Design {
    #[serde(default)]
    modules: BTreeMap<String, Module>,
    segments: Vec<DesignSegment>,
}

#[derive(Deserialize)]
struct DesignSegment {
    id: String,
    #[serde(default)]
    module: Option<String>,
    #[serde(flatten)]
    segment: Segment,
}

#[derive(Serialize)]
struct SegmentReport {
    id: String,
    #[serde(flatten)]
    summary: SegmentSummary,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    SubscriberBuilder::default()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    let cfg = layout_cfg(cmd.min_sun_elevation, cmd.max_frames);
    match cmd.action {
        Action::Layout { input, out } => layout(&input, &out, &cfg),
        Action::Area { input } => area(&input),
        Action::Inset {
            input,
            setback,
            out,
        } => inset(&input, setback, out.as_deref(), &cfg),
        Action::Labels { input } => labels(&input, &cfg),
    }
}

fn layout_cfg(min_sun_elevation: Option<f64>, max_frames: Option<usize>) -> LayoutCfg {
    let mut cfg = LayoutCfg::default();
    if let Some(deg) = min_sun_elevation {
        cfg.min_sun_elevation_deg = deg;
    }
    if let Some(n) = max_frames {
        cfg.max_frames = n;
    }
    cfg
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_json(path, &bytes)
}

fn parse_json<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

fn layout_reports(design: &Design, cfg: &LayoutCfg) -> Vec<SegmentReport> {
    for (name, module) in &design.modules {
        if let Err(err) = module.validate() {
            tracing::warn!(module = %name, %err, "module configuration");
        }
    }
    design
        .segments
        .iter()
        .map(|entry| {
            if let Err(err) = entry.segment.validate() {
                tracing::warn!(segment = %entry.id, %err, "segment configuration");
            }
            let module = entry.module.as_ref().and_then(|name| {
                let found = design.modules.get(name);
                if found.is_none() {
                    tracing::warn!(segment = %entry.id, module = %name, "unknown module");
                }
                found
            });
            let summary = summarize(&entry.segment, module, cfg);
            tracing::info!(
                segment = %entry.id,
                area_sq_ft = summary.area_sq_ft,
                modules = summary.layout.as_ref().map_or(0, |l| l.count),
                "segment"
            );
            SegmentReport {
                id: entry.id.clone(),
                summary,
            }
        })
        .collect()
}

fn layout(input: &Path, out: &Path, cfg: &LayoutCfg) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), "layout");
    let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    let design: Design = parse_json(input, &bytes)?;
    let reports = layout_reports(&design, cfg);
    write_json(out, &reports)?;

    let mut run = provenance::LayoutRun::new(input, bytes.len() as u64, out, *cfg);
    for report in &reports {
        let (modules, kw) = report
            .summary
            .layout
            .as_ref()
            .map_or((0, 0.0), |l| (l.count, l.nameplate));
        run.add_segment(&report.id, modules, kw);
    }
    let prov = run.write_beside(out)?;
    tracing::info!(
        modules = run.modules,
        nameplate_kw = run.nameplate_kw,
        provenance = %prov.display(),
        "layout done"
    );
    Ok(())
}

fn area(input: &Path) -> Result<()> {
    let boundary: Vec<GeoPoint> = read_json(input)?;
    let sq_ft = solarfit::area_sq_ft(&boundary);
    tracing::info!(input = %input.display(), vertices = boundary.len(), "area");
    println!("{}", serde_json::to_string_pretty(&json!({ "areaSqFt": sq_ft }))?);
    Ok(())
}

fn inset(input: &Path, setback: f64, out: Option<&Path>, cfg: &LayoutCfg) -> Result<()> {
    let boundary: Vec<GeoPoint> = read_json(input)?;
    let inner = solarfit::offset::inset_with_cfg(&boundary, setback, cfg);
    tracing::info!(
        setback,
        vertices_in = boundary.len(),
        vertices_out = inner.len(),
        "inset"
    );
    match out {
        Some(path) => write_json(path, &inner),
        None => {
            println!("{}", serde_json::to_string_pretty(&inner)?);
            Ok(())
        }
    }
}

fn labels(input: &Path, cfg: &LayoutCfg) -> Result<()> {
    let boundary: Vec<GeoPoint> = read_json(input)?;
    let labels = edge_labels(&boundary, cfg);
    tracing::info!(input = %input.display(), labels = labels.len(), "labels");
    println!("{}", serde_json::to_string_pretty(&labels)?);
    Ok(())
}
