//! Wind change between historical and future CMIP runs, per model and as a
//! multi-model mean. Inputs are pre-gridded u/v fields (one pressure level,
//! one time mean) in GriddedField JSON; output is JSON with the change fields
//! and an area-weighted mean change speed per model.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use climpost_core::field::rows_as_json;
use climpost_core::stats::weighted_mean;
use climpost_core::{compute_area_and_weights, GriddedField, WindChange};
use log::LevelFilter;
use rayon::prelude::*;
use serde::Deserialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "wind_change", about = "Per-model and multi-model-mean wind change fields")]
struct Args {
    /// Manifest JSON listing models and their u/v field files.
    #[arg(short, long)]
    manifest: PathBuf,

    /// Output JSON path. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only write the summary numbers, not the change fields.
    #[arg(long)]
    summary_only: bool,

    /// Log level (error, warn, info, debug, trace). Falls back to RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

// ── Manifest ──────────────────────────────────────────────────────────────────

/// Paths are relative to the manifest's directory unless absolute.
#[derive(Deserialize, Debug, Clone)]
struct ModelEntry {
    name: String,
    hist_u: PathBuf,
    hist_v: PathBuf,
    future_u: PathBuf,
    future_v: PathBuf,
}

#[derive(Deserialize, Debug)]
struct Manifest {
    models: Vec<ModelEntry>,
}

struct ModelChange {
    name: String,
    change: WindChange,
    mean_speed: f64,
}

fn init_logging(level: Option<&str>) {
    let filter = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| writeln!(buf, "[wind_change {:5}] {}", record.level(), record.args()))
        .init();
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).with_context(|| format!("reading manifest {}", path.display()))?;
    let mut manifest: Manifest =
        serde_json::from_str(&text).with_context(|| format!("parsing manifest {}", path.display()))?;
    if manifest.models.is_empty() {
        bail!("manifest {} lists no models", path.display());
    }
    manifest.models.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(manifest)
}

fn load_field(base: &Path, rel: &Path) -> Result<GriddedField> {
    let path = base.join(rel);
    let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    GriddedField::from_json_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Area-weighted mean of the change speed over valid cells.
fn mean_speed(change: &WindChange) -> Result<f64> {
    let weights = compute_area_and_weights(&change.lat, &change.lon)?.weight;
    Ok(weighted_mean(&change.speed, &weights)?)
}

fn process_model(base: &Path, entry: &ModelEntry) -> Result<ModelChange> {
    let hist_u = load_field(base, &entry.hist_u)?;
    let hist_v = load_field(base, &entry.hist_v)?;
    let fut_u = load_field(base, &entry.future_u)?;
    let fut_v = load_field(base, &entry.future_v)?;
    let change = WindChange::between(&hist_u, &hist_v, &fut_u, &fut_v)
        .with_context(|| format!("model {}", entry.name))?;
    let mean_speed = mean_speed(&change).with_context(|| format!("model {}", entry.name))?;
    Ok(ModelChange { name: entry.name.clone(), change, mean_speed })
}

fn change_doc(name: &str, change: &WindChange, mean_speed: f64, summary_only: bool) -> serde_json::Value {
    let mut doc = serde_json::json!({
        "name": name,
        "weighted_mean_speed": mean_speed,
        "max_speed": change.speed.iter().cloned().filter(|v| !v.is_nan()).fold(f64::NEG_INFINITY, f64::max),
    });
    if !summary_only {
        doc["lat"] = serde_json::json!(change.lat);
        doc["lon"] = serde_json::json!(change.lon);
        doc["du"] = rows_as_json(&change.du);
        doc["dv"] = rows_as_json(&change.dv);
        doc["speed"] = rows_as_json(&change.speed);
        doc["direction_deg"] = rows_as_json(&change.direction_deg);
    }
    doc
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let manifest = load_manifest(&args.manifest)?;
    let base = args.manifest.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

    log::info!("Processing {} models ...", manifest.models.len());
    let models: Vec<ModelChange> = manifest
        .models
        .par_iter()
        .map(|entry| process_model(&base, entry))
        .collect::<Result<_>>()?;

    for m in &models {
        log::info!("  {:<24} mean change speed {:.3} m/s", m.name, m.mean_speed);
    }

    let changes: Vec<WindChange> = models.iter().map(|m| m.change.clone()).collect();
    let ensemble = WindChange::ensemble_mean(&changes).context("ensemble mean")?;
    let ensemble_speed = mean_speed(&ensemble)?;
    log::info!("  {:<24} mean change speed {:.3} m/s", "multi-model mean", ensemble_speed);

    let doc = serde_json::json!({
        "models": models
            .iter()
            .map(|m| change_doc(&m.name, &m.change, m.mean_speed, args.summary_only))
            .collect::<Vec<_>>(),
        "ensemble_mean": change_doc("multi-model mean", &ensemble, ensemble_speed, args.summary_only),
    });
    let text = serde_json::to_string(&doc)?;
    match &args.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            log::info!("-> {}", path.display());
        }
        None => println!("{text}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scratch directory removed on drop, so failed asserts do not leave it behind.
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(tag: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("wind_change_{tag}_{}", std::process::id()));
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    /// Constant 3x2 field.
    fn field_json(value: f64) -> String {
        format!(r#"{{"lat": [0, 10, 20], "lon": [0, 10], "data": [[{value}, {value}], [{value}, {value}], [{value}, {value}]]}}"#)
    }

    fn write_model(dir: &Path, name: &str, du: f64) -> ModelEntry {
        let files = [("hu", 0.0), ("hv", 0.0), ("fu", du), ("fv", 0.0)];
        for (tag, v) in files {
            fs::write(dir.join(format!("{name}_{tag}.json")), field_json(v)).unwrap();
        }
        ModelEntry {
            name: name.to_string(),
            hist_u: format!("{name}_hu.json").into(),
            hist_v: format!("{name}_hv.json").into(),
            future_u: format!("{name}_fu.json").into(),
            future_v: format!("{name}_fv.json").into(),
        }
    }

    #[test]
    fn uniform_change_has_matching_weighted_mean() {
        let scratch = ScratchDir::new("uniform");
        let entry = write_model(&scratch.0, "modelA", 1.5);

        let m = process_model(&scratch.0, &entry).unwrap();
        assert!((m.mean_speed - 1.5).abs() < 1e-12, "mean speed {}", m.mean_speed);

        let doc = change_doc(&m.name, &m.change, m.mean_speed, true);
        assert!(doc.get("speed").is_none());
        assert_eq!(doc["max_speed"].as_f64().unwrap(), 1.5);
    }

    #[test]
    fn manifest_models_are_sorted_by_name() {
        let scratch = ScratchDir::new("manifest");
        let path = scratch.0.join("manifest.json");
        let entry = |n: &str| {
            format!(r#"{{"name": "{n}", "hist_u": "a", "hist_v": "b", "future_u": "c", "future_v": "d"}}"#)
        };
        fs::write(&path, format!(r#"{{"models": [{}, {}]}}"#, entry("MIROC6"), entry("ACCESS-CM2"))).unwrap();

        let manifest = load_manifest(&path).unwrap();
        let names: Vec<&str> = manifest.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["ACCESS-CM2", "MIROC6"]);
    }
}
