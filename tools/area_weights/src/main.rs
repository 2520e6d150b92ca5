//! Grid-cell area weighting for a lat/lon grid.
//! Reads `{ "lat": [...], "lon": [...] }` and writes the N×M area (m²) and
//! global weight arrays as JSON.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use climpost_core::coords::is_strictly_monotonic;
use climpost_core::field::rows_as_json;
use climpost_core::{compute_area_and_weights_with, CellAreas, WeightingParams};
use log::LevelFilter;
use serde::Deserialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "area_weights", about = "Compute grid-cell areas and global area weights for a lat/lon grid")]
struct Args {
    /// JSON file with `lat` and `lon` arrays in degrees.
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON path. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Weighting parameters JSON (e.g. `{"radius_m": 3389500}`).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sphere radius in metres; overrides the config file.
    #[arg(long)]
    radius: Option<f64>,

    /// Log level (error, warn, info, debug, trace). Falls back to RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Deserialize)]
struct Coordinates {
    lat: Vec<f64>,
    lon: Vec<f64>,
}

fn init_logging(level: Option<&str>) {
    let filter = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| writeln!(buf, "[area_weights {:5}] {}", record.level(), record.args()))
        .init();
}

fn load_params(args: &Args) -> Result<WeightingParams> {
    let mut params = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => WeightingParams::default(),
    };
    if let Some(r) = args.radius {
        params.radius_m = r;
    }
    Ok(params)
}

fn output_doc(coords: &Coordinates, params: &WeightingParams, cells: &CellAreas) -> serde_json::Value {
    serde_json::json!({
        "lat": coords.lat,
        "lon": coords.lon,
        "radius_m": params.radius_m,
        "total_area_m2": cells.total_area(),
        "area": rows_as_json(&cells.area),
        "weight": rows_as_json(&cells.weight),
    })
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    let params = load_params(&args)?;
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let coords: Coordinates =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", args.input.display()))?;

    if !is_strictly_monotonic(&coords.lat) {
        log::warn!("latitude axis is not strictly monotonic; areas will not be physically meaningful");
    }
    if !is_strictly_monotonic(&coords.lon) {
        log::warn!("longitude axis is not strictly monotonic; areas will not be physically meaningful");
    }

    let cells = compute_area_and_weights_with(&coords.lat, &coords.lon, &params)
        .context("computing cell areas")?;
    let (n, m) = cells.shape();
    log::info!("{n}x{m} grid, total area {:.4e} m²", cells.total_area());

    let doc = serde_json::to_string(&output_doc(&coords, &params, &cells))?;
    match &args.output {
        Some(path) => {
            fs::write(path, doc).with_context(|| format!("writing {}", path.display()))?;
            log::info!("-> {}", path.display());
        }
        None => println!("{doc}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use climpost_core::compute_area_and_weights;

    #[test]
    fn radius_flag_overrides_default() {
        let args = Args::parse_from(["area_weights", "--input", "grid.json", "--radius", "1000"]);
        assert_eq!(load_params(&args).unwrap().radius_m, 1000.0);

        let args = Args::parse_from(["area_weights", "-i", "grid.json"]);
        assert_eq!(load_params(&args).unwrap(), WeightingParams::default());
    }

    #[test]
    fn output_has_one_row_per_latitude() {
        let coords = Coordinates { lat: vec![0.0, 10.0, 20.0], lon: vec![0.0, 10.0] };
        let cells = compute_area_and_weights(&coords.lat, &coords.lon).unwrap();
        let doc = output_doc(&coords, &WeightingParams::default(), &cells);

        let weight = doc["weight"].as_array().unwrap();
        assert_eq!(weight.len(), 3);
        assert_eq!(weight[0].as_array().unwrap().len(), 2);
        let sum: f64 = weight
            .iter()
            .flat_map(|r| r.as_array().unwrap().iter().map(|v| v.as_f64().unwrap()))
            .sum();
        assert!((sum - 1.0).abs() < 1e-12, "weights sum to {sum}");
    }
}
