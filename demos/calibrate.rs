//! Two-point calibration from the command line
//!
//! Loads the anchor snapshot, places both proxies at the given positions and
//! applies one calibration to a unit carrier at head height.
//!
//! Usage:
//! ```bash
//! cargo run --example calibrate -- \
//!   --anchors samples/anchors.yaml \
//!   --view front \
//!   --tear-duct 0.0312,-0.0915,2.40 \
//!   --chin 0.0,-0.0874,2.15
//! ```

use clap::Parser;
use log::info;
use nalgebra::Point3;
use orthometric::{
    CalibrationReport, CalibrationSession, Carrier, Landmark, LandmarkPair, ViewKind,
};
use std::path::PathBuf;

/// Head height the reference images are created at.
const CARRIER_HEIGHT: f64 = 1.47;

/// Reference photo calibration tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the anchor YAML file
    #[arg(short = 'a', long, default_value = "samples/anchors.yaml")]
    anchors: PathBuf,

    /// View the photograph was taken from (front, side, custom)
    #[arg(short = 'v', long, default_value = "front")]
    view: ViewKind,

    /// Aligned tear-duct proxy position as x,y,z
    #[arg(long, value_parser = parse_point)]
    tear_duct: Point3<f64>,

    /// Aligned chin proxy position as x,y,z
    #[arg(long, value_parser = parse_point)]
    chin: Point3<f64>,

    /// X of the face's symmetry line on the image, re-based to 0 before calibrating
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    symmetry_x: f64,

    /// Optional YAML file the calibration report is written to
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn parse_point(s: &str) -> Result<Point3<f64>, String> {
    let coords = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("'{c}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(format!("expected 3 comma-separated values, got {}", coords.len())),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    let anchors_path = cli.anchors.to_str().ok_or("Invalid anchors path string")?;
    let target = LandmarkPair::load_from_yaml(anchors_path)?;
    info!("Loaded anchors from {anchors_path}");

    let mut session = CalibrationSession::start(cli.view, target);
    session.move_to(Landmark::TearDuct, &cli.tear_duct)?;
    session.move_to(Landmark::Chin, &cli.chin)?;

    let mut carrier = Carrier::new(Point3::new(0.0, 0.0, CARRIER_HEIGHT));
    if cli.symmetry_x != 0.0 {
        carrier.center_on(cli.symmetry_x);
    }
    let result = session.apply(&mut carrier)?;

    let report = CalibrationReport::new(cli.view, &result);
    println!("{}", report.to_json()?);
    println!(
        "Carrier location: ({:.6}, {:.6}, {:.6}), scale: ({:.6}, {:.6}, {:.6})",
        carrier.location.x,
        carrier.location.y,
        carrier.location.z,
        carrier.scale.x,
        carrier.scale.y,
        carrier.scale.z
    );
    if result.is_suspicious() {
        println!("Warning: scale factor {} looks suspicious", result.scale_factor);
    }

    if let Some(output) = cli.output {
        let output_str = output.to_str().ok_or("Invalid output path string")?;
        report.save_to_yaml(output_str)?;
        info!("Saved calibration report to {output_str}");
    }

    Ok(())
}
