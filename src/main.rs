//! Command-line driver for triangle-tile placement.
//!
//! Reads a polygon from a text file (whitespace-separated `x y` pairs,
//! one vertex per pair), runs the relaxation to its step budget or target
//! quality, and prints the final tile poses as `x y angle` lines in the
//! normalized coordinate frame.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use tripack_core::{
    AreaEstimation, Placement, PlacementConfig, Point, DEFAULT_AREA_SAMPLES,
};
use tripack_physics::RapierBodyStore;

#[derive(Parser, Debug)]
#[command(version, about = "Pack equilateral triangles into a polygon", long_about = None)]
struct Cli {
    /// Polygon vertex file: whitespace-separated x y pairs.
    polygon: PathBuf,

    /// Triangle edge length in the polygon's units.
    #[arg(long, default_value_t = 1.0)]
    edge_length: f64,

    /// RNG seed; a time-derived seed is used when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Step budget for the run.
    #[arg(long)]
    steps: Option<u64>,

    /// Start with this many tiles instead of the area-derived count.
    #[arg(long)]
    tiles: Option<usize>,

    /// Stop once the packing quality reaches this value.
    #[arg(long)]
    target_quality: Option<f64>,

    /// Estimate the polygon area by sampling instead of the shoelace
    /// formula.
    #[arg(long, default_value_t = false)]
    sampled_area: bool,

    /// Log a progress line every this many steps.
    #[arg(long, default_value_t = 600)]
    report_every: u64,
}

fn parse_polygon(text: &str) -> Result<Vec<Point>, Box<dyn Error>> {
    let mut values = Vec::new();
    for token in text.split_whitespace() {
        values.push(token.parse::<f64>()?);
    }
    if values.len() % 2 != 0 {
        return Err(format!("odd number of coordinates ({})", values.len()).into());
    }
    Ok(values.chunks(2).map(|c| Point::new(c[0], c[1])).collect())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(&cli.polygon)?;
    let vertices = parse_polygon(&text)?;

    let config = PlacementConfig {
        seed: cli.seed,
        step_budget: cli.steps,
        tile_count: cli.tiles,
        target_quality: cli.target_quality,
        area_estimation: if cli.sampled_area {
            AreaEstimation::Sampled {
                samples: DEFAULT_AREA_SAMPLES,
            }
        } else {
            AreaEstimation::Exact
        },
        ..PlacementConfig::default()
    };

    let report_every = cli.report_every.max(1);
    let mut placement =
        Placement::new(vertices, cli.edge_length, config, RapierBodyStore::new())?;
    let poses = placement.run_until(|report| {
        if report.frame % report_every == 0 || report.removed {
            info!(
                "frame {} tiles {} energy {:.6} quality {:.4}{}",
                report.frame,
                report.tile_count,
                report.energy,
                report.quality,
                if report.removed { " (tile removed)" } else { "" }
            );
        }
        false
    })?;

    info!(
        "finished with {} tiles (seed {})",
        poses.len(),
        placement.seed()
    );
    for pose in &poses {
        println!("{} {} {}", pose.position.x, pose.position.y, pose.angle_deg);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_polygon;

    #[test]
    fn parses_vertex_pairs() {
        let points = parse_polygon("0 0\n10 0\n10 10\n0 10\n").unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[2].x, 10.0);
        assert_eq!(points[2].y, 10.0);
    }

    #[test]
    fn rejects_odd_coordinate_count() {
        assert!(parse_polygon("0 0 1").is_err());
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert!(parse_polygon("0 zero").is_err());
    }
}
