//! Routeviz CLI library.
//!
//! Argument types, subcommand handlers, terminal styling and output
//! formatting for the `routeviz-cli` binary.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use routeviz_lib::{Algorithm, Coordinate};

pub mod commands;
pub mod output;
pub mod terminal;

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary, colored when the terminal allows it.
    #[default]
    Text,
    /// Markdown-flavoured summary.
    Rich,
    /// The run summary as JSON.
    Json,
    /// Every animated segment as a JSON array.
    Timeline,
}

/// Search algorithm accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    Astar,
    Dijkstra,
}

impl From<AlgorithmArg> for Algorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Astar => Algorithm::AStar,
            AlgorithmArg::Dijkstra => Algorithm::Dijkstra,
        }
    }
}

/// Arguments for the `route` subcommand.
#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Start point as LAT,LON.
    #[arg(long, value_parser = parse_coordinate, conflicts_with = "from_place", required_unless_present = "from_place")]
    pub from: Option<Coordinate>,
    /// Start point by place name.
    #[arg(long = "from-place")]
    pub from_place: Option<String>,
    /// End point as LAT,LON.
    #[arg(long, value_parser = parse_coordinate, conflicts_with = "to_place", required_unless_present = "to_place")]
    pub to: Option<Coordinate>,
    /// End point by place name.
    #[arg(long = "to-place")]
    pub to_place: Option<String>,
    /// Search algorithm (overrides config and environment).
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,
    /// Search steps per animation frame.
    #[arg(long)]
    pub speed: Option<usize>,
    /// Selection radius around the start point in kilometres.
    #[arg(long = "radius")]
    pub radius_km: Option<f64>,
    /// JSON session configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Playback time advanced by each simulated frame.
    #[arg(long = "frame-ms", default_value_t = 1000.0 / 60.0)]
    pub frame_ms: f64,
    /// Upper bound on simulated frames.
    #[arg(long = "max-frames", default_value_t = 1_000_000)]
    pub max_frames: usize,
}

/// Arguments for the `nearest` subcommand.
#[derive(Args, Debug, Clone)]
pub struct NearestArgs {
    /// Point to snap, as LAT,LON.
    #[arg(long, value_parser = parse_coordinate)]
    pub at: Coordinate,
    /// Number of candidates to list.
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    raw.parse::<Coordinate>().map_err(|err| err.to_string())
}
