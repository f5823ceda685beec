//! Nearest command handler: snap a point to the closest road nodes.

use anyhow::{bail, Context, Result};
use serde::Serialize;

use routeviz_lib::{Coordinate, Dataset, NodeId, SpatialIndex};

use crate::terminal::ColorPalette;
use crate::{NearestArgs, OutputFormat};

/// One snapping candidate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NearestCandidate {
    pub id: NodeId,
    pub coord: Coordinate,
    pub distance_km: f64,
}

/// Candidates ordered from closest to farthest.
pub fn nearest_candidates(dataset: &Dataset, at: Coordinate, count: usize) -> Vec<NearestCandidate> {
    let index = SpatialIndex::build(&dataset.graph);
    index
        .nearest_n(at, count)
        .into_iter()
        .map(|hit| NearestCandidate {
            id: hit.id,
            coord: hit.coord,
            distance_km: hit.coord.haversine_km(&at),
        })
        .collect()
}

pub fn handle_nearest_command(
    dataset: &Dataset,
    args: &NearestArgs,
    format: OutputFormat,
) -> Result<()> {
    if args.count == 0 {
        bail!("--count must be at least 1");
    }
    let candidates = nearest_candidates(dataset, args.at, args.count);
    if candidates.is_empty() {
        bail!("the graph document contains no nodes");
    }

    match format {
        OutputFormat::Json | OutputFormat::Timeline => {
            let json = serde_json::to_string_pretty(&candidates)
                .context("failed to serialize nearest nodes")?;
            println!("{json}");
        }
        OutputFormat::Text | OutputFormat::Rich => {
            let p = ColorPalette::detect();
            println!("Nearest nodes to {}:", args.at);
            for candidate in &candidates {
                println!(
                    "- {}{}{} ({}) {}{:.3} km{}",
                    p.white_bold,
                    candidate.id,
                    p.reset,
                    candidate.coord,
                    p.cyan,
                    candidate.distance_km,
                    p.reset
                );
            }
        }
    }
    Ok(())
}
