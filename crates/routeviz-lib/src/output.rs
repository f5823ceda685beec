use std::fmt::Write;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::NodeId;
use crate::search::{Algorithm, SearchStatus};
use crate::session::Session;
use crate::timeline::SegmentKind;

const MILES_PER_KM: f64 = 0.621371;

/// Presentation style for turning a [`RunSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    PlainText,
    RichText,
}

/// Endpoint of a run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunEndpoint {
    pub id: NodeId,
    pub coord: Coordinate,
}

/// Node on the traced route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunStep {
    pub index: usize,
    pub id: NodeId,
    pub coord: Coordinate,
}

/// Outcome of one search and its playback.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub algorithm: Algorithm,
    pub status: SearchStatus,
    pub start: RunEndpoint,
    pub goal: RunEndpoint,
    pub steps: Vec<RunStep>,
    pub hops: usize,
    /// Route weight in coordinate-distance units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Great-circle length of the route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub visited: usize,
    pub search_steps: usize,
    pub frames: usize,
    pub search_frames: usize,
    pub max_time: f64,
    pub exploration_segments: usize,
    pub route_segments: usize,
}

impl RunSummary {
    /// Summarise the session's current run.
    pub fn from_session(session: &Session) -> Result<Self> {
        let engine = session
            .engine()
            .ok_or_else(|| Error::invalid("no region graph is installed"))?;
        let (Some(start), Some(goal)) = (engine.start_node(), engine.goal_node()) else {
            return Err(Error::invalid("no search has been started"));
        };
        let graph = engine.graph();
        let endpoint = |id: NodeId| -> Result<RunEndpoint> {
            let coord = graph.coordinate(id).ok_or(Error::UnknownNode { id })?;
            Ok(RunEndpoint { id, coord })
        };

        let mut steps = Vec::new();
        if let Some(route) = session.route() {
            for (index, id) in route.nodes().into_iter().enumerate() {
                let coord = graph.coordinate(id).ok_or(Error::UnknownNode { id })?;
                steps.push(RunStep { index, id, coord });
            }
        }
        let distance_km = session.route().map(|_| {
            steps
                .windows(2)
                .map(|pair| pair[0].coord.haversine_km(&pair[1].coord))
                .sum::<f64>()
        });

        let timeline = session.timeline();
        Ok(Self {
            algorithm: engine.algorithm(),
            status: engine.status(),
            start: endpoint(start)?,
            goal: endpoint(goal)?,
            hops: steps.len().saturating_sub(1),
            steps,
            cost: session.route().map(|route| route.cost),
            distance_km,
            visited: engine.visited_count(),
            search_steps: engine.steps(),
            frames: session.frames(),
            search_frames: session.search_frames(),
            max_time: session.max_time(),
            exploration_segments: timeline.count(SegmentKind::Exploration),
            route_segments: timeline.count(SegmentKind::Route),
        })
    }

    pub fn render(&self, mode: RenderMode) -> String {
        match mode {
            RenderMode::PlainText => self.render_plain(),
            RenderMode::RichText => self.render_rich(),
        }
    }

    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route: {} -> {} ({} hops, algorithm: {}, status: {})",
            self.start.id,
            self.goal.id,
            self.hops,
            self.algorithm,
            status_label(self.status)
        );
        for step in &self.steps {
            let _ = writeln!(buffer, "{:>3}: {} ({})", step.index, step.id, step.coord);
        }
        if let Some(distance) = self.distance_km {
            let _ = writeln!(
                buffer,
                "Path distance: {:.2} km ({:.2} miles)",
                distance,
                distance * MILES_PER_KM
            );
        }
        let _ = writeln!(
            buffer,
            "Explored {} nodes in {} steps over {} frames; timeline {:.0} ({} exploration, {} route segments)",
            self.visited,
            self.search_steps,
            self.search_frames,
            self.max_time,
            self.exploration_segments,
            self.route_segments
        );
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**Route** _{} → {}_ ({} hops, algorithm: `{}`, status: `{}`)",
            self.start.id,
            self.goal.id,
            self.hops,
            self.algorithm,
            status_label(self.status)
        );
        for step in &self.steps {
            let _ = writeln!(buffer, "* {:>2}. **{}** (`{}`)", step.index, step.id, step.coord);
        }
        if let Some(distance) = self.distance_km {
            let _ = writeln!(buffer, "_Path distance: {distance:.2} km_");
        }
        buffer
    }
}

fn status_label(status: SearchStatus) -> &'static str {
    match status {
        SearchStatus::Idle => "idle",
        SearchStatus::Running => "running",
        SearchStatus::Finished => "finished",
        SearchStatus::Failed => "failed",
    }
}
