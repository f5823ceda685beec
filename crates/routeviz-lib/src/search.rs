//! Step-resumable shortest-path search.
//!
//! [`SearchEngine`] runs A* or Dijkstra one node expansion at a time so a host
//! can interleave search work with rendering. Each call to
//! [`SearchEngine::step`] reports the nodes whose best-known predecessor
//! changed; the animation timeline turns those into exploration segments.
//!
//! Per-run state (costs, parents, visit status) lives in an annotation table
//! keyed by node id. The [`Graph`] itself is never written to.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::error::{Error, Result};
use crate::frontier::PriorityFrontier;
use crate::geo::Coordinate;
use crate::graph::{Graph, NodeId};

/// Supported search algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// A* guided by straight-line distance to the goal.
    #[serde(rename = "astar", alias = "a_star", alias = "a-star")]
    AStar,
    /// Dijkstra's algorithm (uniform-cost search).
    #[default]
    Dijkstra,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Algorithm::AStar => "astar",
            Algorithm::Dijkstra => "dijkstra",
        };
        f.write_str(value)
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "astar" | "a_star" | "a-star" | "a*" => Ok(Algorithm::AStar),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            other => Err(Error::InvalidConfig {
                key: "algorithm".to_string(),
                message: format!("unknown algorithm '{other}' (expected astar or dijkstra)"),
            }),
        }
    }
}

/// Lifecycle of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Idle,
    Running,
    Finished,
    /// The frontier emptied before the goal was reached.
    Failed,
}

impl SearchStatus {
    /// Whether the run has stopped producing steps.
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchStatus::Finished | SearchStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStatus {
    #[default]
    Unvisited,
    Open,
    Visited,
}

/// Per-node search state for the current run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation {
    /// Best known cost from the start node.
    pub g: f64,
    /// `g` plus the heuristic estimate to the goal.
    pub f: f64,
    pub parent: Option<NodeId>,
    pub status: NodeStatus,
}

impl Default for Annotation {
    fn default() -> Self {
        Self {
            g: f64::INFINITY,
            f: f64::INFINITY,
            parent: None,
            status: NodeStatus::Unvisited,
        }
    }
}

/// A node whose best-known predecessor changed during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdatedNode {
    pub node: NodeId,
    /// The node it is now reached from.
    pub referer: NodeId,
}

/// Read access to the parent links of a finished search.
///
/// [`crate::trace::RouteTracer`] walks anything implementing this, which keeps
/// the tracer testable against hand-built (or deliberately broken) chains.
pub trait ParentLinks {
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// Upper bound on the length of any valid chain.
    fn node_count(&self) -> usize;
}

/// Incremental A*/Dijkstra state machine over a [`Graph`].
#[derive(Debug)]
pub struct SearchEngine {
    graph: Graph,
    algorithm: Algorithm,
    start: Option<NodeId>,
    goal: Option<NodeId>,
    goal_coord: Option<Coordinate>,
    annotations: HashMap<NodeId, Annotation>,
    frontier: PriorityFrontier,
    status: SearchStatus,
    steps: usize,
    visited: usize,
}

impl SearchEngine {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            algorithm: Algorithm::default(),
            start: None,
            goal: None,
            goal_coord: None,
            annotations: HashMap::new(),
            frontier: PriorityFrontier::new(),
            status: SearchStatus::Idle,
            steps: 0,
            visited: 0,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn start_node(&self) -> Option<NodeId> {
        self.start
    }

    pub fn goal_node(&self) -> Option<NodeId> {
        self.goal
    }

    /// Number of `step()` calls that did work in the current run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of nodes popped from the frontier in the current run.
    pub fn visited_count(&self) -> usize {
        self.visited
    }

    /// Number of nodes currently waiting in the frontier.
    pub fn open_count(&self) -> usize {
        self.frontier.len()
    }

    pub fn annotation(&self, node: NodeId) -> Option<&Annotation> {
        self.annotations.get(&node)
    }

    /// Best known cost from the start node, if the node has been reached.
    pub fn cost(&self, node: NodeId) -> Option<f64> {
        self.annotations
            .get(&node)
            .map(|a| a.g)
            .filter(|g| g.is_finite())
    }

    pub fn node_status(&self, node: NodeId) -> NodeStatus {
        self.annotations
            .get(&node)
            .map(|a| a.status)
            .unwrap_or_default()
    }

    /// Begin a new run from `start` to `goal`.
    ///
    /// Any previous finished or failed run is discarded. Starting while a run
    /// is still in progress is rejected.
    pub fn start(&mut self, algorithm: Algorithm, start: NodeId, goal: NodeId) -> Result<()> {
        if self.status == SearchStatus::Running {
            return Err(Error::invalid(
                "a search is already running; reset it before starting another",
            ));
        }
        if !self.graph.contains(start) {
            return Err(Error::UnknownNode { id: start });
        }
        let Some(goal_coord) = self.graph.coordinate(goal) else {
            return Err(Error::UnknownNode { id: goal });
        };

        self.clear_run();
        self.algorithm = algorithm;
        self.start = Some(start);
        self.goal = Some(goal);
        self.goal_coord = Some(goal_coord);

        let h = self.heuristic(start);
        self.annotations.insert(
            start,
            Annotation {
                g: 0.0,
                f: h,
                parent: None,
                status: NodeStatus::Open,
            },
        );
        self.frontier.push(start, h, 0.0);
        self.status = SearchStatus::Running;

        info!(
            %algorithm,
            start,
            goal,
            nodes = self.graph.len(),
            "search started"
        );
        Ok(())
    }

    /// Expand one node.
    ///
    /// Returns the neighbours whose best-known predecessor changed. Outside of
    /// `Running` this is a no-op returning nothing.
    pub fn step(&mut self) -> Vec<UpdatedNode> {
        if self.status != SearchStatus::Running {
            return Vec::new();
        }

        let Some(entry) = self.frontier.pop() else {
            self.fail();
            return Vec::new();
        };
        self.steps += 1;
        self.visited += 1;

        let current = entry.node;
        let current_g = {
            let annotation = self.annotations.entry(current).or_default();
            annotation.status = NodeStatus::Visited;
            annotation.g
        };
        trace!(node = current, g = current_g, "expanding node");

        if Some(current) == self.goal {
            self.status = SearchStatus::Finished;
            info!(
                goal = current,
                cost = current_g,
                visited = self.visited,
                steps = self.steps,
                "search finished"
            );
            return Vec::new();
        }

        let mut updated = Vec::new();
        for edge in self.graph.neighbours(current) {
            let next = edge.target;
            let candidate = current_g + edge.weight;
            let known = self.annotations.get(&next).copied().unwrap_or_default();

            let improves = match known.status {
                NodeStatus::Visited => false,
                NodeStatus::Unvisited => true,
                NodeStatus::Open => candidate < known.g,
            };
            if !improves {
                continue;
            }

            let f = candidate + self.heuristic(next);
            self.annotations.insert(
                next,
                Annotation {
                    g: candidate,
                    f,
                    parent: Some(current),
                    status: NodeStatus::Open,
                },
            );
            self.frontier.push(next, f, candidate);
            updated.push(UpdatedNode {
                node: next,
                referer: current,
            });
        }

        if self.frontier.is_empty() {
            self.fail();
        }
        updated
    }

    /// Step until the run leaves `Running`, returning the final status.
    pub fn run_to_end(&mut self) -> SearchStatus {
        while self.status == SearchStatus::Running {
            self.step();
        }
        self.status
    }

    /// Return to `Idle`, discarding annotations and the frontier.
    pub fn reset(&mut self) {
        self.clear_run();
        self.start = None;
        self.goal = None;
        self.goal_coord = None;
        self.status = SearchStatus::Idle;
    }

    fn clear_run(&mut self) {
        self.annotations.clear();
        self.frontier.clear();
        self.steps = 0;
        self.visited = 0;
    }

    fn fail(&mut self) {
        self.status = SearchStatus::Failed;
        info!(
            start = self.start,
            goal = self.goal,
            visited = self.visited,
            "search failed: frontier exhausted"
        );
    }

    fn heuristic(&self, node: NodeId) -> f64 {
        match self.algorithm {
            Algorithm::Dijkstra => 0.0,
            Algorithm::AStar => match (self.graph.coordinate(node), self.goal_coord) {
                (Some(from), Some(goal)) => from.distance_to(&goal),
                _ => 0.0,
            },
        }
    }
}

impl ParentLinks for SearchEngine {
    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.annotations.get(&node).and_then(|a| a.parent)
    }

    fn node_count(&self) -> usize {
        self.graph.len()
    }
}
