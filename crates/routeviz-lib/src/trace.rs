//! Backtrace of the final route once a search has finished.

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::NodeId;
use crate::search::{ParentLinks, SearchEngine, SearchStatus};

/// One hop of the traced route, reached from `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteEdge {
    pub node: NodeId,
    pub parent: NodeId,
}

/// Final route reconstructed from parent links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub start: NodeId,
    pub goal: NodeId,
    /// Hops ordered from the goal back to the start.
    edges: Vec<RouteEdge>,
    /// Total edge weight along the route.
    pub cost: f64,
}

impl Route {
    /// Hops in backtrace order (goal first).
    pub fn edges(&self) -> &[RouteEdge] {
        &self.edges
    }

    /// Hops in travel order (start first).
    pub fn edges_forward(&self) -> impl Iterator<Item = &RouteEdge> {
        self.edges.iter().rev()
    }

    /// Node identifiers from start to goal.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.edges.len() + 1);
        nodes.push(self.start);
        nodes.extend(self.edges_forward().map(|edge| edge.node));
        nodes
    }

    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }
}

/// Walks parent links from the goal back to the start.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTracer;

impl RouteTracer {
    pub fn new() -> Self {
        Self
    }

    /// Trace the route of a finished search.
    pub fn trace(&self, engine: &SearchEngine) -> Result<Route> {
        if engine.status() != SearchStatus::Finished {
            return Err(Error::invalid(format!(
                "route can only be traced once the search has finished (status: {:?})",
                engine.status()
            )));
        }
        let (Some(start), Some(goal)) = (engine.start_node(), engine.goal_node()) else {
            return Err(Error::InvariantViolation {
                message: "finished search has no endpoints".to_string(),
            });
        };

        let edges = self.backtrace(engine, start, goal)?;
        let cost = engine.cost(goal).ok_or_else(|| Error::InvariantViolation {
            message: format!("finished search has no cost for goal node {goal}"),
        })?;
        debug!(start, goal, hops = edges.len(), cost, "route traced");

        Ok(Route {
            start,
            goal,
            edges,
            cost,
        })
    }

    /// Follow parent links from `goal` until a node without a parent.
    ///
    /// The walk is bounded by the number of nodes; a longer chain can only be
    /// a cycle. The chain must end exactly at `start`.
    pub fn backtrace<L: ParentLinks>(
        &self,
        links: &L,
        start: NodeId,
        goal: NodeId,
    ) -> Result<Vec<RouteEdge>> {
        let hop_limit = links.node_count();
        let mut edges = Vec::new();
        let mut current = goal;

        while let Some(parent) = links.parent_of(current) {
            if edges.len() >= hop_limit {
                return Err(Error::InvariantViolation {
                    message: format!(
                        "parent chain from node {goal} exceeds {hop_limit} hops; links contain a cycle"
                    ),
                });
            }
            edges.push(RouteEdge {
                node: current,
                parent,
            });
            current = parent;
        }

        if current != start {
            return Err(Error::InvariantViolation {
                message: format!(
                    "parent chain from node {goal} ends at node {current} instead of start node {start}"
                ),
            });
        }
        Ok(edges)
    }
}
