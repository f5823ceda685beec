use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::error::{Error, Result};
use crate::geo::{BoundingBox, Coordinate};

/// Numeric identifier for a road-network node.
pub type NodeId = i64;

/// Directed edge within the road graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    /// Euclidean distance between the endpoint coordinates.
    pub weight: f64,
}

/// Road-network node with its outgoing edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub coord: Coordinate,
    pub edges: Vec<Edge>,
}

/// Immutable adjacency structure shared between searches.
///
/// Cloning is cheap; every clone points at the same node table. Search state
/// never lives here, so a graph can be reused across any number of runs.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Arc<HashMap<NodeId, Node>>,
}

impl Graph {
    /// Validate a node table and wrap it into a graph.
    pub fn from_nodes(nodes: HashMap<NodeId, Node>) -> Result<Self> {
        for node in nodes.values() {
            if let Some(edge) = node.edges.iter().find(|e| !nodes.contains_key(&e.target)) {
                return Err(Error::DanglingNeighbor {
                    node: node.id,
                    target: edge.target,
                });
            }
        }
        Ok(Self {
            nodes: Arc::new(nodes),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn coordinate(&self, id: NodeId) -> Option<Coordinate> {
        self.nodes.get(&id).map(|node| node.coord)
    }

    /// Return the outgoing edges for a node, in insertion order.
    pub fn neighbours(&self, id: NodeId) -> &[Edge] {
        self.nodes
            .get(&id)
            .map(|node| node.edges.as_slice())
            .unwrap_or(&[])
    }

    /// Weight of the cheapest edge from `from` to `to`, if one exists.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.neighbours(from)
            .iter()
            .filter(|edge| edge.target == to)
            .map(|edge| edge.weight)
            .min_by(f64::total_cmp)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Node identifiers in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Restrict the graph to the nodes inside `bbox`.
    ///
    /// Edges leaving the box are dropped so the result stays closed.
    pub fn subgraph(&self, bbox: &BoundingBox) -> Graph {
        let inside: HashMap<NodeId, &Node> = self
            .nodes
            .values()
            .filter(|node| bbox.contains(&node.coord))
            .map(|node| (node.id, node))
            .collect();

        let nodes = inside
            .iter()
            .map(|(&id, node)| {
                let edges = node
                    .edges
                    .iter()
                    .filter(|edge| inside.contains_key(&edge.target))
                    .cloned()
                    .collect();
                (
                    id,
                    Node {
                        id,
                        coord: node.coord,
                        edges,
                    },
                )
            })
            .collect();

        Graph {
            nodes: Arc::new(nodes),
        }
    }
}

/// Incremental constructor for [`Graph`].
///
/// Edge weights are always derived from node coordinates, so the graph and the
/// A* heuristic share one metric.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: HashMap<NodeId, Node>,
    pending: Vec<(NodeId, NodeId)>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Re-adding an identifier replaces its coordinate.
    pub fn node(mut self, id: NodeId, coord: Coordinate) -> Self {
        self.add_node(id, coord);
        self
    }

    /// Connect two nodes in both directions.
    pub fn connect(mut self, a: NodeId, b: NodeId) -> Self {
        self.add_connection(a, b, false);
        self
    }

    /// Connect `from` to `to` only.
    pub fn connect_one_way(mut self, from: NodeId, to: NodeId) -> Self {
        self.add_connection(from, to, true);
        self
    }

    pub fn add_node(&mut self, id: NodeId, coord: Coordinate) {
        if let Some(existing) = self.nodes.get_mut(&id) {
            warn!(node = id, "duplicate node id; keeping the later coordinate");
            existing.coord = coord;
            return;
        }
        self.nodes.insert(
            id,
            Node {
                id,
                coord,
                edges: Vec::new(),
            },
        );
    }

    pub fn add_connection(&mut self, from: NodeId, to: NodeId, one_way: bool) {
        self.pending.push((from, to));
        if !one_way {
            self.pending.push((to, from));
        }
    }

    /// Resolve connections into weighted edges and validate the result.
    pub fn build(mut self) -> Result<Graph> {
        for (from, to) in std::mem::take(&mut self.pending) {
            let Some(target) = self.nodes.get(&to).map(|node| node.coord) else {
                return Err(Error::DanglingNeighbor {
                    node: from,
                    target: to,
                });
            };
            let Some(source) = self.nodes.get_mut(&from) else {
                return Err(Error::UnknownNode { id: from });
            };
            if from == to || source.edges.iter().any(|edge| edge.target == to) {
                continue;
            }

            let weight = source.coord.distance_to(&target);
            if weight == 0.0 {
                warn!(from, to, "zero-length edge between coincident nodes");
            }
            source.edges.push(Edge { target: to, weight });
        }

        Graph::from_nodes(self.nodes)
    }
}
