//! JSON road-network documents.
//!
//! A document lists nodes, the ways that join them, and optionally a set of
//! named places:
//!
//! ```json
//! {
//!   "nodes": [{ "id": 1, "lat": 30.31, "lon": 78.03 }, { "id": 2, "lat": 30.32, "lon": 78.03 }],
//!   "ways": [{ "nodes": [1, 2], "oneway": false }],
//!   "places": [{ "name": "Clock Tower", "lat": 30.32, "lon": 78.04 }]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::geo::Coordinate;
use crate::graph::{Graph, GraphBuilder, NodeId};
use crate::places::{Gazetteer, Place};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

/// Sequence of nodes joined pairwise by road segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WayRecord {
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub oneway: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub ways: Vec<WayRecord>,
    #[serde(default)]
    pub places: Vec<Place>,
}

impl GraphDocument {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Build the graph described by this document.
    pub fn to_graph(&self) -> Result<Graph> {
        let mut builder = GraphBuilder::new();
        for node in &self.nodes {
            builder.add_node(node.id, Coordinate::new(node.lat, node.lon));
        }
        for way in &self.ways {
            for pair in way.nodes.windows(2) {
                builder.add_connection(pair[0], pair[1], way.oneway);
            }
        }
        builder.build()
    }
}

/// Graph and gazetteer loaded from one document.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub graph: Graph,
    pub places: Gazetteer,
}

impl Dataset {
    pub fn from_document(document: GraphDocument) -> Result<Self> {
        let graph = document.to_graph()?;
        Ok(Self {
            graph,
            places: Gazetteer::new(document.places),
        })
    }
}

/// Read a graph document from disk.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)?;
    let dataset = Dataset::from_document(GraphDocument::from_json(&raw)?)?;
    info!(
        path = %path.display(),
        nodes = dataset.graph.len(),
        places = dataset.places.len(),
        "loaded graph document"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn ways_join_consecutive_nodes() {
        let document = GraphDocument::from_json(
            r#"{
                "nodes": [
                    {"id": 1, "lat": 0.0, "lon": 0.0},
                    {"id": 2, "lat": 0.0, "lon": 1.0},
                    {"id": 3, "lat": 0.0, "lon": 2.0}
                ],
                "ways": [
                    {"nodes": [1, 2, 3]},
                    {"nodes": [3, 1], "oneway": true}
                ]
            }"#,
        )
        .unwrap();
        let graph = document.to_graph().unwrap();
        assert_eq!(graph.neighbours(2).len(), 2);
        assert_eq!(graph.edge_weight(3, 1), Some(2.0));
        assert_eq!(graph.edge_weight(1, 3), None);
    }

    #[test]
    fn unknown_way_node_is_rejected() {
        let document = GraphDocument::from_json(
            r#"{"nodes": [{"id": 1, "lat": 0.0, "lon": 0.0}], "ways": [{"nodes": [1, 5]}]}"#,
        )
        .unwrap();
        assert!(matches!(
            document.to_graph(),
            Err(Error::DanglingNeighbor { node: 1, target: 5 })
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            GraphDocument::from_json("{\"nodes\": 4}"),
            Err(Error::Json(_))
        ));
    }
}
