//! Map data collaborators.
//!
//! A session never talks to a data source directly. It goes through
//! [`MapProvider`], whose operations are asynchronous so a host can back them
//! with a network service. [`LocalMapProvider`] answers from an in-memory
//! [`Dataset`].

use std::future::Future;

use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::geo::{BoundingBox, Coordinate};
use crate::graph::{Graph, NodeId};
use crate::places::Gazetteer;
use crate::spatial::{NearestNode, SpatialIndex};

/// Source of road graphs, node snapping and place-name lookup.
pub trait MapProvider {
    /// Fetch the road graph inside `bbox`. The result must contain `root`.
    fn fetch_graph(
        &self,
        bbox: BoundingBox,
        root: NodeId,
    ) -> impl Future<Output = Result<Graph>> + Send;

    /// Snap a point to the closest road node, if any is close enough.
    fn find_nearest_node(
        &self,
        point: Coordinate,
    ) -> impl Future<Output = Result<Option<NearestNode>>> + Send;

    /// Resolve a place name to a coordinate.
    fn resolve_place_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>>> + Send;

    /// Known names resembling `name`, used to enrich lookup failures.
    fn place_suggestions(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }
}

/// [`MapProvider`] backed by a loaded dataset.
#[derive(Debug)]
pub struct LocalMapProvider {
    graph: Graph,
    index: SpatialIndex,
    places: Gazetteer,
    snap_radius_km: f64,
}

impl LocalMapProvider {
    pub fn new(dataset: Dataset, snap_radius_km: f64) -> Self {
        let index = SpatialIndex::build(&dataset.graph);
        Self {
            graph: dataset.graph,
            index,
            places: dataset.places,
            snap_radius_km,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn places(&self) -> &Gazetteer {
        &self.places
    }

    fn extract(&self, bbox: BoundingBox, root: NodeId) -> Result<Graph> {
        if !self.graph.contains(root) {
            return Err(Error::fetch(format!("root node {root} is not in the dataset")));
        }
        let region = self.graph.subgraph(&bbox);
        if !region.contains(root) {
            return Err(Error::fetch(format!(
                "root node {root} lies outside the requested bounding box"
            )));
        }
        debug!(root, nodes = region.len(), "extracted region graph");
        Ok(region)
    }

    fn snap(&self, point: Coordinate) -> Option<NearestNode> {
        self.index
            .nearest(point)
            .filter(|hit| hit.coord.haversine_km(&point) <= self.snap_radius_km)
    }
}

impl MapProvider for LocalMapProvider {
    fn fetch_graph(
        &self,
        bbox: BoundingBox,
        root: NodeId,
    ) -> impl Future<Output = Result<Graph>> + Send {
        std::future::ready(self.extract(bbox, root))
    }

    fn find_nearest_node(
        &self,
        point: Coordinate,
    ) -> impl Future<Output = Result<Option<NearestNode>>> + Send {
        std::future::ready(Ok(self.snap(point)))
    }

    fn resolve_place_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Coordinate>>> + Send {
        std::future::ready(Ok(self.places.lookup(name).map(|place| place.coordinate())))
    }

    fn place_suggestions(&self, name: &str) -> Vec<String> {
        self.places.suggestions(name, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::GraphDocument;

    fn provider() -> LocalMapProvider {
        let document = GraphDocument::from_json(
            r#"{
                "nodes": [
                    {"id": 1, "lat": 30.000, "lon": 78.000},
                    {"id": 2, "lat": 30.001, "lon": 78.000},
                    {"id": 3, "lat": 30.500, "lon": 78.000}
                ],
                "ways": [{"nodes": [1, 2, 3]}],
                "places": [{"name": "Depot", "lat": 30.001, "lon": 78.0}]
            }"#,
        )
        .unwrap();
        LocalMapProvider::new(Dataset::from_document(document).unwrap(), 0.5)
    }

    #[tokio::test]
    async fn fetch_graph_cuts_the_region() {
        let provider = provider();
        let bbox = BoundingBox::around(Coordinate::new(30.0, 78.0), 4.0);
        let graph = provider.fetch_graph(bbox, 1).await.unwrap();
        assert_eq!(graph.node_ids(), vec![1, 2]);

        let err = provider.fetch_graph(bbox, 3).await.unwrap_err();
        assert!(matches!(err, Error::DataFetch { .. }));
    }

    #[tokio::test]
    async fn snapping_respects_the_radius() {
        let provider = provider();
        let near = provider
            .find_nearest_node(Coordinate::new(30.0009, 78.0001))
            .await
            .unwrap();
        assert_eq!(near.map(|n| n.id), Some(2));

        let far = provider
            .find_nearest_node(Coordinate::new(30.25, 78.0))
            .await
            .unwrap();
        assert!(far.is_none());
    }

    #[tokio::test]
    async fn place_names_resolve_through_the_gazetteer() {
        let provider = provider();
        let depot = provider.resolve_place_name("depot").await.unwrap();
        assert_eq!(depot, Some(Coordinate::new(30.001, 78.0)));
        assert_eq!(provider.resolve_place_name("Nowhere").await.unwrap(), None);
        assert_eq!(provider.place_suggestions("Depo"), vec!["Depot".to_string()]);
    }
}
