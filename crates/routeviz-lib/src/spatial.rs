//! KD-tree index for snapping picked coordinates to graph nodes.
//!
//! Points are indexed as `[lat, lon]` in degrees, the same planar metric the
//! search uses for edge weights. Callers that need a physical bound (the
//! snapping radius) convert the winning candidate with
//! [`Coordinate::haversine_km`].

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::geo::Coordinate;
use crate::graph::{Graph, NodeId};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Node matched by a nearest-neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestNode {
    pub id: NodeId,
    pub coord: Coordinate,
    /// Planar distance in degrees.
    pub distance: f64,
}

pub struct SpatialIndex {
    tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32>,
    /// Indexed nodes; tree items are positions in this vector.
    nodes: Vec<(NodeId, Coordinate)>,
}

impl SpatialIndex {
    pub fn build(graph: &Graph) -> Self {
        let mut nodes: Vec<(NodeId, Coordinate)> =
            graph.nodes().map(|node| (node.id, node.coord)).collect();
        // Stable item order keeps equidistant ties deterministic.
        nodes.sort_unstable_by_key(|(id, _)| *id);

        let mut tree: KdTree<f64, usize, 2, BUCKET_SIZE, u32> = KdTree::new();
        for (index, (_, coord)) in nodes.iter().enumerate() {
            tree.add(&[coord.lat, coord.lon], index);
        }
        debug!(node_count = nodes.len(), "built spatial index");

        Self { tree, nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Closest indexed node to `point`.
    pub fn nearest(&self, point: Coordinate) -> Option<NearestNode> {
        self.nearest_n(point, 1).into_iter().next()
    }

    /// Up to `k` closest nodes, nearest first.
    pub fn nearest_n(&self, point: Coordinate, k: usize) -> Vec<NearestNode> {
        if k == 0 || self.nodes.is_empty() {
            return Vec::new();
        }

        let mut found: Vec<NearestNode> = self
            .tree
            .nearest_n::<SquaredEuclidean>(&[point.lat, point.lon], k)
            .into_iter()
            .map(|neighbour| {
                let (id, coord) = self.nodes[neighbour.item];
                NearestNode {
                    id,
                    coord,
                    distance: neighbour.distance.sqrt(),
                }
            })
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        found
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("node_count", &self.nodes.len())
            .finish()
    }
}
