//! Common test utilities and fixture helpers.

use std::path::PathBuf;

use routeviz_lib::{
    load_dataset, Coordinate, Dataset, Graph, GraphBuilder, NearestNode, NodeId, Session,
    SessionConfig,
};

pub const CLOCK_TOWER: NodeId = 1000;
pub const RAJPUR_ROAD: NodeId = 1022;
pub const PALTAN_BAZAAR: NodeId = 1044;
pub const ISLAND: NodeId = 2001;

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

#[allow(dead_code)]
pub fn grid_city_path() -> PathBuf {
    fixtures_dir().join("grid_city.json")
}

#[allow(dead_code)]
pub fn grid_city() -> Dataset {
    load_dataset(&grid_city_path()).expect("grid_city fixture loads")
}

/// `n` nodes spaced one degree apart along the equator, joined in order.
#[allow(dead_code)]
pub fn line_graph(n: i64) -> Graph {
    let mut builder = GraphBuilder::new();
    for i in 0..n {
        builder.add_node(i, Coordinate::new(0.0, i as f64));
    }
    for i in 0..n - 1 {
        builder.add_connection(i, i + 1, false);
    }
    builder.build().expect("line graph is valid")
}

#[allow(dead_code)]
pub fn snapped(graph: &Graph, id: NodeId) -> NearestNode {
    NearestNode {
        id,
        coord: graph.coordinate(id).expect("node exists"),
        distance: 0.0,
    }
}

/// Session over the grid city with both endpoints selected.
#[allow(dead_code)]
pub fn grid_session(config: SessionConfig, start: NodeId, end: NodeId) -> Session {
    let graph = grid_city().graph;
    let mut session = Session::new(config);
    let ticket = session
        .begin_region(snapped(&graph, start))
        .expect("region selection");
    let region = graph.subgraph(&ticket.bbox());
    session
        .finish_region(ticket, Ok(region))
        .expect("region installed");
    session
        .choose_end(snapped(&graph, end))
        .expect("end node selected");
    session
}
