//! Routeviz library entry points.
//!
//! This crate implements the engine behind an animated shortest-path
//! visualization: a step-resumable A*/Dijkstra search over a road graph, the
//! route tracer, the time-stamped waypoint timeline that a renderer scrubs
//! through, and the per-frame animation clock. [`Session`] ties them together
//! with region selection and keyboard bindings. Hosts (the CLI, a map view)
//! should only depend on the items exported here.
//!

pub mod clock;
pub mod config;
pub mod dataset;
pub mod error;
pub mod frontier;
pub mod geo;
pub mod graph;
pub mod input;
pub mod output;
pub mod places;
pub mod provider;
pub mod search;
pub mod session;
pub mod spatial;
pub mod timeline;
pub mod trace;

pub use clock::{route_multiplier, AnimationClock, Direction, FrameReport, PlaybackState};
pub use config::SessionConfig;
pub use dataset::{load_dataset, Dataset, GraphDocument};
pub use error::{Error, ErrorKind, Notification, NotificationLevel, Result};
pub use frontier::PriorityFrontier;
pub use geo::{selection_circle, BoundingBox, Coordinate};
pub use graph::{Edge, Graph, GraphBuilder, Node, NodeId};
pub use input::{Command, InputBindings, Key, KeyAction, KeyEvent};
pub use output::{RenderMode, RunSummary};
pub use places::{Gazetteer, Place};
pub use provider::{LocalMapProvider, MapProvider};
pub use search::{Algorithm, ParentLinks, SearchEngine, SearchStatus, UpdatedNode};
pub use session::{Region, RegionOutcome, RegionTicket, Session};
pub use spatial::{NearestNode, SpatialIndex};
pub use timeline::{SegmentKind, SegmentVisibility, Waypoint, WaypointTimeline};
pub use trace::{Route, RouteEdge, RouteTracer};
