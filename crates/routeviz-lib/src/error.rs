use thiserror::Error;

use crate::geo::Coordinate;
use crate::graph::NodeId;

/// Convenient result alias for the routeviz library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The frontier was exhausted before the goal was reached.
    #[error("no path found between node {start} and node {goal}")]
    NoPathFound { start: NodeId, goal: NodeId },

    /// Graph download or nearest-node lookup failed.
    #[error("failed to fetch map data: {message}")]
    DataFetch { message: String },

    /// The caller broke an operation contract (e.g. starting twice).
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },

    /// Internal search state is corrupted; the current run must be reset.
    #[error("search invariant violated: {message}")]
    InvariantViolation { message: String },

    /// Raised when a node identifier does not exist in the loaded graph.
    #[error("node {id} is not part of the loaded graph")]
    UnknownNode { id: NodeId },

    /// Raised when a neighbour reference points outside the graph.
    #[error("node {node} references missing neighbour {target}")]
    DanglingNeighbor { node: NodeId, target: NodeId },

    /// Raised when a place name could not be resolved.
    #[error("unknown place name: {name}{}", format_suggestions(.suggestions))]
    UnknownPlace {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when a picked point lies outside the active selection circle.
    #[error("point {point} lies outside the {radius_km} km selection radius")]
    OutsideSelection { point: Coordinate, radius_km: f64 },

    /// No road node lies close enough to a picked point.
    #[error("no road node within reach of {point}")]
    NoNearbyNode { point: Coordinate },

    /// Raised when the search is started before both endpoints are chosen.
    #[error("both a start and an end node must be selected")]
    MissingEndpoints,

    /// Raised when a gesture arrives while region data is still loading.
    #[error("map data for the selected region is still loading")]
    RegionLoading,

    /// Raised when a `LAT,LON` pair cannot be parsed.
    #[error("invalid coordinate '{input}': expected LAT,LON in degrees")]
    InvalidCoordinate { input: String },

    /// Raised when configuration values are out of range.
    #[error("invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used by hosts to decide how to react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoPathFound,
    DataFetch,
    InvalidOperation,
    InvariantViolation,
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Transient message a presentation layer shows for a failed gesture.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    pub(crate) fn fetch(message: impl Into<String>) -> Self {
        Error::DataFetch {
            message: message.into(),
        }
    }

    /// Classify the error into the engine's recovery taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoPathFound { .. } => ErrorKind::NoPathFound,
            Error::DataFetch { .. }
            | Error::NoNearbyNode { .. }
            | Error::DanglingNeighbor { .. }
            | Error::Io(_)
            | Error::Json(_) => ErrorKind::DataFetch,
            Error::InvariantViolation { .. } => ErrorKind::InvariantViolation,
            Error::InvalidOperation { .. }
            | Error::UnknownNode { .. }
            | Error::UnknownPlace { .. }
            | Error::OutsideSelection { .. }
            | Error::MissingEndpoints
            | Error::RegionLoading
            | Error::InvalidCoordinate { .. }
            | Error::InvalidConfig { .. } => ErrorKind::InvalidOperation,
        }
    }

    /// Whether the session remains usable without an explicit reset.
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::InvariantViolation
    }

    /// Translate the error into the message a user should see.
    pub fn notification(&self) -> Notification {
        let (level, message) = match self {
            Error::NoPathFound { .. } => (
                NotificationLevel::Error,
                "No path was found between the selected points.".to_string(),
            ),
            Error::DataFetch { .. } | Error::Io(_) | Error::Json(_) => (
                NotificationLevel::Error,
                "Error fetching map data. Please try again.".to_string(),
            ),
            Error::DanglingNeighbor { .. } => (
                NotificationLevel::Error,
                "The map data for this area is inconsistent. Please try another location."
                    .to_string(),
            ),
            Error::UnknownNode { .. } => (
                NotificationLevel::Error,
                "An error occurred. Please try again.".to_string(),
            ),
            Error::OutsideSelection { .. } => (
                NotificationLevel::Info,
                "Please select a point inside the radius.".to_string(),
            ),
            Error::NoNearbyNode { .. } => (
                NotificationLevel::Info,
                "No path was found in the vicinity, please try another location.".to_string(),
            ),
            Error::MissingEndpoints => (
                NotificationLevel::Info,
                "Please select a start and end node.".to_string(),
            ),
            Error::RegionLoading => (
                NotificationLevel::Info,
                "Please wait for all data to load.".to_string(),
            ),
            Error::UnknownPlace { .. } => (NotificationLevel::Info, self.to_string()),
            Error::InvariantViolation { .. } => (
                NotificationLevel::Error,
                "The search ended in an inconsistent state and was reset.".to_string(),
            ),
            Error::InvalidOperation { .. }
            | Error::InvalidCoordinate { .. }
            | Error::InvalidConfig { .. } => (NotificationLevel::Info, self.to_string()),
        };
        Notification { level, message }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
