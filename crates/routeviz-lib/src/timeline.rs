//! Time-stamped animation segments for exploration and route playback.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geo::Coordinate;

/// Default number of animation time units per degree of edge length.
pub const DEFAULT_TIME_SCALE: f64 = 50_000.0;

/// Colour class of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Edge touched while the search was exploring.
    Exploration,
    /// Edge on the final route.
    Route,
}

/// How much of a segment is visible at a given playback time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentVisibility {
    Hidden,
    /// Partly drawn; the value is the exposed fraction in `(0, 1)`.
    Partial(f64),
    Drawn,
}

/// Animated segment drawn from `path[0]` to `path[1]` over `timestamps`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub path: [Coordinate; 2],
    pub timestamps: [f64; 2],
    #[serde(rename = "color")]
    pub kind: SegmentKind,
}

impl Waypoint {
    pub fn start_time(&self) -> f64 {
        self.timestamps[0]
    }

    pub fn end_time(&self) -> f64 {
        self.timestamps[1]
    }

    pub fn visibility(&self, time: f64) -> SegmentVisibility {
        let [t0, t1] = self.timestamps;
        if t1 <= time {
            SegmentVisibility::Drawn
        } else if t0 > time || t0 == t1 {
            SegmentVisibility::Hidden
        } else {
            let fraction = (time - t0) / (t1 - t0);
            if fraction <= 0.0 {
                SegmentVisibility::Hidden
            } else {
                SegmentVisibility::Partial(fraction)
            }
        }
    }
}

/// Append-only sequence of waypoints with a running time cursor.
///
/// Waypoints are only ever appended at the cursor, so start times and end
/// times are both non-decreasing along the sequence.
#[derive(Debug, Clone)]
pub struct WaypointTimeline {
    waypoints: Vec<Waypoint>,
    timer: f64,
    scale: f64,
}

impl Default for WaypointTimeline {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

impl WaypointTimeline {
    pub fn new(scale: f64) -> Self {
        Self {
            waypoints: Vec::new(),
            timer: 0.0,
            scale,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Change the time scale used by later appends.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Append the segment `referer -> node`.
    ///
    /// Does nothing when either endpoint is missing. Returns the appended
    /// waypoint otherwise.
    pub fn append(
        &mut self,
        node: Option<Coordinate>,
        referer: Option<Coordinate>,
        kind: SegmentKind,
        multiplier: f64,
    ) -> Option<&Waypoint> {
        let (node, referer) = (node?, referer?);
        let duration = node.distance_to(&referer) * self.scale * multiplier;
        let start = self.timer;
        self.timer += duration;
        trace!(?kind, start, end = self.timer, "segment appended");

        self.waypoints.push(Waypoint {
            path: [referer, node],
            timestamps: [start, self.timer],
            kind,
        });
        self.waypoints.last()
    }

    /// Drop every waypoint and rewind the cursor.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.timer = 0.0;
    }

    /// Time at which the last appended segment finishes drawing.
    pub fn timer(&self) -> f64 {
        self.timer
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn count(&self, kind: SegmentKind) -> usize {
        self.waypoints.iter().filter(|w| w.kind == kind).count()
    }

    /// Waypoints with anything drawn at `time`, paired with their visibility.
    pub fn visible_at(&self, time: f64) -> impl Iterator<Item = (&Waypoint, SegmentVisibility)> {
        // Start times are sorted, so everything after the first hidden
        // segment is hidden as well.
        self.waypoints
            .iter()
            .map(move |w| (w, w.visibility(time)))
            .take_while(move |(w, _)| w.start_time() <= time)
            .filter(|(_, visibility)| *visibility != SegmentVisibility::Hidden)
    }

    /// Number of segments fully drawn at `time`.
    pub fn drawn_count(&self, time: f64) -> usize {
        self.waypoints
            .partition_point(|w| w.end_time() <= time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(lat: f64, lon: f64) -> Option<Coordinate> {
        Some(Coordinate::new(lat, lon))
    }

    #[test]
    fn append_advances_timer_by_scaled_distance() {
        let mut timeline = WaypointTimeline::new(10.0);
        timeline.append(c(0.0, 1.0), c(0.0, 0.0), SegmentKind::Exploration, 1.0);
        timeline.append(c(0.0, 3.0), c(0.0, 1.0), SegmentKind::Route, 2.0);

        assert_eq!(timeline.timer(), 50.0);
        assert_eq!(timeline.waypoints()[0].timestamps, [0.0, 10.0]);
        assert_eq!(timeline.waypoints()[1].timestamps, [10.0, 50.0]);
        assert_eq!(timeline.waypoints()[1].path[0], Coordinate::new(0.0, 1.0));
        assert_eq!(timeline.count(SegmentKind::Route), 1);
    }

    #[test]
    fn missing_endpoint_is_ignored() {
        let mut timeline = WaypointTimeline::default();
        assert!(timeline
            .append(None, c(0.0, 0.0), SegmentKind::Exploration, 1.0)
            .is_none());
        assert!(timeline
            .append(c(0.0, 0.0), None, SegmentKind::Route, 1.0)
            .is_none());
        assert!(timeline.is_empty());
        assert_eq!(timeline.timer(), 0.0);
    }

    #[test]
    fn visibility_follows_playback_time() {
        let mut timeline = WaypointTimeline::new(1.0);
        timeline.append(c(0.0, 4.0), c(0.0, 0.0), SegmentKind::Exploration, 1.0);
        timeline.append(c(0.0, 8.0), c(0.0, 4.0), SegmentKind::Exploration, 1.0);

        let w = &timeline.waypoints()[1];
        assert_eq!(w.visibility(3.0), SegmentVisibility::Hidden);
        assert_eq!(w.visibility(4.0), SegmentVisibility::Hidden);
        assert_eq!(w.visibility(5.0), SegmentVisibility::Partial(0.25));
        assert_eq!(w.visibility(8.0), SegmentVisibility::Drawn);

        assert_eq!(timeline.drawn_count(0.0), 0);
        assert_eq!(timeline.drawn_count(5.0), 1);
        assert_eq!(timeline.visible_at(5.0).count(), 2);
        assert_eq!(timeline.drawn_count(8.0), 2);
    }

    #[test]
    fn visible_iterator_is_independent_of_the_caller_time() {
        let mut timeline = WaypointTimeline::new(1.0);
        timeline.append(c(0.0, 4.0), c(0.0, 0.0), SegmentKind::Route, 1.0);
        timeline.append(c(0.0, 8.0), c(0.0, 4.0), SegmentKind::Route, 1.0);

        let visible = {
            let halfway = timeline.timer() / 2.0 + 2.0;
            timeline.visible_at(halfway)
        };
        let visible: Vec<_> = visible.map(|(_, v)| v).collect();
        assert_eq!(
            visible,
            vec![SegmentVisibility::Drawn, SegmentVisibility::Partial(0.5)]
        );
    }

    #[test]
    fn clear_rewinds_the_cursor() {
        let mut timeline = WaypointTimeline::new(1.0);
        timeline.append(c(0.0, 1.0), c(0.0, 0.0), SegmentKind::Exploration, 1.0);
        timeline.clear();
        assert!(timeline.is_empty());
        assert_eq!(timeline.timer(), 0.0);
    }

    #[test]
    fn serializes_kind_as_color() {
        let waypoint = Waypoint {
            path: [Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
            timestamps: [0.0, 1.0],
            kind: SegmentKind::Route,
        };
        let json = serde_json::to_value(&waypoint).unwrap();
        assert_eq!(json["color"], "route");
        assert_eq!(json["timestamps"][1], 1.0);
    }
}
