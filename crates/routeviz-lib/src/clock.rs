//! Per-frame driver for search stepping and playback time.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::search::{SearchEngine, SearchStatus};
use crate::timeline::{SegmentKind, WaypointTimeline};
use crate::trace::{Route, RouteTracer};

/// Length of one discrete playback step (one 60 Hz frame, in milliseconds).
pub const DEFAULT_FRAME_STEP: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// No frames are scheduled.
    #[default]
    Stopped,
    Playing,
    Paused,
    /// The timeline is being dragged; stepping is suspended.
    Scrubbing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// What happened during one [`AnimationClock::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Search steps performed.
    pub steps: usize,
    /// Exploration segments appended.
    pub explored: usize,
    /// Route segments appended (non-zero only on the finishing frame).
    pub route_segments: usize,
    /// The search ran out of frontier during this frame.
    pub failed: bool,
    /// Playback time after the frame.
    pub time: f64,
    pub state: PlaybackState,
}

/// Route reveal speed relative to exploration for a given search speed.
pub fn route_multiplier(speed: usize) -> f64 {
    (speed.max(1) as f64).log2().max(1.0)
}

/// Drives a [`SearchEngine`] and the playback cursor one host frame at a time.
///
/// The clock owns no search data. The session hands it the engine, timeline
/// and tracer on every tick.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    state: PlaybackState,
    direction: Direction,
    resume_after_scrub: bool,
    ended: bool,
    time: f64,
    speed: usize,
    frame_step: f64,
    frames: usize,
    search_frames: usize,
    route: Option<Route>,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(5, DEFAULT_FRAME_STEP)
    }
}

impl AnimationClock {
    pub fn new(speed: usize, frame_step: f64) -> Self {
        Self {
            state: PlaybackState::Stopped,
            direction: Direction::Forward,
            resume_after_scrub: false,
            ended: false,
            time: 0.0,
            speed: speed.max(1),
            frame_step,
            frames: 0,
            search_frames: 0,
            route: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Playback has reached the end of a stopped search at least once since
    /// the last start, clear or restart. Scrubbing and frame stepping keep
    /// this set.
    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn speed(&self) -> usize {
        self.speed
    }

    /// Steps performed per frame. Values below one are raised to one.
    pub fn set_speed(&mut self, speed: usize) {
        self.speed = speed.max(1);
    }

    pub fn frame_step(&self) -> f64 {
        self.frame_step
    }

    /// Frames ticked while playing.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Frames that advanced the search.
    pub fn search_frames(&self) -> usize {
        self.search_frames
    }

    /// Route traced when the search finished, if it has.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Whether the host should keep delivering frames.
    pub fn wants_frame(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Schedule frames for a freshly started search.
    pub fn start(&mut self) {
        self.clear();
        self.state = PlaybackState::Playing;
    }

    /// Stop frame scheduling without touching playback time.
    pub fn cancel(&mut self) {
        self.state = PlaybackState::Stopped;
        self.resume_after_scrub = false;
    }

    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Scrubbing => self.resume_after_scrub = true,
            _ => self.state = PlaybackState::Playing,
        }
    }

    pub fn pause(&mut self) {
        match self.state {
            PlaybackState::Scrubbing => self.resume_after_scrub = false,
            PlaybackState::Playing => self.state = PlaybackState::Paused,
            PlaybackState::Stopped | PlaybackState::Paused => {}
        }
    }

    /// Like [`AnimationClock::play`], but an ended animation parked at
    /// `max_time` replays from the beginning.
    pub fn resume(&mut self, max_time: f64) {
        if !self.replay_if_at_end(max_time) {
            self.play();
        }
    }

    /// Flip between playing and paused.
    ///
    /// An ended animation parked at `max_time` replays from the beginning.
    pub fn toggle(&mut self, max_time: f64) {
        if self.replay_if_at_end(max_time) {
            return;
        }
        match self.state {
            PlaybackState::Playing => self.state = PlaybackState::Paused,
            PlaybackState::Stopped | PlaybackState::Paused => self.state = PlaybackState::Playing,
            PlaybackState::Scrubbing => self.resume_after_scrub = !self.resume_after_scrub,
        }
    }

    fn replay_if_at_end(&mut self, max_time: f64) -> bool {
        if !self.ended
            || self.state == PlaybackState::Scrubbing
            || self.direction == Direction::Backward
            || self.time < max_time
        {
            return false;
        }
        self.ended = false;
        self.time = 0.0;
        self.state = PlaybackState::Playing;
        debug!("replaying from the beginning");
        true
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Enter the transient dragging state.
    pub fn begin_scrub(&mut self) {
        if self.state == PlaybackState::Scrubbing {
            return;
        }
        self.resume_after_scrub = self.state == PlaybackState::Playing;
        self.state = PlaybackState::Scrubbing;
    }

    /// Leave the dragging state, resuming playback if it was playing before.
    pub fn end_scrub(&mut self) {
        if self.state != PlaybackState::Scrubbing {
            return;
        }
        self.state = if self.resume_after_scrub {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        };
        self.resume_after_scrub = false;
    }

    /// Set playback time directly, clamped to `[0, max_time]`.
    pub fn scrub(&mut self, time: f64, max_time: f64) -> f64 {
        self.time = if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, max_time.max(0.0))
        };
        self.time
    }

    /// Move playback by exactly one frame step. Only valid once the search
    /// has stopped.
    pub fn step_frame(
        &mut self,
        direction: Direction,
        status: SearchStatus,
        max_time: f64,
    ) -> Result<f64> {
        if !status.is_terminal() {
            return Err(Error::invalid(
                "frame stepping is only available once the search has ended",
            ));
        }
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        let delta = match direction {
            Direction::Forward => self.frame_step,
            Direction::Backward => -self.frame_step,
        };
        Ok(self.scrub(self.time + delta, max_time))
    }

    /// Forget everything about the current run.
    pub fn clear(&mut self) {
        self.state = PlaybackState::Stopped;
        self.direction = Direction::Forward;
        self.resume_after_scrub = false;
        self.ended = false;
        self.time = 0.0;
        self.frames = 0;
        self.search_frames = 0;
        self.route = None;
    }

    /// Advance one host frame that took `delta` time units.
    ///
    /// While playing and the search is running, performs up to `speed` steps
    /// and records every updated node as an exploration segment. When the
    /// search finishes inside the loop the route is traced and appended right
    /// away. Playback time then moves by `delta` in the current direction.
    pub fn tick(
        &mut self,
        engine: &mut SearchEngine,
        timeline: &mut WaypointTimeline,
        tracer: &RouteTracer,
        delta: f64,
    ) -> Result<FrameReport> {
        let mut report = FrameReport::default();
        if self.state != PlaybackState::Playing {
            report.time = self.time;
            report.state = self.state;
            return Ok(report);
        }
        self.frames += 1;

        if engine.status() == SearchStatus::Running {
            self.search_frames += 1;
            for _ in 0..self.speed {
                let updated = engine.step();
                report.steps += 1;

                let graph = engine.graph();
                for update in &updated {
                    let appended = timeline.append(
                        graph.coordinate(update.node),
                        graph.coordinate(update.referer),
                        SegmentKind::Exploration,
                        1.0,
                    );
                    if appended.is_some() {
                        report.explored += 1;
                    }
                }

                match engine.status() {
                    SearchStatus::Running => {}
                    SearchStatus::Finished => {
                        report.route_segments = self.reveal_route(engine, timeline, tracer)?;
                        break;
                    }
                    SearchStatus::Failed => {
                        // Nothing left to reveal but the exploration itself.
                        report.failed = true;
                        self.time = timeline.timer();
                        self.state = PlaybackState::Stopped;
                        self.ended = true;
                        break;
                    }
                    SearchStatus::Idle => break,
                }
            }
        }

        self.advance(delta, engine.status(), timeline.timer());
        debug!(
            frame = self.frames,
            steps = report.steps,
            explored = report.explored,
            time = self.time,
            "frame advanced"
        );

        report.time = self.time;
        report.state = self.state;
        Ok(report)
    }

    fn reveal_route(
        &mut self,
        engine: &SearchEngine,
        timeline: &mut WaypointTimeline,
        tracer: &RouteTracer,
    ) -> Result<usize> {
        let route = tracer.trace(engine)?;
        let multiplier = route_multiplier(self.speed);
        let graph = engine.graph();

        let mut appended = 0;
        for edge in route.edges_forward() {
            if timeline
                .append(
                    graph.coordinate(edge.node),
                    graph.coordinate(edge.parent),
                    SegmentKind::Route,
                    multiplier,
                )
                .is_some()
            {
                appended += 1;
            }
        }
        info!(
            hops = route.hop_count(),
            cost = route.cost,
            max_time = timeline.timer(),
            "route revealed"
        );
        self.route = Some(route);
        Ok(appended)
    }

    fn advance(&mut self, delta: f64, status: SearchStatus, max_time: f64) {
        if self.state != PlaybackState::Playing || !delta.is_finite() || delta <= 0.0 {
            return;
        }
        match self.direction {
            Direction::Forward => {
                self.time += delta;
                if status.is_terminal() && self.time >= max_time {
                    self.time = max_time;
                    self.state = PlaybackState::Paused;
                    self.ended = true;
                    debug!(time = self.time, "playback reached the end");
                }
            }
            Direction::Backward => {
                self.time -= delta;
                if self.time <= 0.0 {
                    self.time = 0.0;
                    self.state = PlaybackState::Paused;
                    self.direction = Direction::Forward;
                }
            }
        }
    }
}
