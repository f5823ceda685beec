//! View-layer facade tying selection, search and playback together.
//!
//! A [`Session`] owns everything one map view needs: the installed region
//! graph, the search engine, the waypoint timeline, the animation clock and
//! the keyboard bindings. Hosts call the command methods in response to user
//! gestures, call [`Session::tick`] once per animation frame while
//! [`Session::wants_frame`] is true, and render [`Session::visible_segments`].
//!
//! Region selection is split in two so a host can fetch graph data in the
//! background: [`Session::begin_region`] hands out a [`RegionTicket`] and
//! [`Session::finish_region`] installs the fetched graph only if no newer
//! selection happened in the meantime.

use tracing::{debug, info, warn};

use crate::clock::{AnimationClock, Direction, FrameReport, PlaybackState};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::geo::{selection_circle, BoundingBox, Coordinate, SELECTION_CIRCLE_SEGMENTS};
use crate::graph::{Graph, NodeId};
use crate::input::{Command, InputBindings, InputContext, KeyEvent};
use crate::provider::MapProvider;
use crate::search::{Algorithm, SearchEngine, SearchStatus};
use crate::spatial::NearestNode;
use crate::timeline::{SegmentVisibility, Waypoint, WaypointTimeline};
use crate::trace::{Route, RouteTracer};

/// Circular area around the start node that the search is confined to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub root: NodeId,
    pub center: Coordinate,
    pub radius_km: f64,
}

impl Region {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::around(self.center, self.radius_km)
    }

    /// Polygon ring of the selection circle.
    pub fn ring(&self) -> Vec<Coordinate> {
        selection_circle(self.center, self.radius_km, SELECTION_CIRCLE_SEGMENTS)
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        self.center.haversine_km(point) <= self.radius_km
    }
}

/// Handle for an outstanding region fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionTicket {
    generation: u64,
    region: Region,
}

impl RegionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn root(&self) -> NodeId {
        self.region.root
    }

    /// Area the graph should be fetched for.
    pub fn bbox(&self) -> BoundingBox {
        self.region.bbox()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionOutcome {
    /// The graph was installed and the session is ready for an end point.
    Installed { nodes: usize },
    /// A newer selection superseded this fetch; its result was dropped.
    Stale,
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    generation: u64,
    loading: bool,
    region: Option<Region>,
    start: Option<NearestNode>,
    end: Option<NearestNode>,
    engine: Option<SearchEngine>,
    timeline: WaypointTimeline,
    clock: AnimationClock,
    tracer: RouteTracer,
    input: InputBindings,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let timeline = WaypointTimeline::new(config.time_scale);
        let clock = AnimationClock::new(config.speed, config.frame_step);
        Self {
            config,
            generation: 0,
            loading: false,
            region: None,
            start: None,
            end: None,
            engine: None,
            timeline,
            clock,
            tracer: RouteTracer::new(),
            input: InputBindings::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn start_point(&self) -> Option<&NearestNode> {
        self.start.as_ref()
    }

    pub fn end_point(&self) -> Option<&NearestNode> {
        self.end.as_ref()
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.engine.as_ref().map(SearchEngine::graph)
    }

    pub fn engine(&self) -> Option<&SearchEngine> {
        self.engine.as_ref()
    }

    pub fn timeline(&self) -> &WaypointTimeline {
        &self.timeline
    }

    /// Whether a region fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self) -> SearchStatus {
        self.engine
            .as_ref()
            .map_or(SearchStatus::Idle, SearchEngine::status)
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.clock.state()
    }

    pub fn direction(&self) -> Direction {
        self.clock.direction()
    }

    /// Both endpoints are resolved and their graph is installed.
    pub fn can_start(&self) -> bool {
        self.start.is_some() && self.end.is_some() && self.engine.is_some() && !self.loading
    }

    /// A search has been started since the last clear.
    pub fn started(&self) -> bool {
        self.status() != SearchStatus::Idle
    }

    /// The search has stopped and playback has reached the end of the
    /// timeline. Stays set while stepping or scrubbing back through the run.
    pub fn animation_ended(&self) -> bool {
        self.status().is_terminal() && self.clock.ended()
    }

    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Furthest reachable playback time so far.
    pub fn max_time(&self) -> f64 {
        self.timeline.timer()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        self.timeline.waypoints()
    }

    /// Segments drawn at the current playback time.
    pub fn visible_segments(&self) -> impl Iterator<Item = (&Waypoint, SegmentVisibility)> {
        self.timeline.visible_at(self.clock.time())
    }

    pub fn route(&self) -> Option<&Route> {
        self.clock.route()
    }

    /// Frames ticked while playing since the last start.
    pub fn frames(&self) -> usize {
        self.clock.frames()
    }

    /// Frames that advanced the search since the last start.
    pub fn search_frames(&self) -> usize {
        self.clock.search_frames()
    }

    pub fn wants_frame(&self) -> bool {
        self.engine.is_some() && self.clock.wants_frame()
    }

    /// Search steps per frame; applies from the next frame on.
    pub fn set_speed(&mut self, speed: usize) -> Result<()> {
        if speed == 0 {
            return Err(Error::InvalidConfig {
                key: "speed".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        self.config.speed = speed;
        self.clock.set_speed(speed);
        Ok(())
    }

    /// Algorithm for the next search.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.algorithm = algorithm;
    }

    /// Selection radius for the next region; the current region keeps its own.
    pub fn set_radius(&mut self, radius_km: f64) -> Result<()> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(Error::InvalidConfig {
                key: "radius_km".to_string(),
                message: format!("must be a positive number (got {radius_km})"),
            });
        }
        self.config.radius_km = radius_km;
        Ok(())
    }

    /// Start selecting a new region around `start`.
    ///
    /// Clears the current run and drops the installed graph immediately; the
    /// returned ticket must be passed to [`Session::finish_region`] together
    /// with the fetched graph.
    pub fn begin_region(&mut self, start: NearestNode) -> Result<RegionTicket> {
        self.ensure_idle()?;

        self.generation += 1;
        self.clear();
        self.engine = None;
        self.loading = true;
        self.start = Some(start);
        self.end = None;

        let region = Region {
            root: start.id,
            center: start.coord,
            radius_km: self.config.radius_km,
        };
        self.region = Some(region);
        info!(
            generation = self.generation,
            root = start.id,
            radius_km = region.radius_km,
            "region selection begun"
        );

        Ok(RegionTicket {
            generation: self.generation,
            region,
        })
    }

    /// Install the result of a region fetch.
    ///
    /// Results for superseded tickets are discarded, whether they succeeded
    /// or not. A failed fetch leaves no graph installed.
    pub fn finish_region(
        &mut self,
        ticket: RegionTicket,
        fetched: Result<Graph>,
    ) -> Result<RegionOutcome> {
        if ticket.generation != self.generation {
            match &fetched {
                Ok(_) => debug!(
                    ticket = ticket.generation,
                    current = self.generation,
                    "discarding stale region graph"
                ),
                Err(err) => debug!(
                    ticket = ticket.generation,
                    current = self.generation,
                    error = %err,
                    "discarding stale region fetch failure"
                ),
            }
            return Ok(RegionOutcome::Stale);
        }
        self.loading = false;

        let graph = match fetched {
            Ok(graph) => graph,
            Err(err) => {
                warn!(generation = ticket.generation, error = %err, "region fetch failed");
                return Err(err);
            }
        };
        if !graph.contains(ticket.root()) {
            warn!(root = ticket.root(), "fetched graph does not contain the start node");
            return Err(Error::fetch(format!(
                "fetched graph does not contain start node {}",
                ticket.root()
            )));
        }

        let nodes = graph.len();
        self.engine = Some(SearchEngine::new(graph));
        info!(generation = ticket.generation, nodes, "region graph installed");
        Ok(RegionOutcome::Installed { nodes })
    }

    /// Snap `point` to a road node and load the region around it.
    pub async fn select_start<P: MapProvider>(
        &mut self,
        provider: &P,
        point: Coordinate,
    ) -> Result<RegionOutcome> {
        self.ensure_idle()?;
        let node = provider
            .find_nearest_node(point)
            .await?
            .ok_or(Error::NoNearbyNode { point })?;

        let ticket = self.begin_region(node)?;
        let fetched = provider.fetch_graph(ticket.bbox(), ticket.root()).await;
        self.finish_region(ticket, fetched)
    }

    /// Snap `point` to a road node inside the current region and make it the
    /// search goal.
    pub async fn select_end<P: MapProvider>(
        &mut self,
        provider: &P,
        point: Coordinate,
    ) -> Result<NodeId> {
        self.ensure_idle()?;
        if self.loading {
            return Err(Error::RegionLoading);
        }
        let region = self
            .region
            .ok_or_else(|| Error::invalid("select a start point before choosing an end point"))?;
        if !region.contains(&point) {
            return Err(Error::OutsideSelection {
                point,
                radius_km: region.radius_km,
            });
        }

        let node = provider
            .find_nearest_node(point)
            .await?
            .ok_or(Error::NoNearbyNode { point })?;
        self.choose_end(node)
    }

    /// Resolve both endpoints by place name and select them.
    pub async fn select_places<P: MapProvider>(
        &mut self,
        provider: &P,
        start_name: &str,
        end_name: &str,
    ) -> Result<()> {
        self.ensure_idle()?;
        let start = resolve_place(provider, start_name).await?;
        let end = resolve_place(provider, end_name).await?;

        self.select_start(provider, start).await?;
        self.select_end(provider, end).await?;
        Ok(())
    }

    /// Make an already snapped node the search goal.
    pub fn choose_end(&mut self, node: NearestNode) -> Result<NodeId> {
        self.ensure_idle()?;
        if self.loading {
            return Err(Error::RegionLoading);
        }
        let Some(graph) = self.graph() else {
            return Err(Error::invalid("no region graph is installed"));
        };
        if !graph.contains(node.id) {
            return Err(Error::UnknownNode { id: node.id });
        }
        self.clear();
        self.end = Some(node);
        debug!(node = node.id, "end node selected");
        Ok(node.id)
    }

    /// Start a fresh search between the selected endpoints.
    pub fn start(&mut self) -> Result<()> {
        if self.loading {
            return Err(Error::RegionLoading);
        }
        self.ensure_idle()?;
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(Error::MissingEndpoints);
        };

        self.clear();
        let Some(engine) = self.engine.as_mut() else {
            return Err(Error::MissingEndpoints);
        };
        engine.start(self.config.algorithm, start.id, end.id)?;
        self.clock.start();
        Ok(())
    }

    /// Start the search if nothing has run yet, otherwise flip playback.
    pub fn toggle(&mut self) -> Result<()> {
        if !self.can_start() {
            return Err(Error::MissingEndpoints);
        }
        if !self.started() && self.clock.time() == 0.0 {
            return self.start();
        }
        let max = self.max_time();
        self.clock.toggle(max);
        Ok(())
    }

    pub fn play(&mut self) -> Result<()> {
        if !self.started() {
            return self.start();
        }
        let max = self.max_time();
        self.clock.resume(max);
        Ok(())
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Discard the current run; endpoints and the region graph stay.
    pub fn clear(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.reset();
        }
        self.timeline.clear();
        self.timeline.set_scale(self.config.time_scale);
        self.clock.clear();
    }

    /// Jump playback to `time`, clamped to the revealed range.
    pub fn scrub(&mut self, time: f64) -> f64 {
        let max = self.max_time();
        self.clock.scrub(time, max)
    }

    pub fn begin_scrub(&mut self) {
        self.clock.begin_scrub();
    }

    pub fn end_scrub(&mut self) {
        self.clock.end_scrub();
    }

    pub fn step_frame(&mut self, direction: Direction) -> Result<f64> {
        let max = self.max_time();
        self.clock.step_frame(direction, self.status(), max)
    }

    /// Choose the playback direction. Reverse play needs a stopped search.
    pub fn set_direction(&mut self, direction: Direction) -> Result<()> {
        if direction == Direction::Backward && !self.status().is_terminal() {
            return Err(Error::invalid(
                "reverse playback is only available once the search has ended",
            ));
        }
        self.clock.set_direction(direction);
        Ok(())
    }

    /// Advance one animation frame of `delta` time units.
    ///
    /// Returns `NoPathFound` on the frame the search runs dry. A corrupted
    /// parent chain clears the run before the error is returned.
    pub fn tick(&mut self, delta: f64) -> Result<FrameReport> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(FrameReport {
                time: self.clock.time(),
                state: self.clock.state(),
                ..FrameReport::default()
            });
        };

        let report = match self
            .clock
            .tick(engine, &mut self.timeline, &self.tracer, delta)
        {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "frame failed; clearing the run");
                self.clear();
                return Err(err);
            }
        };

        if report.failed {
            let (start, goal) = (
                engine.start_node().unwrap_or_default(),
                engine.goal_node().unwrap_or_default(),
            );
            return Err(Error::NoPathFound { start, goal });
        }
        Ok(report)
    }

    /// Tick until no more frames are wanted or `max_frames` is reached.
    ///
    /// Returns the number of frames ticked.
    pub fn play_to_end(&mut self, delta: f64, max_frames: usize) -> Result<usize> {
        let mut ticked = 0;
        while self.wants_frame() && ticked < max_frames {
            self.tick(delta)?;
            ticked += 1;
        }
        Ok(ticked)
    }

    pub fn attach_input(&mut self) {
        self.input.attach();
    }

    pub fn detach_input(&mut self) {
        self.input.detach();
    }

    /// Translate a key event and apply the resulting command.
    pub fn handle_key(&mut self, event: KeyEvent) -> Result<Option<Command>> {
        let ctx = InputContext {
            started: self.started(),
            animation_ended: self.animation_ended(),
        };
        let Some(command) = self.input.handle(event, ctx) else {
            return Ok(None);
        };
        match command {
            Command::Toggle => self.toggle()?,
            Command::Play => self.play()?,
            Command::Pause => self.pause(),
            Command::StepFrame(direction) => {
                self.step_frame(direction)?;
            }
            Command::Clear => self.clear(),
        }
        Ok(Some(command))
    }

    /// Stop scheduling frames and release keyboard bindings.
    pub fn dispose(&mut self) {
        self.clock.cancel();
        self.input.detach();
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.started() && !self.animation_ended() {
            return Err(Error::invalid(
                "a search is in progress; wait for it to end or clear it first",
            ));
        }
        Ok(())
    }
}

async fn resolve_place<P: MapProvider>(provider: &P, name: &str) -> Result<Coordinate> {
    provider
        .resolve_place_name(name)
        .await?
        .ok_or_else(|| Error::UnknownPlace {
            name: name.to_string(),
            suggestions: provider.place_suggestions(name),
        })
}
