mod common;

use routeviz_lib::{
    Algorithm, Command, Coordinate, Direction, Error, ErrorKind, Key, KeyEvent,
    LocalMapProvider, NodeId, PlaybackState, RegionOutcome, SearchStatus, SegmentKind,
    SegmentVisibility, Session, SessionConfig, Waypoint,
};

use common::{
    grid_city, grid_session, snapped, CLOCK_TOWER, ISLAND, PALTAN_BAZAAR, RAJPUR_ROAD,
};

const FRAME: f64 = 1000.0 / 60.0;

fn config(speed: usize) -> SessionConfig {
    SessionConfig {
        speed,
        ..SessionConfig::default()
    }
}

fn exploration(waypoints: &[Waypoint]) -> Vec<Waypoint> {
    waypoints
        .iter()
        .filter(|w| w.kind == SegmentKind::Exploration)
        .cloned()
        .collect()
}

#[test]
fn higher_speed_finishes_in_fewer_frames_with_the_same_result() {
    let mut slow = grid_session(config(1), CLOCK_TOWER, PALTAN_BAZAAR);
    let mut fast = grid_session(config(8), CLOCK_TOWER, PALTAN_BAZAAR);
    for session in [&mut slow, &mut fast] {
        session.start().expect("start");
        session.play_to_end(FRAME, 100_000).expect("playback");
        assert_eq!(session.status(), SearchStatus::Finished);
    }

    let steps = slow.engine().unwrap().steps();
    assert_eq!(steps, fast.engine().unwrap().steps());
    assert_eq!(slow.search_frames(), steps);
    assert_eq!(fast.search_frames(), steps.div_ceil(8));

    assert_eq!(slow.route().unwrap().nodes(), fast.route().unwrap().nodes());
    assert_eq!(exploration(slow.waypoints()), exploration(fast.waypoints()));
    // Only the route reveal is stretched at higher speeds.
    assert!(fast.max_time() > slow.max_time());
}

#[test]
fn scrubbing_bounds_show_nothing_then_everything() {
    let mut session = grid_session(SessionConfig::default(), CLOCK_TOWER, RAJPUR_ROAD);
    session.start().unwrap();
    session.play_to_end(FRAME, 100_000).unwrap();
    assert!(session.animation_ended());

    session.begin_scrub();
    assert_eq!(session.scrub(0.0), 0.0);
    assert_eq!(session.visible_segments().count(), 0);

    let max = session.max_time();
    assert_eq!(session.scrub(max + 500.0), max);
    let visible: Vec<_> = session.visible_segments().collect();
    assert_eq!(visible.len(), session.waypoints().len());
    assert!(visible
        .iter()
        .all(|(_, visibility)| *visibility == SegmentVisibility::Drawn));
    assert!(visible.iter().any(|(w, _)| w.kind == SegmentKind::Route));
    session.end_scrub();
    assert_eq!(session.playback_state(), PlaybackState::Paused);
}

#[test]
fn clear_then_start_reproduces_a_fresh_run() {
    let mut fresh = grid_session(SessionConfig::default(), CLOCK_TOWER, PALTAN_BAZAAR);
    fresh.start().unwrap();
    fresh.play_to_end(FRAME, 100_000).unwrap();

    let mut reused = grid_session(SessionConfig::default(), CLOCK_TOWER, PALTAN_BAZAAR);
    reused.start().unwrap();
    reused.play_to_end(FRAME * 3.0, 100_000).unwrap();
    reused.clear();
    assert_eq!(reused.status(), SearchStatus::Idle);
    assert!(reused.waypoints().is_empty());

    reused.start().unwrap();
    reused.play_to_end(FRAME, 100_000).unwrap();

    assert_eq!(reused.waypoints(), fresh.waypoints());
    assert_eq!(reused.route(), fresh.route());
    assert_eq!(reused.frames(), fresh.frames());
    assert_eq!(reused.time(), fresh.time());
}

#[test]
fn unreachable_goal_reports_no_path_and_stays_interactive() {
    let mut session = grid_session(SessionConfig::default(), CLOCK_TOWER, ISLAND);
    session.start().unwrap();

    let err = session
        .play_to_end(FRAME, 100_000)
        .expect_err("the island is not connected");
    assert!(matches!(err, Error::NoPathFound { start: CLOCK_TOWER, goal: ISLAND }));
    assert_eq!(err.kind(), ErrorKind::NoPathFound);
    assert_eq!(session.status(), SearchStatus::Failed);
    assert!(session.animation_ended());
    assert!(session.route().is_none());

    // The next gesture works without an explicit reset.
    session.set_algorithm(Algorithm::AStar);
    let graph = grid_city().graph;
    session.choose_end(snapped(&graph, PALTAN_BAZAAR)).unwrap();
    session.start().unwrap();
    session.play_to_end(FRAME, 100_000).unwrap();
    assert_eq!(session.status(), SearchStatus::Finished);
}

#[test]
fn keyboard_drives_playback_once_attached() {
    let mut session = grid_session(SessionConfig::default(), CLOCK_TOWER, PALTAN_BAZAAR);
    assert_eq!(session.handle_key(KeyEvent::release(Key::Space)).unwrap(), None);

    session.attach_input();
    assert_eq!(
        session.handle_key(KeyEvent::release(Key::Space)).unwrap(),
        Some(Command::Toggle)
    );
    assert!(session.started());
    assert!(session.wants_frame());

    // Clearing is ignored mid-run.
    assert_eq!(session.handle_key(KeyEvent::release(Key::R)).unwrap(), None);

    session.play_to_end(FRAME, 100_000).unwrap();
    let end = session.time();
    assert_eq!(
        session.handle_key(KeyEvent::press(Key::ArrowLeft)).unwrap(),
        Some(Command::StepFrame(Direction::Backward))
    );
    assert!((session.time() - (end - FRAME)).abs() < 1e-9);
    session.handle_key(KeyEvent::release(Key::ArrowLeft)).unwrap();

    assert_eq!(
        session.handle_key(KeyEvent::release(Key::R)).unwrap(),
        Some(Command::Clear)
    );
    assert!(!session.started());

    session.dispose();
    assert_eq!(session.handle_key(KeyEvent::release(Key::Space)).unwrap(), None);
}

fn finished_session(end: NodeId) -> Session {
    let mut session = grid_session(SessionConfig::default(), CLOCK_TOWER, end);
    session.attach_input();
    session.start().unwrap();
    session.play_to_end(FRAME, 100_000).unwrap();
    assert!(session.animation_ended());
    session
}

#[test]
fn arrow_keys_keep_stepping_after_the_end() {
    let mut session = finished_session(PALTAN_BAZAAR);
    let end = session.time();

    for n in 1..=3 {
        assert_eq!(
            session.handle_key(KeyEvent::press(Key::ArrowLeft)).unwrap(),
            Some(Command::StepFrame(Direction::Backward))
        );
        assert_eq!(session.handle_key(KeyEvent::release(Key::ArrowLeft)).unwrap(), None);
        assert!((session.time() - (end - n as f64 * FRAME)).abs() < 1e-9);
        assert!(session.animation_ended());
    }

    for n in (0..3).rev() {
        assert_eq!(
            session.handle_key(KeyEvent::press(Key::ArrowRight)).unwrap(),
            Some(Command::StepFrame(Direction::Forward))
        );
        assert_eq!(session.handle_key(KeyEvent::release(Key::ArrowRight)).unwrap(), None);
        assert!((session.time() - (end - n as f64 * FRAME)).abs() < 1e-9);
        assert!(session.animation_ended());
    }

    // Stepping past the end stays clamped.
    session.handle_key(KeyEvent::press(Key::ArrowRight)).unwrap();
    assert_eq!(session.time(), end);
    assert_eq!(session.playback_state(), PlaybackState::Paused);
}

#[test]
fn clear_key_works_after_stepping_back() {
    let mut session = finished_session(PALTAN_BAZAAR);
    session.handle_key(KeyEvent::press(Key::ArrowLeft)).unwrap();
    session.handle_key(KeyEvent::release(Key::ArrowLeft)).unwrap();
    session.handle_key(KeyEvent::press(Key::ArrowLeft)).unwrap();
    session.handle_key(KeyEvent::release(Key::ArrowLeft)).unwrap();
    assert!(session.time() < session.max_time());
    assert!(session.animation_ended());

    assert_eq!(
        session.handle_key(KeyEvent::release(Key::R)).unwrap(),
        Some(Command::Clear)
    );
    assert_eq!(session.status(), SearchStatus::Idle);
    assert!(session.waypoints().is_empty());
}

#[test]
fn failed_search_stays_ended_while_scrubbing() {
    let mut session = grid_session(SessionConfig::default(), CLOCK_TOWER, ISLAND);
    session.start().unwrap();
    assert!(session.play_to_end(FRAME, 100_000).is_err());
    session.scrub(0.0);
    assert!(session.animation_ended());
    session.step_frame(Direction::Forward).unwrap();
    assert!(session.animation_ended());
}

#[test]
fn selection_is_allowed_after_scrubbing_a_finished_run_back_to_zero() {
    let graph = grid_city().graph;

    let mut session = finished_session(PALTAN_BAZAAR);
    session.begin_scrub();
    session.scrub(0.0);
    session.end_scrub();
    assert!(session.animation_ended());
    assert_eq!(session.choose_end(snapped(&graph, RAJPUR_ROAD)).unwrap(), RAJPUR_ROAD);
    session.start().unwrap();
    session.play_to_end(FRAME, 100_000).unwrap();
    assert_eq!(session.route().unwrap().goal, RAJPUR_ROAD);

    let mut session = finished_session(PALTAN_BAZAAR);
    session.scrub(0.0);
    assert!(session.animation_ended());
    session.start().expect("a finished run can be restarted");
    assert_eq!(session.status(), SearchStatus::Running);

    let mut session = finished_session(PALTAN_BAZAAR);
    session.scrub(0.0);
    let ticket = session
        .begin_region(snapped(&graph, RAJPUR_ROAD))
        .expect("a finished run does not block a new region");
    assert_eq!(ticket.root(), RAJPUR_ROAD);
    assert_eq!(session.status(), SearchStatus::Idle);
}

#[tokio::test]
async fn selecting_points_through_the_provider() {
    let provider = LocalMapProvider::new(grid_city(), 0.5);
    let mut session = Session::default();

    let outcome = session
        .select_start(&provider, Coordinate::new(30.3166, 78.0323))
        .await
        .expect("start selected");
    assert!(matches!(outcome, RegionOutcome::Installed { nodes } if nodes >= 25));
    assert_eq!(session.start_point().unwrap().id, CLOCK_TOWER);
    assert!(!session.can_start());

    let far = Coordinate::new(30.5, 78.5);
    let err = session.select_end(&provider, far).await.unwrap_err();
    assert!(matches!(err, Error::OutsideSelection { .. }));
    assert_eq!(err.notification().message, "Please select a point inside the radius.");

    let end = session
        .select_end(&provider, Coordinate::new(30.3245, 78.0401))
        .await
        .expect("end selected");
    assert_eq!(end, PALTAN_BAZAAR);
    assert!(session.can_start());
}

#[tokio::test]
async fn place_names_select_both_endpoints() {
    let provider = LocalMapProvider::new(grid_city(), 0.5);
    let mut session = Session::default();

    session
        .select_places(&provider, "clock tower", "Rajpur Road")
        .await
        .expect("places resolve");
    assert_eq!(session.start_point().unwrap().id, CLOCK_TOWER);
    assert_eq!(session.end_point().unwrap().id, RAJPUR_ROAD);

    let err = session
        .select_places(&provider, "Clock Towr", "Rajpur Road")
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Did you mean"), "got {message}");
    assert!(message.contains("'Clock Tower'"), "got {message}");
}

#[test]
fn stale_region_fetches_never_replace_newer_selections() {
    let graph = grid_city().graph;
    let mut session = Session::default();

    let first = session.begin_region(snapped(&graph, CLOCK_TOWER)).unwrap();
    let second = session.begin_region(snapped(&graph, RAJPUR_ROAD)).unwrap();
    assert!(second.generation() > first.generation());

    let installed = session
        .finish_region(second, Ok(graph.subgraph(&second.bbox())))
        .unwrap();
    assert!(matches!(installed, RegionOutcome::Installed { .. }));

    // The older fetch completes late, with a failure; it is dropped.
    let late = session
        .finish_region(first, Err(Error::DataFetch { message: "timeout".to_string() }))
        .unwrap();
    assert_eq!(late, RegionOutcome::Stale);
    assert_eq!(session.region().unwrap().root, RAJPUR_ROAD);
    assert!(session.graph().is_some());
}
