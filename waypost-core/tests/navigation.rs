//! End-to-end engine scenarios with mock collaborators

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use geo::Point;

use waypost_core::prelude::*;

// ---------------------------------------------------------------------------
// Mock collaborators
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ProviderLog {
    requests: Vec<(Point<f64>, Point<f64>)>,
}

struct MockProvider {
    log: Rc<RefCell<ProviderLog>>,
    response: Option<Route>,
}

impl RoutingProvider for MockProvider {
    fn request_route(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        _options: &RouteOptions,
    ) -> Result<Vec<Route>, Error> {
        self.log.borrow_mut().requests.push((origin, destination));
        match &self.response {
            Some(route) => Ok(vec![route.clone()]),
            None => Err(Error::Provider("routing backend unavailable".to_string())),
        }
    }
}

#[derive(Default)]
struct SpeechLog {
    spoken: Vec<String>,
}

struct MockSpeech(Rc<RefCell<SpeechLog>>);

impl SpeechOutput for MockSpeech {
    fn speak(&mut self, text: &str) {
        self.0.borrow_mut().spoken.push(text.to_string());
    }

    fn cancel(&mut self) {}
}

struct StaticHazards(Vec<HazardFeature>);

impl HazardDataSource for StaticHazards {
    fn load_features(&self) -> Result<Vec<HazardFeature>, Error> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct ObserverLog {
    snapshots: Vec<NavigationState>,
    announcements: Vec<String>,
    alerts: Vec<HazardAlert>,
    events: Vec<NavigationEvent>,
}

struct CollectingObserver(Rc<RefCell<ObserverLog>>);

impl NavigationObserver for CollectingObserver {
    fn on_state_change(&mut self, state: &NavigationState) {
        self.0.borrow_mut().snapshots.push(state.clone());
    }

    fn on_hazard_alerts(&mut self, alerts: &[HazardAlert]) {
        self.0.borrow_mut().alerts.extend_from_slice(alerts);
    }

    fn on_announcement(&mut self, text: &str) {
        self.0.borrow_mut().announcements.push(text.to_string());
    }

    fn on_event(&mut self, event: &NavigationEvent) {
        self.0.borrow_mut().events.push(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const VERTEX_SPACING_DEG: f64 = 0.0009; // ~100 m along a meridian

fn vertex(i: usize) -> Point<f64> {
    Point::new(0.0, i as f64 * VERTEX_SPACING_DEG)
}

fn step(maneuver: ManeuverKind, geometry: Vec<Point<f64>>, distance_m: f64) -> Step {
    Step {
        instruction: String::new(),
        maneuver,
        direction: Some(Direction::Left),
        roundabout_exit: None,
        distance_m,
        duration_s: distance_m / 14.0,
        geometry,
        street: Some("Test Road".to_string()),
    }
}

/// 21 vertices, step 0 ends at vertex 10, step 1 (arrive) at vertex 20
fn two_step_route() -> Route {
    let geometry: Vec<Point<f64>> = (0..=20).map(vertex).collect();
    Route {
        distance_m: 2000.0,
        duration_s: 150.0,
        geometry: geometry.clone(),
        legs: vec![Leg {
            distance_m: 2000.0,
            duration_s: 150.0,
            steps: vec![
                step(ManeuverKind::Turn, geometry[..=10].to_vec(), 1000.0),
                step(ManeuverKind::Arrive, geometry[10..].to_vec(), 1000.0),
            ],
        }],
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn fix(point: Point<f64>, seconds: i64) -> LocationFix {
    LocationFix {
        point,
        speed_mps: Some(14.0),
        heading_deg: None,
        timestamp: t0() + Duration::seconds(seconds),
    }
}

struct Harness {
    engine: NavigationEngine,
    provider_log: Rc<RefCell<ProviderLog>>,
    speech_log: Rc<RefCell<SpeechLog>>,
    observer_log: Rc<RefCell<ObserverLog>>,
}

fn harness(reroute_response: Option<Route>) -> Harness {
    harness_with_settings(reroute_response, StaticSettings::default())
}

fn harness_with_settings(reroute_response: Option<Route>, settings: StaticSettings) -> Harness {
    let provider_log = Rc::new(RefCell::new(ProviderLog::default()));
    let speech_log = Rc::new(RefCell::new(SpeechLog::default()));
    let observer_log = Rc::new(RefCell::new(ObserverLog::default()));

    let mut engine = NavigationEngine::new(
        Box::new(MockProvider {
            log: Rc::clone(&provider_log),
            response: reroute_response,
        }),
        Box::new(settings),
        Box::new(MockSpeech(Rc::clone(&speech_log))),
    );
    engine.add_observer(Box::new(CollectingObserver(Rc::clone(&observer_log))));

    Harness {
        engine,
        provider_log,
        speech_log,
        observer_log,
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn walking_the_route_announces_each_step_once_and_finishes() {
    let mut h = harness(None);
    h.engine.start_navigation(two_step_route());

    for i in 0..=20 {
        h.engine.update_location(fix(vertex(i), i as i64));
    }

    let log = h.observer_log.borrow();

    // One announcement per step, each fired exactly once
    assert_eq!(log.announcements.len(), 2, "{:?}", log.announcements);
    assert!(log.announcements[0].contains("turn left"));
    assert!(log.announcements[1].contains("arrive at your destination"));

    // Progress strictly increases 0 -> 1 across the per-tick snapshots
    let progress: Vec<f64> = log
        .snapshots
        .iter()
        .filter(|s| s.is_navigating && s.last_known_position.is_some())
        .map(|s| s.route_progress)
        .collect();
    assert_eq!(progress.len(), 21);
    assert_eq!(progress.first(), Some(&0.0));
    assert_eq!(progress.last(), Some(&1.0));
    assert!(
        progress.windows(2).all(|w| w[0] < w[1]),
        "progress not strictly increasing: {progress:?}"
    );

    // Positions sit exactly on the geometry, so never off route
    assert!(log.snapshots.iter().all(|s| !s.is_off_route));
    assert!(log.events.contains(&NavigationEvent::Arrived));

    // Arrival resets the trip; no reroute was ever requested
    drop(log);
    assert!(!h.engine.state().is_navigating);
    assert!(h.provider_log.borrow().requests.is_empty());
}

#[test]
fn sustained_deviation_issues_exactly_one_reroute_request() {
    // The replacement route passes through the deviated position
    let deviated = Point::new(0.000719, 5.0 * VERTEX_SPACING_DEG);
    let replacement = Route {
        distance_m: 1500.0,
        duration_s: 110.0,
        geometry: vec![deviated, vertex(12), vertex(20)],
        legs: vec![Leg {
            distance_m: 1500.0,
            duration_s: 110.0,
            steps: vec![step(
                ManeuverKind::Arrive,
                vec![deviated, vertex(20)],
                1500.0,
            )],
        }],
    };

    let mut h = harness(Some(replacement));
    h.engine.start_navigation(two_step_route());

    // ~80 m east of vertex 5, held for ten one-second ticks
    for tick in 0..10 {
        h.engine.update_location(fix(deviated, tick));
    }

    assert_eq!(
        h.provider_log.borrow().requests.len(),
        1,
        "expected a single reroute request, issued on the entry tick"
    );

    let log = h.observer_log.borrow();
    assert_eq!(
        log.events
            .iter()
            .filter(|e| **e == NavigationEvent::OffRoute)
            .count(),
        1
    );
    assert!(log.events.contains(&NavigationEvent::RouteReplaced));

    // Snapshot 0 is start_navigation; snapshot 1 is the entry tick,
    // which both detected the deviation and swapped the route
    assert!(!log.snapshots[1].is_off_route);
}

#[test]
fn failed_reroute_leaves_state_off_route_without_retries() {
    let mut h = harness(None); // provider always fails
    h.engine.start_navigation(two_step_route());

    let deviated = Point::new(0.000719, 5.0 * VERTEX_SPACING_DEG);
    for tick in 0..10 {
        h.engine.update_location(fix(deviated, tick));
    }

    // One attempt on entry; staying off route is not a re-trigger
    assert_eq!(h.provider_log.borrow().requests.len(), 1);
    assert!(h.engine.state().is_off_route);

    let log = h.observer_log.borrow();
    assert_eq!(
        log.events
            .iter()
            .filter(|e| matches!(e, NavigationEvent::RerouteFailed { .. }))
            .count(),
        1
    );
}

#[test]
fn oscillating_across_the_boundary_is_debounced_per_window() {
    let mut h = harness(None);
    h.engine.start_navigation(two_step_route());

    let off = Point::new(0.000719, 5.0 * VERTEX_SPACING_DEG);
    let on = vertex(5);

    // Re-enters off-route at t=0,2,4,6,8; only t=0 and t=6 clear the
    // five-second window measured from the last attempt
    for tick in 0..10 {
        let position = if tick % 2 == 0 { off } else { on };
        h.engine.update_location(fix(position, tick));
    }

    assert_eq!(h.provider_log.borrow().requests.len(), 2);
}

#[test]
fn hazard_alerts_reach_observers_and_refresh_respects_dedup() {
    let mut h = harness(None);

    // Speed camera ~200 m up the route from the start
    let camera = HazardFeature::with_kind_defaults(
        "cam-ahead",
        HazardKind::SpeedCamera,
        HazardGeometry::Point(vertex(2)),
        "test",
    );
    h.engine
        .load_hazards(&StaticHazards(vec![camera]))
        .unwrap();
    assert!(h.engine.catalog().is_ready());

    h.engine.start_navigation(two_step_route());
    h.engine.update_location(fix(vertex(0), 0));

    // The 1 s display timer re-feeds the same position; the dedup
    // window must hold across it
    for s in 1..=5 {
        h.engine.refresh(t0() + Duration::seconds(s));
    }

    let log = h.observer_log.borrow();
    assert_eq!(log.alerts.len(), 1, "{:?}", log.alerts);
    let alert = &log.alerts[0];
    assert_eq!(alert.hazard_id, "cam-ahead");
    assert_eq!(alert.level, AlertLevel::Warning);
    assert!(alert.message.contains("Speed camera"));

    let spoken = h.speech_log.borrow();
    let camera_mentions = spoken
        .spoken
        .iter()
        .filter(|t| t.contains("Speed camera"))
        .count();
    assert_eq!(camera_mentions, 1);
}

#[test]
fn updates_before_start_navigation_are_ignored() {
    let mut h = harness(None);
    h.engine.update_location(fix(vertex(0), 0));
    assert!(h.observer_log.borrow().snapshots.is_empty());
    assert!(!h.engine.state().is_navigating);
}

#[test]
fn captions_flow_even_with_voice_disabled() {
    let mut settings = StaticSettings::default();
    settings.voice.enabled = false;

    let mut h = harness_with_settings(None, settings);
    h.engine.start_navigation(two_step_route());
    for i in 0..=20 {
        h.engine.update_location(fix(vertex(i), i as i64));
    }

    // The caption stream is independent of audio playback
    assert_eq!(h.observer_log.borrow().announcements.len(), 2);
    assert!(h.speech_log.borrow().spoken.is_empty());
}

#[test]
fn reported_hazards_enter_the_catalog_with_kind_defaults() {
    let mut h = harness(None);
    h.engine.load_hazards(&StaticHazards(Vec::new())).unwrap();

    let id = h.engine.report_hazard(
        vertex(1),
        HazardKind::PoliceCheckpoint,
        Some("checkpoint on the bridge".to_string()),
    );
    assert_eq!(id, "user-report-1");

    let found = h.engine.catalog().within_radius(vertex(1), 50.0);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].confidence, 0.6);
    assert!(!found[0].verified);
    assert_eq!(found[0].source, "user_report");
    assert_eq!(
        found[0].time_impact_s,
        HazardKind::PoliceCheckpoint.default_time_impact()
    );
}
