//! Navigation engine: one tick per position update
//!
//! Owns the live [`NavigationState`] and runs every position update to
//! completion before the next is accepted: route matching, off-route
//! detection, maneuver announcement and hazard scanning all happen
//! synchronously inside [`NavigationEngine::update_location`]. Speech
//! playback is the only suspension point and is callback-driven, so it
//! never blocks the tick.

use chrono::{DateTime, Utc};
use geo::Point;
use log::{info, warn};

use crate::Error;
use crate::hazards::{
    AlertLevel, HazardAlert, HazardCatalog, HazardDataSource, HazardProximityEngine,
};
use crate::model::{
    AvoidanceSettings, HazardFeature, HazardGeometry, HazardKind, LocationFix, NavigationSettings,
    NavigationState, Route, SettingsStore, Severity, VoiceSettings,
};
use crate::routing::{self, RouteOptions, RoutingProvider, ScoredRoute};
use crate::tracking::off_route::{OffRouteMonitor, Rerouter, Transition};
use crate::tracking::progress;
use crate::voice::{AnnouncementQueue, ManeuverAnnouncer, Priority, SpeechOutput};

/// Lifecycle notifications emitted alongside state snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    NavigationStarted,
    NavigationStopped,
    OffRoute,
    BackOnRoute,
    RerouteFailed { reason: String },
    RouteReplaced,
    Arrived,
}

/// Typed observer over engine output. Every callback fires at most
/// once per change, dispatch is non-reentrant, and the announcement
/// stream is independent of whether audio is enabled.
pub trait NavigationObserver {
    fn on_state_change(&mut self, _state: &NavigationState) {}
    fn on_hazard_alerts(&mut self, _alerts: &[HazardAlert]) {}
    fn on_announcement(&mut self, _text: &str) {}
    fn on_event(&mut self, _event: &NavigationEvent) {}
}

/// Per-tick results computed against the active route before any
/// state mutation or observer dispatch happens
struct TickOutcome {
    leg_index: usize,
    step_index: usize,
    progress: f64,
    distance_to_maneuver: Option<f64>,
    remaining: (f64, f64),
    transition: Option<Transition>,
    announcement: Option<String>,
    arrived: bool,
}

pub struct NavigationEngine {
    state: NavigationState,
    catalog: HazardCatalog,
    queue: AnnouncementQueue,
    monitor: OffRouteMonitor,
    rerouter: Rerouter,
    announcer: ManeuverAnnouncer,
    proximity: HazardProximityEngine,
    provider: Box<dyn RoutingProvider>,
    settings: Box<dyn SettingsStore>,
    observers: Vec<Box<dyn NavigationObserver>>,
    destination: Option<Point<f64>>,
    last_fix: Option<LocationFix>,
    report_seq: u64,
}

impl NavigationEngine {
    /// Build an engine from its collaborators. Construct one per
    /// process in a composition root and pass it by reference; there
    /// is no ambient instance to look up.
    pub fn new(
        provider: Box<dyn RoutingProvider>,
        settings: Box<dyn SettingsStore>,
        speech: Box<dyn SpeechOutput>,
    ) -> NavigationEngine {
        NavigationEngine {
            state: NavigationState::idle(),
            catalog: HazardCatalog::new(),
            queue: AnnouncementQueue::new(speech),
            monitor: OffRouteMonitor::new(),
            rerouter: Rerouter::new(),
            announcer: ManeuverAnnouncer::new(),
            proximity: HazardProximityEngine::new(),
            provider,
            settings,
            observers: Vec::new(),
            destination: None,
            last_fix: None,
            report_seq: 0,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn NavigationObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn catalog(&self) -> &HazardCatalog {
        &self.catalog
    }

    /// Bulk-replace the hazard catalog from a data source.
    ///
    /// # Errors
    ///
    /// Returns the source's error; the previous catalog contents stay
    /// intact in that case.
    pub fn load_hazards(&mut self, source: &dyn HazardDataSource) -> Result<usize, Error> {
        let features = source.load_features()?;
        let count = features.len();
        self.catalog.load_features(features);
        Ok(count)
    }

    /// Record a user hazard report at `point`, filling severity,
    /// radius and time impact from the per-kind defaults. Returns the
    /// assigned feature id.
    pub fn report_hazard(
        &mut self,
        point: Point<f64>,
        kind: HazardKind,
        note: Option<String>,
    ) -> String {
        self.report_seq += 1;
        let id = format!("user-report-{}", self.report_seq);
        let mut feature = HazardFeature::with_kind_defaults(
            id.clone(),
            kind,
            HazardGeometry::Point(point),
            "user_report",
        );
        feature.confidence = 0.6;
        feature.description = note;
        info!("User reported {} at {:?}", kind.name(), point);
        self.catalog.insert(feature);
        id
    }

    /// Score and rank route candidates against the current catalog and
    /// avoidance settings, without starting navigation
    pub fn score_routes(&self, routes: Vec<Route>, avoidance: bool) -> Vec<ScoredRoute> {
        let settings = self.settings.avoidance();
        routing::rank_candidates(
            routing::assess_candidates(&self.catalog, &settings, routes),
            avoidance,
        )
    }

    pub fn start_navigation(&mut self, route: Route) {
        let voice = self.settings.voice();
        let nav = self.settings.navigation();

        self.reset_trip();
        self.state.is_navigating = true;
        self.state.total_distance_remaining = route.distance_m;
        self.state.total_time_remaining = route.duration_s;
        self.destination = route.geometry.last().copied();
        info!(
            "Navigation started: {:.1} km, {:.0} s",
            route.distance_m / 1000.0,
            route.duration_s
        );
        self.state.route = Some(route);

        self.speak_instruction(&nav, &voice, "Navigation started", Priority::Normal);
        self.emit(&NavigationEvent::NavigationStarted);
        self.notify_state();
    }

    pub fn stop_navigation(&mut self) {
        if !self.state.is_navigating {
            return;
        }
        self.queue.stop();
        let voice = self.settings.voice();
        let nav = self.settings.navigation();
        self.reset_trip();
        self.speak_instruction(&nav, &voice, "Navigation stopped", Priority::Normal);
        info!("Navigation stopped");
        self.emit(&NavigationEvent::NavigationStopped);
        self.notify_state();
    }

    /// One navigation tick. Runs to completion: progress matching,
    /// off-route handling (possibly a reroute), maneuver announcement
    /// and the hazard proximity scan, then a single state snapshot to
    /// observers. Updates before `start_navigation` are ignored.
    pub fn update_location(&mut self, fix: LocationFix) {
        if !self.state.is_navigating {
            return;
        }

        let nav = self.settings.navigation();
        let avoidance = self.settings.avoidance();
        let voice = self.settings.voice();

        self.state.last_known_position = Some(fix.point);
        self.state.current_speed = fix.speed_mps.unwrap_or(0.0);
        self.last_fix = Some(fix);

        let Some(outcome) = self.run_route_matching(&nav, fix.point) else {
            return;
        };

        self.apply_outcome(&outcome);

        let alerts = if nav.hazard_alerts {
            self.proximity.scan(
                &self.catalog,
                &avoidance,
                fix.point,
                fix.speed_mps,
                fix.timestamp,
            )
        } else {
            Vec::new()
        };

        match outcome.transition {
            Some(Transition::WentOffRoute) => {
                info!("Position off route");
                self.emit(&NavigationEvent::OffRoute);
                self.speak_instruction(
                    &nav,
                    &voice,
                    "You have left the planned route",
                    Priority::High,
                );
                if nav.auto_reroute
                    && self
                        .rerouter
                        .try_begin_attempt(fix.timestamp, nav.reroute_delay_s)
                {
                    self.attempt_reroute(fix.point, &nav, &avoidance, &voice);
                }
            }
            Some(Transition::BackOnRoute) => {
                info!("Position back on route");
                self.emit(&NavigationEvent::BackOnRoute);
                self.speak_instruction(&nav, &voice, "Back on route", Priority::Normal);
            }
            None => {}
        }

        if let Some(text) = outcome.announcement {
            for observer in &mut self.observers {
                observer.on_announcement(&text);
            }
            self.speak_instruction(&nav, &voice, &text, Priority::Normal);
        }

        if !alerts.is_empty() {
            for observer in &mut self.observers {
                observer.on_hazard_alerts(&alerts);
            }
            for alert in &alerts {
                if alert.level == AlertLevel::Info {
                    continue;
                }
                let priority = if alert.severity == Severity::High {
                    Priority::High
                } else {
                    Priority::Normal
                };
                self.speak_hazard(&nav, &voice, &alert.message, priority);
            }
        }

        self.notify_state();

        if outcome.arrived {
            info!("Destination reached");
            self.emit(&NavigationEvent::Arrived);
            self.speak_instruction(
                &nav,
                &voice,
                "You have arrived at your destination",
                Priority::Normal,
            );
            self.reset_trip();
            self.notify_state();
        }
    }

    /// Re-feed the last known fix with a fresh timestamp so displayed
    /// distances and times stay current between GPS fixes. Runs the
    /// same pipeline as a real update; all dedup rules apply.
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        if let Some(fix) = self.last_fix {
            self.update_location(LocationFix {
                timestamp: now,
                ..fix
            });
        }
    }

    /// Host callback: the current speech finished
    pub fn playback_finished(&mut self) {
        self.queue.playback_finished();
    }

    /// Host callback: speech failed; the queue advances without retry
    pub fn playback_failed(&mut self) {
        self.queue.playback_failed();
    }

    fn run_route_matching(
        &mut self,
        nav: &NavigationSettings,
        position: Point<f64>,
    ) -> Option<TickOutcome> {
        let route = self.state.route.as_ref()?;
        let location = progress::locate_on_route(&route.geometry, position)?;
        let (leg_index, step_index) = progress::resolve_step(route, location.progress);

        let step = route.step(leg_index, step_index);
        let distance_to_maneuver =
            step.and_then(|s| progress::distance_to_step_end(s, position));
        let remaining = progress::remaining_after(route, leg_index, step_index);

        let transition = self
            .monitor
            .observe(location.min_distance_m, nav.off_route_threshold_m);

        let announcement = match (step, distance_to_maneuver) {
            (Some(step), Some(distance)) => self.announcer.check(
                leg_index,
                step_index,
                step,
                distance,
                nav.maneuver_distance_m,
            ),
            _ => None,
        };

        let arrived = route
            .geometry
            .last()
            .is_some_and(|end| {
                crate::geomath::haversine_distance(position, *end) <= nav.arrival_threshold_m
            });

        Some(TickOutcome {
            leg_index,
            step_index,
            progress: location.progress,
            distance_to_maneuver,
            remaining,
            transition,
            announcement,
            arrived,
        })
    }

    fn apply_outcome(&mut self, outcome: &TickOutcome) {
        self.state.current_leg_index = outcome.leg_index;
        self.state.current_step_index = outcome.step_index;
        self.state.route_progress = outcome.progress;
        self.state.is_off_route = self.monitor.is_off_route();
        // Keep the previous maneuver distance when the step carries no
        // geometry; route data originates externally and must not
        // stall navigation
        if let Some(distance) = outcome.distance_to_maneuver {
            self.state.distance_to_next_maneuver = distance;
        }
        self.state.time_to_next_maneuver = (self.state.current_speed > 0.0)
            .then(|| self.state.distance_to_next_maneuver / self.state.current_speed);
        self.state.total_distance_remaining = outcome.remaining.0;
        self.state.total_time_remaining = outcome.remaining.1;
    }

    fn attempt_reroute(
        &mut self,
        origin: Point<f64>,
        nav: &NavigationSettings,
        avoidance: &AvoidanceSettings,
        voice: &VoiceSettings,
    ) {
        let Some(destination) = self.destination else {
            return;
        };

        info!("Requesting reroute from current position");
        self.speak_instruction(nav, voice, "Recalculating route", Priority::Normal);

        match self
            .provider
            .request_route(origin, destination, &RouteOptions::default())
        {
            Ok(routes) if !routes.is_empty() => {
                let ranked =
                    routing::rank_candidates(
                        routing::assess_candidates(&self.catalog, avoidance, routes),
                        true,
                    );
                if let Some(best) = ranked.into_iter().next() {
                    self.apply_new_route(best.route);
                    self.emit(&NavigationEvent::RouteReplaced);
                }
            }
            Ok(_) => {
                warn!("Reroute returned no candidates");
                self.emit(&NavigationEvent::RerouteFailed {
                    reason: "no route candidates returned".to_string(),
                });
            }
            Err(error) => {
                warn!("Reroute failed: {error}");
                self.emit(&NavigationEvent::RerouteFailed {
                    reason: error.to_string(),
                });
            }
        }
    }

    /// Swap the active route atomically: indices, progress, announcer
    /// memory and off-route state all reset together
    fn apply_new_route(&mut self, route: Route) {
        self.destination = route.geometry.last().copied().or(self.destination);
        self.state.current_leg_index = 0;
        self.state.current_step_index = 0;
        self.state.route_progress = 0.0;
        self.state.is_off_route = false;
        self.state.total_distance_remaining = route.distance_m;
        self.state.total_time_remaining = route.duration_s;
        self.state.route = Some(route);
        self.announcer.reset();
        self.monitor.reset();
        info!("Route replaced after reroute");
    }

    fn reset_trip(&mut self) {
        self.state = NavigationState::idle();
        self.destination = None;
        self.last_fix = None;
        self.announcer.reset();
        self.monitor.reset();
        self.rerouter.reset();
        self.proximity.clear();
    }

    fn speak_instruction(
        &mut self,
        nav: &NavigationSettings,
        voice: &VoiceSettings,
        text: &str,
        priority: Priority,
    ) {
        if nav.voice_guidance && voice.enabled && voice.navigation_instructions {
            self.queue.enqueue(text, priority);
        }
    }

    fn speak_hazard(
        &mut self,
        nav: &NavigationSettings,
        voice: &VoiceSettings,
        text: &str,
        priority: Priority,
    ) {
        if nav.hazard_alerts && voice.enabled && voice.hazard_alerts {
            self.queue.enqueue(text, priority);
        }
    }

    fn emit(&mut self, event: &NavigationEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }

    fn notify_state(&mut self) {
        for observer in &mut self.observers {
            observer.on_state_change(&self.state);
        }
    }
}
