//! Off-route detection and reroute debouncing
//!
//! Deviation is a pure threshold function of the minimum vertex
//! distance, independent of how the position got there. Reroute
//! attempts are debounced from the *last attempt*, so oscillating
//! across the threshold cannot spam the routing provider.

use chrono::{DateTime, Duration, Utc};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    OnRoute,
    OffRoute,
}

/// Boundary crossing reported by [`OffRouteMonitor::observe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    WentOffRoute,
    BackOnRoute,
}

#[derive(Debug)]
pub struct OffRouteMonitor {
    state: RouteState,
}

impl Default for OffRouteMonitor {
    fn default() -> Self {
        OffRouteMonitor::new()
    }
}

impl OffRouteMonitor {
    pub fn new() -> OffRouteMonitor {
        OffRouteMonitor {
            state: RouteState::OnRoute,
        }
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    pub fn is_off_route(&self) -> bool {
        self.state == RouteState::OffRoute
    }

    /// Feed one minimum-vertex-distance observation. Returns the
    /// transition if the threshold was crossed; repeated identical
    /// observations are idempotent.
    pub fn observe(&mut self, min_distance_m: f64, threshold_m: f64) -> Option<Transition> {
        match self.state {
            RouteState::OnRoute if min_distance_m > threshold_m => {
                self.state = RouteState::OffRoute;
                debug!("Off route: {min_distance_m:.0} m from geometry");
                Some(Transition::WentOffRoute)
            }
            RouteState::OffRoute if min_distance_m <= threshold_m => {
                self.state = RouteState::OnRoute;
                Some(Transition::BackOnRoute)
            }
            _ => None,
        }
    }

    /// Back to OnRoute, e.g. after a route replacement
    pub fn reset(&mut self) {
        self.state = RouteState::OnRoute;
    }
}

/// Gate on reroute requests: at most one attempt per debounce window,
/// counted from the previous attempt regardless of its outcome.
#[derive(Debug, Default)]
pub struct Rerouter {
    last_attempt: Option<DateTime<Utc>>,
}

impl Rerouter {
    pub fn new() -> Rerouter {
        Rerouter::default()
    }

    /// True when an attempt may start now; records the attempt time.
    pub fn try_begin_attempt(&mut self, now: DateTime<Utc>, delay_s: f64) -> bool {
        let window = Duration::milliseconds((delay_s * 1000.0) as i64);
        match self.last_attempt {
            Some(previous) if now - previous < window => false,
            _ => {
                self.last_attempt = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_attempt = None;
    }
}
