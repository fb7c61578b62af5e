//! Live navigation state, owned exclusively by the engine

use chrono::{DateTime, Utc};
use geo::Point;

use super::route::{Route, Step};

/// One position report from the location source. Timestamps only need
/// to be monotonic; all temporal logic in the engine (reroute debounce,
/// alert TTLs) is driven by them rather than by wall-clock reads.
#[derive(Debug, Clone, Copy)]
pub struct LocationFix {
    pub point: Point<f64>,
    /// Ground speed in m/s, when the source provides one
    pub speed_mps: Option<f64>,
    pub heading_deg: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the trip in progress. Observers receive read snapshots
/// on every change; only position updates and reroute completion mutate
/// the live instance.
#[derive(Debug, Clone)]
pub struct NavigationState {
    pub is_navigating: bool,
    pub route: Option<Route>,
    pub current_leg_index: usize,
    pub current_step_index: usize,
    pub last_known_position: Option<Point<f64>>,
    pub is_off_route: bool,
    /// Fraction of the route geometry passed, [0, 1]
    pub route_progress: f64,
    pub distance_to_next_maneuver: f64,
    /// None while the current speed is zero or unknown
    pub time_to_next_maneuver: Option<f64>,
    pub total_distance_remaining: f64,
    pub total_time_remaining: f64,
    /// m/s
    pub current_speed: f64,
}

impl NavigationState {
    pub(crate) fn idle() -> NavigationState {
        NavigationState {
            is_navigating: false,
            route: None,
            current_leg_index: 0,
            current_step_index: 0,
            last_known_position: None,
            is_off_route: false,
            route_progress: 0.0,
            distance_to_next_maneuver: 0.0,
            time_to_next_maneuver: None,
            total_distance_remaining: 0.0,
            total_time_remaining: 0.0,
            current_speed: 0.0,
        }
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.route
            .as_ref()
            .and_then(|r| r.step(self.current_leg_index, self.current_step_index))
    }

    /// Provider text of the active instruction, for display
    pub fn current_instruction(&self) -> Option<&str> {
        self.current_step().map(|s| s.instruction.as_str())
    }
}
