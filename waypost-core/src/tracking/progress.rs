//! Position-to-route matching by nearest vertex
//!
//! The scan is linear in the route length, which is fine for routes of
//! a few thousand vertices; very long routes would want a
//! cumulative-distance binary search or a spatial index instead.

use geo::Point;
use itertools::Itertools;

use crate::geomath::haversine_distance;
use crate::model::{Route, Step};

/// Where a position falls on the route geometry
#[derive(Debug, Clone, Copy)]
pub struct RouteLocation {
    pub nearest_index: usize,
    /// Distance from the position to the nearest route vertex
    pub min_distance_m: f64,
    /// Fraction of the geometry passed: 0 at the first vertex, 1 at
    /// the last
    pub progress: f64,
}

/// Nearest route vertex to `position`. None for empty geometry.
pub fn locate_on_route(geometry: &[Point<f64>], position: Point<f64>) -> Option<RouteLocation> {
    let nearest_index = geometry
        .iter()
        .map(|vertex| haversine_distance(position, *vertex))
        .position_min_by(f64::total_cmp)?;
    let min_distance_m = haversine_distance(position, geometry[nearest_index]);

    let progress = if geometry.len() > 1 {
        nearest_index as f64 / (geometry.len() - 1) as f64
    } else {
        0.0
    };

    Some(RouteLocation {
        nearest_index,
        min_distance_m,
        progress,
    })
}

/// Resolve the active (leg, step) pair by walking steps until the
/// accumulated step distance reaches `progress` of the total route
/// distance. Out-of-range data clamps to the last step.
pub fn resolve_step(route: &Route, progress: f64) -> (usize, usize) {
    let target = progress * route.distance_m;
    let mut accumulated = 0.0;

    for (leg_index, leg) in route.legs.iter().enumerate() {
        for (step_index, step) in leg.steps.iter().enumerate() {
            accumulated += step.distance_m;
            if target <= accumulated {
                return (leg_index, step_index);
            }
        }
    }

    let last_leg = route.legs.len().saturating_sub(1);
    let last_step = route
        .legs
        .last()
        .map_or(0, |leg| leg.steps.len().saturating_sub(1));
    (last_leg, last_step)
}

/// Distance from `position` to the step's maneuver point (its final
/// geometry vertex). None for a step without geometry; the caller
/// keeps its previous value in that case.
pub fn distance_to_step_end(step: &Step, position: Point<f64>) -> Option<f64> {
    step.geometry
        .last()
        .map(|vertex| haversine_distance(position, *vertex))
}

/// Remaining (distance, time) summed from the active step to the end
/// of the route
pub fn remaining_after(route: &Route, leg_index: usize, step_index: usize) -> (f64, f64) {
    let mut distance = 0.0;
    let mut time = 0.0;

    for (li, leg) in route.legs.iter().enumerate().skip(leg_index) {
        let first_step = if li == leg_index { step_index } else { 0 };
        for step in leg.steps.iter().skip(first_step) {
            distance += step.distance_m;
            time += step.duration_s;
        }
    }

    (distance, time)
}
