//! Provider-computed route geometry and turn-by-turn instructions
//!
//! A [`Route`] is immutable once returned by the routing provider; the
//! engine only ever swaps whole routes, never edits one in place.

use std::fmt;

use geo::Point;

/// One discrete driving instruction within a leg
#[derive(Debug, Clone)]
pub struct Step {
    /// Provider instruction text, used verbatim when no template applies
    pub instruction: String,
    pub maneuver: ManeuverKind,
    pub direction: Option<Direction>,
    /// Exit number for roundabout maneuvers
    pub roundabout_exit: Option<u32>,
    pub distance_m: f64,
    pub duration_s: f64,
    /// Subsequence of the route geometry covered by this step.
    /// The final vertex is the maneuver point.
    pub geometry: Vec<Point<f64>>,
    pub street: Option<String>,
}

/// Portion of a route between two waypoints
#[derive(Debug, Clone)]
pub struct Leg {
    pub distance_m: f64,
    pub duration_s: f64,
    pub steps: Vec<Step>,
}

/// Complete route as returned by the routing provider
#[derive(Debug, Clone)]
pub struct Route {
    pub distance_m: f64,
    pub duration_s: f64,
    pub geometry: Vec<Point<f64>>,
    pub legs: Vec<Leg>,
}

impl Route {
    pub fn step(&self, leg: usize, step: usize) -> Option<&Step> {
        self.legs.get(leg).and_then(|l| l.steps.get(step))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverKind {
    Depart,
    Turn,
    Merge,
    Ramp,
    Roundabout,
    Continue,
    Arrive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Straight,
    SlightLeft,
    SlightRight,
    SharpLeft,
    SharpRight,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Straight => "straight",
            Direction::SlightLeft => "slight left",
            Direction::SlightRight => "slight right",
            Direction::SharpLeft => "sharp left",
            Direction::SharpRight => "sharp right",
        };
        f.write_str(text)
    }
}
