//! External routing provider seam
//!
//! The engine never computes routes itself; initial routes and
//! reroutes both come from a provider returning full polylines with
//! turn-by-turn steps.

use geo::Point;

use crate::Error;
use crate::model::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingProfile {
    Driving,
    Cycling,
    Walking,
}

#[derive(Debug, Clone)]
pub struct RouteOptions {
    pub profile: RoutingProfile,
    /// Ask the provider for alternates so avoidance scoring has
    /// candidates to rank
    pub alternatives: bool,
    pub avoid_hazards: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        RouteOptions {
            profile: RoutingProfile::Driving,
            alternatives: true,
            avoid_hazards: true,
        }
    }
}

pub trait RoutingProvider {
    /// Request route candidates from `origin` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Provider`] on timeout or upstream failure; the
    /// engine surfaces that as a single failed-reroute event.
    fn request_route(
        &self,
        origin: Point<f64>,
        destination: Point<f64>,
        options: &RouteOptions,
    ) -> Result<Vec<Route>, Error>;
}
