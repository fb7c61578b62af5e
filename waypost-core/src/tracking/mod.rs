//! Mapping live positions onto route geometry and deviation handling

pub mod off_route;
pub mod progress;

pub use off_route::{OffRouteMonitor, Rerouter, RouteState, Transition};
pub use progress::{RouteLocation, locate_on_route, resolve_step};
