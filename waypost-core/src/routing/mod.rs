//! Routing provider seam and hazard-aware candidate scoring

pub mod provider;
pub mod scoring;

pub use provider::{RouteOptions, RoutingProfile, RoutingProvider};
pub use scoring::{
    RouteAssessment, ScoredRoute, assess_candidates, assess_route, rank_candidates,
};
