//! Real-time navigation and hazard-avoidance engine
//!
//! Matches a moving position against a provider-computed route,
//! detects deviation and debounces rerouting, schedules turn
//! announcements, scans for nearby hazards with alert deduplication,
//! and folds corridor hazards into a route-ranking penalty. Routing,
//! location, speech and settings are external collaborators expressed
//! as traits; see [`engine::NavigationEngine`] for the composition
//! root.

pub mod engine;
pub mod error;
pub mod geomath;
pub mod hazards;
pub mod model;
pub mod prelude;
pub mod routing;
pub mod tracking;
pub mod voice;

pub use engine::{NavigationEngine, NavigationEvent, NavigationObserver};
pub use error::Error;
