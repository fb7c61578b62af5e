// Re-export key components
pub use crate::engine::{NavigationEngine, NavigationEvent, NavigationObserver};
pub use crate::error::Error;
pub use crate::geomath::{bearing, haversine_distance};

// Data model
pub use crate::model::{
    AvoidanceSettings, Direction, HazardFeature, HazardGeometry, HazardKind, Leg, LocationFix,
    ManeuverKind, NavigationSettings, NavigationState, Route, SettingsStore, Severity,
    StaticSettings, Step, VoiceSettings,
};

// Hazard catalog and alerting
pub use crate::hazards::{
    AlertLevel, GeoJsonHazardSource, HazardAlert, HazardCatalog, HazardDataSource,
    HazardProximityEngine, hazards_from_geojson,
};

// Candidate scoring and the provider seam
pub use crate::routing::{
    RouteAssessment, RouteOptions, RoutingProfile, RoutingProvider, ScoredRoute,
    assess_candidates, assess_route, rank_candidates,
};

// Speech
pub use crate::voice::{AnnouncementQueue, Priority, SpeechOutput};
