//! Data model for navigation: routes, hazards, settings and live state

pub mod hazard;
pub mod route;
pub mod settings;
pub mod state;

pub use hazard::{HazardFeature, HazardGeometry, HazardKind, Severity};
pub use route::{Direction, Leg, ManeuverKind, Route, Step};
pub use settings::{
    AvoidanceSettings, NavigationSettings, SettingsStore, StaticSettings, VoiceSettings,
};
pub use state::{LocationFix, NavigationState};
