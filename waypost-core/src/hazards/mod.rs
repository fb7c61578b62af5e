//! Hazard catalog, data loading and per-tick proximity alerting

pub mod catalog;
pub mod loading;
pub mod proximity;

pub use catalog::HazardCatalog;
pub use loading::{GeoJsonHazardSource, HazardDataSource, hazards_from_geojson};
pub use proximity::{AlertLevel, HazardAlert, HazardProximityEngine};
