//! Bulk hazard loading from GeoJSON feature collections

use std::path::PathBuf;

use geo::Point;
use geojson::{GeoJson, GeometryValue, JsonObject};
use log::{info, warn};

use crate::Error;
use crate::model::{HazardFeature, HazardGeometry, HazardKind, Severity};

/// Source of bulk hazard features. Incremental user reports go through
/// the engine instead, which applies per-kind defaults.
pub trait HazardDataSource {
    fn load_features(&self) -> Result<Vec<HazardFeature>, Error>;
}

/// File-backed GeoJSON feature collection
#[derive(Debug, Clone)]
pub struct GeoJsonHazardSource {
    path: PathBuf,
}

impl GeoJsonHazardSource {
    pub fn new(path: impl Into<PathBuf>) -> GeoJsonHazardSource {
        GeoJsonHazardSource { path: path.into() }
    }
}

impl HazardDataSource for GeoJsonHazardSource {
    fn load_features(&self) -> Result<Vec<HazardFeature>, Error> {
        let text = std::fs::read_to_string(&self.path)?;
        hazards_from_geojson(&text)
    }
}

/// Parse a GeoJSON FeatureCollection into hazard features.
///
/// Structural problems (not a collection, unparseable JSON) fail the
/// whole load; individual features with unsupported geometry or
/// missing properties are skipped or filled from per-kind defaults,
/// since hazard data originates externally and one bad feature must
/// not take the catalog down with it.
///
/// # Errors
///
/// Returns an error if the text is not valid GeoJSON or not a
/// FeatureCollection.
pub fn hazards_from_geojson(text: &str) -> Result<Vec<HazardFeature>, Error> {
    let geojson: GeoJson = text.parse()?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(Error::InvalidData(
            "hazard source must be a GeoJSON FeatureCollection".to_string(),
        ));
    };

    let mut hazards = Vec::with_capacity(collection.features.len());
    for (position, feature) in collection.features.into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            warn!("Skipping hazard feature {position}: no geometry");
            continue;
        };
        let Some(geometry) = hazard_geometry(&geometry.value) else {
            warn!("Skipping hazard feature {position}: unsupported geometry type");
            continue;
        };

        let props = feature.properties.unwrap_or_default();
        let kind = str_prop(&props, "type")
            .or_else(|| str_prop(&props, "kind"))
            .map_or(HazardKind::Unknown, |name| HazardKind::from_name(&name));

        let id = str_prop(&props, "id").unwrap_or_else(|| format!("feature-{position}"));
        let severity = str_prop(&props, "severity")
            .and_then(|s| Severity::from_name(&s))
            .unwrap_or_else(|| kind.default_severity());

        hazards.push(HazardFeature {
            id,
            kind,
            geometry,
            severity,
            avoidance_radius_m: f64_prop(&props, "avoidance_radius")
                .unwrap_or_else(|| kind.default_avoidance_radius()),
            time_impact_s: f64_prop(&props, "time_impact")
                .unwrap_or_else(|| kind.default_time_impact()),
            confidence: f64_prop(&props, "confidence")
                .unwrap_or(1.0)
                .clamp(0.0, 1.0),
            source: str_prop(&props, "source").unwrap_or_else(|| "import".to_string()),
            verified: bool_prop(&props, "verified").unwrap_or(false),
            description: str_prop(&props, "description"),
        });
    }

    info!("Parsed {} hazard features", hazards.len());
    Ok(hazards)
}

fn hazard_geometry(value: &GeometryValue) -> Option<HazardGeometry> {
    match value {
        GeometryValue::Point { coordinates } => {
            coord_point(coordinates.as_slice()).map(HazardGeometry::Point)
        }
        GeometryValue::LineString { coordinates } => {
            let points: Vec<Point<f64>> = coordinates
                .iter()
                .filter_map(|c| coord_point(c.as_slice()))
                .collect();
            if points.is_empty() {
                None
            } else {
                Some(HazardGeometry::Polyline(points))
            }
        }
        _ => None,
    }
}

fn coord_point(coords: &[f64]) -> Option<Point<f64>> {
    // GeoJSON order is [lng, lat]
    match coords {
        [x, y, ..] => Some(Point::new(*x, *y)),
        _ => None,
    }
}

fn str_prop(props: &JsonObject, key: &str) -> Option<String> {
    props
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn f64_prop(props: &JsonObject, key: &str) -> Option<f64> {
    props.get(key).and_then(serde_json::Value::as_f64)
}

fn bool_prop(props: &JsonObject, key: &str) -> Option<bool> {
    props.get(key).and_then(serde_json::Value::as_bool)
}
