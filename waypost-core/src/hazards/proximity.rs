//! Per-tick hazard proximity scan with alert leveling and deduplication

use chrono::{DateTime, Duration, Utc};
use geo::Point;
use hashbrown::HashMap;
use log::debug;

use super::catalog::HazardCatalog;
use crate::model::{AvoidanceSettings, HazardKind, Severity};

const CRITICAL_DISTANCE_M: f64 = 100.0;
const WARNING_DISTANCE_M: f64 = 300.0;
/// Width of the dedup distance buckets
const BUCKET_SIZE_M: f64 = 100.0;
const ALERT_TTL_MIN: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone)]
pub struct HazardAlert {
    pub hazard_id: String,
    pub kind: HazardKind,
    pub severity: Severity,
    pub distance_m: f64,
    pub bearing_deg: f64,
    /// Seconds until reaching the hazard at the current speed
    pub time_to_reach_s: Option<f64>,
    pub level: AlertLevel,
    pub message: String,
}

/// Scans the catalog around the current position once per tick and
/// suppresses repeats: each (hazard, 100 m distance bucket) pair fires
/// at most once per five-minute window, however often the position
/// wobbles inside the bucket.
#[derive(Debug, Default)]
pub struct HazardProximityEngine {
    fired: HashMap<(String, u32), DateTime<Utc>>,
}

impl HazardProximityEngine {
    pub fn new() -> HazardProximityEngine {
        HazardProximityEngine::default()
    }

    /// Drop all dedup records, e.g. when a new trip starts
    pub fn clear(&mut self) {
        self.fired.clear();
    }

    /// One proximity pass. Returns the surviving alerts sorted by
    /// ascending distance; suppressed or disabled hazards produce none.
    pub fn scan(
        &mut self,
        catalog: &HazardCatalog,
        settings: &AvoidanceSettings,
        position: Point<f64>,
        speed_mps: Option<f64>,
        now: DateTime<Utc>,
    ) -> Vec<HazardAlert> {
        // Scavenge expired records lazily; no timers involved
        self.fired.retain(|_, expires| *expires > now);

        let mut alerts = Vec::new();
        for hazard in catalog.within_radius(position, settings.alert_distance_m) {
            if !settings.is_kind_enabled(hazard.kind) {
                continue;
            }

            let distance = hazard.distance_from(position);
            let bucket = (distance / BUCKET_SIZE_M).floor() as u32;
            let key = (hazard.id.clone(), bucket);
            if self.fired.contains_key(&key) {
                debug!("Suppressed repeat alert for {} (bucket {bucket})", hazard.id);
                continue;
            }
            self.fired
                .insert(key, now + Duration::minutes(ALERT_TTL_MIN));

            let time_to_reach_s = speed_mps.filter(|s| *s > 0.0).map(|s| distance / s);
            alerts.push(HazardAlert {
                hazard_id: hazard.id.clone(),
                kind: hazard.kind,
                severity: hazard.severity,
                distance_m: distance,
                bearing_deg: hazard.bearing_from(position),
                time_to_reach_s,
                level: alert_level(distance, hazard.severity),
                message: alert_message(hazard.kind, distance),
            });
        }

        alerts.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        alerts
    }
}

fn alert_level(distance_m: f64, severity: Severity) -> AlertLevel {
    if distance_m < CRITICAL_DISTANCE_M {
        AlertLevel::Critical
    } else if distance_m < WARNING_DISTANCE_M || severity == Severity::High {
        AlertLevel::Warning
    } else {
        AlertLevel::Info
    }
}

fn alert_message(kind: HazardKind, distance_m: f64) -> String {
    let phrase = match kind {
        HazardKind::SpeedCamera => "Speed camera",
        HazardKind::RedLightCamera => "Red light camera",
        HazardKind::Roadwork => "Road works",
        HazardKind::AverageSpeedCamera => "Average speed check zone",
        HazardKind::PoliceCheckpoint => "Police checkpoint",
        HazardKind::RailwayCrossing => "Railway crossing",
        HazardKind::TollBooth => "Toll booth",
        HazardKind::TollRoad => "Toll road",
        HazardKind::ConstructionZone => "Construction zone",
        HazardKind::SchoolZone => "School zone",
        HazardKind::Ferry => "Ferry crossing",
        HazardKind::NarrowRoad => "Narrow road",
        HazardKind::SteepGrade => "Steep grade",
        HazardKind::UnpavedRoad => "Unpaved road",
        HazardKind::Junction => "Complex junction",
        HazardKind::Motorway => "Motorway",
        HazardKind::Unknown => "Hazard",
    };
    let advisory = match kind {
        HazardKind::RailwayCrossing => " - prepare to stop",
        HazardKind::TollBooth => " - have payment ready",
        HazardKind::ConstructionZone | HazardKind::SchoolZone => " - reduce speed",
        HazardKind::NarrowRoad => " - drive carefully",
        HazardKind::Junction => " - stay alert",
        _ => "",
    };
    format!(
        "{phrase} ahead in {}{advisory}",
        short_distance(distance_m)
    )
}

fn short_distance(m: f64) -> String {
    if m < 1000.0 {
        format!("{} m", m.round() as i64)
    } else {
        format!("{:.1} km", m / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::model::{HazardFeature, HazardGeometry};

    fn catalog_with(features: Vec<HazardFeature>) -> HazardCatalog {
        let mut catalog = HazardCatalog::new();
        catalog.load_features(features);
        catalog
    }

    fn camera_at(id: &str, x: f64, y: f64) -> HazardFeature {
        HazardFeature::with_kind_defaults(
            id,
            HazardKind::SpeedCamera,
            HazardGeometry::Point(Point::new(x, y)),
            "test",
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn levels_follow_distance_and_severity() {
        assert_eq!(alert_level(50.0, Severity::Low), AlertLevel::Critical);
        assert_eq!(alert_level(150.0, Severity::Low), AlertLevel::Warning);
        assert_eq!(alert_level(450.0, Severity::Low), AlertLevel::Info);
        // High severity is never downgraded below warning
        assert_eq!(alert_level(450.0, Severity::High), AlertLevel::Warning);
    }

    #[test]
    fn disabled_kinds_never_alert() {
        let catalog = catalog_with(vec![HazardFeature::with_kind_defaults(
            "sz-1",
            HazardKind::SchoolZone,
            HazardGeometry::Point(Point::new(0.0, 0.001)),
            "test",
        )]);
        let mut engine = HazardProximityEngine::new();
        let alerts = engine.scan(
            &catalog,
            &AvoidanceSettings::default(),
            Point::new(0.0, 0.0),
            None,
            t0(),
        );
        assert!(alerts.is_empty());
    }

    #[test]
    fn fixed_bucket_fires_once_per_five_minute_window() {
        let catalog = catalog_with(vec![camera_at("cam", 0.0, 0.002)]);
        let settings = AvoidanceSettings::default();
        let mut engine = HazardProximityEngine::new();

        let mut fired = 0;
        for tick in 0..100 {
            let now = t0() + Duration::seconds(tick);
            fired += engine
                .scan(&catalog, &settings, Point::new(0.0, 0.0), None, now)
                .len();
        }
        assert_eq!(fired, 1);

        // After the TTL lapses the same bucket may fire again
        let later = t0() + Duration::minutes(6);
        let alerts = engine.scan(&catalog, &settings, Point::new(0.0, 0.0), None, later);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn entering_a_new_bucket_fires_again() {
        let catalog = catalog_with(vec![camera_at("cam", 0.0, 0.004)]);
        let settings = AvoidanceSettings::default();
        let mut engine = HazardProximityEngine::new();

        // ~440 m away, then ~220 m away: different buckets
        let far = engine.scan(&catalog, &settings, Point::new(0.0, 0.0), None, t0());
        let near = engine.scan(
            &catalog,
            &settings,
            Point::new(0.0, 0.002),
            None,
            t0() + Duration::seconds(30),
        );
        assert_eq!(far.len(), 1);
        assert_eq!(near.len(), 1);
        assert!(near[0].distance_m < far[0].distance_m);
    }

    #[test]
    fn alerts_are_sorted_by_distance() {
        let catalog = catalog_with(vec![
            camera_at("far", 0.0, 0.004),
            camera_at("near", 0.0, 0.001),
        ]);
        let mut engine = HazardProximityEngine::new();
        let alerts = engine.scan(
            &catalog,
            &AvoidanceSettings::default(),
            Point::new(0.0, 0.0),
            Some(14.0),
            t0(),
        );
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].hazard_id, "near");
        assert!(alerts[0].time_to_reach_s.unwrap() < alerts[1].time_to_reach_s.unwrap());
    }

    #[test]
    fn message_carries_kind_wording() {
        let text = alert_message(HazardKind::RailwayCrossing, 240.0);
        assert_eq!(text, "Railway crossing ahead in 240 m - prepare to stop");
        let km = alert_message(HazardKind::SpeedCamera, 1240.0);
        assert_eq!(km, "Speed camera ahead in 1.2 km");
    }
}
