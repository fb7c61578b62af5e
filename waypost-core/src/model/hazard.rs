//! Hazard features: point or polyline obstacles to warn about or avoid

use geo::Point;

use crate::geomath::{bearing, haversine_distance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HazardKind {
    SpeedCamera,
    RedLightCamera,
    Roadwork,
    AverageSpeedCamera,
    PoliceCheckpoint,
    RailwayCrossing,
    TollBooth,
    TollRoad,
    ConstructionZone,
    SchoolZone,
    Ferry,
    NarrowRoad,
    SteepGrade,
    UnpavedRoad,
    Junction,
    Motorway,
    Unknown,
}

impl HazardKind {
    pub const ALL: [HazardKind; 17] = [
        HazardKind::SpeedCamera,
        HazardKind::RedLightCamera,
        HazardKind::Roadwork,
        HazardKind::AverageSpeedCamera,
        HazardKind::PoliceCheckpoint,
        HazardKind::RailwayCrossing,
        HazardKind::TollBooth,
        HazardKind::TollRoad,
        HazardKind::ConstructionZone,
        HazardKind::SchoolZone,
        HazardKind::Ferry,
        HazardKind::NarrowRoad,
        HazardKind::SteepGrade,
        HazardKind::UnpavedRoad,
        HazardKind::Junction,
        HazardKind::Motorway,
        HazardKind::Unknown,
    ];

    /// Parse the snake_case wire name; unrecognized names map to `Unknown`
    pub fn from_name(name: &str) -> HazardKind {
        match name {
            "speed_camera" => HazardKind::SpeedCamera,
            "red_light_camera" | "traffic_camera" => HazardKind::RedLightCamera,
            "roadwork" => HazardKind::Roadwork,
            "average_speed_camera" => HazardKind::AverageSpeedCamera,
            "police_checkpoint" => HazardKind::PoliceCheckpoint,
            "railway_crossing" => HazardKind::RailwayCrossing,
            "toll_booth" => HazardKind::TollBooth,
            "toll_road" => HazardKind::TollRoad,
            "construction_zone" => HazardKind::ConstructionZone,
            "school_zone" => HazardKind::SchoolZone,
            "ferry" | "ferry_route" | "ferry_terminal" => HazardKind::Ferry,
            "narrow_road" => HazardKind::NarrowRoad,
            "steep_grade" => HazardKind::SteepGrade,
            "unpaved_road" => HazardKind::UnpavedRoad,
            "junction" | "motorway_junction" => HazardKind::Junction,
            "motorway" => HazardKind::Motorway,
            _ => HazardKind::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HazardKind::SpeedCamera => "speed_camera",
            HazardKind::RedLightCamera => "red_light_camera",
            HazardKind::Roadwork => "roadwork",
            HazardKind::AverageSpeedCamera => "average_speed_camera",
            HazardKind::PoliceCheckpoint => "police_checkpoint",
            HazardKind::RailwayCrossing => "railway_crossing",
            HazardKind::TollBooth => "toll_booth",
            HazardKind::TollRoad => "toll_road",
            HazardKind::ConstructionZone => "construction_zone",
            HazardKind::SchoolZone => "school_zone",
            HazardKind::Ferry => "ferry",
            HazardKind::NarrowRoad => "narrow_road",
            HazardKind::SteepGrade => "steep_grade",
            HazardKind::UnpavedRoad => "unpaved_road",
            HazardKind::Junction => "junction",
            HazardKind::Motorway => "motorway",
            HazardKind::Unknown => "unknown",
        }
    }

    /// Default avoidance radius in meters, used when a feature or user
    /// report does not carry its own
    pub fn default_avoidance_radius(self) -> f64 {
        match self {
            HazardKind::RailwayCrossing | HazardKind::Ferry => 1000.0,
            HazardKind::TollBooth | HazardKind::TollRoad => 500.0,
            HazardKind::ConstructionZone | HazardKind::Roadwork => 300.0,
            HazardKind::Junction => 200.0,
            HazardKind::SchoolZone => 150.0,
            _ => 100.0,
        }
    }

    /// Default time impact in seconds for route scoring
    pub fn default_time_impact(self) -> f64 {
        match self {
            HazardKind::Ferry => 900.0,
            HazardKind::RailwayCrossing
            | HazardKind::ConstructionZone
            | HazardKind::Roadwork => 180.0,
            HazardKind::PoliceCheckpoint => 90.0,
            HazardKind::TollBooth | HazardKind::SteepGrade => 60.0,
            HazardKind::SchoolZone => 45.0,
            HazardKind::Junction => 30.0,
            _ => 10.0,
        }
    }

    pub fn default_severity(self) -> Severity {
        match self {
            HazardKind::SpeedCamera
            | HazardKind::RedLightCamera
            | HazardKind::AverageSpeedCamera
            | HazardKind::RailwayCrossing
            | HazardKind::TollRoad
            | HazardKind::TollBooth
            | HazardKind::Ferry => Severity::High,
            HazardKind::PoliceCheckpoint
            | HazardKind::Junction
            | HazardKind::ConstructionZone
            | HazardKind::Roadwork
            | HazardKind::NarrowRoad
            | HazardKind::SteepGrade => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_name(name: &str) -> Option<Severity> {
        match name {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Point hazards sit at a single location; polyline hazards (roadwork
/// stretches, toll roads, average-speed zones) span several vertices.
#[derive(Debug, Clone)]
pub enum HazardGeometry {
    Point(Point<f64>),
    Polyline(Vec<Point<f64>>),
}

impl HazardGeometry {
    pub fn vertices(&self) -> &[Point<f64>] {
        match self {
            HazardGeometry::Point(p) => std::slice::from_ref(p),
            HazardGeometry::Polyline(points) => points,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HazardFeature {
    pub id: String,
    pub kind: HazardKind,
    pub geometry: HazardGeometry,
    pub severity: Severity,
    pub avoidance_radius_m: f64,
    pub time_impact_s: f64,
    /// Reliability of the source, [0, 1]
    pub confidence: f64,
    pub source: String,
    pub verified: bool,
    pub description: Option<String>,
}

impl HazardFeature {
    /// Build a feature from a location and kind, filling severity,
    /// radius and time impact from the per-kind defaults
    pub fn with_kind_defaults(
        id: impl Into<String>,
        kind: HazardKind,
        geometry: HazardGeometry,
        source: impl Into<String>,
    ) -> HazardFeature {
        HazardFeature {
            id: id.into(),
            kind,
            geometry,
            severity: kind.default_severity(),
            avoidance_radius_m: kind.default_avoidance_radius(),
            time_impact_s: kind.default_time_impact(),
            confidence: 1.0,
            source: source.into(),
            verified: false,
            description: None,
        }
    }

    /// Distance from `point` to the nearest vertex of this hazard
    pub fn distance_from(&self, point: Point<f64>) -> f64 {
        self.geometry
            .vertices()
            .iter()
            .map(|v| haversine_distance(point, *v))
            .fold(f64::INFINITY, f64::min)
    }

    /// Bearing from `point` towards the nearest vertex of this hazard
    pub fn bearing_from(&self, point: Point<f64>) -> f64 {
        let nearest = self
            .geometry
            .vertices()
            .iter()
            .min_by(|a, b| {
                haversine_distance(point, **a).total_cmp(&haversine_distance(point, **b))
            })
            .copied();
        nearest.map_or(0.0, |v| bearing(point, v))
    }
}
