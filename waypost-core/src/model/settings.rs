//! Engine settings supplied by the host as read-only snapshots

use serde::{Deserialize, Serialize};

use super::hazard::HazardKind;

/// Per-kind avoidance flags plus alerting and scoring limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceSettings {
    pub avoid_speed_cameras: bool,
    pub avoid_red_light_cameras: bool,
    pub avoid_roadworks: bool,
    pub avoid_average_speed_cameras: bool,
    pub avoid_police_checkpoints: bool,
    pub avoid_railway_crossings: bool,
    pub avoid_toll_booths: bool,
    pub avoid_toll_roads: bool,
    pub avoid_construction_zones: bool,
    pub avoid_school_zones: bool,
    pub avoid_ferries: bool,
    pub avoid_narrow_roads: bool,
    pub avoid_steep_grades: bool,
    pub avoid_unpaved_roads: bool,
    pub avoid_junctions: bool,
    pub avoid_motorways: bool,
    pub alert_distance_m: f64,
    /// Ceiling on the extra journey time accepted for avoidance
    pub max_extra_time_min: u32,
}

impl AvoidanceSettings {
    pub fn is_kind_enabled(&self, kind: HazardKind) -> bool {
        match kind {
            HazardKind::SpeedCamera => self.avoid_speed_cameras,
            HazardKind::RedLightCamera => self.avoid_red_light_cameras,
            HazardKind::Roadwork => self.avoid_roadworks,
            HazardKind::AverageSpeedCamera => self.avoid_average_speed_cameras,
            HazardKind::PoliceCheckpoint => self.avoid_police_checkpoints,
            HazardKind::RailwayCrossing => self.avoid_railway_crossings,
            HazardKind::TollBooth => self.avoid_toll_booths,
            HazardKind::TollRoad => self.avoid_toll_roads,
            HazardKind::ConstructionZone => self.avoid_construction_zones,
            HazardKind::SchoolZone => self.avoid_school_zones,
            HazardKind::Ferry => self.avoid_ferries,
            HazardKind::NarrowRoad => self.avoid_narrow_roads,
            HazardKind::SteepGrade => self.avoid_steep_grades,
            HazardKind::UnpavedRoad => self.avoid_unpaved_roads,
            HazardKind::Junction => self.avoid_junctions,
            HazardKind::Motorway => self.avoid_motorways,
            HazardKind::Unknown => false,
        }
    }
}

impl Default for AvoidanceSettings {
    fn default() -> Self {
        AvoidanceSettings {
            avoid_speed_cameras: true,
            avoid_red_light_cameras: true,
            avoid_roadworks: false,
            avoid_average_speed_cameras: true,
            avoid_police_checkpoints: false,
            // On by default: level crossing delays dwarf the detour cost
            avoid_railway_crossings: true,
            avoid_toll_booths: true,
            avoid_toll_roads: true,
            avoid_construction_zones: true,
            avoid_school_zones: false,
            avoid_ferries: false,
            avoid_narrow_roads: false,
            avoid_steep_grades: false,
            avoid_unpaved_roads: false,
            avoid_junctions: false,
            avoid_motorways: false,
            alert_distance_m: 500.0,
            max_extra_time_min: 20,
        }
    }
}

/// Thresholds and toggles for route following
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    pub auto_reroute: bool,
    pub off_route_threshold_m: f64,
    pub reroute_delay_s: f64,
    pub maneuver_distance_m: f64,
    pub arrival_threshold_m: f64,
    pub voice_guidance: bool,
    pub hazard_alerts: bool,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        NavigationSettings {
            auto_reroute: true,
            off_route_threshold_m: 50.0,
            reroute_delay_s: 5.0,
            maneuver_distance_m: 200.0,
            arrival_threshold_m: 30.0,
            voice_guidance: true,
            hazard_alerts: true,
        }
    }
}

/// Speech preferences. Volume, rate, pitch and voice are passed through
/// to the speech backend; the engine only consults the enable flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub enabled: bool,
    pub volume: f64,
    pub rate: f64,
    pub pitch: f64,
    pub voice: Option<String>,
    pub language: String,
    pub hazard_alerts: bool,
    pub navigation_instructions: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        VoiceSettings {
            enabled: true,
            volume: 0.8,
            rate: 0.9,
            pitch: 1.0,
            voice: None,
            language: "en-US".to_string(),
            hazard_alerts: true,
            navigation_instructions: true,
        }
    }
}

/// Read-only settings snapshots, read fresh on each use. The engine
/// never caches a snapshot across ticks, so host-side changes apply on
/// the next position update.
pub trait SettingsStore {
    fn avoidance(&self) -> AvoidanceSettings;
    fn voice(&self) -> VoiceSettings;
    fn navigation(&self) -> NavigationSettings;
}

/// In-memory settings, for composition roots and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    pub avoidance: AvoidanceSettings,
    pub voice: VoiceSettings,
    pub navigation: NavigationSettings,
}

impl SettingsStore for StaticSettings {
    fn avoidance(&self) -> AvoidanceSettings {
        self.avoidance.clone()
    }

    fn voice(&self) -> VoiceSettings {
        self.voice.clone()
    }

    fn navigation(&self) -> NavigationSettings {
        self.navigation.clone()
    }
}
