//! Folding corridor hazards into a route-ranking penalty
//!
//! Scoring annotates candidates with an estimated extra time and an
//! aggregate severity; it never rewrites the provider's own distance
//! or duration figures.

use std::cmp::Ordering;

use itertools::Itertools;
use rayon::prelude::*;

use crate::hazards::HazardCatalog;
use crate::model::{AvoidanceSettings, Route, Severity};

/// Corridor half-width used when sweeping candidates for hazards
pub const CORRIDOR_BUFFER_M: f64 = 200.0;
/// Durations within this of each other count as tied for ranking
pub const NEAR_TIE_DURATION_S: f64 = 300.0;

const MAX_COMPLEXITY_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct RouteAssessment {
    /// Everything found in the corridor, enabled or not
    pub total_obstacles: usize,
    /// Corridor hazards of kinds the settings ask to avoid
    pub avoidable_obstacles: usize,
    /// Detour penalty estimate, capped at the settings limit
    pub estimated_extra_time_s: f64,
    /// Worst severity among avoidable hazards; None when clear
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone)]
pub struct ScoredRoute {
    pub route: Route,
    pub assessment: RouteAssessment,
}

/// Sweep one candidate's corridor and derive its penalty.
///
/// The raw penalty is the summed time impact of avoidable hazards,
/// inflated by a diminishing complexity multiplier
/// (min(1 + 0.1·n, 2)); the product is capped at the configured
/// maximum extra time however many hazards pile up.
pub fn assess_route(
    catalog: &HazardCatalog,
    settings: &AvoidanceSettings,
    route: &Route,
) -> RouteAssessment {
    let nearby = catalog.near_corridor(&route.geometry, CORRIDOR_BUFFER_M);
    let avoidable: Vec<_> = nearby
        .iter()
        .filter(|h| settings.is_kind_enabled(h.kind))
        .collect();

    let raw_penalty_s: f64 = avoidable.iter().map(|h| h.time_impact_s).sum();
    let multiplier =
        (1.0 + 0.1 * avoidable.len() as f64).min(MAX_COMPLEXITY_MULTIPLIER);
    let cap_s = f64::from(settings.max_extra_time_min) * 60.0;

    RouteAssessment {
        total_obstacles: nearby.len(),
        avoidable_obstacles: avoidable.len(),
        estimated_extra_time_s: (raw_penalty_s * multiplier).round().min(cap_s),
        severity: avoidable.iter().map(|h| h.severity).max(),
    }
}

/// Assess every candidate in parallel, preserving order
pub fn assess_candidates(
    catalog: &HazardCatalog,
    settings: &AvoidanceSettings,
    routes: Vec<Route>,
) -> Vec<ScoredRoute> {
    routes
        .into_par_iter()
        .map(|route| ScoredRoute {
            assessment: assess_route(catalog, settings, &route),
            route,
        })
        .collect()
}

/// Order candidates for display. With avoidance requested: fewer
/// avoidable obstacles first, lower severity on a near-tie of
/// duration, then shorter duration, then shorter distance. Without:
/// duration, then distance.
pub fn rank_candidates(scored: Vec<ScoredRoute>, avoidance: bool) -> Vec<ScoredRoute> {
    scored
        .into_iter()
        .sorted_by(|a, b| {
            if avoidance {
                compare_with_avoidance(a, b)
            } else {
                compare_by_time(a, b)
            }
        })
        .collect()
}

fn compare_with_avoidance(a: &ScoredRoute, b: &ScoredRoute) -> Ordering {
    let by_obstacles = a
        .assessment
        .avoidable_obstacles
        .cmp(&b.assessment.avoidable_obstacles);
    if by_obstacles != Ordering::Equal {
        return by_obstacles;
    }

    let near_tie = (a.route.duration_s - b.route.duration_s).abs() <= NEAR_TIE_DURATION_S;
    if near_tie {
        let by_severity = a.assessment.severity.cmp(&b.assessment.severity);
        if by_severity != Ordering::Equal {
            return by_severity;
        }
    }

    compare_by_time(a, b)
}

fn compare_by_time(a: &ScoredRoute, b: &ScoredRoute) -> Ordering {
    a.route
        .duration_s
        .total_cmp(&b.route.duration_s)
        .then(a.route.distance_m.total_cmp(&b.route.distance_m))
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::model::{HazardFeature, HazardGeometry, HazardKind};

    fn straight_route(duration_s: f64, distance_m: f64) -> Route {
        Route {
            distance_m,
            duration_s,
            geometry: (0..=10).map(|i| Point::new(0.0, f64::from(i) * 0.001)).collect(),
            legs: Vec::new(),
        }
    }

    fn cameras_on_route(n: usize) -> HazardCatalog {
        let mut catalog = HazardCatalog::new();
        let features = (0..n)
            .map(|i| {
                HazardFeature::with_kind_defaults(
                    format!("cam-{i}"),
                    HazardKind::SpeedCamera,
                    HazardGeometry::Point(Point::new(0.0, i as f64 * 0.001)),
                    "test",
                )
            })
            .collect();
        catalog.load_features(features);
        catalog
    }

    #[test]
    fn extra_time_is_nondecreasing_in_obstacle_count() {
        let settings = AvoidanceSettings::default();
        let route = straight_route(600.0, 5_000.0);

        let mut previous = -1.0;
        for n in 0..8 {
            let assessment = assess_route(&cameras_on_route(n), &settings, &route);
            assert_eq!(assessment.avoidable_obstacles, n);
            assert!(
                assessment.estimated_extra_time_s >= previous,
                "penalty decreased at n={n}"
            );
            previous = assessment.estimated_extra_time_s;
        }
    }

    #[test]
    fn extra_time_is_capped_regardless_of_count() {
        let mut settings = AvoidanceSettings::default();
        settings.avoid_ferries = true;
        settings.max_extra_time_min = 2;

        let mut catalog = HazardCatalog::new();
        let ferries = (0..6)
            .map(|i| {
                HazardFeature::with_kind_defaults(
                    format!("ferry-{i}"),
                    HazardKind::Ferry,
                    HazardGeometry::Point(Point::new(0.0, i as f64 * 0.001)),
                    "test",
                )
            })
            .collect();
        catalog.load_features(ferries);

        let assessment =
            assess_route(&catalog, &settings, &straight_route(600.0, 5_000.0));
        assert_eq!(assessment.estimated_extra_time_s, 120.0);
    }

    #[test]
    fn disabled_kinds_count_as_obstacles_but_not_avoidable() {
        let mut catalog = HazardCatalog::new();
        catalog.load_features(vec![HazardFeature::with_kind_defaults(
            "sz",
            HazardKind::SchoolZone,
            HazardGeometry::Point(Point::new(0.0, 0.001)),
            "test",
        )]);

        let assessment = assess_route(
            &catalog,
            &AvoidanceSettings::default(),
            &straight_route(600.0, 5_000.0),
        );
        assert_eq!(assessment.total_obstacles, 1);
        assert_eq!(assessment.avoidable_obstacles, 0);
        assert_eq!(assessment.severity, None);
        assert_eq!(assessment.estimated_extra_time_s, 0.0);
    }

    #[test]
    fn ranking_prefers_fewer_avoidable_obstacles() {
        let clear = ScoredRoute {
            route: straight_route(700.0, 6_000.0),
            assessment: RouteAssessment {
                total_obstacles: 0,
                avoidable_obstacles: 0,
                estimated_extra_time_s: 0.0,
                severity: None,
            },
        };
        let busy = ScoredRoute {
            route: straight_route(600.0, 5_000.0),
            assessment: RouteAssessment {
                total_obstacles: 3,
                avoidable_obstacles: 3,
                estimated_extra_time_s: 40.0,
                severity: Some(Severity::High),
            },
        };

        let ranked = rank_candidates(vec![busy, clear], true);
        assert_eq!(ranked[0].assessment.avoidable_obstacles, 0);

        // Without avoidance the faster route wins
        let ranked = rank_candidates(ranked, false);
        assert_eq!(ranked[0].route.duration_s, 600.0);
    }

    #[test]
    fn near_tie_falls_back_to_severity() {
        let assessment = |severity| RouteAssessment {
            total_obstacles: 1,
            avoidable_obstacles: 1,
            estimated_extra_time_s: 10.0,
            severity: Some(severity),
        };
        let high = ScoredRoute {
            route: straight_route(600.0, 5_000.0),
            assessment: assessment(Severity::High),
        };
        let low = ScoredRoute {
            route: straight_route(650.0, 5_500.0),
            assessment: assessment(Severity::Low),
        };

        let ranked = rank_candidates(vec![high, low], true);
        assert_eq!(ranked[0].assessment.severity, Some(Severity::Low));
    }

    #[test]
    fn assessment_leaves_provider_figures_alone() {
        let route = straight_route(600.0, 5_000.0);
        let scored = assess_candidates(
            &cameras_on_route(3),
            &AvoidanceSettings::default(),
            vec![route],
        );
        assert_eq!(scored[0].route.duration_s, 600.0);
        assert_eq!(scored[0].route.distance_m, 5_000.0);
        assert!(scored[0].assessment.estimated_extra_time_s > 0.0);
    }
}
