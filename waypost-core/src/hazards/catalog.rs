//! Spatially indexed hazard features with radius and corridor queries

use geo::Point;
use hashbrown::HashSet;
use log::info;
use rayon::prelude::*;
use rstar::{AABB, RTree, RTreeObject};

use crate::geomath::haversine_distance;
use crate::model::HazardFeature;

// Conservative meters-per-degree scales for converting a metric radius
// into an R-tree envelope; candidates are filtered with exact haversine
// distances afterwards.
const M_PER_DEG_LAT: f64 = 110_540.0;
const M_PER_DEG_LNG_EQUATOR: f64 = 111_320.0;

/// One hazard vertex in the R-tree, tagged with the owning feature
#[derive(Debug, Clone)]
struct IndexedVertex {
    position: [f64; 2],
    hazard: usize,
}

impl RTreeObject for IndexedVertex {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

fn search_envelope(center: Point<f64>, radius_m: f64) -> AABB<[f64; 2]> {
    let d_lat = radius_m / M_PER_DEG_LAT;
    let lng_scale = (M_PER_DEG_LNG_EQUATOR * center.y().to_radians().cos()).max(1.0);
    let d_lng = radius_m / lng_scale;
    AABB::from_corners(
        [center.x() - d_lng, center.y() - d_lat],
        [center.x() + d_lng, center.y() + d_lat],
    )
}

/// Indexed hazard features. Bulk loads replace the whole catalog
/// atomically; queries against an unloaded catalog return empty.
#[derive(Debug, Default)]
pub struct HazardCatalog {
    hazards: Vec<HazardFeature>,
    index: RTree<IndexedVertex>,
    ready: bool,
}

impl HazardCatalog {
    pub fn new() -> HazardCatalog {
        HazardCatalog::default()
    }

    /// True once a bulk load has completed
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    /// Replace the catalog contents. The index is rebuilt off to the
    /// side and swapped in whole; a failed or partial source load never
    /// leaves a half-replaced catalog behind.
    pub fn load_features(&mut self, features: Vec<HazardFeature>) {
        let vertices = index_vertices(&features);
        self.index = RTree::bulk_load(vertices);
        self.hazards = features;
        self.ready = true;
        info!("Hazard catalog loaded: {} features", self.hazards.len());
    }

    /// Add a single feature (user report) without touching the rest
    pub fn insert(&mut self, feature: HazardFeature) {
        let hazard = self.hazards.len();
        for vertex in feature.geometry.vertices() {
            self.index.insert(IndexedVertex {
                position: [vertex.x(), vertex.y()],
                hazard,
            });
        }
        self.hazards.push(feature);
    }

    /// Hazards whose nearest vertex lies within `radius_m` of `center`
    pub fn within_radius(&self, center: Point<f64>, radius_m: f64) -> Vec<&HazardFeature> {
        let mut indices: Vec<usize> = self
            .index
            .locate_in_envelope(&search_envelope(center, radius_m))
            .map(|v| v.hazard)
            .collect();
        indices.sort_unstable();
        indices.dedup();

        indices
            .into_iter()
            .map(|i| &self.hazards[i])
            .filter(|h| h.distance_from(center) <= radius_m)
            .collect()
    }

    /// Hazards within `buffer_m` of any corridor point. Distance is
    /// nearest-hazard-vertex to corridor-point, an accepted
    /// approximation of true segment distance.
    pub fn near_corridor(&self, corridor: &[Point<f64>], buffer_m: f64) -> Vec<&HazardFeature> {
        let hits = corridor
            .par_iter()
            .fold(HashSet::new, |mut acc: HashSet<usize>, point| {
                for vertex in self
                    .index
                    .locate_in_envelope(&search_envelope(*point, buffer_m))
                {
                    if !acc.contains(&vertex.hazard)
                        && self.hazards[vertex.hazard].distance_from(*point) <= buffer_m
                    {
                        acc.insert(vertex.hazard);
                    }
                }
                acc
            })
            .reduce(HashSet::new, |mut a, b| {
                a.extend(b);
                a
            });

        let mut indices: Vec<usize> = hits.into_iter().collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| &self.hazards[i]).collect()
    }
}

fn index_vertices(features: &[HazardFeature]) -> Vec<IndexedVertex> {
    features
        .iter()
        .enumerate()
        .flat_map(|(hazard, feature)| {
            feature
                .geometry
                .vertices()
                .iter()
                .map(move |v| IndexedVertex {
                    position: [v.x(), v.y()],
                    hazard,
                })
        })
        .collect()
}
