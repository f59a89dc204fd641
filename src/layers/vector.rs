use serde::{Deserialize, Serialize};

use super::path::geometry_path;
use crate::core::geo::Point;
use crate::core::projection::Projection;
use crate::data::quakes::{QuakeFeature, VectorFeatureSet};

/// Square-root scale from magnitude to circle radius, so circle *area*
/// grows linearly with magnitude. Domain `[0, domain_max]`, range
/// `[0, range_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusScale {
    pub domain_max: f64,
    pub range_max: f64,
}

impl RadiusScale {
    pub fn new(domain_max: f64, range_max: f64) -> Self {
        Self {
            domain_max,
            range_max,
        }
    }

    /// Scale whose domain tops out at the strongest quake in `features`
    pub fn for_features(features: &VectorFeatureSet, range_max: f64) -> Self {
        Self::new(features.max_magnitude().unwrap_or(0.0), range_max)
    }

    /// Radius for a magnitude. Negative magnitudes draw as zero. A collapsed
    /// domain (every quake magnitude 0) maps everything to the middle of the
    /// range.
    pub fn radius(&self, magnitude: f64) -> f64 {
        if !(self.domain_max.is_finite() && self.domain_max > 0.0) {
            return self.range_max / 2.0;
        }
        let magnitude = if magnitude.is_finite() { magnitude.max(0.0) } else { 0.0 };
        self.range_max * (magnitude / self.domain_max).sqrt()
    }
}

/// Earthquake features and their paths under the current projection.
///
/// Every render recomputes every path; the collection is small enough that
/// diffing would cost more than it saves.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    features: VectorFeatureSet,
    radius: RadiusScale,
    paths: Vec<String>,
}

impl VectorLayer {
    pub fn new(features: VectorFeatureSet, range_max: f64) -> Self {
        let radius = RadiusScale::for_features(&features, range_max);
        log::debug!(
            "vector layer: {} features, radius domain [0, {}] -> [0, {}]",
            features.len(),
            radius.domain_max,
            radius.range_max
        );
        Self {
            features,
            radius,
            paths: Vec::new(),
        }
    }

    pub fn features(&self) -> &VectorFeatureSet {
        &self.features
    }

    pub fn radius_scale(&self) -> &RadiusScale {
        &self.radius
    }

    pub fn radius_of(&self, feature: &QuakeFeature) -> f64 {
        self.radius.radius(feature.magnitude)
    }

    /// Recomputes every feature's path
    pub fn render(&mut self, projection: &Projection) -> &[String] {
        let radius = self.radius;
        self.paths = self
            .features
            .features()
            .iter()
            .map(|feature| geometry_path(&feature.geometry, projection, radius.radius(feature.magnitude)))
            .collect();
        &self.paths
    }

    /// Paths from the last render
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Topmost point feature whose circle covers `pixel`. Later features are
    /// drawn over earlier ones, so the search runs back to front.
    pub fn feature_at(&self, pixel: &Point, projection: &Projection) -> Option<&QuakeFeature> {
        self.features.features().iter().rev().find(|feature| {
            feature
                .geometry
                .as_point()
                .map(|coord| projection.project(&coord).distance_to(pixel) <= self.radius_of(feature))
                .unwrap_or(false)
        })
    }
}
