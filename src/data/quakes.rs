use crate::core::geo::{GeoPoint, LngLatBounds};
use crate::data::geojson::{GeoJson, GeoJsonGeometry};
use crate::Result;

/// One renderable feature: its geometry and the magnitude that sizes it
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeFeature {
    pub id: Option<String>,
    pub geometry: GeoJsonGeometry,
    pub magnitude: f64,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl QuakeFeature {
    /// The quake as a point record, for `Point` geometries
    pub fn geo_point(&self) -> Option<GeoPoint> {
        self.geometry
            .as_point()
            .map(|c| GeoPoint::new(c.lng, c.lat, self.magnitude))
    }
}

/// The loaded earthquake collection. Built once when data arrives and only
/// read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorFeatureSet {
    features: Vec<QuakeFeature>,
}

impl VectorFeatureSet {
    pub fn new(features: Vec<QuakeFeature>) -> Self {
        Self { features }
    }

    /// Builds the set from GeoJSON, reading the magnitude from
    /// `magnitude_property`. Features without geometry are skipped; a missing
    /// or non-numeric magnitude counts as zero.
    pub fn from_geojson(geojson: GeoJson, magnitude_property: &str) -> Self {
        let mut skipped = 0usize;
        let features = geojson
            .into_features()
            .into_iter()
            .filter_map(|feature| {
                let magnitude = feature.number_property(magnitude_property).unwrap_or_else(|| {
                    log::debug!("feature {:?} has no numeric '{}'", feature.id, magnitude_property);
                    0.0
                });
                let Some(geometry) = feature.geometry else {
                    skipped += 1;
                    return None;
                };
                Some(QuakeFeature {
                    id: feature.id.map(|id| match id {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    }),
                    geometry,
                    magnitude,
                    properties: feature.properties.unwrap_or_default(),
                })
            })
            .collect::<Vec<_>>();

        if skipped > 0 {
            log::warn!("skipped {} features without geometry", skipped);
        }
        log::info!("loaded {} features", features.len());
        Self { features }
    }

    /// Parses GeoJSON text into a feature set
    pub fn from_str(geojson_str: &str, magnitude_property: &str) -> Result<Self> {
        Ok(Self::from_geojson(GeoJson::parse(geojson_str)?, magnitude_property))
    }

    pub fn features(&self) -> &[QuakeFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Point records of every `Point` feature
    pub fn points(&self) -> Vec<GeoPoint> {
        self.features.iter().filter_map(|f| f.geo_point()).collect()
    }

    /// Largest magnitude, or `None` for an empty set
    pub fn max_magnitude(&self) -> Option<f64> {
        self.features
            .iter()
            .map(|f| f.magnitude)
            .filter(|m| m.is_finite())
            .reduce(f64::max)
    }

    /// Bounding box of all feature geometry
    pub fn bounds(&self) -> Option<LngLatBounds> {
        self.features
            .iter()
            .filter_map(|f| f.geometry.bounds())
            .reduce(|a, b| a.union(&b))
    }
}
