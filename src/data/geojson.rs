use serde::{Deserialize, Serialize};

use crate::core::geo::{LngLat, LngLatBounds};

/// A GeoJSON position. Extra members (altitude, or depth in quake feeds) are
/// kept but ignored for projection.
pub type Position = Vec<f64>;

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

impl GeoJsonFeature {
    /// Numeric property by name; `None` when missing or not a number
    pub fn number_property(&self, name: &str) -> Option<f64> {
        self.properties.as_ref()?.get(name)?.as_f64()
    }
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection { features: Vec<GeoJsonFeature> },
}

impl GeoJson {
    /// Parses a GeoJSON document
    pub fn parse(geojson_str: &str) -> crate::Result<Self> {
        serde_json::from_str(geojson_str)
            .map_err(|e| crate::Error::DataLoad(format!("invalid GeoJSON: {}", e)))
    }

    /// Features in document order; a lone feature is a collection of one
    pub fn into_features(self) -> Vec<GeoJsonFeature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection { features } => features,
        }
    }
}

/// Longitude/latitude of a position, `None` if it has fewer than two members
pub fn position_lng_lat(position: &[f64]) -> Option<LngLat> {
    match position {
        [lng, lat, ..] => Some(LngLat::new(*lng, *lat)),
        _ => None,
    }
}

impl GeoJsonGeometry {
    /// Every position of the geometry, rings and parts flattened
    pub fn positions(&self) -> Vec<LngLat> {
        let mut out = Vec::new();
        self.collect_positions(&mut out);
        out
    }

    fn collect_positions(&self, out: &mut Vec<LngLat>) {
        if let GeoJsonGeometry::GeometryCollection { geometries } = self {
            for geometry in geometries {
                geometry.collect_positions(out);
            }
            return;
        }

        let mut push = |p: &Position| {
            if let Some(coord) = position_lng_lat(p) {
                out.push(coord);
            }
        };
        match self {
            GeoJsonGeometry::Point { coordinates } => push(coordinates),
            GeoJsonGeometry::LineString { coordinates }
            | GeoJsonGeometry::MultiPoint { coordinates } => coordinates.iter().for_each(push),
            GeoJsonGeometry::Polygon { coordinates }
            | GeoJsonGeometry::MultiLineString { coordinates } => {
                coordinates.iter().flatten().for_each(push)
            }
            GeoJsonGeometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().for_each(push)
            }
            GeoJsonGeometry::GeometryCollection { .. } => {}
        }
    }

    /// Bounding box of all positions
    pub fn bounds(&self) -> Option<LngLatBounds> {
        let positions = self.positions();
        let (first, rest) = positions.split_first()?;
        let mut bounds = LngLatBounds::from_point(*first);
        for coord in rest {
            bounds.extend(coord);
        }
        Some(bounds)
    }

    /// The coordinate of a `Point` geometry
    pub fn as_point(&self) -> Option<LngLat> {
        match self {
            GeoJsonGeometry::Point { coordinates } => position_lng_lat(coordinates),
            _ => None,
        }
    }
}
