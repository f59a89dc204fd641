//! Configuration for the map: viewport floor, zoom extent, initial centering,
//! tile provider, marker sizing and tile loading.
//!
//! Every section has sensible defaults matching the stock earthquake map, and
//! the whole tree deserializes from JSON so a config file only needs to name
//! the fields it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::constants::{
    DEFAULT_CENTER, DEFAULT_K, K_MAX, K_MIN, MAX_RADIUS, MAX_TILE_ZOOM, MIN_VIEWPORT_HEIGHT,
    MIN_VIEWPORT_WIDTH, TILE_SIZE, WHEEL_DELTA_FACTOR,
};
use crate::core::geo::LngLat;
use crate::{MapError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MapConfig {
    pub viewport: ViewportConfig,
    pub zoom: ZoomConfig,
    pub center: CenterPolicy,
    pub tiles: TileProviderConfig,
    pub radius: RadiusConfig,
    pub loader: TileLoaderConfig,
}

impl MapConfig {
    /// Parses a JSON config, filling unspecified fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        log::info!("loaded config from {}", path.as_ref().display());
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        let zoom = &self.zoom;
        if !(zoom.k_min.is_finite() && zoom.k_min > 0.0) {
            return Err(MapError::Config(format!("k_min must be positive, got {}", zoom.k_min)));
        }
        if !(zoom.k_max.is_finite() && zoom.k_max >= zoom.k_min) {
            return Err(MapError::Config(format!(
                "k_max ({}) must be finite and >= k_min ({})",
                zoom.k_max, zoom.k_min
            )));
        }
        if self.tiles.subdomains.is_empty() {
            return Err(MapError::Config("tile provider needs at least one subdomain".into()));
        }
        if self.tiles.tile_size == 0 {
            return Err(MapError::Config("tile size must be non-zero".into()));
        }
        if self.tiles.max_zoom > 30 {
            return Err(MapError::Config(format!(
                "max_zoom {} exceeds the addressable pyramid",
                self.tiles.max_zoom
            )));
        }
        if !(self.radius.range_max.is_finite() && self.radius.range_max >= 0.0) {
            return Err(MapError::Config(format!(
                "radius range must be non-negative, got {}",
                self.radius.range_max
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_VIEWPORT_WIDTH,
            min_height: MIN_VIEWPORT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub k_min: f64,
    pub k_max: f64,
    /// Scale used when the map first centres on the data
    pub initial_k: f64,
    pub wheel_delta_factor: f64,
}

impl ZoomConfig {
    pub fn clamp_k(&self, k: f64) -> f64 {
        k.clamp(self.k_min, self.k_max)
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            k_min: K_MIN,
            k_max: K_MAX,
            initial_k: DEFAULT_K,
            wheel_delta_factor: WHEEL_DELTA_FACTOR,
        }
    }
}

/// Where the initial view is centred once data has loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CenterPolicy {
    Fixed { lng: f64, lat: f64 },
    /// Centre of the loaded features' bounding box, or the default centre
    /// when the collection has no geometry
    FeatureBounds,
}

impl CenterPolicy {
    pub fn fixed_center(&self) -> LngLat {
        match self {
            Self::Fixed { lng, lat } => LngLat::new(*lng, *lat),
            Self::FeatureBounds => LngLat::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1),
        }
    }
}

impl Default for CenterPolicy {
    fn default() -> Self {
        Self::Fixed {
            lng: DEFAULT_CENTER.0,
            lat: DEFAULT_CENTER.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileProviderConfig {
    pub scheme: String,
    pub host: String,
    pub style: String,
    pub subdomains: Vec<String>,
    pub tile_size: u32,
    pub max_zoom: u8,
}

impl Default for TileProviderConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "basemaps.cartocdn.com".to_string(),
            style: "rastertiles/voyager".to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            tile_size: TILE_SIZE,
            max_zoom: MAX_TILE_ZOOM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiusConfig {
    /// Radius in pixels of the strongest quake in the collection
    pub range_max: f64,
    /// Feature property holding the magnitude
    pub magnitude_property: String,
}

impl Default for RadiusConfig {
    fn default() -> Self {
        Self {
            range_max: MAX_RADIUS,
            magnitude_property: "mag".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLoaderConfig {
    pub timeout_ms: u64,
    /// Recently fetched tiles kept in memory so a tile that scrolls back into
    /// view does not hit the network again
    pub cache_capacity: usize,
    pub user_agent: String,
}

impl TileLoaderConfig {
    pub fn for_testing() -> Self {
        Self {
            timeout_ms: 500,
            cache_capacity: 16,
            ..Self::default()
        }
    }
}

impl Default for TileLoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            cache_capacity: 512,
            user_agent: concat!("quakemap/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
