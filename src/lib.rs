//! # quakemap
//!
//! A zoomable, pannable earthquake map: GeoJSON point data drawn over raster
//! basemap tiles through a spherical Mercator projection.
//!
//! The [`Synchronizer`] owns the interaction transform and keeps the
//! projection, the raster tile grid and the vector features aligned on every
//! zoom/pan event. Rendering goes through the [`RenderSurface`] trait so the
//! same control loop drives an SVG document or a test double.

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod sync;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::MapConfig,
    geo::{GeoPoint, LngLat, LngLatBounds, Point, TileRef},
    projection::Projection,
    transform::Transform,
    viewport::Viewport,
};

pub use data::{
    geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
    loader::DataSource,
    quakes::VectorFeatureSet,
};

pub use input::events::MapEvent;

pub use layers::{raster::RasterLayer, vector::VectorLayer};

pub use rendering::{surface::RenderSurface, svg::SvgSurface};

pub use sync::{DataState, EventOutcome, SyncState, Synchronizer};

pub use tiles::{
    grid::{TileGridResolver, TileSet},
    loader::{HttpTileFetcher, TileCompletion, TileFetcher},
    source::{CartoTileSource, TileSource},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The feature collection could not be fetched or parsed. Fatal to the
    /// vector layer only.
    #[error("Data load error: {0}")]
    DataLoad(String),

    /// A single tile image failed. Skipped silently, never retried.
    #[error("Tile fetch error for {tile}: {reason}")]
    TileFetch { tile: TileRef, reason: String },

    /// A coordinate fell outside the projection's domain and was clamped.
    #[error("Coordinate outside projection domain: {0}")]
    ProjectionDomain(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Error type alias for convenience
pub type Error = MapError;
