//! Prelude module for common quakemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use quakemap::prelude::*;`

pub use crate::core::{
    config::{CenterPolicy, MapConfig, RadiusConfig, TileLoaderConfig, TileProviderConfig},
    geo::{GeoPoint, LngLat, LngLatBounds, Point, TileRef},
    projection::Projection,
    transform::Transform,
    viewport::Viewport,
};

pub use crate::data::{
    geojson::{GeoJson, GeoJsonFeature, GeoJsonGeometry},
    loader::DataSource,
    quakes::{QuakeFeature, VectorFeatureSet},
};

pub use crate::input::{events::MapEvent, zoom::ZoomBehavior};

pub use crate::layers::{
    raster::{CommitOutcome, RasterLayer},
    vector::{RadiusScale, VectorLayer},
};

pub use crate::rendering::{
    surface::{RecordingSurface, RenderSurface, SurfaceOp},
    svg::SvgSurface,
};

pub use crate::runtime::{AsyncHandle, AsyncSpawner};

pub use crate::sync::{DataState, EventOutcome, SyncState, Synchronizer};

pub use crate::tiles::{
    cache::TileCache,
    grid::{TileGridResolver, TileSet},
    loader::{HttpTileFetcher, TileCompletion, TileFetcher},
    reconcile::TileDelta,
    source::{CartoTileSource, TileSource},
};

pub use crate::{Error as MapError, Result};

pub use std::{
    pin::Pin,
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub use futures::Future;
