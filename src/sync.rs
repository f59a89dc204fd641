//! The transform synchronizer.
//!
//! [`Synchronizer`] is the single owner of the view: the interaction
//! transform, the projection derived from it, the current tile set and both
//! layers. Every event goes through [`Synchronizer::handle`]; every accepted
//! view change goes through [`Synchronizer::apply_transform`], which keeps the
//! projection, the raster grid and the vector paths in step.

use std::sync::Arc;

use crate::core::config::{CenterPolicy, MapConfig};
use crate::core::geo::{LngLat, Point};
use crate::core::projection::Projection;
use crate::core::transform::Transform;
use crate::core::viewport::Viewport;
use crate::data::quakes::{QuakeFeature, VectorFeatureSet};
use crate::input::events::MapEvent;
use crate::input::zoom::ZoomBehavior;
use crate::layers::raster::{CommitOutcome, RasterLayer};
use crate::layers::vector::VectorLayer;
use crate::rendering::surface::RenderSurface;
use crate::runtime::AsyncSpawner;
use crate::tiles::grid::{TileGridResolver, TileSet};
use crate::tiles::loader::TileFetcher;
use crate::tiles::reconcile::TileDelta;
use crate::tiles::source::{CartoTileSource, TileSource};
use crate::{MapError, Result};

/// Advisory: `Transforming` only while [`Synchronizer::apply_transform`] runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Transforming,
}

/// Where the feature collection stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    Pending,
    Loaded,
    /// Load failed; the map runs raster-only
    Failed,
}

/// What [`Synchronizer::handle`] did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// A transform was applied
    Applied(TileDelta),
    /// A tile completion was committed or discarded
    Tile(CommitOutcome),
    /// Accepted, but the view did not move
    Unchanged,
    /// Dropped because the map is not ready yet
    Ignored,
}

pub struct Synchronizer<S: RenderSurface> {
    config: MapConfig,
    viewport: Viewport,
    transform: Transform,
    projection: Projection,
    resolver: TileGridResolver,
    raster: RasterLayer,
    vector: Option<VectorLayer>,
    zoom: ZoomBehavior,
    surface: S,
    state: SyncState,
    data: DataState,
    generation: u64,
}

impl<S: RenderSurface> Synchronizer<S> {
    /// Builds a synchronizer drawing on `surface`. `window` is floored at the
    /// configured minimum viewport. Nothing is drawn until data arrives.
    pub fn new(
        config: MapConfig,
        window: Viewport,
        surface: S,
        source: Arc<dyn TileSource>,
        fetcher: Arc<dyn TileFetcher>,
        spawner: Arc<dyn AsyncSpawner>,
    ) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::from_window(
            window.width,
            window.height,
            config.viewport.min_width,
            config.viewport.min_height,
        );
        let mut surface = surface;
        surface.resize(viewport);

        log::info!(
            "synchronizer ready: viewport {}x{}, k in [{}, {}]",
            viewport.width,
            viewport.height,
            config.zoom.k_min,
            config.zoom.k_max
        );

        Ok(Self {
            resolver: TileGridResolver::new(config.tiles.tile_size, config.tiles.max_zoom),
            zoom: ZoomBehavior::new(config.zoom.clone()),
            raster: RasterLayer::new(source, fetcher, spawner),
            config,
            viewport,
            transform: Transform::identity(),
            projection: Projection::unit(),
            vector: None,
            surface,
            state: SyncState::Idle,
            data: DataState::Pending,
            generation: 0,
        })
    }

    /// Like [`Synchronizer::new`], with tile URLs built from the configured
    /// provider
    pub fn from_config(
        config: MapConfig,
        window: Viewport,
        surface: S,
        fetcher: Arc<dyn TileFetcher>,
        spawner: Arc<dyn AsyncSpawner>,
    ) -> Result<Self> {
        let source = Arc::new(CartoTileSource::new(&config.tiles));
        Self::new(config, window, surface, source, fetcher, spawner)
    }

    pub fn handle(&mut self, event: MapEvent) -> EventOutcome {
        match event {
            MapEvent::DataLoaded(Ok(features)) => self.on_data_loaded(features),
            MapEvent::DataLoaded(Err(e)) => self.on_data_failed(e),
            MapEvent::TileLoaded(completion) => {
                EventOutcome::Tile(self.raster.commit(completion, &mut self.surface))
            }
            MapEvent::Resize { width, height } => self.on_resize(width, height),
            event if event.is_interaction() && self.data == DataState::Pending => {
                log::warn!("ignoring {} event: data not loaded yet", event.kind());
                EventOutcome::Ignored
            }
            event => match self.zoom.next_transform(&event, &self.transform, &self.viewport) {
                Some(next) => EventOutcome::Applied(self.apply_transform(next)),
                None => EventOutcome::Unchanged,
            },
        }
    }

    fn on_data_loaded(&mut self, features: VectorFeatureSet) -> EventOutcome {
        let layer = VectorLayer::new(features, self.config.radius.range_max);
        log::info!(
            "data loaded: {} features, max magnitude {}",
            layer.features().len(),
            layer.radius_scale().domain_max
        );
        self.vector = Some(layer);
        self.data = DataState::Loaded;
        EventOutcome::Applied(self.apply_transform(self.default_transform()))
    }

    fn on_data_failed(&mut self, error: MapError) -> EventOutcome {
        log::error!("earthquake data unavailable, showing basemap only: {}", error);
        self.vector = None;
        self.data = DataState::Failed;
        EventOutcome::Applied(self.apply_transform(self.default_transform()))
    }

    fn on_resize(&mut self, width: u32, height: u32) -> EventOutcome {
        self.viewport = Viewport::from_window(
            width,
            height,
            self.config.viewport.min_width,
            self.config.viewport.min_height,
        );
        self.surface.resize(self.viewport);
        log::debug!("viewport now {}x{}", self.viewport.width, self.viewport.height);

        if self.data == DataState::Pending {
            return EventOutcome::Unchanged;
        }
        EventOutcome::Applied(self.apply_transform(self.transform))
    }

    /// Centre the view should open on: the configured point, or the middle of
    /// the data when the policy asks for it and there is data to measure
    pub fn initial_center(&self) -> LngLat {
        match &self.config.center {
            CenterPolicy::FeatureBounds => self
                .vector
                .as_ref()
                .and_then(|layer| layer.features().bounds())
                .map(|bounds| bounds.center())
                .unwrap_or_else(|| self.config.center.fixed_center()),
            policy => policy.fixed_center(),
        }
    }

    /// The transform applied once data has loaded (or failed to)
    pub fn default_transform(&self) -> Transform {
        self.zoom
            .centered(&self.initial_center(), self.config.zoom.initial_k, &self.viewport)
    }

    /// Makes `transform` the current view. Projection, tiles, vector paths
    /// and the raster group transform all follow it before this returns.
    pub fn apply_transform(&mut self, transform: Transform) -> TileDelta {
        if !transform.is_finite() {
            log::warn!("rejecting non-finite transform {:?}", transform);
            return TileDelta::default();
        }
        self.state = SyncState::Transforming;

        let transform = transform.clamped(self.config.zoom.k_min, self.config.zoom.k_max);
        self.generation += 1;
        self.transform = transform;
        self.projection.apply_transform(&transform);

        let tiles = self.resolver.resolve_transform(&transform, &self.viewport);
        let group_transform = tiles.group_transform();
        let delta = self.raster.reconcile(tiles, self.generation, &mut self.surface);

        if let Some(vector) = self.vector.as_mut() {
            let paths = vector.render(&self.projection);
            self.surface.draw_vectors(paths);
        }
        self.surface.set_raster_transform(&group_transform);

        log::debug!(
            "applied k={} x={} y={} (generation {})",
            transform.k,
            transform.x,
            transform.y,
            self.generation
        );
        self.state = SyncState::Idle;
        delta
    }

    /// Commits every tile fetch that has finished since the last call and
    /// returns how many tiles were attached
    pub fn pump(&mut self) -> usize {
        let mut attached = 0;
        for completion in self.raster.drain_completions() {
            if self.raster.commit(completion, &mut self.surface) == CommitOutcome::Attached {
                attached += 1;
            }
        }
        attached
    }

    /// Topmost earthquake under a screen pixel
    pub fn feature_at(&self, pixel: &Point) -> Option<&QuakeFeature> {
        let hit = self.vector.as_ref()?.feature_at(pixel, &self.projection);
        if let Some(feature) = hit {
            log::debug!("hover {:?} (magnitude {})", feature.id, feature.magnitude);
        }
        hit
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tile_set(&self) -> &TileSet {
        self.raster.current()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn data_state(&self) -> DataState {
        self.data
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn raster(&self) -> &RasterLayer {
        &self.raster
    }

    pub fn vector(&self) -> Option<&VectorLayer> {
        self.vector.as_ref()
    }

    /// Tiles requested but not yet committed
    pub fn pending_tiles(&self) -> usize {
        self.raster.pending_count()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
