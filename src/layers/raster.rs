//! Raster tile lifecycle: which tiles are wanted, which are in flight, which
//! are on the surface.
//!
//! A tile goes `requested -> attached` when its fetch completes, or is
//! dropped from either state when a new tile set no longer contains it.
//! Fetches are fire-and-forget; their results come back over a channel and
//! are only committed if the exact fetch that produced them is still the one
//! being tracked.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

use crate::core::geo::TileRef;
use crate::prelude::HashMap;
use crate::rendering::surface::{RenderSurface, TileImage};
use crate::runtime::{AsyncHandle, AsyncSpawner};
use crate::tiles::grid::TileSet;
use crate::tiles::loader::{TileCompletion, TileFetcher};
use crate::tiles::reconcile::TileDelta;
use crate::tiles::source::TileSource;

struct PendingTile {
    generation: u64,
    url: String,
    handle: Box<dyn AsyncHandle>,
}

/// What happened to a tile completion handed to [`RasterLayer::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Attached,
    /// The fetch failed; the tile stays blank
    Failed,
    /// The tile left the view, or a newer fetch superseded this one
    Stale,
}

pub struct RasterLayer {
    source: Arc<dyn TileSource>,
    fetcher: Arc<dyn TileFetcher>,
    spawner: Arc<dyn AsyncSpawner>,
    current: TileSet,
    pending: HashMap<TileRef, PendingTile>,
    attached: HashMap<TileRef, String>,
    completions_tx: Sender<TileCompletion>,
    completions_rx: Receiver<TileCompletion>,
    fetches_started: u64,
}

impl RasterLayer {
    pub fn new(
        source: Arc<dyn TileSource>,
        fetcher: Arc<dyn TileFetcher>,
        spawner: Arc<dyn AsyncSpawner>,
    ) -> Self {
        let (completions_tx, completions_rx) = unbounded();
        Self {
            source,
            fetcher,
            spawner,
            current: TileSet::empty(),
            pending: HashMap::default(),
            attached: HashMap::default(),
            completions_tx,
            completions_rx,
            fetches_started: 0,
        }
    }

    /// The tile set the layer is currently showing
    pub fn current(&self) -> &TileSet {
        &self.current
    }

    pub fn is_pending(&self, tile: &TileRef) -> bool {
        self.pending.contains_key(tile)
    }

    pub fn is_attached(&self, tile: &TileRef) -> bool {
        self.attached.contains_key(tile)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Total fetches ever started
    pub fn fetches_started(&self) -> u64 {
        self.fetches_started
    }

    /// Swaps in `next`, releasing tiles that left and requesting tiles that
    /// arrived. Tiles in both sets are left exactly as they are.
    pub fn reconcile(
        &mut self,
        next: TileSet,
        generation: u64,
        surface: &mut dyn RenderSurface,
    ) -> TileDelta {
        let delta = TileDelta::between(&self.current.tiles, &next.tiles);

        for tile in &delta.removed {
            self.release(tile, surface);
        }
        for tile in &delta.added {
            self.request(*tile, generation);
        }

        if !delta.is_noop() {
            log::debug!(
                "tiles: +{} -{} ={} (generation {})",
                delta.added.len(),
                delta.removed.len(),
                delta.retained.len(),
                generation
            );
        }
        self.current = next;
        delta
    }

    fn release(&mut self, tile: &TileRef, surface: &mut dyn RenderSurface) {
        if let Some(pending) = self.pending.remove(tile) {
            pending.handle.cancel();
            log::debug!("abandoned fetch for tile {}", tile);
        }
        if self.attached.remove(tile).is_some() {
            surface.detach_tile(tile);
        }
    }

    fn request(&mut self, tile: TileRef, generation: u64) {
        let url = self.source.url(tile);
        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.completions_tx.clone();
        let task_url = url.clone();

        let handle = self.spawner.spawn_boxed(Box::pin(async move {
            let result = fetcher.fetch(tile, &task_url).await;
            // The layer may be gone by now; nothing to report to then
            let _ = tx.send(TileCompletion {
                tile,
                generation,
                result,
            });
        }));

        self.fetches_started += 1;
        self.pending.insert(
            tile,
            PendingTile {
                generation,
                url,
                handle,
            },
        );
    }

    /// Completions that have arrived since the last call
    pub fn drain_completions(&self) -> Vec<TileCompletion> {
        self.completions_rx.try_iter().collect()
    }

    /// Attaches a completed tile if it is still wanted and the completion
    /// comes from the fetch currently tracked for it.
    pub fn commit(
        &mut self,
        completion: TileCompletion,
        surface: &mut dyn RenderSurface,
    ) -> CommitOutcome {
        let tile = completion.tile;
        if !self.current.contains(&tile) {
            log::debug!("discarding tile {}: no longer in view", tile);
            return CommitOutcome::Stale;
        }

        let tracked = matches!(
            self.pending.get(&tile),
            Some(pending) if pending.generation == completion.generation
        );
        if !tracked {
            log::debug!(
                "discarding tile {}: stale fetch from generation {}",
                tile,
                completion.generation
            );
            return CommitOutcome::Stale;
        }

        let Some(pending) = self.pending.remove(&tile) else {
            return CommitOutcome::Stale;
        };
        match completion.result {
            Ok(bytes) => {
                let size = self.current.tile_size;
                let origin = tile.origin(size);
                surface.attach_tile(TileImage {
                    tile,
                    href: pending.url.clone(),
                    x: origin.x,
                    y: origin.y,
                    size,
                    byte_len: bytes.len(),
                });
                self.attached.insert(tile, pending.url);
                CommitOutcome::Attached
            }
            Err(e) => {
                log::debug!("tile {} failed, leaving blank: {}", tile, e);
                CommitOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::surface::RecordingSurface;
    use crate::runtime::spawners::queued::QueuedSpawner;
    use crate::tiles::grid::TileGridResolver;
    use crate::tiles::source::CartoTileSource;
    use crate::{MapError, Result};
    use async_trait::async_trait;

    struct StaticFetcher;

    #[async_trait]
    impl TileFetcher for StaticFetcher {
        async fn fetch(&self, tile: TileRef, _url: &str) -> Result<Arc<Vec<u8>>> {
            if tile.col == 0 && tile.row == 0 {
                return Err(MapError::TileFetch {
                    tile,
                    reason: "HTTP 404".to_string(),
                });
            }
            Ok(Arc::new(vec![1, 2, 3]))
        }
    }

    fn layer(spawner: &QueuedSpawner) -> RasterLayer {
        RasterLayer::new(
            Arc::new(CartoTileSource::voyager()),
            Arc::new(StaticFetcher),
            Arc::new(spawner.clone()),
        )
    }

    fn tile_set(tiles: Vec<TileRef>) -> TileSet {
        TileSet {
            tiles,
            ..TileSet::empty()
        }
    }

    #[test]
    fn test_requests_then_attaches() {
        let spawner = QueuedSpawner::new();
        let mut raster = layer(&spawner);
        let mut surface = RecordingSurface::new();

        let set = TileGridResolver::default().resolve(1024.0, 512.0, 512.0, 512, 256);
        let delta = raster.reconcile(set, 1, &mut surface);
        assert_eq!(delta.added.len(), 2);
        assert_eq!(raster.pending_count(), 2);
        assert!(surface.attached().is_empty());

        spawner.run_pending();
        let outcomes: Vec<CommitOutcome> = raster
            .drain_completions()
            .into_iter()
            .map(|c| raster.commit(c, &mut surface))
            .collect();

        // Tile 0/0 fails, tile 1/0 attaches
        assert!(outcomes.contains(&CommitOutcome::Failed));
        assert!(outcomes.contains(&CommitOutcome::Attached));
        assert_eq!(surface.attached(), vec![TileRef::new(1, 0, 2)]);
        assert_eq!(raster.pending_count(), 0);

        let image = &surface.attached_images()[0];
        assert_eq!((image.x, image.y, image.size), (256.0, 0.0, 256));
        assert_eq!(image.href, "http://a.basemaps.cartocdn.com/rastertiles/voyager/2/1/0.png");
    }

    #[test]
    fn test_release_detaches_and_cancels() {
        let spawner = QueuedSpawner::new();
        let mut raster = layer(&spawner);
        let mut surface = RecordingSurface::new();
        let a = TileRef::new(1, 1, 3);
        let b = TileRef::new(2, 1, 3);

        raster.reconcile(tile_set(vec![a]), 1, &mut surface);
        spawner.run_pending();
        for c in raster.drain_completions() {
            raster.commit(c, &mut surface);
        }
        assert!(raster.is_attached(&a));

        // b requested, then released before its fetch runs
        raster.reconcile(tile_set(vec![a, b]), 2, &mut surface);
        raster.reconcile(tile_set(vec![]), 3, &mut surface);
        assert_eq!(spawner.run_pending(), 0);
        assert!(raster.drain_completions().is_empty());
        assert!(surface.attached().is_empty());
        assert!(surface.ops.contains(&crate::rendering::surface::SurfaceOp::Detach(a)));
    }

    #[test]
    fn test_superseded_fetch_is_stale() {
        let spawner = QueuedSpawner::new();
        let mut raster = layer(&spawner);
        let mut surface = RecordingSurface::new();
        let tile = TileRef::new(4, 4, 4);

        raster.reconcile(tile_set(vec![tile]), 1, &mut surface);
        raster.reconcile(tile_set(vec![]), 2, &mut surface);
        raster.reconcile(tile_set(vec![tile]), 3, &mut surface);

        let old = TileCompletion {
            tile,
            generation: 1,
            result: Ok(Arc::new(vec![9])),
        };
        assert_eq!(raster.commit(old, &mut surface), CommitOutcome::Stale);
        assert!(raster.is_pending(&tile));

        let fresh = TileCompletion {
            tile,
            generation: 3,
            result: Ok(Arc::new(vec![9])),
        };
        assert_eq!(raster.commit(fresh, &mut surface), CommitOutcome::Attached);
        assert_eq!(raster.fetches_started(), 2);
    }
}
