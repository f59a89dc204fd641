use async_trait::async_trait;
use quakemap::prelude::*;
use quakemap::runtime::spawners::queued::QueuedSpawner;
use quakemap::sync::{DataState, EventOutcome};
use std::sync::Mutex;

const TAU: f64 = std::f64::consts::TAU;

/// Fetcher double that counts calls per tile and can be told to fail
#[derive(Default)]
struct CountingFetcher {
    calls: Mutex<HashMap<TileRef, usize>>,
    fail_all: bool,
}

impl CountingFetcher {
    fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    fn calls_for(&self, tile: &TileRef) -> usize {
        self.calls.lock().unwrap().get(tile).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl TileFetcher for CountingFetcher {
    async fn fetch(&self, tile: TileRef, _url: &str) -> quakemap::Result<Arc<Vec<u8>>> {
        *self.calls.lock().unwrap().entry(tile).or_insert(0) += 1;
        if self.fail_all {
            return Err(MapError::TileFetch {
                tile,
                reason: "HTTP 503".to_string(),
            });
        }
        Ok(Arc::new(vec![0x89, b'P', b'N', b'G']))
    }
}

struct Harness {
    sync: Synchronizer<RecordingSurface>,
    fetcher: Arc<CountingFetcher>,
    spawner: QueuedSpawner,
}

impl Harness {
    fn new() -> Self {
        Self::with_fetcher(CountingFetcher::default())
    }

    fn with_fetcher(fetcher: CountingFetcher) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let fetcher = Arc::new(fetcher);
        let spawner = QueuedSpawner::new();
        let sync = Synchronizer::from_config(
            MapConfig::default(),
            Viewport::from_window_default(960, 500),
            RecordingSurface::new(),
            fetcher.clone(),
            Arc::new(spawner.clone()),
        )
        .unwrap();
        Self {
            sync,
            fetcher,
            spawner,
        }
    }

    fn loaded() -> Self {
        let mut harness = Self::new();
        harness.sync.handle(MapEvent::DataLoaded(Ok(single_quake())));
        harness
    }

    /// Runs every queued fetch and commits the results
    fn settle(&mut self) -> usize {
        self.spawner.run_pending();
        self.sync.pump()
    }
}

fn single_quake() -> VectorFeatureSet {
    VectorFeatureSet::from_str(
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","id":"nc73000001",
             "geometry":{"type":"Point","coordinates":[-119.665,37.414]},
             "properties":{"mag":4.0,"place":"Yosemite Valley"}}
        ]}"#,
        "mag",
    )
    .unwrap()
}

/// Integration tests driving the synchronizer the way the host event loop does
#[cfg(test)]
mod synchronizer_tests {
    use super::*;

    /// Projection scale follows k across the whole extent
    #[test]
    fn test_scale_coupling() {
        let mut h = Harness::loaded();
        for exp in 11..=24 {
            for frac in [1.0, 1.3, 1.77] {
                let k = (2f64.powi(exp) * frac).min(2f64.powi(24));
                h.sync.apply_transform(Transform::new(k, 12.0, -40.0));
                let expected = k / TAU;
                let actual = h.sync.projection().scale_factor();
                assert!(
                    (actual - expected).abs() <= expected * 1e-12,
                    "k={} scale={} expected {}",
                    k,
                    actual,
                    expected
                );
            }
        }
    }

    /// Same transform in, same ordered tiles out
    #[test]
    fn test_tile_determinism() {
        let resolver = TileGridResolver::default();
        let a = resolver.resolve(23170.5, -3100.25, 9000.0, 960, 500);
        let b = resolver.resolve(23170.5, -3100.25, 9000.0, 960, 500);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    /// Retained tiles are never fetched again; only new tiles are requested
    #[test]
    fn test_reconciliation_minimality() {
        let mut h = Harness::loaded();
        let first: Vec<TileRef> = h.sync.tile_set().tiles.clone();
        assert_eq!(h.settle(), first.len());
        assert_eq!(h.fetcher.total_calls(), first.len());

        // Half a tile to the left: one column leaves, one column arrives
        let pan = h.sync.tile_set().scale / 2.0;
        let delta = match h.sync.handle(MapEvent::Zoom(h.sync.transform().pan_by(&Point::new(-pan, 0.0)))) {
            EventOutcome::Applied(delta) => delta,
            other => panic!("expected a transform, got {:?}", other),
        };
        let second: Vec<TileRef> = h.sync.tile_set().tiles.clone();
        h.settle();

        let added: HashSet<TileRef> = second.iter().filter(|t| !first.contains(t)).copied().collect();
        let removed: HashSet<TileRef> = first.iter().filter(|t| !second.contains(t)).copied().collect();
        assert_eq!(delta.added.iter().copied().collect::<HashSet<_>>(), added);
        assert_eq!(delta.removed.iter().copied().collect::<HashSet<_>>(), removed);

        for tile in &second {
            assert_eq!(h.fetcher.calls_for(tile), 1, "tile {} fetched more than once", tile);
        }
        for tile in &removed {
            assert!(h.sync.surface().ops.contains(&SurfaceOp::Detach(*tile)));
        }
        assert_eq!(h.fetcher.total_calls(), first.len() + added.len());

        let mut attached = h.sync.surface().attached();
        attached.sort();
        let mut expected = second.clone();
        expected.sort();
        assert_eq!(attached, expected);
    }

    /// Applying the same transform twice leaves the rendered state unchanged
    #[test]
    fn test_idempotent_rerender() {
        let mut h = Harness::loaded();
        h.settle();
        let transform = h.sync.transform();

        let snapshot = |h: &Harness| {
            (
                h.sync.surface().raster_transform().map(str::to_string),
                h.sync.surface().vectors().map(|v| v.to_vec()),
                h.sync.surface().attached(),
                *h.sync.projection(),
                h.sync.tile_set().clone(),
            )
        };

        let before = snapshot(&h);
        let delta = h.sync.apply_transform(transform);
        assert!(delta.is_noop());
        assert_eq!(h.settle(), 0);
        let once = snapshot(&h);
        h.sync.apply_transform(transform);
        let twice = snapshot(&h);

        assert_eq!(before, once);
        assert_eq!(once, twice);
        assert_eq!(h.fetcher.total_calls(), h.sync.tile_set().len());
    }

    /// Out-of-range scales are clamped, never rejected
    #[test]
    fn test_clamp_boundary() {
        let mut h = Harness::loaded();

        let outcome = h.sync.handle(MapEvent::Zoom(Transform::new(10.0, 0.0, 0.0)));
        assert!(matches!(outcome, EventOutcome::Applied(_)));
        assert_eq!(h.sync.transform().k, 2048.0);

        h.sync.handle(MapEvent::Zoom(Transform::new(1e12, 0.0, 0.0)));
        assert_eq!(h.sync.transform().k, 16_777_216.0);
        assert!((h.sync.projection().scale_factor() - 16_777_216.0 / TAU).abs() < 1e-6);

        for _ in 0..40 {
            h.sync.handle(MapEvent::DoubleClick { position: Point::new(480.0, 250.0) });
            assert!(h.sync.transform().k <= 16_777_216.0);
        }
        for _ in 0..40 {
            h.sync.handle(MapEvent::Wheel { delta: 900.0, position: Point::new(10.0, 10.0) });
            assert!(h.sync.transform().k >= 2048.0);
        }
    }

    /// The only (hence largest) quake gets the full radius
    #[test]
    fn test_single_feature_full_radius() {
        let h = Harness::loaded();
        let vector = h.sync.vector().unwrap();
        let quake = &vector.features().features()[0];
        assert_eq!(vector.radius_of(quake), 10.0);

        let paths = h.sync.surface().vectors().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].contains("a10,10 0 1,1 0,-20"));
    }

    /// The default centre lands in the middle of the viewport
    #[test]
    fn test_default_view_centres_on_yosemite() {
        let h = Harness::loaded();
        let transform = h.sync.transform();
        assert_eq!(transform.k, 16384.0);

        let viewport = h.sync.viewport();
        let center = h.sync.projection().project(&LngLat::new(-119.665, 37.414));
        assert!((center.x - viewport.width as f64 / 2.0).abs() <= 0.5);
        assert!((center.y - viewport.height as f64 / 2.0).abs() <= 0.5);

        // Hovering the middle of the map finds the quake
        let hit = h.sync.feature_at(&viewport.center()).unwrap();
        assert_eq!(hit.id.as_deref(), Some("nc73000001"));
    }

    /// Zooming within one power-of-two band keeps the tile level
    #[test]
    fn test_zoom_within_band_keeps_level() {
        let mut h = Harness::loaded();
        let anchor = h.sync.viewport().center();

        h.sync.handle(MapEvent::Zoom(h.sync.transform().zoom_to(16384.0 * 1.05, &anchor, 2048.0, 16_777_216.0)));
        let level_a = h.sync.tile_set().zoom_level();
        let scale_a = h.sync.tile_set().scale;

        h.sync.handle(MapEvent::Zoom(h.sync.transform().zoom_to(16384.0 * 1.9, &anchor, 2048.0, 16_777_216.0)));
        let level_b = h.sync.tile_set().zoom_level();
        let scale_b = h.sync.tile_set().scale;

        assert_eq!(level_a, Some(6));
        assert_eq!(level_a, level_b);
        assert!(scale_b > scale_a);
    }

    /// A tile released while its fetch is outstanding is never attached
    #[test]
    fn test_released_tile_not_attached() {
        let mut h = Harness::loaded();
        let released = h.sync.tile_set().tiles[0];
        let stale_generation = h.sync.generation();

        // Jump far away before any fetch has run
        h.sync.handle(MapEvent::Recenter {
            center: LngLat::new(139.69, 35.69),
            k: 16384.0,
        });
        assert!(!h.sync.tile_set().contains(&released));

        // The queued fetch was cancelled, so nothing comes back for it
        h.settle();
        assert_eq!(h.fetcher.calls_for(&released), 0);
        assert!(!h.sync.surface().attached().contains(&released));

        // A completion that slipped through anyway is discarded
        let late = TileCompletion {
            tile: released,
            generation: stale_generation,
            result: Ok(Arc::new(vec![1])),
        };
        assert_eq!(
            h.sync.handle(MapEvent::TileLoaded(late)),
            EventOutcome::Tile(CommitOutcome::Stale)
        );
        assert!(!h.sync.surface().attached().contains(&released));
        assert!(!h.sync.raster().is_attached(&released));
    }

    /// Interactions before the data arrives are dropped
    #[test]
    fn test_events_before_data_are_ignored() {
        let mut h = Harness::new();
        assert_eq!(
            h.sync.handle(MapEvent::Wheel { delta: -100.0, position: Point::new(1.0, 1.0) }),
            EventOutcome::Ignored
        );
        assert_eq!(h.sync.handle(MapEvent::Zoom(Transform::new(5000.0, 1.0, 1.0))), EventOutcome::Ignored);
        assert_eq!(h.sync.data_state(), DataState::Pending);
        assert!(h.sync.tile_set().is_empty());
        assert_eq!(h.spawner.spawned_count(), 0);
    }

    /// A failed data load still shows the basemap around the default centre
    #[test]
    fn test_data_failure_keeps_raster() {
        let mut h = Harness::new();
        let outcome = h.sync.handle(MapEvent::DataLoaded(Err(MapError::DataLoad(
            "data/earthquakes_4326_cali.geojson: not found".to_string(),
        ))));
        assert!(matches!(outcome, EventOutcome::Applied(_)));
        assert_eq!(h.sync.data_state(), DataState::Failed);
        assert!(h.sync.vector().is_none());
        assert!(h.sync.surface().vectors().is_none());

        assert!(!h.sync.tile_set().is_empty());
        assert_eq!(h.settle(), h.sync.tile_set().len());
        assert!(h.sync.surface().raster_transform().is_some());

        // Interaction works raster-only
        assert!(matches!(
            h.sync.handle(MapEvent::DoubleClick { position: Point::new(100.0, 100.0) }),
            EventOutcome::Applied(_)
        ));
        assert!(h.sync.feature_at(&Point::new(480.0, 250.0)).is_none());
    }

    /// Failed tiles stay blank and are not retried
    #[test]
    fn test_failed_tiles_left_blank() {
        let mut h = Harness::with_fetcher(CountingFetcher::failing());
        h.sync.handle(MapEvent::DataLoaded(Ok(single_quake())));
        let wanted = h.sync.tile_set().len();

        assert_eq!(h.settle(), 0);
        assert!(h.sync.surface().attached().is_empty());
        assert_eq!(h.sync.pending_tiles(), 0);

        h.sync.apply_transform(h.sync.transform());
        h.settle();
        assert_eq!(h.fetcher.total_calls(), wanted);
    }

    /// Resizing re-resolves tiles for the larger viewport
    #[test]
    fn test_resize_reapplies() {
        let mut h = Harness::loaded();
        let before = h.sync.tile_set().len();

        let outcome = h.sync.handle(MapEvent::Resize { width: 1920, height: 1080 });
        assert!(matches!(outcome, EventOutcome::Applied(_)));
        assert_eq!(h.sync.viewport(), Viewport::new(1920, 1080));
        assert!(h.sync.tile_set().len() > before);

        h.sync.handle(MapEvent::Resize { width: 10, height: 10 });
        assert_eq!(h.sync.viewport(), Viewport::new(960, 500));
    }

    /// Fetches spawned on tokio arrive through pump()
    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_tokio_spawner_end_to_end() {
        use quakemap::runtime::spawners::tokio_impl::TokioSpawner;

        let fetcher = Arc::new(CountingFetcher::default());
        let mut sync = Synchronizer::from_config(
            MapConfig::default(),
            Viewport::default(),
            SvgSurface::new(Viewport::default()),
            fetcher.clone(),
            Arc::new(TokioSpawner::current().unwrap()),
        )
        .unwrap();
        sync.handle(MapEvent::DataLoaded(Ok(single_quake())));
        let wanted = sync.tile_set().len();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut attached = 0;
        while sync.pending_tiles() > 0 && Instant::now() < deadline {
            attached += sync.pump();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(attached, wanted);
        assert_eq!(sync.surface().tile_count(), wanted);
        let svg = sync.surface().to_svg_string();
        assert!(svg.contains("basemaps.cartocdn.com/rastertiles/voyager/6/"));
        assert!(svg.contains("<path d=\"M"));
    }
}
