use anyhow::Context;
use clap::Parser;
use quakemap::prelude::*;
use quakemap::runtime::spawners::tokio_impl::TokioSpawner;
use std::path::PathBuf;

/// Render earthquakes over a raster basemap to a standalone SVG
#[derive(Parser)]
#[command(name = "quakemap")]
#[command(version)]
struct Cli {
    /// GeoJSON file path or http(s) URL
    #[arg(default_value = "data/earthquakes_4326_cali.geojson")]
    data: String,

    /// Output SVG file
    #[arg(short, long, default_value = "map.svg")]
    out: PathBuf,

    /// Window width; never below 960
    #[arg(long, default_value_t = 960)]
    width: u32,

    /// Window height; never below 500
    #[arg(long, default_value_t = 500)]
    height: u32,

    /// JSON config overriding the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wheel deltas applied at the viewport centre after the initial view,
    /// in order (negative zooms in)
    #[arg(long = "wheel", allow_hyphen_values = true)]
    wheel: Vec<f64>,

    /// How long to wait for tiles before writing the SVG
    #[arg(long, default_value_t = 10_000)]
    wait_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MapConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => MapConfig::default(),
    };

    let spawner = TokioSpawner::current().context("no tokio runtime")?;
    let fetcher = HttpTileFetcher::new(&config.loader).context("building tile client")?;
    let window = Viewport::new(cli.width, cli.height);
    let magnitude_property = config.radius.magnitude_property.clone();

    let mut map = Synchronizer::from_config(
        config,
        window,
        SvgSurface::new(window),
        Arc::new(fetcher),
        Arc::new(spawner),
    )?;

    let source = DataSource::parse(&cli.data);
    log::info!("loading {}", source);
    let data = source.load(&magnitude_property).await;
    map.handle(MapEvent::DataLoaded(data));

    let center = map.viewport().center();
    for delta in &cli.wheel {
        map.handle(MapEvent::Wheel {
            delta: *delta,
            position: center,
        });
    }

    let deadline = Instant::now() + Duration::from_millis(cli.wait_ms);
    let mut attached = 0;
    while map.pending_tiles() > 0 && Instant::now() < deadline {
        attached += map.pump();
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    attached += map.pump();
    if map.pending_tiles() > 0 {
        log::warn!("{} tiles still loading after {}ms", map.pending_tiles(), cli.wait_ms);
    }

    let transform = map.transform();
    log::info!(
        "view k={} x={} y={}, {} of {} tiles attached",
        transform.k,
        transform.x,
        transform.y,
        attached,
        map.tile_set().len()
    );

    map.surface()
        .write_to(&cli.out)
        .with_context(|| format!("writing {}", cli.out.display()))?;
    println!("{}", cli.out.display());
    Ok(())
}
