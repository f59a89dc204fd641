pub mod cache;
pub mod grid;
pub mod loader;
pub mod reconcile;
pub mod source;

// Re-exports for convenience
pub use grid::{TileGridResolver, TileSet};
pub use loader::{HttpTileFetcher, TileCompletion, TileFetcher};
pub use reconcile::TileDelta;
pub use source::{CartoTileSource, TileSource};
