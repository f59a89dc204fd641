//! Tile grid resolution.
//!
//! Given the interaction transform and the viewport size, work out which
//! raster tiles cover the screen and how the tile group must be scaled and
//! translated so that tile `(col, row)` drawn at `(col * 256, row * 256)`
//! lands under the matching vector geometry.

use serde::{Deserialize, Serialize};

use crate::core::constants::{MAX_TILE_ZOOM, TILE_SIZE};
use crate::core::geo::TileRef;
use crate::core::transform::Transform;
use crate::core::viewport::Viewport;

/// Tiles covering the viewport plus the grid's own framing.
///
/// `scale` is the on-screen size in pixels of one tile and `translate` the
/// grid origin expressed in tiles, so the raster group transform is
/// `translate(translate * scale) scale(scale / tile_size)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSet {
    pub tiles: Vec<TileRef>,
    pub scale: f64,
    pub translate: (f64, f64),
    pub tile_size: u32,
}

impl TileSet {
    pub fn empty() -> Self {
        Self {
            tiles: Vec::new(),
            scale: TILE_SIZE as f64,
            translate: (0.0, 0.0),
            tile_size: TILE_SIZE,
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, tile: &TileRef) -> bool {
        self.tiles.contains(tile)
    }

    /// Discrete zoom level shared by every tile in the set
    pub fn zoom_level(&self) -> Option<u8> {
        self.tiles.first().map(|t| t.zoom_level)
    }

    /// SVG/CSS transform for the raster group
    pub fn group_transform(&self) -> String {
        format_group_transform(self.scale, self.translate, self.tile_size)
    }
}

impl Default for TileSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Formats `translate(Tx,Ty) scale(S)` for a tile grid.
///
/// Integral scales get integral translations so tile edges sit on whole
/// pixels; fractional scales keep full precision so neighbouring tiles do not
/// open seams between them.
pub fn format_group_transform(scale: f64, translate: (f64, f64), tile_size: u32) -> String {
    let k = scale / tile_size as f64;
    let tx = translate.0 * scale;
    let ty = translate.1 * scale;

    let (tx, ty) = if scale.fract() == 0.0 {
        (round_half_up(tx), round_half_up(ty))
    } else {
        (tx, ty)
    };

    // + 0.0 folds negative zero so it prints as "0"
    format!("translate({},{}) scale({})", tx + 0.0, ty + 0.0, k)
}

// Halves round towards +inf, same as the browser's Math.round
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Computes tile coverage for a transform. Pure: equal inputs always give
/// the same ordered tile list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGridResolver {
    tile_size: u32,
    max_zoom: u8,
}

impl TileGridResolver {
    pub fn new(tile_size: u32, max_zoom: u8) -> Self {
        Self {
            tile_size: tile_size.max(1),
            max_zoom,
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    /// Discrete raster zoom level for a continuous scale `k`: the world is
    /// `k` pixels wide, so `log2(k / tile_size)` floored, clamped to
    /// `[0, max_zoom]`.
    pub fn zoom_level(&self, k: f64) -> u8 {
        let z = (k.log2() - (self.tile_size as f64).log2()).max(0.0);
        if !z.is_finite() {
            return 0;
        }
        (z.floor() as u64).min(self.max_zoom as u64) as u8
    }

    pub fn resolve_transform(&self, transform: &Transform, viewport: &Viewport) -> TileSet {
        self.resolve(
            transform.k,
            transform.x,
            transform.y,
            viewport.width as i64,
            viewport.height as i64,
        )
    }

    /// Tiles covering a `width` x `height` viewport under transform
    /// `(k, x, y)`, listed row-major.
    pub fn resolve(&self, k: f64, x: f64, y: f64, width: i64, height: i64) -> TileSet {
        if width <= 0 || height <= 0 {
            return TileSet {
                tile_size: self.tile_size,
                ..TileSet::empty()
            };
        }
        if !(k.is_finite() && k > 0.0 && x.is_finite() && y.is_finite()) {
            log::warn!("cannot resolve tiles for transform ({}, {}, {})", k, x, y);
            return TileSet {
                tile_size: self.tile_size,
                ..TileSet::empty()
            };
        }

        let zoom_level = self.zoom_level(k);
        let extent = TileRef::grid_extent(zoom_level) as f64;
        // On-screen size of one tile at this zoom level
        let tile_k = k / extent;

        // The world spans [-k/2, k/2] around the translation
        let origin_x = x - k / 2.0;
        let origin_y = y - k / 2.0;

        let cols = Self::span(origin_x, width as f64, tile_k, extent);
        let rows = Self::span(origin_y, height as f64, tile_k, extent);

        let mut tiles = Vec::with_capacity(cols.len() * rows.len());
        for row in rows {
            for col in cols.clone() {
                tiles.push(TileRef::new(col, row, zoom_level));
            }
        }

        TileSet {
            tiles,
            scale: tile_k,
            translate: (origin_x / tile_k, origin_y / tile_k),
            tile_size: self.tile_size,
        }
    }

    // Indices of tiles overlapping [0, length) on one axis, clamped to the pyramid
    fn span(origin: f64, length: f64, tile_k: f64, extent: f64) -> std::ops::Range<u32> {
        let start = ((0.0 - origin) / tile_k).floor().max(0.0);
        let end = ((length - origin) / tile_k).ceil().min(extent);
        if end <= start {
            return 0..0;
        }
        (start as u32)..(end as u32)
    }
}

impl Default for TileGridResolver {
    fn default() -> Self {
        Self::new(TILE_SIZE, MAX_TILE_ZOOM)
    }
}
