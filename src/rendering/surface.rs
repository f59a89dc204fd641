use serde::{Deserialize, Serialize};

use crate::core::geo::TileRef;
use crate::core::viewport::Viewport;

/// A tile image ready to be placed inside the raster group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileImage {
    pub tile: TileRef,
    pub href: String,
    /// Position inside the raster group, before the group transform
    pub x: f64,
    pub y: f64,
    pub size: u32,
    pub byte_len: usize,
}

/// Where the synchronizer draws. Implementations own the visual resources;
/// the synchronizer only tells them what changed.
pub trait RenderSurface {
    /// Sets the raster group transform, e.g. `translate(-10,4) scale(1.5)`
    fn set_raster_transform(&mut self, transform: &str);

    /// Adds a loaded tile image to the raster group
    fn attach_tile(&mut self, image: TileImage);

    /// Removes a tile image; unknown tiles are ignored
    fn detach_tile(&mut self, tile: &TileRef);

    /// Replaces every vector path, one per feature in feature order
    fn draw_vectors(&mut self, paths: &[String]);

    /// The viewport changed size
    fn resize(&mut self, _viewport: Viewport) {}
}

/// One call made on a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    RasterTransform(String),
    Attach(TileRef),
    Detach(TileRef),
    Vectors(Vec<String>),
}

/// Surface that records every call, for tests and debugging
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
    attached: Vec<TileImage>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tiles currently attached, in attach order
    pub fn attached(&self) -> Vec<TileRef> {
        self.attached.iter().map(|image| image.tile).collect()
    }

    pub fn attached_images(&self) -> &[TileImage] {
        &self.attached
    }

    /// The most recent raster transform
    pub fn raster_transform(&self) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            SurfaceOp::RasterTransform(t) => Some(t.as_str()),
            _ => None,
        })
    }

    /// The most recently drawn vector paths
    pub fn vectors(&self) -> Option<&[String]> {
        self.ops.iter().rev().find_map(|op| match op {
            SurfaceOp::Vectors(paths) => Some(paths.as_slice()),
            _ => None,
        })
    }

    pub fn count(&self, pred: impl Fn(&SurfaceOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn set_raster_transform(&mut self, transform: &str) {
        self.ops.push(SurfaceOp::RasterTransform(transform.to_string()));
    }

    fn attach_tile(&mut self, image: TileImage) {
        self.ops.push(SurfaceOp::Attach(image.tile));
        self.attached.push(image);
    }

    fn detach_tile(&mut self, tile: &TileRef) {
        self.ops.push(SurfaceOp::Detach(*tile));
        self.attached.retain(|image| image.tile != *tile);
    }

    fn draw_vectors(&mut self, paths: &[String]) {
        self.ops.push(SurfaceOp::Vectors(paths.to_vec()));
    }
}
