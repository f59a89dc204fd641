use std::path::Path;

use svg::node::element::{Group, Image, Path as SvgPath, Style};
use svg::Document;

use super::surface::{RenderSurface, TileImage};
use crate::core::geo::TileRef;
use crate::core::viewport::Viewport;
use crate::Result;

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

const DEFAULT_STYLE: &str = "path { fill: red; fill-opacity: 0.4; stroke: #700; stroke-width: 0.5; }";

/// Builds a standalone SVG document: a raster `<g>` of tile `<image>`s under
/// one `<path>` per feature.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: u32,
    height: u32,
    raster_transform: String,
    tiles: Vec<TileImage>,
    paths: Vec<String>,
    style: String,
}

impl SvgSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            raster_transform: String::new(),
            tiles: Vec::new(),
            paths: Vec::new(),
            style: DEFAULT_STYLE.to_string(),
        }
    }

    /// Replaces the embedded stylesheet
    pub fn with_style(mut self, css: impl Into<String>) -> Self {
        self.style = css.into();
        self
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// The current scene as an SVG document tree
    pub fn to_document(&self) -> Document {
        let raster = self.tiles.iter().fold(
            Group::new().set("transform", self.raster_transform.as_str()),
            |group, image| {
                group.add(
                    Image::new()
                        .set("xlink:href", image.href.as_str())
                        .set("x", image.x)
                        .set("y", image.y)
                        .set("width", image.size)
                        .set("height", image.size),
                )
            },
        );

        let mut document = Document::new()
            .set("xmlns:xlink", XLINK_NS)
            .set("width", self.width)
            .set("height", self.height)
            .set("viewBox", (0, 0, self.width, self.height));
        if !self.style.is_empty() {
            document = document.add(Style::new(self.style.as_str()));
        }
        document = document.add(raster);

        self.paths
            .iter()
            .fold(document, |document, d| document.add(SvgPath::new().set("d", d.as_str())))
    }

    /// Serializes the current scene
    pub fn to_svg_string(&self) -> String {
        self.to_document().to_string()
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        svg::save(path.as_ref(), &self.to_document())?;
        log::info!(
            "wrote {} ({} tiles, {} paths)",
            path.as_ref().display(),
            self.tiles.len(),
            self.paths.len()
        );
        Ok(())
    }
}

impl RenderSurface for SvgSurface {
    fn set_raster_transform(&mut self, transform: &str) {
        self.raster_transform = transform.to_string();
    }

    fn attach_tile(&mut self, image: TileImage) {
        // Re-attaching replaces the old element rather than stacking a copy
        self.tiles.retain(|existing| existing.tile != image.tile);
        self.tiles.push(image);
    }

    fn detach_tile(&mut self, tile: &TileRef) {
        self.tiles.retain(|image| image.tile != *tile);
    }

    fn draw_vectors(&mut self, paths: &[String]) {
        self.paths = paths.to_vec();
    }

    fn resize(&mut self, viewport: Viewport) {
        self.width = viewport.width;
        self.height = viewport.height;
    }
}
