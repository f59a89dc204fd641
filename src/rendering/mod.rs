pub mod surface;
pub mod svg;

pub use surface::{RecordingSurface, RenderSurface, SurfaceOp, TileImage};
pub use svg::SvgSurface;
