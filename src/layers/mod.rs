//! The two map layers: raster basemap tiles and vector earthquake features.

pub mod path;
pub mod raster;
pub mod vector;

pub use raster::{CommitOutcome, RasterLayer};
pub use vector::{RadiusScale, VectorLayer};
