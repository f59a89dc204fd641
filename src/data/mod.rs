pub mod geojson;
pub mod loader;
pub mod quakes;
