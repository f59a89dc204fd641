//! Core constants shared by the projection, the tile grid and the zoom behaviour.

use std::f64::consts::PI;

/// One full turn in radians. Projection scale is `k / TAU`, which puts the
/// whole world `k` pixels wide, the same unit the tile pyramid uses.
pub const TAU: f64 = 2.0 * PI;

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Lower bound of the interaction scale `k` (2^11).
pub const K_MIN: f64 = (1u64 << 11) as f64;

/// Upper bound of the interaction scale `k` (2^24).
pub const K_MAX: f64 = (1u64 << 24) as f64;

/// Scale applied when the map first centres on the data (2^14).
pub const DEFAULT_K: f64 = (1u64 << 14) as f64;

/// Highest raster zoom level the tile provider serves.
pub const MAX_TILE_ZOOM: u8 = 22;

/// Latitude limit of the spherical Mercator domain.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Smallest viewport the map will lay itself out in.
pub const MIN_VIEWPORT_WIDTH: u32 = 960;
pub const MIN_VIEWPORT_HEIGHT: u32 = 500;

/// Default map centre: the Sierra Nevada, California (lng, lat).
pub const DEFAULT_CENTER: (f64, f64) = (-119.665, 37.414);

/// Largest circle radius, in pixels, drawn for the strongest quake.
pub const MAX_RADIUS: f64 = 10.0;

/// Wheel delta to scale exponent, matching d3-zoom for pixel-mode wheels.
pub const WHEEL_DELTA_FACTOR: f64 = 0.002;
