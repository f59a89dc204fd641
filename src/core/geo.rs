use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::constants::MAX_LATITUDE;

/// A geographical coordinate in degrees, longitude first as GeoJSON orders it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    /// Creates a new coordinate
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Clamps latitude to the Mercator domain
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(coords: [f64; 2]) -> Self {
        Self::new(coords[0], coords[1])
    }
}

impl Default for LngLat {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// One earthquake record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub magnitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64, magnitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            magnitude,
        }
    }

    pub fn lng_lat(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a bounding box of geographical coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl LngLatBounds {
    pub fn new(south_west: LngLat, north_east: LngLat) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Degenerate bounds around a single coordinate
    pub fn from_point(point: LngLat) -> Self {
        Self::new(point, point)
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LngLat) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LngLat) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.south_west.lng + self.north_east.lng) / 2.0,
            (self.south_west.lat + self.north_east.lat) / 2.0,
        )
    }

    /// Returns the union of this bounds with another bounds
    pub fn union(&self, other: &LngLatBounds) -> LngLatBounds {
        let mut merged = *self;
        merged.extend(&other.south_west);
        merged.extend(&other.north_east);
        merged
    }
}

/// Identifies one raster tile in the slippy-map pyramid.
///
/// Equality and hashing are structural, so a `TileRef` is a stable key for
/// reconciling tile sets across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileRef {
    pub col: u32,
    pub row: u32,
    pub zoom_level: u8,
}

impl TileRef {
    pub fn new(col: u32, row: u32, zoom_level: u8) -> Self {
        Self {
            col,
            row,
            zoom_level,
        }
    }

    /// Number of tiles along one axis at this zoom level
    pub fn grid_extent(zoom_level: u8) -> u64 {
        1u64 << zoom_level
    }

    /// Checks if the tile exists at its zoom level
    pub fn is_valid(&self) -> bool {
        let extent = Self::grid_extent(self.zoom_level);
        (self.col as u64) < extent && (self.row as u64) < extent
    }

    /// Top-left corner of the tile inside the raster group, in tile-size units
    pub fn origin(&self, tile_size: u32) -> Point {
        Point::new(
            self.col as f64 * tile_size as f64,
            self.row as f64 * tile_size as f64,
        )
    }
}

impl fmt::Display for TileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom_level, self.col, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lng_lat_creation() {
        let coord = LngLat::new(-119.665, 37.414);
        assert_eq!(coord.lng, -119.665);
        assert_eq!(coord.lat, 37.414);
        assert!(coord.is_valid());
        assert!(!LngLat::new(0.0, 91.0).is_valid());
    }

    #[test]
    fn test_clamp_lat() {
        assert_eq!(LngLat::clamp_lat(90.0), MAX_LATITUDE);
        assert_eq!(LngLat::clamp_lat(-90.0), -MAX_LATITUDE);
        assert_eq!(LngLat::clamp_lat(12.5), 12.5);
    }

    #[test]
    fn test_wrap_lng() {
        assert_eq!(LngLat::wrap_lng(190.0), -170.0);
        assert_eq!(LngLat::wrap_lng(-190.0), 170.0);
        assert_eq!(LngLat::wrap_lng(45.0), 45.0);
    }

    #[test]
    fn test_bounds_extend_and_center() {
        let mut bounds = LngLatBounds::from_point(LngLat::new(-120.0, 36.0));
        bounds.extend(&LngLat::new(-118.0, 38.0));

        assert!(bounds.contains(&LngLat::new(-119.0, 37.0)));
        assert!(!bounds.contains(&LngLat::new(-117.0, 37.0)));
        assert_eq!(bounds.center(), LngLat::new(-119.0, 37.0));
    }

    #[test]
    fn test_tile_ref_identity() {
        let a = TileRef::new(3, 5, 4);
        let b = TileRef::new(3, 5, 4);
        let c = TileRef::new(3, 5, 5);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_valid());
        assert!(!TileRef::new(16, 0, 4).is_valid());
        assert_eq!(a.to_string(), "4/3/5");
        assert_eq!(a.origin(256), Point::new(768.0, 1280.0));
    }
}
