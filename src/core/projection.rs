use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::core::constants::{MAX_LATITUDE, TAU};
use crate::core::geo::{LngLat, Point};
use crate::core::transform::Transform;

/// Spherical Mercator projection with a pixel scale and origin.
///
/// `project` maps longitude linearly onto `x` and latitude through the
/// Mercator stretch onto `y` (north up), then scales by `scale_factor` and
/// offsets by the origin. The whole world spans `scale_factor * 2π` pixels,
/// so a scale of `k / 2π` lines the projection up with a tile pyramid whose
/// world width is `k` pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    scale_factor: f64,
    origin_x: f64,
    origin_y: f64,
}

impl Projection {
    /// Creates a projection; a non-positive or non-finite scale falls back to
    /// the unit scale
    pub fn new(scale_factor: f64, origin_x: f64, origin_y: f64) -> Self {
        let scale_factor = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0 / TAU
        };
        Self {
            scale_factor,
            origin_x,
            origin_y,
        }
    }

    /// Scale `1/2π`, no translation: the world is one pixel wide and centred
    /// on the origin. Centering coordinates are computed in this space.
    pub fn unit() -> Self {
        Self::new(1.0 / TAU, 0.0, 0.0)
    }

    /// Projection matching an interaction transform
    pub fn from_transform(transform: &Transform) -> Self {
        Self::new(transform.k / TAU, transform.x, transform.y)
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn origin(&self) -> Point {
        Point::new(self.origin_x, self.origin_y)
    }

    /// Sets the scale. Non-positive or non-finite factors are ignored.
    pub fn set_scale(&mut self, factor: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            log::warn!("ignoring invalid projection scale {}", factor);
            return;
        }
        self.scale_factor = factor;
    }

    pub fn set_translate(&mut self, x: f64, y: f64) {
        self.origin_x = x;
        self.origin_y = y;
    }

    /// Sets scale and translate together from an interaction transform
    pub fn apply_transform(&mut self, transform: &Transform) {
        self.set_scale(transform.k / TAU);
        self.set_translate(transform.x, transform.y);
    }

    /// Projects a coordinate to pixels. Latitudes beyond the Mercator limit
    /// are clamped rather than sent to infinity.
    pub fn project(&self, coord: &LngLat) -> Point {
        let lat = if coord.lat.abs() > MAX_LATITUDE {
            log::debug!(
                "latitude {} outside projection domain, clamping to ±{}",
                coord.lat,
                MAX_LATITUDE
            );
            LngLat::clamp_lat(coord.lat)
        } else {
            coord.lat
        };

        let lambda = coord.lng.to_radians();
        let phi = lat.to_radians();
        let x = lambda;
        let y = (PI / 4.0 + phi / 2.0).tan().ln();

        Point::new(
            x * self.scale_factor + self.origin_x,
            -y * self.scale_factor + self.origin_y,
        )
    }

    /// Inverse of [`Projection::project`]
    pub fn invert(&self, point: &Point) -> LngLat {
        let x = (point.x - self.origin_x) / self.scale_factor;
        let y = -(point.y - self.origin_y) / self.scale_factor;

        let lng = x.to_degrees();
        let lat = (2.0 * y.exp().atan() - PI / 2.0).to_degrees();
        LngLat::new(lng, lat)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_unit_projection_spans_one_pixel() {
        let projection = Projection::unit();

        let west = projection.project(&LngLat::new(-180.0, 0.0));
        let east = projection.project(&LngLat::new(180.0, 0.0));
        assert!((east.x - west.x - 1.0).abs() < EPS);

        let origin = projection.project(&LngLat::new(0.0, 0.0));
        assert!(origin.x.abs() < EPS);
        assert!(origin.y.abs() < EPS);
    }

    #[test]
    fn test_north_is_up() {
        let projection = Projection::new(1000.0, 0.0, 0.0);
        let north = projection.project(&LngLat::new(0.0, 45.0));
        assert!(north.y < 0.0);
    }

    #[test]
    fn test_project_invert_roundtrip() {
        let projection = Projection::new(2607.59, 480.0, 250.0);
        let coord = LngLat::new(-119.665, 37.414);

        let back = projection.invert(&projection.project(&coord));
        assert!((back.lng - coord.lng).abs() < 1e-9);
        assert!((back.lat - coord.lat).abs() < 1e-9);
    }

    #[test]
    fn test_poles_are_clamped_not_infinite() {
        let projection = Projection::new(1.0, 0.0, 0.0);

        let north = projection.project(&LngLat::new(0.0, 90.0));
        let south = projection.project(&LngLat::new(0.0, -90.0));
        assert!(north.is_finite());
        assert!(south.is_finite());

        let limit = projection.project(&LngLat::new(0.0, MAX_LATITUDE));
        assert_eq!(north, limit);
        // Web Mercator's latitude limit makes the map square: y = ±π
        assert!((north.y + PI).abs() < 1e-6);
    }

    #[test]
    fn test_set_scale_rejects_invalid_values() {
        let mut projection = Projection::new(5.0, 0.0, 0.0);
        projection.set_scale(0.0);
        projection.set_scale(-3.0);
        projection.set_scale(f64::NAN);
        assert_eq!(projection.scale_factor(), 5.0);

        projection.set_scale(7.0);
        assert_eq!(projection.scale_factor(), 7.0);
    }

    #[test]
    fn test_mutators_take_effect_immediately() {
        let mut projection = Projection::unit();
        let coord = LngLat::new(10.0, 10.0);
        let before = projection.project(&coord);

        projection.set_translate(100.0, 50.0);
        let after = projection.project(&coord);
        assert!((after.x - before.x - 100.0).abs() < EPS);
        assert!((after.y - before.y - 50.0).abs() < EPS);
    }

    #[test]
    fn test_scale_tracks_transform() {
        let transform = Transform::new(16384.0, 12.0, -4.0);
        let projection = Projection::from_transform(&transform);
        assert_eq!(projection.scale_factor(), 16384.0 / TAU);
        assert_eq!(projection.origin(), Point::new(12.0, -4.0));
    }
}
