use serde::{Deserialize, Serialize};

use crate::core::constants::{K_MAX, K_MIN};
use crate::core::geo::Point;

/// The interaction transform: uniform scale `k` followed by translation
/// `(x, y)`. A world-space point `p` lands on screen at `p * k + (x, y)`.
///
/// This is the single source of truth for the view. Projection scale and the
/// tile grid are both derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Transform {
    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    /// Scale 1, no translation
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Returns this transform with `k` clamped into `[k_min, k_max]`.
    /// The translation is left alone.
    pub fn clamped(&self, k_min: f64, k_max: f64) -> Self {
        Self::new(self.k.clamp(k_min, k_max), self.x, self.y)
    }

    /// Clamps `k` to the default scale extent
    pub fn clamped_default(&self) -> Self {
        self.clamped(K_MIN, K_MAX)
    }

    pub fn is_finite(&self) -> bool {
        self.k.is_finite() && self.x.is_finite() && self.y.is_finite()
    }

    /// Maps a world point to screen space
    pub fn apply(&self, point: &Point) -> Point {
        Point::new(point.x * self.k + self.x, point.y * self.k + self.y)
    }

    /// Maps a screen point back to world space
    pub fn invert(&self, point: &Point) -> Point {
        Point::new((point.x - self.x) / self.k, (point.y - self.y) / self.k)
    }

    /// Post-multiplies a translation expressed in world units
    pub fn translate(&self, tx: f64, ty: f64) -> Self {
        Self::new(self.k, self.x + self.k * tx, self.y + self.k * ty)
    }

    /// Post-multiplies a uniform scale
    pub fn scale(&self, s: f64) -> Self {
        Self::new(self.k * s, self.x, self.y)
    }

    /// Shifts the view by a screen-space pixel delta
    pub fn pan_by(&self, delta: &Point) -> Self {
        Self::new(self.k, self.x + delta.x, self.y + delta.y)
    }

    /// Rescales to `k` (clamped) while keeping the world point under
    /// `anchor` fixed on screen
    pub fn zoom_to(&self, k: f64, anchor: &Point, k_min: f64, k_max: f64) -> Self {
        let k = k.clamp(k_min, k_max);
        let world = self.invert(anchor);
        Self::new(k, anchor.x - world.x * k, anchor.y - world.y * k)
    }

    /// Transform that puts `center` (a point in unit-projection space) at the
    /// middle of a `width` x `height` viewport at scale `k`. Equivalent to
    /// `identity.translate(w/2, h/2).scale(k).translate(-cx, -cy)`.
    pub fn centered_on(center: &Point, k: f64, width: f64, height: f64) -> Self {
        Self::identity()
            .translate(width / 2.0, height / 2.0)
            .scale(k)
            .translate(-center.x, -center.y)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
