use serde::{Deserialize, Serialize};

use crate::core::constants::{MIN_VIEWPORT_HEIGHT, MIN_VIEWPORT_WIDTH};
use crate::core::geo::Point;

/// Pixel dimensions of the map surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Sizes the viewport from the host window, never smaller than
    /// `(min_width, min_height)`
    pub fn from_window(
        window_width: u32,
        window_height: u32,
        min_width: u32,
        min_height: u32,
    ) -> Self {
        Self::new(window_width.max(min_width), window_height.max(min_height))
    }

    /// Window sizing against the default 960x500 floor
    pub fn from_window_default(window_width: u32, window_height: u32) -> Self {
        Self::from_window(
            window_width,
            window_height,
            MIN_VIEWPORT_WIDTH,
            MIN_VIEWPORT_HEIGHT,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn size(&self) -> Point {
        Point::new(self.width as f64, self.height as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(MIN_VIEWPORT_WIDTH, MIN_VIEWPORT_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_is_floored_at_minimum() {
        let small = Viewport::from_window_default(320, 240);
        assert_eq!(small, Viewport::new(960, 500));

        let large = Viewport::from_window_default(1920, 1080);
        assert_eq!(large, Viewport::new(1920, 1080));

        let mixed = Viewport::from_window_default(1200, 300);
        assert_eq!(mixed, Viewport::new(1200, 500));
    }

    #[test]
    fn test_center() {
        let viewport = Viewport::new(960, 500);
        assert_eq!(viewport.center(), Point::new(480.0, 250.0));
        assert!(!viewport.is_empty());
        assert!(Viewport::new(0, 10).is_empty());
    }
}
