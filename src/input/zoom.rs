use crate::core::config::ZoomConfig;
use crate::core::geo::{LngLat, Point};
use crate::core::projection::Projection;
use crate::core::transform::Transform;
use crate::core::viewport::Viewport;
use crate::input::events::MapEvent;

/// Turns gestures into transforms, the way a browser zoom behaviour does:
/// wheel and pinch scale about the pointer, drags translate by the pointer
/// delta, and every scale is held to the configured extent.
#[derive(Debug, Clone)]
pub struct ZoomBehavior {
    config: ZoomConfig,
    drag_anchor: Option<Point>,
}

impl ZoomBehavior {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config,
            drag_anchor: None,
        }
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Transform centring `center` in `viewport` at scale `k`
    pub fn centered(&self, center: &LngLat, k: f64, viewport: &Viewport) -> Transform {
        let projected = Projection::unit().project(center);
        Transform::centered_on(
            &projected,
            self.config.clamp_k(k),
            viewport.width as f64,
            viewport.height as f64,
        )
    }

    /// The transform an interaction event asks for, or `None` when the event
    /// does not move the view (drag start/end, non-gesture events)
    pub fn next_transform(
        &mut self,
        event: &MapEvent,
        current: &Transform,
        viewport: &Viewport,
    ) -> Option<Transform> {
        let (k_min, k_max) = (self.config.k_min, self.config.k_max);
        match event {
            MapEvent::Zoom(transform) => Some(*transform),
            MapEvent::Wheel { delta, position } => {
                let factor = 2f64.powf(-delta * self.config.wheel_delta_factor);
                Some(current.zoom_to(current.k * factor, position, k_min, k_max))
            }
            MapEvent::DragStart { position } => {
                self.drag_anchor = Some(*position);
                None
            }
            MapEvent::DragMove { position } => {
                let anchor = self.drag_anchor.replace(*position)?;
                Some(current.pan_by(&position.subtract(&anchor)))
            }
            MapEvent::DragEnd => {
                self.drag_anchor = None;
                None
            }
            MapEvent::Pinch { scale, center } => {
                Some(current.zoom_to(current.k * scale, center, k_min, k_max))
            }
            MapEvent::DoubleClick { position } => {
                Some(current.zoom_to(current.k * 2.0, position, k_min, k_max))
            }
            MapEvent::Recenter { center, k } => Some(self.centered(center, *k, viewport)),
            MapEvent::Resize { .. } | MapEvent::DataLoaded(_) | MapEvent::TileLoaded(_) => None,
        }
    }
}

impl Default for ZoomBehavior {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}
