use crate::core::geo::{LngLat, Point};
use crate::core::transform::Transform;
use crate::data::quakes::VectorFeatureSet;
use crate::tiles::loader::TileCompletion;
use crate::Result;

/// Everything the synchronizer reacts to. Gestures, programmatic view
/// changes and async completions all arrive through this one type.
#[derive(Debug)]
pub enum MapEvent {
    /// A fully formed transform from an external zoom behaviour
    Zoom(Transform),
    /// Scroll wheel; positive delta zooms out
    Wheel { delta: f64, position: Point },
    /// Start of drag operation
    DragStart { position: Point },
    /// Drag in progress, absolute pointer position
    DragMove { position: Point },
    /// End of drag operation
    DragEnd,
    /// Two-finger pinch: scale relative to the current view about `center`
    Pinch { scale: f64, center: Point },
    /// Double click/tap zooms in one level about the pointer
    DoubleClick { position: Point },
    /// Programmatic re-center on a coordinate at scale `k`
    Recenter { center: LngLat, k: f64 },
    /// Host window resized
    Resize { width: u32, height: u32 },
    /// The feature collection finished loading, or failed to
    DataLoaded(Result<VectorFeatureSet>),
    /// A tile fetch finished
    TileLoaded(TileCompletion),
}

impl MapEvent {
    /// True for events that move or rescale the view
    pub fn is_interaction(&self) -> bool {
        matches!(
            self,
            MapEvent::Zoom(_)
                | MapEvent::Wheel { .. }
                | MapEvent::DragStart { .. }
                | MapEvent::DragMove { .. }
                | MapEvent::DragEnd
                | MapEvent::Pinch { .. }
                | MapEvent::DoubleClick { .. }
                | MapEvent::Recenter { .. }
        )
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            MapEvent::Zoom(_) => "zoom",
            MapEvent::Wheel { .. } => "wheel",
            MapEvent::DragStart { .. } => "drag-start",
            MapEvent::DragMove { .. } => "drag",
            MapEvent::DragEnd => "drag-end",
            MapEvent::Pinch { .. } => "pinch",
            MapEvent::DoubleClick { .. } => "dblclick",
            MapEvent::Recenter { .. } => "recenter",
            MapEvent::Resize { .. } => "resize",
            MapEvent::DataLoaded(_) => "data-loaded",
            MapEvent::TileLoaded(_) => "tile-loaded",
        }
    }
}
