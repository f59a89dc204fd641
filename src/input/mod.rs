pub mod events;
pub mod zoom;

pub use events::MapEvent;
pub use zoom::ZoomBehavior;
