mod cache;
mod coordinator;
mod error;
mod viewport;

pub use cache::DiagramCache;
pub use coordinator::{DiagramCoordinator, DiagramStats};
pub use error::{DiagramError, Result};
pub use viewport::{PanZoom, PointerButton, Transform, ViewportController, graphic_size};
