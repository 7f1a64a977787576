//! Keeps the reader's place while rendered content changes size underneath
//! them: pinned readers follow the bottom, readers scrolled up stay where they
//! were.

mod anchor;
mod bottom_lock;
mod debug;
mod surface;

pub use anchor::ScrollAnchor;
pub use bottom_lock::BottomLock;
pub use debug::{ScrollDebugEntry, ScrollDebugLog, ScrollEventKind};
pub use surface::MemorySurface;
