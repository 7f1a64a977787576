mod diagram;
mod error;
mod event;
mod geometry;
mod scroll;
mod services;
mod source;

pub use diagram::*;
pub use error::*;
pub use event::*;
pub use geometry::*;
pub use scroll::*;
pub use services::*;
pub use source::*;
