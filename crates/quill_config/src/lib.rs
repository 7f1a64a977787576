mod error;
mod reader;
mod render_config;

pub use error::*;
pub use reader::*;
pub use render_config::*;
