//! Text transforms applied to streamed chat content before it reaches the
//! Markdown engine.
//!
//! Everything here is pure and infallible: malformed input degrades to "no
//! protection applied" instead of an error.

mod escape;
mod fence;
mod html;
mod protect;
mod repair;

pub use escape::{DOLLAR_PLACEHOLDER, restore_math_delimiters, sanitize};
pub use fence::open_diagram_fence;
pub use html::{EmbeddedBlock, dedent_html, looks_like_html_block, split_embedded_block};
pub use protect::ProtectedText;
pub use repair::repair_fences;
