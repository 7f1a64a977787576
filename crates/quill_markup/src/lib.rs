//! Default collaborators for the render pipeline: a CommonMark engine, a
//! delimiter-scanning math renderer, a syntect-backed highlighter and helpers
//! that work on the produced markup, including tool status completion.

mod blocks;
mod highlight;
mod html;
mod markdown;
mod math;
mod tool_status;

pub use blocks::{Piece, add_copy_buttons, copy_block, split_language_blocks};
pub use highlight::SyntectHighlighter;
pub use html::{escape_html, strip_tags, unescape_html};
pub use markdown::CmarkEngine;
pub use math::DelimiterMath;
pub use tool_status::{DONE_LABEL, ToolStatusUpdate, has_element, mark_done, take_status_updates};
