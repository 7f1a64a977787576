use crate::{Result, ScrollMetrics};

/// Converts Markdown text into markup. Must be pure.
pub trait MarkdownEngine: Send + Sync {
    fn render(&self, text: &str) -> Result<String>;
}

/// Typesets math delimiters found in markup text. Running it on already
/// typeset markup must be a no-op.
pub trait MathRenderer: Send + Sync {
    fn render(&self, markup: &str) -> Result<String>;
}

/// Highlights code blocks in markup, skipping blocks that are already marked
/// as highlighted.
pub trait CodeHighlighter: Send + Sync {
    fn highlight(&self, markup: &str) -> Result<String>;
}

/// Compiles diagram source text into graphic markup.
#[async_trait::async_trait]
pub trait DiagramCompiler: Send + Sync {
    async fn compile(&self, code: &str) -> Result<String>;
}

/// The scrolling region hosting the rendered document.
pub trait ScrollSurface: Send + Sync {
    /// Returns `None` when the surface is not attached to a layout yet.
    fn metrics(&self) -> Option<ScrollMetrics>;
    fn set_scroll_top(&self, scroll_top: f64);
}

/// System clipboard with a modern asynchronous path and a synchronous legacy
/// fallback.
#[async_trait::async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
    fn write_text_legacy(&self, text: &str) -> Result<()>;
}
