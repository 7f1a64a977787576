use derive_setters::Setters;
use pulldown_cmark::{Event, Options, Parser, html};
use quill_domain::{MarkdownEngine, Result};

/// CommonMark with the GitHub extensions chat content relies on.
#[derive(Clone, Debug, Setters)]
#[setters(into)]
pub struct CmarkEngine {
    /// Render single newlines as line breaks, as chat users expect.
    breaks: bool,
    tables: bool,
}

impl Default for CmarkEngine {
    fn default() -> Self {
        Self { breaks: true, tables: true }
    }
}

impl CmarkEngine {
    fn options(&self) -> Options {
        let mut options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
        if self.tables {
            options |= Options::ENABLE_TABLES;
        }
        options
    }
}

impl MarkdownEngine for CmarkEngine {
    fn render(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let parser = Parser::new_ext(text, self.options()).map(|event| match event {
            Event::SoftBreak if self.breaks => Event::HardBreak,
            event => event,
        });

        let mut markup = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut markup, parser);
        Ok(markup)
    }
}
