use std::sync::Arc;

use derive_setters::Setters;
use lazy_static::lazy_static;
use quill_domain::{CodeHighlighter, Error, Result};
use regex::Regex;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::html::unescape_html;

lazy_static! {
    static ref CODE_BLOCK: Regex =
        Regex::new(r#"(?s)<pre><code([^>]*)>(.*?)</code></pre>"#).unwrap();
    static ref LANGUAGE: Regex = Regex::new(r#"class="language-([^"\s]+)""#).unwrap();
}

const HIGHLIGHTED: &str = "data-highlighted=\"true\"";

/// Loads and caches syntax highlighting resources and applies them to the
/// code blocks of rendered markup.
#[derive(Clone, Setters)]
#[setters(into)]
pub struct SyntectHighlighter {
    #[setters(skip)]
    syntax_set: Arc<SyntaxSet>,
    #[setters(skip)]
    theme_set: Arc<ThemeSet>,
    theme: String,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self {
            syntax_set: Arc::new(SyntaxSet::load_defaults_newlines()),
            theme_set: Arc::new(ThemeSet::load_defaults()),
            theme: "base16-ocean.dark".to_string(),
        }
    }
}

impl SyntectHighlighter {
    fn highlight_code(&self, code: &str, lang: &str) -> Result<String> {
        let failed = |message: String| Error::Highlight { language: lang.to_string(), message };

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());
        let theme = self
            .theme_set
            .themes
            .get(&self.theme)
            .ok_or_else(|| failed(format!("unknown theme '{}'", self.theme)))?;
        let mut hl = HighlightLines::new(syntax, theme);

        let mut html = String::with_capacity(code.len() * 4);
        for line in LinesWithEndings::from(code) {
            let ranges = hl
                .highlight_line(line, &self.syntax_set)
                .map_err(|e| failed(e.to_string()))?;
            let styled = styled_line_to_highlighted_html(&ranges[..], IncludeBackground::No)
                .map_err(|e| failed(e.to_string()))?;
            html.push_str(&styled);
        }
        Ok(html)
    }
}

impl CodeHighlighter for SyntectHighlighter {
    fn highlight(&self, markup: &str) -> Result<String> {
        let mut out = String::with_capacity(markup.len());
        let mut cursor = 0;

        for caps in CODE_BLOCK.captures_iter(markup) {
            let (Some(block), Some(attrs), Some(body)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            out.push_str(&markup[cursor..block.start()]);
            cursor = block.end();

            let attrs = attrs.as_str();
            if attrs.contains(HIGHLIGHTED) {
                out.push_str(block.as_str());
                continue;
            }

            let lang = LANGUAGE
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());
            let highlighted = self.highlight_code(&unescape_html(body.as_str()), lang)?;
            out.push_str(&format!(
                "<pre><code{attrs} {HIGHLIGHTED}>{highlighted}</code></pre>"
            ));
        }

        out.push_str(&markup[cursor..]);
        Ok(out)
    }
}
