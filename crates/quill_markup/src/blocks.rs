use lazy_static::lazy_static;
use regex::Regex;

use crate::html::{strip_tags, unescape_html};

lazy_static! {
    static ref BARE_BLOCK: Regex = Regex::new(r"(?s)<pre>(<code[^>]*>.*?</code>)</pre>").unwrap();
    static ref COPY_BLOCK: Regex = Regex::new(
        r#"(?s)<pre[^>]*><code[^>]*>(.*?)</code>(?:<button[^>]*data-copy-block="(\d+)"[^>]*></button>)?"#
    )
    .unwrap();
}

/// A run of rendered markup, or one language block lifted out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Markup(&'a str),
    /// `code` is plain text; `markup` is the block as it was rendered.
    Code { code: String, markup: &'a str },
}

/// Splits markup around every code block tagged with `language`. The code is
/// returned as plain text, with highlighting spans and entities removed.
pub fn split_language_blocks<'a>(markup: &'a str, language: &str) -> Vec<Piece<'a>> {
    let pattern = format!(
        r#"(?s)<pre[^>]*><code class="language-{}"[^>]*>(.*?)</code>(?:<button[^>]*></button>)?</pre>"#,
        regex::escape(language)
    );
    let Ok(block) = Regex::new(&pattern) else {
        return vec![Piece::Markup(markup)];
    };

    let mut pieces = Vec::new();
    let mut cursor = 0;
    for caps in block.captures_iter(markup) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            pieces.push(Piece::Markup(&markup[cursor..whole.start()]));
        }
        pieces.push(Piece::Code {
            code: unescape_html(&strip_tags(body.as_str())),
            markup: whole.as_str(),
        });
        cursor = whole.end();
    }
    if cursor < markup.len() || pieces.is_empty() {
        pieces.push(Piece::Markup(&markup[cursor..]));
    }
    pieces
}

/// Adds a copy affordance to every code block that does not carry one yet.
/// Buttons are numbered in document order so [`code_blocks`] can resolve them.
pub fn add_copy_buttons(markup: &str) -> String {
    let mut index = markup.matches("data-copy-block=").count();
    BARE_BLOCK
        .replace_all(markup, |caps: &regex::Captures| {
            let button = format!(
                r#"<button type="button" class="code-copy-btn" aria-label="Copy code" title="Copy code" data-copy-block="{index}"></button>"#
            );
            index += 1;
            format!(r#"<pre class="codeblock">{}{button}</pre>"#, &caps[1])
        })
        .into_owned()
}

/// Plain text of the code block whose copy button carries `index`. Buttons
/// keep their numbers when blocks around them are lifted out.
pub fn copy_block(markup: &str, index: usize) -> Option<String> {
    let number = index.to_string();
    COPY_BLOCK
        .captures_iter(markup)
        .find(|caps| caps.get(2).is_some_and(|found| found.as_str() == number))
        .map(|caps| unescape_html(&strip_tags(&caps[1])))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_language_blocks() {
        let fixture = "<p>Before</p>\n<pre><code class=\"language-mermaid\">graph TD\nA--&gt;B\n</code></pre>\n<p>After</p>\n";

        let actual = split_language_blocks(fixture, "mermaid");
        let expected = vec![
            Piece::Markup("<p>Before</p>\n"),
            Piece::Code {
                code: "graph TD\nA-->B\n".to_string(),
                markup: "<pre><code class=\"language-mermaid\">graph TD\nA--&gt;B\n</code></pre>",
            },
            Piece::Markup("\n<p>After</p>\n"),
        ];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_split_highlighted_block_with_button() {
        let fixture = "<pre class=\"codeblock\"><code class=\"language-mermaid\" data-highlighted=\"true\"><span style=\"color:#c0c5ce;\">graph LR\n</span></code><button type=\"button\" class=\"code-copy-btn\"></button></pre>";

        let actual = split_language_blocks(fixture, "mermaid");
        let expected = vec![Piece::Code { code: "graph LR\n".to_string(), markup: fixture }];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_split_ignores_other_languages() {
        let fixture = "<pre><code class=\"language-js\">x</code></pre>";

        let actual = split_language_blocks(fixture, "mermaid");
        let expected = vec![Piece::Markup(fixture)];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_add_copy_buttons() {
        let fixture = "<pre><code>a\n</code></pre><p>x</p><pre><code class=\"language-js\">b\n</code></pre>";

        let actual = add_copy_buttons(fixture);
        let expected = "<pre class=\"codeblock\"><code>a\n</code><button type=\"button\" class=\"code-copy-btn\" aria-label=\"Copy code\" title=\"Copy code\" data-copy-block=\"0\"></button></pre><p>x</p><pre class=\"codeblock\"><code class=\"language-js\">b\n</code><button type=\"button\" class=\"code-copy-btn\" aria-label=\"Copy code\" title=\"Copy code\" data-copy-block=\"1\"></button></pre>";

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_add_copy_buttons_is_idempotent() {
        let fixture = "<pre><code>a\n</code></pre>";

        let once = add_copy_buttons(fixture);
        let twice = add_copy_buttons(&once);

        assert_eq!(twice, once);
    }

    #[test]
    fn test_copy_block() {
        let fixture = add_copy_buttons(
            "<pre><code>if a &lt; b {}\n</code></pre><pre><code class=\"language-sh\"><span>ls</span>\n</code></pre>",
        );

        assert_eq!(copy_block(&fixture, 0), Some("if a < b {}\n".to_string()));
        assert_eq!(copy_block(&fixture, 1), Some("ls\n".to_string()));
        assert_eq!(copy_block(&fixture, 2), None);
    }

    #[test]
    fn test_copy_block_survives_lifted_blocks() {
        let markup = add_copy_buttons(
            "<pre><code class=\"language-mermaid\">graph TD\n</code></pre>\n<pre><code class=\"language-js\">let a = 1;\n</code></pre>",
        );
        let fixture: String = split_language_blocks(&markup, "mermaid")
            .into_iter()
            .filter_map(|piece| match piece {
                Piece::Markup(markup) => Some(markup),
                Piece::Code { .. } => None,
            })
            .collect();

        assert_eq!(copy_block(&fixture, 0), None);
        assert_eq!(copy_block(&fixture, 1), Some("let a = 1;\n".to_string()));
    }
}
