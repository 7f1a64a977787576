use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverses the entities produced by the Markdown engine and [`escape_html`].
pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

pub fn strip_tags(markup: &str) -> String {
    TAG.replace_all(markup, "").into_owned()
}
