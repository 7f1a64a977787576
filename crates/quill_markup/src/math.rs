use lazy_static::lazy_static;
use quill_domain::{MathRenderer, Result};
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9-]*)[^>]*?(/?)>").unwrap();
}

/// Elements whose text is never scanned for math.
const IGNORED_TAGS: &[&str] = &["script", "noscript", "style", "textarea", "pre", "code"];

/// Wraps `$$…$$` (display) and `$…$` (inline) spans found in markup text into
/// math elements for a client-side typesetter. Text inside code, pre and
/// script-like elements is left alone, as is any already wrapped expression.
#[derive(Clone, Debug, Default)]
pub struct DelimiterMath;

impl MathRenderer for DelimiterMath {
    fn render(&self, markup: &str) -> Result<String> {
        let mut out = String::with_capacity(markup.len());
        let mut ignored_depth = 0usize;
        let mut cursor = 0;

        for caps in TAG.captures_iter(markup) {
            let Some(tag) = caps.get(0) else { continue };
            let text = &markup[cursor..tag.start()];
            if ignored_depth == 0 {
                out.push_str(&typeset(text));
            } else {
                out.push_str(text);
            }
            out.push_str(tag.as_str());
            cursor = tag.end();

            let name = caps[2].to_ascii_lowercase();
            let closing = !caps[1].is_empty();
            let self_closing = !caps[3].is_empty();
            if IGNORED_TAGS.contains(&name.as_str()) && !self_closing {
                if closing {
                    ignored_depth = ignored_depth.saturating_sub(1);
                } else {
                    ignored_depth += 1;
                }
            }
        }

        let tail = &markup[cursor..];
        if ignored_depth == 0 {
            out.push_str(&typeset(tail));
        } else {
            out.push_str(tail);
        }
        Ok(out)
    }
}

fn typeset(text: &str) -> String {
    if !text.contains('$') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + 32);
    let mut rest = text;

    while let Some(start) = rest.find('$') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        if let Some(body) = candidate.strip_prefix("$$") {
            match body.find("$$") {
                Some(end) if !body[..end].trim().is_empty() => {
                    push_math(&mut out, &body[..end], "math-display");
                    rest = &body[end + 2..];
                }
                _ => {
                    out.push_str("$$");
                    rest = body;
                }
            }
            continue;
        }

        let body = &candidate[1..];
        match body.find('$') {
            Some(end) if !body[..end].trim().is_empty() => {
                push_math(&mut out, &body[..end], "math-inline");
                rest = &body[end + 1..];
            }
            _ => {
                out.push('$');
                rest = body;
            }
        }
    }

    out.push_str(rest);
    out
}

fn push_math(out: &mut String, tex: &str, class: &str) {
    out.push_str("<span class=\"math ");
    out.push_str(class);
    out.push_str("\">");
    out.push_str(tex.trim());
    out.push_str("</span>");
}
