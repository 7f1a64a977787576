use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"</?[a-zA-Z][\s\S]*?>").unwrap();
    static ref LEADING_INDENT: Regex = Regex::new(r"^[ \t]+").unwrap();
}

const BLOCK_OPEN: &str = "<div";
const BLOCK_CLOSE: &str = "</div>";

/// A raw-markup container embedded between two Markdown fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedBlock<'a> {
    pub prefix: &'a str,
    pub block: &'a str,
    pub suffix: &'a str,
}

/// True when the whole text reads as a raw-markup fragment: it starts with
/// `<`, ends with `>` and contains at least one tag.
pub fn looks_like_html_block(text: &str) -> bool {
    let trimmed = text.trim();
    if !trimmed.starts_with('<') || !trimmed.ends_with('>') {
        return false;
    }
    TAG.is_match(trimmed)
}

/// Removes the indentation shared by every non-blank line of a raw-markup
/// fragment, so the Markdown engine does not mistake it for indented code.
/// Other text is returned unchanged.
pub fn dedent_html(text: &str) -> String {
    if !looks_like_html_block(text) {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let min_indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| LEADING_INDENT.find(line).map_or(0, |m| m.len()))
        .min()
        .unwrap_or(0);

    if min_indent == 0 {
        return text.to_string();
    }

    lines
        .iter()
        .map(|line| {
            let strip = line
                .bytes()
                .take(min_indent)
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count();
            &line[strip..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits text around a single embedded container, from the first `<div` to
/// the last `</div>`. Text holding a code fence is never split.
pub fn split_embedded_block(text: &str) -> Option<EmbeddedBlock<'_>> {
    if text.contains("```") {
        return None;
    }
    let start = text.find(BLOCK_OPEN)?;
    let end = text.rfind(BLOCK_CLOSE)?;
    if end <= start {
        return None;
    }
    let block_end = end + BLOCK_CLOSE.len();
    Some(EmbeddedBlock {
        prefix: &text[..start],
        block: &text[start..block_end],
        suffix: &text[block_end..],
    })
}
