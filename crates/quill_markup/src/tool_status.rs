use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::html::strip_tags;

lazy_static! {
    static ref UPDATE: Regex =
        Regex::new(r#"(?s)<div class="tool-status-update" data-target-id="([^"]+)">(.*?)</div>"#).unwrap();
    static ref ELEMENT: Regex = Regex::new(r#"(?s)<div\b[^>]*?\sid="([^"]+)"[^>]*>.*?</div>"#).unwrap();
}

pub const DONE_LABEL: &str = "Completed";

/// A completion marker naming the running tool status it finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatusUpdate {
    pub target_id: String,
    /// Escaped label text shown once the tool is done.
    pub label: String,
}

/// Removes every completion marker from `markup`, returning the remaining
/// markup and the markers in document order.
pub fn take_status_updates(markup: &str) -> (String, Vec<ToolStatusUpdate>) {
    let mut updates = Vec::new();
    let remaining = UPDATE.replace_all(markup, |caps: &Captures| {
        let label = strip_tags(&caps[2]).trim().to_string();
        updates.push(ToolStatusUpdate {
            target_id: caps[1].to_string(),
            label: if label.is_empty() { DONE_LABEL.to_string() } else { label },
        });
        ""
    });
    (remaining.into_owned(), updates)
}

/// Whether `markup` holds an element with the given id.
pub fn has_element(markup: &str, id: &str) -> bool {
    markup.contains(&format!(r#" id="{id}""#))
}

/// Swaps every element whose id `done` knows for a finished status carrying
/// the returned label.
pub fn mark_done<'a>(markup: &'a str, done: impl Fn(&str) -> Option<String>) -> Cow<'a, str> {
    ELEMENT.replace_all(markup, |caps: &Captures| match done(&caps[1]) {
        Some(label) => format!(r#"<div class="tool-status tool-status--done">{label}</div>"#),
        None => caps[0].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_take_status_updates() {
        let fixture = "<p>a</p>\n<div class=\"tool-status-update\" data-target-id=\"tool-status-1\">Looked up &amp; found</div><br />\n<div class=\"tool-status-update\" data-target-id=\"tool-status-2\"></div>";

        let (actual, updates) = take_status_updates(fixture);
        let expected = vec![
            ToolStatusUpdate {
                target_id: "tool-status-1".to_string(),
                label: "Looked up &amp; found".to_string(),
            },
            ToolStatusUpdate { target_id: "tool-status-2".to_string(), label: "Completed".to_string() },
        ];

        assert_eq!(actual, "<p>a</p>\n<br />\n");
        assert_eq!(updates, expected);
    }

    #[test]
    fn test_has_element() {
        let fixture = "<div id=\"tool-status-1\" class=\"tool-status tool-status--running\">Search</div>";

        assert!(has_element(fixture, "tool-status-1"));
        assert!(!has_element(fixture, "tool-status-2"));
        assert!(!has_element("<div data-target-id=\"tool-status-1\"></div>", "tool-status-1"));
    }

    #[test]
    fn test_mark_done_replaces_known_targets_only() {
        let fixture = "<div id=\"tool-status-1\" class=\"tool-status tool-status--running\">Search</div><br /><div id=\"other\">x</div>";

        let actual = mark_done(fixture, |id| (id == "tool-status-1").then(|| "Searched".to_string()));
        let expected = "<div class=\"tool-status tool-status--done\">Searched</div><br /><div id=\"other\">x</div>";

        assert_eq!(actual, expected);
    }
}
