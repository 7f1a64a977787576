use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::ProtectedText;

/// Stands in for an escaped `$` until math rendering has scanned the markup.
pub const DOLLAR_PLACEHOLDER: &str = "@@QUILL_DOLLAR@@";

lazy_static! {
    static ref ESCAPED_DOLLAR: Regex = Regex::new(r"(\\+)\$").unwrap();
}

/// Makes text safe for the Markdown engine and the math renderer.
///
/// Outside code regions every run of backslashes directly before a `$` loses
/// one backslash and the `$` becomes [`DOLLAR_PLACEHOLDER`]. Code regions are
/// returned verbatim.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let protected = ProtectedText::new(text);
    let escaped = ESCAPED_DOLLAR.replace_all(protected.text(), |caps: &Captures| {
        format!("{}{}", &caps[1][1..], DOLLAR_PLACEHOLDER)
    });
    protected.restore(escaped.into_owned())
}

/// Turns placeholders back into literal `$`. Must run after math rendering.
pub fn restore_math_delimiters(markup: &str) -> String {
    markup.replace(DOLLAR_PLACEHOLDER, "$")
}
