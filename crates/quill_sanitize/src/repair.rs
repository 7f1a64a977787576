//! Repair fences that a streaming model glued onto neighbouring text.
//!
//! Models often emit `Hello ```js` or `}```` instead of putting the fence on a
//! line of its own, which the Markdown engine then reads as inline code.

/// Moves fences that share a line with prose or code onto their own lines.
///
/// Handles:
/// - Trailing opening fences: `Hello ```js` becomes `Hello` + ```` ```js ````
///   (only outside a code block)
/// - Embedded closing fences: `}```` becomes `}` + ```` ``` ```` (only inside a
///   code block)
pub fn repair_fences(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut open: Option<Fence> = None;

    for line in text.split('\n') {
        match open {
            None => {
                if let Some(fence) = Fence::parse(line) {
                    open = Some(fence);
                    lines.push(line);
                } else if let Some((prose, fence_line, fence)) = split_trailing_fence(line) {
                    open = Some(fence);
                    lines.push(prose);
                    lines.push(fence_line);
                } else {
                    lines.push(line);
                }
            }
            Some(fence) => {
                if fence.is_closed_by(line) {
                    open = None;
                    lines.push(line);
                } else if let Some((code, closing)) = split_embedded_fence(line, fence) {
                    open = None;
                    lines.push(code);
                    lines.push(closing);
                } else {
                    lines.push(line);
                }
            }
        }
    }

    lines.join("\n")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    /// Detects a fence line (with or without indentation and info string).
    fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    fn is_closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let len = trimmed.chars().take_while(|c| *c == self.marker).count();
        len >= self.len && trimmed.len() == len
    }

    fn token(&self) -> &'static str {
        if self.marker == '`' { "```" } else { "~~~" }
    }
}

/// Splits `Hello ```js` into `Hello` and ```` ```js ````. The info string must
/// be attached to the fence and nothing else may follow it.
fn split_trailing_fence(line: &str) -> Option<(&str, &str, Fence)> {
    let start = match (line.find("```"), line.find("~~~")) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => return None,
    };
    let prose = line[..start].trim_end();
    if prose.trim().is_empty() {
        return None;
    }

    let fence_line = &line[start..];
    let fence = Fence::parse(fence_line)?;
    let info = fence_line[fence.len..].trim_end();
    let attached = info
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '.' | '#'));
    attached.then_some((prose, fence_line.trim_end(), fence))
}

/// Splits a line ending in the open fence's closing token.
/// e.g., `}``` ` becomes Some((`}`, ```` ``` ````))
fn split_embedded_fence(line: &str, fence: Fence) -> Option<(&str, &'static str)> {
    let trimmed = line.trim_end();
    let token = fence.token();

    if let Some(stripped) = trimmed.strip_suffix(token)
        && !stripped.trim().is_empty()
    {
        return Some((stripped, token));
    }

    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_normal_text_unchanged() {
        let fixture = "hello world\nsecond line";
        assert_eq!(repair_fences(fixture), fixture);
    }

    #[test]
    fn test_valid_fences_unchanged() {
        let fixture = "```rust\nfn main() {}\n```";
        assert_eq!(repair_fences(fixture), fixture);

        let fixture = "   ```\ncode\n   ```";
        assert_eq!(repair_fences(fixture), fixture);
    }

    #[test]
    fn test_embedded_fence_not_split_outside_code_block() {
        assert_eq!(repair_fences("}```"), "}```");
        assert_eq!(repair_fences("return x;```"), "return x;```");
    }

    #[test]
    fn test_embedded_backtick_fence_split_in_code_block() {
        assert_eq!(repair_fences("```\n}```"), "```\n}\n```");
        assert_eq!(repair_fences("```\n     }```"), "```\n     }\n```");
        assert_eq!(
            repair_fences("```js\nreturn x;```\nafter"),
            "```js\nreturn x;\n```\nafter"
        );
    }

    #[test]
    fn test_embedded_tilde_fence_split_in_code_block() {
        assert_eq!(repair_fences("~~~\n}~~~"), "~~~\n}\n~~~");
    }

    #[test]
    fn test_backtick_token_does_not_close_tilde_block() {
        let fixture = "~~~\nx```\n~~~";
        assert_eq!(repair_fences(fixture), fixture);
    }

    #[test]
    fn test_whitespace_only_before_fence_unchanged() {
        assert_eq!(repair_fences("```\n   ```"), "```\n   ```");
        assert_eq!(repair_fences("```\n\t```"), "```\n\t```");
    }

    #[test]
    fn test_trailing_opening_fence_moved_to_own_line() {
        let fixture = "Hello ```js\nconst x=1```";

        let actual = repair_fences(fixture);
        let expected = "Hello\n```js\nconst x=1\n```";

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_inline_code_with_fence_tokens_unchanged() {
        let fixture = "Use ```code``` inline";
        assert_eq!(repair_fences(fixture), fixture);

        let fixture = "Type ``` to start";
        assert_eq!(repair_fences(fixture), fixture);
    }

    #[test]
    fn test_fence_with_info_string_inside_block_is_content() {
        let fixture = "````md\n```js\nx\n```\n````";
        assert_eq!(repair_fences(fixture), fixture);
    }
}
