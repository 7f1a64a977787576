/// Returns `true` when the last `` ```<language> `` start token in `text` has
/// no `` ``` `` end token after it, i.e. the diagram is still streaming in.
pub fn open_diagram_fence(text: &str, language: &str) -> bool {
    let start_token = format!("```{language}");
    let Some(open) = text.rfind(&start_token) else {
        return false;
    };
    !text[open + 3..].contains("```")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_diagram_is_closed() {
        assert!(!open_diagram_fence("", "mermaid"));
        assert!(!open_diagram_fence("plain ```js\ncode", "mermaid"));
    }

    #[test]
    fn test_unterminated_diagram_is_open() {
        assert!(open_diagram_fence("```mermaid\ngraph TD; A-->B", "mermaid"));
        assert!(open_diagram_fence("```mermaid", "mermaid"));
    }

    #[test]
    fn test_terminated_diagram_is_closed() {
        assert!(!open_diagram_fence(
            "```mermaid\ngraph TD; A-->B\n```",
            "mermaid"
        ));
    }

    #[test]
    fn test_only_last_diagram_matters() {
        let fixture = "```mermaid\na\n```\ntext\n```mermaid\nb";
        assert!(open_diagram_fence(fixture, "mermaid"));

        let fixture = "```mermaid\na\n```\ntext\n```mermaid\nb\n```";
        assert!(!open_diagram_fence(fixture, "mermaid"));
    }

    #[test]
    fn test_partial_closing_fence_is_open() {
        assert!(open_diagram_fence("```mermaid\nA-->B\n``", "mermaid"));
    }
}
