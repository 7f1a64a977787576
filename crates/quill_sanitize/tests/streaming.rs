use pretty_assertions::assert_eq;
use quill_sanitize::{open_diagram_fence, repair_fences, sanitize, split_embedded_block};

/// Replays a diagram arriving a few characters at a time.
#[test]
fn test_diagram_fence_opens_then_closes() {
    let full = "Here:\n```mermaid\ngraph TD; A-->B\n```\nDone";
    let open_at = full.find("```mermaid").unwrap() + "```mermaid".len();
    let close_at = full.rfind("```").unwrap() + 3;

    for end in 0..=full.len() {
        let Some(prefix) = full.get(..end) else { continue };
        let actual = open_diagram_fence(prefix, "mermaid");
        let expected = end >= open_at && end < close_at;
        assert_eq!(actual, expected, "prefix: {prefix:?}");
    }
}

#[test]
fn test_repaired_stream_keeps_code_verbatim() {
    let fixture = "Cost \\$3 ```sh\necho \\$HOME```";

    let actual = sanitize(&repair_fences(fixture));
    let expected = "Cost @@QUILL_DOLLAR@@3\n```sh\necho \\$HOME\n```";

    assert_eq!(actual, expected);
}

#[test]
fn test_split_embedded_block_keeps_all_text() {
    let fixture = "# Title\n<div id=\"x\">\n<div>inner</div>\n</div>\ntail";

    let actual = split_embedded_block(fixture).unwrap();

    assert_eq!(
        format!("{}{}{}", actual.prefix, actual.block, actual.suffix),
        fixture
    );
    assert_eq!(actual.block, "<div id=\"x\">\n<div>inner</div>\n</div>");
}
