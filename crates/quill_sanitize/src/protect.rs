use std::ops::Range;

/// Text with its code regions swapped out for placeholder tokens.
///
/// Fenced regions run from a run of three or more backticks or tildes to the
/// next identical run. Inline spans run from a backtick run to the next run of
/// at least the same length with no backtick in between. Unterminated
/// constructs are left in place unprotected.
#[derive(Clone, Debug)]
pub struct ProtectedText {
    text: String,
    blocks: Vec<String>,
}

impl ProtectedText {
    pub fn new(content: &str) -> Self {
        let mut text = String::with_capacity(content.len());
        let mut blocks = Vec::new();
        let mut cursor = 0;

        for region in code_regions(content) {
            text.push_str(&content[cursor..region.start]);
            text.push_str(&placeholder(blocks.len()));
            blocks.push(content[region.clone()].to_string());
            cursor = region.end;
        }
        text.push_str(&content[cursor..]);

        Self { text, blocks }
    }

    /// The text with placeholders in place of code regions.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Puts the original code regions back into a transformed copy of
    /// [`Self::text`].
    pub fn restore(&self, mut transformed: String) -> String {
        for (i, block) in self.blocks.iter().enumerate() {
            transformed = transformed.replacen(&placeholder(i), block, 1);
        }
        transformed
    }
}

fn placeholder(index: usize) -> String {
    format!("\x00{index}\x00")
}

fn code_regions(content: &str) -> Vec<Range<usize>> {
    let bytes = content.as_bytes();
    let mut regions = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let marker = bytes[i];
        if marker != b'`' && marker != b'~' {
            i += 1;
            continue;
        }

        let run = run_length(bytes, i, marker);
        if run >= 3 {
            let delimiter = &content[i..i + run];
            if let Some(offset) = content[i + run..].find(delimiter) {
                let end = i + run + offset + run;
                regions.push(i..end);
                i = end;
                continue;
            }
        }

        if marker == b'`'
            && let Some(end) = inline_span_end(bytes, i, run)
        {
            regions.push(i..end);
            i = end;
            continue;
        }

        i += run;
    }

    regions
}

fn run_length(bytes: &[u8], start: usize, marker: u8) -> usize {
    bytes[start..].iter().take_while(|&&b| b == marker).count()
}

fn inline_span_end(bytes: &[u8], start: usize, run: usize) -> Option<usize> {
    let body = start + run;
    let close = body + bytes[body..].iter().position(|&b| b == b'`')?;
    (run_length(bytes, close, b'`') >= run).then_some(close + run)
}
