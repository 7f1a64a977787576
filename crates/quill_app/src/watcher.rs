use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quill_domain::{ContentEvent, Error, FenceState, RawText, Result};
use quill_sanitize::open_diagram_fence;

use crate::Document;

pub fn decode_raw_text(raw: RawText) -> Result<String> {
    match raw {
        RawText::Plain(text) => Ok(text),
        RawText::Base64(encoded) => {
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| Error::InvalidPayload(e.to_string()))?;
            String::from_utf8(bytes).map_err(|e| Error::InvalidPayload(e.to_string()))
        }
    }
}

/// Stores incoming text on its source and classifies it as stream safe or
/// holding an unterminated diagram fence.
#[derive(Debug, Clone)]
pub struct MutationWatcher {
    language: String,
}

impl MutationWatcher {
    pub fn new(language: impl Into<String>) -> Self {
        Self { language: language.into() }
    }

    /// Returns `true` when the source text changed and a render pass is
    /// needed.
    pub fn observe(&self, document: &mut Document, event: ContentEvent) -> bool {
        let ContentEvent { id, raw } = event;
        let text = match decode_raw_text(raw) {
            Ok(text) => text,
            Err(error) => {
                tracing::debug!(source_id = %id, error = %error, "Ignoring undecodable payload");
                return false;
            }
        };

        let fence = if open_diagram_fence(&text, &self.language) {
            FenceState::Open
        } else {
            FenceState::Closed
        };
        let source = document.upsert(&id);
        if source.fence != fence {
            tracing::debug!(source_id = %id, ?fence, "Diagram fence state changed");
        }
        source.fence = fence;
        source.set_text(text)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quill_domain::SourceId;

    use super::*;

    #[test]
    fn test_observe_stores_text() {
        let mut document = Document::new();
        let fixture = MutationWatcher::new("mermaid");

        assert!(fixture.observe(&mut document, ContentEvent::plain("m1", "Hi")));
        assert!(!fixture.observe(&mut document, ContentEvent::plain("m1", "Hi")));

        let actual = &document.source(&SourceId::from("m1")).unwrap().raw_text;
        assert_eq!(actual, "Hi");
    }

    #[test]
    fn test_open_fence_marks_source_dirty() {
        let mut document = Document::new();
        let fixture = MutationWatcher::new("mermaid");
        let id = SourceId::from("m1");

        fixture.observe(&mut document, ContentEvent::plain("m1", "See:\n```mermaid\ngraph TD"));
        assert_eq!(document.source(&id).unwrap().fence, FenceState::Open);

        fixture.observe(&mut document, ContentEvent::plain("m1", "See:\n```mermaid\ngraph TD\n```"));
        assert_eq!(document.source(&id).unwrap().fence, FenceState::Closed);
    }

    #[test]
    fn test_base64_payload_is_decoded() {
        let mut document = Document::new();
        let fixture = MutationWatcher::new("mermaid");

        fixture.observe(&mut document, ContentEvent::base64("m1", "SGVsbG8gw6k="));

        let actual = &document.source(&SourceId::from("m1")).unwrap().raw_text;
        assert_eq!(actual, "Hello é");
    }

    #[test]
    fn test_undecodable_payload_is_ignored() {
        let mut document = Document::new();
        let fixture = MutationWatcher::new("mermaid");

        let actual = fixture.observe(&mut document, ContentEvent::base64("m1", "not base64!"));

        assert!(!actual);
        assert!(document.is_empty());
    }
}
