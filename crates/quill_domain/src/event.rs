use serde::{Deserialize, Serialize};

use crate::SourceId;

/// Cumulative raw text of a region, as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawText {
    #[serde(rename = "text")]
    Plain(String),
    #[serde(rename = "text_b64")]
    Base64(String),
}

/// A region received new text. Carries the whole text, never a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEvent {
    pub id: SourceId,
    #[serde(flatten)]
    pub raw: RawText,
}

impl ContentEvent {
    pub fn plain(id: impl Into<SourceId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), raw: RawText::Plain(text.into()) }
    }

    pub fn base64(id: impl Into<SourceId>, encoded: impl Into<String>) -> Self {
        Self { id: id.into(), raw: RawText::Base64(encoded.into()) }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_deserialize_plain_event() {
        let fixture = r#"{"id":"m1","text":"Hello"}"#;

        let actual: ContentEvent = serde_json::from_str(fixture).unwrap();
        let expected = ContentEvent::plain("m1", "Hello");

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_deserialize_encoded_event() {
        let fixture = r#"{"id":"m2","text_b64":"SGk="}"#;

        let actual: ContentEvent = serde_json::from_str(fixture).unwrap();
        let expected = ContentEvent::base64("m2", "SGk=");

        assert_eq!(actual, expected);
    }
}
