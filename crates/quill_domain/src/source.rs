use derive_more::derive::{Display, From};
use serde::{Deserialize, Serialize};

use crate::DiagramId;

/// Identifies one renderable region, typically a single chat message.
#[derive(Debug, Display, From, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Whether the latest text of a source leaves a diagram fence unterminated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FenceState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderStatus {
    #[default]
    Pending,
    Rendered,
    Failed,
}

/// One piece of installed output. Diagrams are slots so a finished compile
/// can update its instance without touching the surrounding markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Markup(String),
    Diagram(DiagramId),
}

/// A streaming renderable text region.
#[derive(Debug, Clone)]
pub struct ContentSource {
    pub id: SourceId,
    pub raw_text: String,
    pub last_rendered: Option<String>,
    pub fence: FenceState,
    pub status: RenderStatus,
    pub segments: Vec<Segment>,
}

impl ContentSource {
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            raw_text: String::new(),
            last_rendered: None,
            fence: FenceState::Closed,
            status: RenderStatus::Pending,
            segments: Vec::new(),
        }
    }

    /// Replaces the raw text, returning `true` when it actually changed.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.raw_text == text {
            return false;
        }
        self.raw_text = text;
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.fence == FenceState::Open
    }

    /// True when the raw text differs from what produced the installed output.
    pub fn is_stale(&self) -> bool {
        self.last_rendered.as_deref() != Some(self.raw_text.as_str())
    }

    pub fn diagram_ids(&self) -> impl Iterator<Item = DiagramId> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Diagram(id) => Some(*id),
            Segment::Markup(_) => None,
        })
    }
}
