use std::sync::Arc;

use derive_more::derive::Display;

use crate::SourceId;

/// Identifies one rendered diagram region, shown as `diagram-N`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("diagram-{_0}")]
pub struct DiagramId(u64);

impl DiagramId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagramState {
    Pending,
    Rendered(Arc<str>),
    Failed(String),
}

/// A diagram fence upgraded into a graphic slot.
#[derive(Debug, Clone)]
pub struct DiagramInstance {
    pub id: DiagramId,
    pub source_id: SourceId,
    pub code: String,
    pub state: DiagramState,
}

impl DiagramInstance {
    pub fn new(id: DiagramId, source_id: SourceId, code: impl Into<String>) -> Self {
        Self { id, source_id, code: code.into(), state: DiagramState::Pending }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DiagramState::Pending)
    }
}
