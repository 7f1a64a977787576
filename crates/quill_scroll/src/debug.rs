use std::collections::VecDeque;

use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollEventKind {
    Scroll,
    BeforeSwap,
    AfterSwap,
    WsBeforeMessage,
    WsAfterMessage,
    #[serde(rename = "focusin")]
    FocusIn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollDebugEntry {
    /// Milliseconds since the Unix epoch.
    pub t: i64,
    #[serde(rename = "type")]
    pub kind: ScrollEventKind,
    pub scroll_top: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

/// Bounded history of scroll-related events for diagnosing jumps.
#[derive(Debug, Clone)]
pub struct ScrollDebugLog {
    capacity: usize,
    entries: VecDeque<ScrollDebugEntry>,
    last_scroll_top: Option<f64>,
}

impl ScrollDebugLog {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, entries: VecDeque::with_capacity(capacity), last_scroll_top: None }
    }

    pub fn record(&mut self, kind: ScrollEventKind, scroll_top: f64, target_id: Option<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(ScrollDebugEntry {
            t: Utc::now().timestamp_millis(),
            kind,
            scroll_top,
            target_id,
        });
    }

    /// Records a scroll only when the offset actually moved.
    pub fn record_scroll(&mut self, scroll_top: f64) {
        if self.last_scroll_top == Some(scroll_top) {
            return;
        }
        self.last_scroll_top = Some(scroll_top);
        self.record(ScrollEventKind::Scroll, scroll_top, None);
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScrollDebugEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dump(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}
