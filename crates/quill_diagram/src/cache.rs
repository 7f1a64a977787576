use std::sync::Arc;

use indexmap::IndexMap;

/// Compiled graphics keyed by the exact diagram source, least recently used
/// first.
#[derive(Debug, Clone, Default)]
pub struct DiagramCache {
    entries: IndexMap<String, Arc<str>>,
    capacity: Option<usize>,
}

impl DiagramCache {
    /// `None` keeps every entry.
    pub fn new(capacity: Option<usize>) -> Self {
        Self { entries: IndexMap::new(), capacity }
    }

    pub fn get(&mut self, code: &str) -> Option<Arc<str>> {
        let index = self.entries.get_index_of(code)?;
        let graphic = self.touch(index).clone();
        Some(graphic)
    }

    pub fn insert(&mut self, code: impl Into<String>, graphic: Arc<str>) {
        let (index, _) = self.entries.insert_full(code.into(), graphic);
        self.touch(index);
        if let Some(capacity) = self.capacity {
            while self.entries.len() > capacity {
                self.entries.shift_remove_index(0);
            }
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn touch(&mut self, index: usize) -> &Arc<str> {
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        &self.entries[last]
    }
}
