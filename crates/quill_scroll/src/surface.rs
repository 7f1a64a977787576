use std::sync::{Mutex, MutexGuard};

use quill_domain::{ScrollMetrics, ScrollSurface};

#[derive(Debug)]
struct State {
    metrics: ScrollMetrics,
    attached: bool,
}

/// Scroll surface kept in memory, for headless hosts and tests. Offsets are
/// clamped to the scrollable range like a browser viewport.
#[derive(Debug)]
pub struct MemorySurface {
    state: Mutex<State>,
}

impl MemorySurface {
    pub fn new(scroll_height: f64, client_height: f64) -> Self {
        let metrics = ScrollMetrics { scroll_top: 0.0, scroll_height, client_height };
        Self { state: Mutex::new(State { metrics, attached: true }) }
    }

    /// A surface that is not laid out yet and reports no metrics.
    pub fn detached() -> Self {
        let surface = Self::new(0.0, 0.0);
        surface.lock().attached = false;
        surface
    }

    pub fn attach(&self) {
        self.lock().attached = true;
    }

    /// Content grew or shrank. The offset is clamped to the new range.
    pub fn set_content_height(&self, scroll_height: f64) {
        let mut state = self.lock();
        state.metrics.scroll_height = scroll_height;
        let max = state.metrics.max_scroll_top();
        state.metrics.scroll_top = state.metrics.scroll_top.min(max);
    }

    pub fn grow(&self, by: f64) {
        let height = self.lock().metrics.scroll_height;
        self.set_content_height(height + by);
    }

    pub fn scroll_top(&self) -> f64 {
        self.lock().metrics.scroll_top
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ScrollSurface for MemorySurface {
    fn metrics(&self) -> Option<ScrollMetrics> {
        let state = self.lock();
        state.attached.then_some(state.metrics)
    }

    fn set_scroll_top(&self, scroll_top: f64) {
        let mut state = self.lock();
        let max = state.metrics.max_scroll_top();
        state.metrics.scroll_top = scroll_top.clamp(0.0, max);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_offset_is_clamped() {
        let fixture = MemorySurface::new(1000.0, 400.0);

        fixture.set_scroll_top(5000.0);
        assert_eq!(fixture.scroll_top(), 600.0);

        fixture.set_scroll_top(-3.0);
        assert_eq!(fixture.scroll_top(), 0.0);
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let fixture = MemorySurface::new(1000.0, 400.0);
        fixture.set_scroll_top(600.0);

        fixture.set_content_height(500.0);

        assert_eq!(fixture.scroll_top(), 100.0);
    }

    #[test]
    fn test_detached_surface_has_no_metrics() {
        let fixture = MemorySurface::detached();

        assert_eq!(fixture.metrics(), None);
        fixture.attach();
        assert!(fixture.metrics().is_some());
    }
}
