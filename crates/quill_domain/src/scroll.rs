/// Geometry of a scrolling region at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    pub fn distance_from_bottom(&self) -> f64 {
        self.max_scroll_top() - self.scroll_top
    }
}

/// Scroll position captured right before a content swap. Used once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSnapshot {
    pub scroll_top: f64,
    pub at_bottom: bool,
}
