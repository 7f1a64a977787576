use std::sync::Arc;
use std::time::Duration;

use quill_config::ScrollConfig;
use quill_domain::{ScrollSnapshot, ScrollSurface};

/// Captures the scroll position before a content swap and puts the reader
/// back afterwards.
#[derive(Clone)]
pub struct ScrollAnchor {
    surface: Arc<dyn ScrollSurface>,
    bottom_threshold: f64,
    settle_delays: Vec<Duration>,
}

impl ScrollAnchor {
    pub fn new(surface: Arc<dyn ScrollSurface>, config: &ScrollConfig) -> Self {
        Self {
            surface,
            bottom_threshold: config.bottom_threshold_px,
            settle_delays: config.settle_delays(),
        }
    }

    pub fn surface(&self) -> &Arc<dyn ScrollSurface> {
        &self.surface
    }

    pub fn snapshot(&self) -> Option<ScrollSnapshot> {
        let metrics = self.surface.metrics()?;
        Some(ScrollSnapshot {
            scroll_top: metrics.scroll_top,
            at_bottom: metrics.distance_from_bottom() < self.bottom_threshold,
        })
    }

    pub fn restore(&self, snapshot: ScrollSnapshot) {
        if snapshot.at_bottom {
            self.pin_to_bottom();
        } else {
            self.surface.set_scroll_top(snapshot.scroll_top);
        }
    }

    pub fn pin_to_bottom(&self) {
        if let Some(metrics) = self.surface.metrics() {
            self.surface.set_scroll_top(metrics.max_scroll_top());
        }
    }

    /// Pins now and again after every settle delay, so late layout growth
    /// (images, graphics) does not leave the reader above the bottom.
    pub async fn force_to_bottom(&self) {
        self.pin_to_bottom();
        for delay in &self.settle_delays {
            tokio::time::sleep(*delay).await;
            self.pin_to_bottom();
        }
    }

    /// Puts the reader back after a swap. Readers scrolled up keep their exact
    /// offset.
    pub async fn reconcile(&self, snapshot: Option<ScrollSnapshot>) {
        match snapshot {
            Some(snapshot) if snapshot.at_bottom => self.force_to_bottom().await,
            Some(snapshot) => self.restore(snapshot),
            None => tracing::debug!("Scroll surface not attached, skipping reconcile"),
        }
    }
}
