use std::time::Duration;

use quill_config::ScrollConfig;
use quill_domain::ScrollMetrics;
use tokio::time::Instant;

/// Timed override that keeps the viewport pinned while content streams in
/// faster than layout settles. Engages only when the reader is already near
/// the bottom; scrolling away releases it at once.
#[derive(Debug, Clone)]
pub struct BottomLock {
    duration: Duration,
    near_threshold: f64,
    until: Option<Instant>,
}

impl BottomLock {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            duration: config.bottom_lock(),
            near_threshold: config.near_bottom_threshold_px,
            until: None,
        }
    }

    /// Arms (or extends) the lock when `metrics` is within reach of the
    /// bottom. Returns whether the lock is armed.
    pub fn engage(&mut self, now: Instant, metrics: ScrollMetrics) -> bool {
        if metrics.distance_from_bottom() > self.near_threshold {
            return false;
        }
        self.until = Some(now + self.duration);
        true
    }

    /// Whether the viewport should be pinned this frame.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now < until => true,
            Some(_) => {
                self.until = None;
                false
            }
            None => false,
        }
    }

    /// A scroll the reader made. Moving away from the bottom releases the
    /// lock.
    pub fn user_scrolled(&mut self, metrics: ScrollMetrics) {
        if self.until.is_some() && metrics.distance_from_bottom() > self.near_threshold {
            tracing::debug!(scroll_top = metrics.scroll_top, "Bottom lock released by user scroll");
            self.until = None;
        }
    }

    pub fn is_engaged(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    pub fn release(&mut self) {
        self.until = None;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn metrics(scroll_top: f64) -> ScrollMetrics {
        ScrollMetrics { scroll_top, scroll_height: 1000.0, client_height: 400.0 }
    }

    #[test]
    fn test_engages_only_near_bottom() {
        let mut fixture = BottomLock::new(&ScrollConfig::default());
        let now = Instant::now();

        assert!(!fixture.engage(now, metrics(500.0)));
        assert!(fixture.engage(now, metrics(570.0)));
        assert!(fixture.is_engaged(now));
    }

    #[test]
    fn test_expires_after_duration() {
        let mut fixture = BottomLock::new(&ScrollConfig::default());
        let now = Instant::now();
        fixture.engage(now, metrics(600.0));

        assert!(fixture.tick(now + Duration::from_millis(1199)));
        assert!(!fixture.tick(now + Duration::from_millis(1200)));
        assert_eq!(fixture.is_engaged(now), false);
    }

    #[test]
    fn test_user_scroll_away_releases() {
        let mut fixture = BottomLock::new(&ScrollConfig::default());
        let now = Instant::now();
        fixture.engage(now, metrics(600.0));

        fixture.user_scrolled(metrics(590.0));
        assert!(fixture.tick(now));

        fixture.user_scrolled(metrics(100.0));
        assert!(!fixture.tick(now));
    }
}
