use std::time::Duration;

use derive_setters::Setters;
use quill_domain::Size;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Top-level settings for the render pipeline.
#[derive(Debug, Clone, PartialEq, Setters, Serialize, Deserialize)]
#[setters(into)]
#[serde(default)]
pub struct RenderConfig {
    /// Interval between frame ticks. Render passes coalesce per frame.
    pub frame_interval_ms: u64,
    pub scroll: ScrollConfig,
    pub diagram: DiagramConfig,
    pub viewport: ViewportConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            scroll: ScrollConfig::default(),
            diagram: DiagramConfig::default(),
            viewport: ViewportConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "frame_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.diagram.language.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "diagram.language",
                message: "must not be empty".to_string(),
            });
        }
        if self.diagram.cache_capacity == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "diagram.cache_capacity",
                message: "must be greater than zero when set".to_string(),
            });
        }
        self.viewport.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Setters, Serialize, Deserialize)]
#[setters(into)]
#[serde(default)]
pub struct ScrollConfig {
    /// Distance from the bottom under which a snapshot counts as pinned.
    pub bottom_threshold_px: f64,
    /// Distance from the bottom under which the bottom lock may engage.
    pub near_bottom_threshold_px: f64,
    pub bottom_lock_ms: u64,
    /// Extra pins applied after a forced scroll, to absorb late layout growth.
    pub settle_delays_ms: Vec<u64>,
    pub debug_log_capacity: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            bottom_threshold_px: 24.0,
            near_bottom_threshold_px: 32.0,
            bottom_lock_ms: 1200,
            settle_delays_ms: vec![0, 50, 150],
            debug_log_capacity: 300,
        }
    }
}

impl ScrollConfig {
    pub fn bottom_lock(&self) -> Duration {
        Duration::from_millis(self.bottom_lock_ms)
    }

    pub fn settle_delays(&self) -> Vec<Duration> {
        self.settle_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Setters, Serialize, Deserialize)]
#[setters(into)]
#[serde(default)]
pub struct DiagramConfig {
    /// Fence language that marks a diagram block.
    pub language: String,
    pub debounce_ms: u64,
    /// Maximum number of compiled graphics kept. `None` keeps everything.
    pub cache_capacity: Option<usize>,
    /// Container size assumed for the initial fit until the host reports one.
    pub default_container: Size,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            language: "mermaid".to_string(),
            debounce_ms: 250,
            cache_capacity: Some(256),
            default_container: Size::new(800.0, 480.0),
        }
    }
}

impl DiagramConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Setters, Serialize, Deserialize)]
#[setters(into)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub fit_padding_px: f64,
    /// Factor applied by the zoom-in button; zoom-out uses `2 - zoom_step`.
    pub zoom_step: f64,
    /// Scale change per wheel notch.
    pub wheel_intensity: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 12.0,
            fit_padding_px: 16.0,
            zoom_step: 1.1,
            wheel_intensity: 0.01,
        }
    }
}

impl ViewportConfig {
    fn validate(&self) -> Result<()> {
        if self.min_scale <= 0.0 || self.min_scale > self.max_scale {
            return Err(ConfigError::InvalidValue {
                key: "viewport.min_scale",
                message: format!(
                    "must be positive and not above max_scale ({})",
                    self.max_scale
                ),
            });
        }
        if !(1.0..2.0).contains(&self.zoom_step) {
            return Err(ConfigError::InvalidValue {
                key: "viewport.zoom_step",
                message: "must be in [1.0, 2.0)".to_string(),
            });
        }
        Ok(())
    }
}
