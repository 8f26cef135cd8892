//! Viewer configuration.

use serde::{Deserialize, Serialize};

/// Durable key under which the region memory is stored.
pub const REGION_MEMORY_KEY: &str = "region_memory";

/// Tunables for the viewport and region capture engine.
///
/// Every field has a default, so a partial config file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Smallest allowed scale.
    pub min_scale: f64,
    /// Largest allowed scale. Also caps fit-to-container.
    pub max_scale: f64,
    /// Factor applied by one zoom in / zoom out step.
    pub zoom_step: f64,
    /// Fraction of the container a fitted page may occupy.
    pub fit_margin: f64,
    /// Drags narrower or shorter than this (container pixels) are discarded.
    pub min_selection_size: f64,
    /// Number of snapshots kept in the region memory.
    pub memory_capacity: usize,
    /// Number of snapshots surfaced by `RegionMemory::list`.
    pub memory_preview: usize,
    /// Storage key for the region memory.
    pub memory_key: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.25,
            max_scale: 3.0,
            zoom_step: 1.2,
            fit_margin: 0.9,
            min_selection_size: 10.0,
            memory_capacity: 10,
            memory_preview: 3,
            memory_key: REGION_MEMORY_KEY.to_string(),
        }
    }
}

impl ViewerConfig {
    /// Clamp a scale into the configured bounds.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.min_scale;
        }
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Repair values that would break the engine's invariants.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            log::warn!("Invalid min_scale {}, using {}", self.min_scale, defaults.min_scale);
            self.min_scale = defaults.min_scale;
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            log::warn!("Invalid max_scale {}, using {}", self.max_scale, defaults.max_scale.max(self.min_scale));
            self.max_scale = defaults.max_scale.max(self.min_scale);
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            log::warn!("Invalid zoom_step {}, using {}", self.zoom_step, defaults.zoom_step);
            self.zoom_step = defaults.zoom_step;
        }
        if !(self.fit_margin > 0.0 && self.fit_margin <= 1.0) {
            log::warn!("Invalid fit_margin {}, using {}", self.fit_margin, defaults.fit_margin);
            self.fit_margin = defaults.fit_margin;
        }
        if self.memory_capacity == 0 {
            log::warn!("memory_capacity must be positive, using {}", defaults.memory_capacity);
            self.memory_capacity = defaults.memory_capacity;
        }
        if self.memory_key.is_empty() {
            self.memory_key = defaults.memory_key;
        }
        self
    }
}
