//! Interaction configuration.
//!
//! All tunable constants (grid size, zoom range, swipe thresholds, animation
//! timings) live in one immutable struct that is handed to each component at
//! construction time. Tests override individual values, e.g. zero-duration
//! animations, without touching any global state.

use crate::geometry::GRID_SIZE;
use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid grid size: {0}")]
    InvalidGridSize(f64),
    #[error("Invalid zoom range: min {min} > max {max}")]
    InvalidZoomRange { min: f64, max: f64 },
    #[error("Invalid viewport: {0}x{1}")]
    InvalidViewport(f64, f64),
    #[error("Swipe threshold fraction out of range: {0}")]
    InvalidSwipeThreshold(f64),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Physical parameters of a damped spring animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub damping: f64,
    pub stiffness: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
}

fn default_mass() -> f64 {
    1.0
}

impl SpringConfig {
    /// Soft settle used for card resets and node repositioning.
    pub const GENTLE: Self = Self {
        damping: 15.0,
        stiffness: 100.0,
        mass: 1.0,
    };
    /// Springy overshoot.
    pub const BOUNCY: Self = Self {
        damping: 10.0,
        stiffness: 150.0,
        mass: 1.0,
    };
    /// Fast settle used by list cards that snap back.
    pub const RESPONSIVE: Self = Self {
        damping: 20.0,
        stiffness: 300.0,
        mass: 1.0,
    };
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::GENTLE
    }
}

/// A fixed-duration tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub duration_ms: u64,
}

impl TimingConfig {
    pub const QUICK: Self = Self { duration_ms: 200 };
    pub const NORMAL: Self = Self { duration_ms: 300 };
    pub const SLOW: Self = Self { duration_ms: 500 };

    /// Duration as a `Duration`.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Every constant the interaction engine depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Grid cell size for snapping node positions.
    pub grid_size: f64,
    /// Whether released nodes snap to the grid.
    pub snap_to_grid: bool,
    /// Zoom level at mount.
    pub initial_zoom: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Increment applied by the zoom in/out buttons.
    pub zoom_step: f64,
    /// Fraction of the viewport width a card must travel to commit.
    pub swipe_threshold_fraction: f64,
    /// Release velocity (px/s) that commits regardless of distance.
    pub velocity_threshold: f64,
    /// Degrees of card tilt at a full-viewport horizontal swipe.
    pub rotation_factor: f64,
    /// Visible screen area.
    pub viewport: Size,
    /// Size of a board node card; connection anchors sit at its center.
    pub node_size: Size,
    /// Off-screen slide after a swipe commit.
    pub commit_timing: TimingConfig,
    /// Card flip rotation.
    pub flip_timing: TimingConfig,
    /// Spring-back after an uncommitted review swipe.
    pub reset_spring: SpringConfig,
    /// Spring-back after an uncommitted list-card swipe.
    pub list_reset_spring: SpringConfig,
    /// Spring used when a node is moved programmatically or snapped.
    pub reposition_spring: SpringConfig,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            snap_to_grid: false,
            initial_zoom: 1.0,
            zoom_min: 0.5,
            zoom_max: 2.0,
            zoom_step: 0.1,
            swipe_threshold_fraction: 0.3,
            velocity_threshold: 500.0,
            rotation_factor: 7.0,
            viewport: Size::new(390.0, 844.0),
            node_size: Size::new(200.0, 100.0),
            commit_timing: TimingConfig::NORMAL,
            flip_timing: TimingConfig::NORMAL,
            reset_spring: SpringConfig::GENTLE,
            list_reset_spring: SpringConfig::RESPONSIVE,
            reposition_spring: SpringConfig::GENTLE,
        }
    }
}

impl InteractionConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zoom limits used by the document viewer.
    pub fn document_viewer() -> Self {
        Self {
            zoom_min: 0.8,
            zoom_max: 1.5,
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that the values describe a usable configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        if !(self.zoom_min > 0.0 && self.zoom_min <= self.zoom_max) {
            return Err(ConfigError::InvalidZoomRange {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }
        if !(self.viewport.width > 0.0 && self.viewport.height > 0.0) {
            return Err(ConfigError::InvalidViewport(
                self.viewport.width,
                self.viewport.height,
            ));
        }
        if !(self.swipe_threshold_fraction > 0.0 && self.swipe_threshold_fraction <= 1.0) {
            return Err(ConfigError::InvalidSwipeThreshold(self.swipe_threshold_fraction));
        }
        Ok(())
    }

    /// Distance (px) a swipe must travel to commit.
    pub fn swipe_threshold(&self) -> f64 {
        self.viewport.width * self.swipe_threshold_fraction
    }

    /// Offset from a node's top-left corner to its connection anchor.
    pub fn anchor_offset(&self) -> Vec2 {
        Vec2::new(self.node_size.width / 2.0, self.node_size.height / 2.0)
    }

    /// Override the grid size and snapping.
    pub fn with_grid(mut self, grid_size: f64, snap_to_grid: bool) -> Self {
        self.grid_size = grid_size;
        self.snap_to_grid = snap_to_grid;
        self
    }

    /// Override the zoom limits.
    pub fn with_zoom_range(mut self, zoom_min: f64, zoom_max: f64) -> Self {
        self.zoom_min = zoom_min;
        self.zoom_max = zoom_max;
        self
    }

    /// Override the viewport size.
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Size::new(width, height);
        self
    }

    /// Override the swipe distance fraction and velocity threshold.
    pub fn with_swipe(mut self, threshold_fraction: f64, velocity_threshold: f64) -> Self {
        self.swipe_threshold_fraction = threshold_fraction;
        self.velocity_threshold = velocity_threshold;
        self
    }

    /// Make every timed animation finish instantly.
    pub fn with_instant_animations(mut self) -> Self {
        self.commit_timing = TimingConfig { duration_ms: 0 };
        self.flip_timing = TimingConfig { duration_ms: 0 };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InteractionConfig::default();
        assert!((config.grid_size - 20.0).abs() < f64::EPSILON);
        assert!(!config.snap_to_grid);
        assert!((config.zoom_min - 0.5).abs() < f64::EPSILON);
        assert!((config.zoom_max - 2.0).abs() < f64::EPSILON);
        assert!((config.swipe_threshold() - 117.0).abs() < 1e-9);
        assert_eq!(config.anchor_offset(), Vec2::new(100.0, 50.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            InteractionConfig::from_json(r#"{ "grid_size": 25.0, "snap_to_grid": true }"#).unwrap();
        assert!((config.grid_size - 25.0).abs() < f64::EPSILON);
        assert!(config.snap_to_grid);
        assert!((config.velocity_threshold - 500.0).abs() < f64::EPSILON);
        assert_eq!(config.reset_spring, SpringConfig::GENTLE);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = InteractionConfig::document_viewer().with_grid(10.0, true);
        let json = config.to_json().unwrap();
        let back = InteractionConfig::from_json(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = InteractionConfig::default().with_grid(0.0, true);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGridSize(_))));

        let config = InteractionConfig::default().with_zoom_range(2.0, 1.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidZoomRange { .. })));

        let config = InteractionConfig::default().with_swipe(1.5, 500.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSwipeThreshold(_))));

        assert!(matches!(
            InteractionConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_instant_animations() {
        let config = InteractionConfig::default().with_instant_animations();
        assert_eq!(config.commit_timing.duration(), Duration::ZERO);
        assert_eq!(config.flip_timing.duration(), Duration::ZERO);
    }
}
