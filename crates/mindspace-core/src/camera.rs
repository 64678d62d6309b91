//! Canvas transform for pan/zoom.

use crate::config::InteractionConfig;
use crate::geometry::clamp;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// How far the canvas may be panned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum PanBounds {
    /// Infinite board: pan accumulates without limit.
    #[default]
    Unbounded,
    /// Zoomable content of a fixed size: panning is only possible while
    /// zoomed in, and never reveals space outside the content.
    Contained { width: f64, height: f64 },
}

/// Flattened render transform, applied as translate then scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

/// Pan offset and zoom of a 2D canvas.
///
/// View state only; it is rebuilt from [`InteractionConfig`] on mount.
///
/// The render transform is `translate(offset) * scale(zoom)`: the offset is
/// in screen units and is not multiplied by the zoom.
#[derive(Debug, Clone)]
pub struct CanvasTransform {
    /// Current translation offset (pan).
    pub offset: Vec2,
    /// Current zoom level, always within `[min_zoom, max_zoom]`.
    zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Increment used by the zoom buttons.
    pub zoom_step: f64,
    /// Zoom restored by `reset`.
    initial_zoom: f64,
    /// Pan limits.
    pub bounds: PanBounds,
    /// Offset captured when the current pan gesture began.
    pan_origin: Option<Vec2>,
    /// Zoom captured when the current pinch gesture began.
    pinch_origin: Option<f64>,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::new(&InteractionConfig::default())
    }
}

impl CanvasTransform {
    /// Create a transform at pan (0, 0) and the configured initial zoom.
    pub fn new(config: &InteractionConfig) -> Self {
        let initial_zoom = clamp(config.initial_zoom, config.zoom_min, config.zoom_max);
        Self {
            offset: Vec2::ZERO,
            zoom: initial_zoom,
            min_zoom: config.zoom_min,
            max_zoom: config.zoom_max,
            zoom_step: config.zoom_step,
            initial_zoom,
            bounds: PanBounds::Unbounded,
            pan_origin: None,
            pinch_origin: None,
        }
    }

    /// Set the pan limits.
    pub fn with_bounds(mut self, bounds: PanBounds) -> Self {
        self.bounds = bounds;
        self.offset = self.constrain(self.offset);
        self
    }

    /// Current zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom as a whole percentage for display.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    /// Get the affine transform for rendering (canvas space to screen space).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Flattened transform for the render layer.
    pub fn view_transform(&self) -> ViewTransform {
        ViewTransform {
            translate_x: self.offset.x,
            translate_y: self.offset.y,
            scale: self.zoom,
        }
    }

    /// Convert a screen point to canvas coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a canvas point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        if !delta.x.is_finite() || !delta.y.is_finite() {
            log::warn!("Ignoring non-finite pan delta {:?}", delta);
            return;
        }
        if !self.can_pan() {
            return;
        }
        self.offset = self.constrain(self.offset + delta);
    }

    /// Start a pan gesture, remembering the current offset.
    pub fn begin_pan(&mut self) {
        self.pan_origin = Some(self.offset);
    }

    /// Move to `origin + translation`, where `translation` is the total finger
    /// travel since `begin_pan`.
    pub fn update_pan(&mut self, translation: Vec2) {
        let Some(origin) = self.pan_origin else {
            return;
        };
        if !translation.x.is_finite() || !translation.y.is_finite() || !self.can_pan() {
            return;
        }
        self.offset = self.constrain(origin + translation);
    }

    /// Finish the pan gesture.
    pub fn end_pan(&mut self) {
        self.pan_origin = None;
    }

    /// Whether a pan gesture is in progress.
    pub fn is_panning(&self) -> bool {
        self.pan_origin.is_some()
    }

    /// Multiply the zoom by `factor`, clamped to the allowed range.
    ///
    /// Returns the new zoom if it changed. Non-finite factors are ignored.
    pub fn zoom_by(&mut self, factor: f64) -> Option<f64> {
        if !factor.is_finite() {
            log::warn!("Ignoring non-finite zoom factor {}", factor);
            return None;
        }
        self.set_zoom(self.zoom * factor)
    }

    /// Set the zoom directly (clamped). Returns the new zoom if it changed.
    pub fn set_zoom(&mut self, zoom: f64) -> Option<f64> {
        if zoom.is_nan() {
            return None;
        }
        let new_zoom = clamp(zoom, self.min_zoom, self.max_zoom);
        if new_zoom == self.zoom {
            return None;
        }
        self.zoom = new_zoom;
        self.offset = self.constrain(self.offset);
        Some(new_zoom)
    }

    /// Zoom-in button.
    pub fn zoom_in(&mut self) -> Option<f64> {
        if self.zoom >= self.max_zoom {
            return None;
        }
        self.set_zoom(self.zoom + self.zoom_step)
    }

    /// Zoom-out button.
    pub fn zoom_out(&mut self) -> Option<f64> {
        if self.zoom <= self.min_zoom {
            return None;
        }
        self.set_zoom(self.zoom - self.zoom_step)
    }

    /// Start a pinch, remembering the current zoom.
    pub fn begin_pinch(&mut self) {
        self.pinch_origin = Some(self.zoom);
    }

    /// Apply the cumulative pinch `scale` reported since `begin_pinch`.
    pub fn update_pinch(&mut self, scale: f64) -> Option<f64> {
        let saved = self.pinch_origin?;
        if !scale.is_finite() {
            return None;
        }
        self.set_zoom(saved * scale)
    }

    /// Finish the pinch and return the resulting zoom.
    pub fn end_pinch(&mut self) -> f64 {
        self.pinch_origin = None;
        self.zoom
    }

    /// Zoom, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> Option<f64> {
        if !factor.is_finite() {
            return None;
        }
        let world_point = self.screen_to_world(screen_point);
        let new_zoom = self.set_zoom(self.zoom * factor)?;

        // Adjust offset so world_point stays at screen_point
        let new_screen = self.world_to_screen(world_point);
        self.offset = self.constrain(self.offset + (screen_point - new_screen));
        Some(new_zoom)
    }

    /// Double-tap behaviour: zoomed content returns to 1x, otherwise zoom to 2x.
    pub fn toggle_zoom(&mut self) -> Option<f64> {
        if (self.zoom - 1.0).abs() > f64::EPSILON {
            self.offset = Vec2::ZERO;
            self.set_zoom(1.0)
        } else {
            self.set_zoom(2.0)
        }
    }

    /// Reset to the mount state.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = self.initial_zoom;
        self.pan_origin = None;
        self.pinch_origin = None;
    }

    fn can_pan(&self) -> bool {
        match self.bounds {
            PanBounds::Unbounded => true,
            PanBounds::Contained { .. } => self.zoom > 1.0,
        }
    }

    fn constrain(&self, offset: Vec2) -> Vec2 {
        match self.bounds {
            PanBounds::Unbounded => offset,
            PanBounds::Contained { width, height } => {
                let max_x = (width * (self.zoom - 1.0) / 2.0).max(0.0);
                let max_y = (height * (self.zoom - 1.0) / 2.0).max(0.0);
                Vec2::new(clamp(offset.x, -max_x, max_x), clamp(offset.y, -max_y, max_y))
            }
        }
    }
}
