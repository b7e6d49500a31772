// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pan/zoom transform between screen and canvas space.

use egui::{Pos2, Rect, Vec2};

const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 4.0;

/// The canvas viewport: pan offset and zoom level.
///
/// Canvas space is the zoom/pan-independent coordinate system nodes are
/// positioned in; screen space is the host window. Zoom greater than one
/// magnifies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Pan offset in canvas units.
    pub pan: Vec2,
    /// Zoom level, clamped to `0.1..=4.0`.
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Convert a screen position to canvas space. `rect` is the canvas
    /// area within the host window.
    pub fn screen_to_canvas(&self, screen: Pos2, rect: Rect) -> Pos2 {
        let center = rect.center();
        Pos2::new(
            (screen.x - center.x) / self.zoom - self.pan.x,
            (screen.y - center.y) / self.zoom - self.pan.y,
        )
    }

    /// Convert a canvas position to screen space.
    pub fn canvas_to_screen(&self, canvas: Pos2, rect: Rect) -> Pos2 {
        let center = rect.center();
        Pos2::new(
            (canvas.x + self.pan.x) * self.zoom + center.x,
            (canvas.y + self.pan.y) * self.zoom + center.y,
        )
    }

    /// Convert a canvas rect to screen space.
    pub fn canvas_rect_to_screen(&self, canvas: Rect, rect: Rect) -> Rect {
        Rect::from_min_size(
            self.canvas_to_screen(canvas.min, rect),
            canvas.size() * self.zoom,
        )
    }

    /// Pan by a pointer delta given in screen pixels.
    pub fn pan_by_screen_delta(&mut self, delta: Vec2) {
        self.pan += delta / self.zoom;
    }

    /// Multiplicative scroll zoom, optionally keeping the canvas point
    /// under the pointer fixed.
    pub fn scroll_zoom(&mut self, pointer: Pos2, rect: Rect, delta_y: f32, zoom_to_mouse: bool) {
        if delta_y == 0.0 {
            return;
        }
        let factor = if delta_y > 0.0 { 1.1 } else { 1.0 / 1.1 };
        let old_zoom = self.zoom;
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom_to_mouse && self.zoom != old_zoom {
            let pointer_canvas = self.screen_to_canvas(pointer, rect);
            let zoom_ratio = self.zoom / old_zoom;
            self.pan.x += pointer_canvas.x * (1.0 - zoom_ratio);
            self.pan.y += pointer_canvas.y * (1.0 - zoom_ratio);
        }
    }

    /// Center the view on a canvas point.
    pub fn center_on(&mut self, canvas: Pos2) {
        self.pan = -canvas.to_vec2();
    }

    /// Reset pan and zoom to defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
