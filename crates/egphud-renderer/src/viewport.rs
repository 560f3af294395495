use serde::{Deserialize, Serialize};

use egphud_core::{BBox, Point};

pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 6.0;
pub const ZOOM_STEP: f64 = 1.1;

/// Mapping between world space (project pixels) and screen space (viewport pixels).
///
/// `screen = world * zoom + pan`. Any manual pan or zoom clears `auto_fit`;
/// while `auto_fit` is set a viewport resize re-fits the project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub auto_fit: bool,
    /// Viewport width in pixels.
    pub viewport_width: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
}

impl ViewTransform {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            auto_fit: true,
            viewport_width: viewport_width.max(1.0),
            viewport_height: viewport_height.max(1.0),
        }
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }

    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }

    /// Convert a screen-space distance to world units.
    pub fn screen_len_to_world(&self, pixels: f64) -> f64 {
        pixels / self.zoom.max(0.001)
    }

    /// Fit the whole resolution rectangle into the viewport and center it.
    pub fn fit_to_view(&mut self, resolution: (u32, u32)) {
        let res_w = resolution.0.max(1) as f64;
        let res_h = resolution.1.max(1) as f64;
        self.zoom = (self.viewport_width / res_w).min(self.viewport_height / res_h);
        self.pan_x = (self.viewport_width - res_w * self.zoom) / 2.0;
        self.pan_y = (self.viewport_height - res_h * self.zoom) / 2.0;
        self.auto_fit = true;
    }

    /// Zoom by `factor` keeping the world point under `screen` fixed.
    /// Returns false when the clamped zoom did not change.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) -> bool {
        let new_zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        if new_zoom == self.zoom {
            return false;
        }
        let world = self.screen_to_world(screen);
        self.zoom = new_zoom;
        self.pan_x = screen.x - world.x * self.zoom;
        self.pan_y = screen.y - world.y * self.zoom;
        self.auto_fit = false;
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_at(self.viewport_center(), ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_at(self.viewport_center(), 1.0 / ZOOM_STEP)
    }

    /// Pan by a delta in screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
        self.auto_fit = false;
    }

    /// Apply a new viewport size, re-fitting when auto-fit is active.
    pub fn resize(&mut self, width: f64, height: f64, resolution: (u32, u32)) {
        self.viewport_width = width.max(1.0);
        self.viewport_height = height.max(1.0);
        if self.auto_fit {
            self.fit_to_view(resolution);
        }
    }

    pub fn viewport_center(&self) -> Point {
        Point::new(self.viewport_width / 2.0, self.viewport_height / 2.0)
    }

    /// The world-space rectangle currently visible in the viewport.
    pub fn visible_world_bounds(&self) -> BBox {
        BBox::from_corners(
            self.screen_to_world(Point::new(0.0, 0.0)),
            self.screen_to_world(Point::new(self.viewport_width, self.viewport_height)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_world_screen_inverse() {
        let mut v = ViewTransform::new(800.0, 600.0);
        v.zoom = 2.5;
        v.pan_x = 13.0;
        v.pan_y = -7.0;
        let p = Point::new(123.4, 56.7);
        assert!(close(v.screen_to_world(v.world_to_screen(p)), p));
    }

    #[test]
    fn test_fit_to_view_centers_resolution() {
        let mut v = ViewTransform::new(1000.0, 1000.0);
        v.fit_to_view((1920, 1080));
        assert!((v.zoom - 1000.0 / 1920.0).abs() < 1e-12);
        let tl = v.world_to_screen(Point::new(0.0, 0.0));
        let br = v.world_to_screen(Point::new(1920.0, 1080.0));
        assert!((tl.x).abs() < 1e-9);
        assert!(((tl.y + br.y) / 2.0 - 500.0).abs() < 1e-9);
        assert!(v.auto_fit);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut v = ViewTransform::new(800.0, 600.0);
        v.fit_to_view((1920, 1080));
        let anchor = Point::new(300.0, 200.0);
        let world_before = v.screen_to_world(anchor);
        assert!(v.zoom_at(anchor, 1.5));
        assert!(close(v.world_to_screen(world_before), anchor));
        assert!(!v.auto_fit);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut v = ViewTransform::new(800.0, 600.0);
        v.zoom = ZOOM_MAX;
        assert!(!v.zoom_at(Point::new(0.0, 0.0), 2.0));
        v.zoom_at(Point::new(0.0, 0.0), 1e-6);
        assert!((v.zoom - ZOOM_MIN).abs() < 1e-12);
    }

    #[test]
    fn test_resize_respects_auto_fit() {
        let mut v = ViewTransform::new(800.0, 600.0);
        v.fit_to_view((1920, 1080));
        v.resize(1920.0, 1080.0, (1920, 1080));
        assert!((v.zoom - 1.0).abs() < 1e-12);

        v.pan_by(10.0, 0.0);
        assert!(!v.auto_fit);
        let before = v;
        v.resize(400.0, 300.0, (1920, 1080));
        assert_eq!(v.zoom, before.zoom);
        assert_eq!(v.pan_x, before.pan_x);
    }
}
