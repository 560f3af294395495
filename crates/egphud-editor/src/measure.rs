//! Text metrics and on-canvas bounds of shapes.
//!
//! Text shapes are a single anchor point, so their extent depends on how the
//! host renders the font at the current zoom. Hosts that can measure real
//! glyph runs supply their own [`TextMeasure`].

use egphud_core::{Align, BBox, Point, Shape, ShapeKind};
use egphud_renderer::render_data::{text_display_size, DEFAULT_DISPLAY_FONT};

/// Measures a rendered text run in screen pixels.
pub trait TextMeasure {
    /// Returns `(width, height)` of `text` drawn in `font` at `size` points.
    fn measure(&self, font: &str, size: u32, text: &str) -> (f64, f64);
}

/// Fixed-advance approximation: each character is 0.6 em wide, one em tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, _font: &str, size: u32, text: &str) -> (f64, f64) {
        let chars = text.chars().count().max(1) as f64;
        let size = size as f64;
        (size * chars * 0.6, size)
    }
}

/// Asks the user for a text string, pre-filled with `initial`.
pub trait TextPrompt {
    /// `None` cancels the text tool.
    fn prompt_text(&mut self, initial: &str) -> Option<String>;
}

impl<F> TextPrompt for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn prompt_text(&mut self, initial: &str) -> Option<String> {
        self(initial)
    }
}

/// Prompt that accepts the pre-filled text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptDefaultPrompt;

impl TextPrompt for AcceptDefaultPrompt {
    fn prompt_text(&mut self, initial: &str) -> Option<String> {
        Some(initial.to_string())
    }
}

/// World-space bounds of a text shape as drawn at `zoom`.
pub fn text_bounds(shape: &Shape, zoom: f64, measure: &dyn TextMeasure) -> Option<BBox> {
    let anchor = shape.points.first()?;
    let zoom = zoom.max(0.001);
    let size = text_display_size(shape.font_size, zoom);
    let font = if shape.font.is_empty() {
        DEFAULT_DISPLAY_FONT
    } else {
        shape.font.as_str()
    };
    let text = if shape.text.is_empty() {
        " "
    } else {
        shape.text.as_str()
    };
    let (w, h) = measure.measure(font, size, text);
    let half_w = w.max(1.0) / zoom / 2.0;
    let half_h = h.max(1.0) / zoom / 2.0;

    let (left, right) = match shape.align {
        Align::Left => (anchor.x, anchor.x + half_w * 2.0),
        Align::Center => (anchor.x - half_w, anchor.x + half_w),
        Align::Right => (anchor.x - half_w * 2.0, anchor.x),
    };
    let pad = 1.0 / zoom;
    Some(BBox::new(
        Point::new(left - pad, anchor.y - half_h - pad),
        Point::new(right + pad, anchor.y + half_h + pad),
    ))
}

/// World-space bounds of any shape; text uses rendered extent, the rest their points.
pub fn shape_bounds(shape: &Shape, zoom: f64, measure: &dyn TextMeasure) -> Option<BBox> {
    match shape.kind {
        ShapeKind::Text => text_bounds(shape, zoom, measure),
        _ => shape.point_bounds(),
    }
}
