use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{BBox, Point};

/// Unique shape identifier. Freshly generated ids are UUID v4 strings; ids loaded
/// from a project file are kept verbatim.
pub type ShapeId = String;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Drawable primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Line,
    Rect,
    Box,
    Circle,
    CircleFilled,
    Poly,
    Text,
}

impl ShapeKind {
    /// Minimum number of points a shape of this kind needs to be drawn or exported.
    pub fn min_points(self) -> usize {
        match self {
            ShapeKind::Poly => 3,
            ShapeKind::Text => 1,
            _ => 2,
        }
    }

    pub fn is_circle(self) -> bool {
        matches!(self, ShapeKind::Circle | ShapeKind::CircleFilled)
    }

    /// Kinds whose interior is painted with the fill color.
    pub fn is_filled(self) -> bool {
        matches!(
            self,
            ShapeKind::Box | ShapeKind::CircleFilled | ShapeKind::Poly
        )
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// EGP horizontal alignment code.
    pub fn code(self) -> u8 {
        match self {
            Align::Left => 0,
            Align::Center => 1,
            Align::Right => 2,
        }
    }
}

fn default_stroke() -> String {
    "#FFFFFF".to_string()
}

fn default_stroke_width() -> u32 {
    1
}

fn default_font_size() -> u32 {
    12
}

/// A single primitive placed on a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default = "default_stroke")]
    pub stroke: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default)]
    pub fill: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub align: Align,
}

impl Shape {
    /// Create a shape with a fresh id. Circle kinds always carry stroke width 1.
    pub fn new(kind: ShapeKind, points: Vec<Point>, stroke: &str, stroke_width: u32) -> Self {
        let stroke_width = if kind.is_circle() {
            1
        } else {
            stroke_width.max(1)
        };
        Self {
            id: new_id(),
            kind,
            points,
            stroke: stroke.to_string(),
            stroke_width,
            fill: None,
            text: String::new(),
            font: String::new(),
            font_size: default_font_size(),
            align: Align::Left,
        }
    }

    pub fn with_fill(mut self, fill: Option<&str>) -> Self {
        self.fill = fill.map(str::to_string);
        self
    }

    pub fn with_text(mut self, text: &str, font: &str, font_size: u32, align: Align) -> Self {
        self.text = text.to_string();
        self.font = font.to_string();
        self.font_size = font_size.max(1);
        self.align = align;
        self
    }

    /// Whether the shape has enough points for its kind.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= self.kind.min_points()
    }

    /// Axis-aligned bounds of the raw points. Text shapes only have an anchor here;
    /// their real extent depends on measured glyphs.
    pub fn point_bounds(&self) -> Option<BBox> {
        BBox::from_points(&self.points)
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        for p in &mut self.points {
            *p = p.translate(dx, dy);
        }
    }

    /// Deep copy with a fresh id.
    pub fn duplicate_with_new_id(&self) -> Self {
        Self {
            id: new_id(),
            ..self.clone()
        }
    }

    /// Set the stroke width, keeping circle kinds at 1.
    pub fn set_stroke_width(&mut self, width: u32) {
        self.stroke_width = if self.kind.is_circle() {
            1
        } else {
            width.max(1)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_stroke_forced_to_one() {
        let mut s = Shape::new(
            ShapeKind::Circle,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            "#FFFFFF",
            5,
        );
        assert_eq!(s.stroke_width, 1);
        s.set_stroke_width(8);
        assert_eq!(s.stroke_width, 1);

        let mut l = Shape::new(
            ShapeKind::Line,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            "#FFFFFF",
            5,
        );
        l.set_stroke_width(8);
        assert_eq!(l.stroke_width, 8);
    }

    #[test]
    fn test_drawable_by_kind() {
        let poly = Shape::new(
            ShapeKind::Poly,
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            "#FFFFFF",
            1,
        );
        assert!(!poly.is_drawable());
        let text = Shape::new(ShapeKind::Text, vec![Point::new(5.0, 5.0)], "#FFFFFF", 1);
        assert!(text.is_drawable());
        let empty = Shape::new(ShapeKind::Text, vec![], "#FFFFFF", 1);
        assert!(!empty.is_drawable());
    }

    #[test]
    fn test_duplicate_gets_fresh_id() {
        let s = Shape::new(ShapeKind::Box, vec![Point::new(0.0, 0.0)], "#FFFFFF", 1);
        let d = s.duplicate_with_new_id();
        assert_ne!(s.id, d.id);
        assert_eq!(s.points, d.points);
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ShapeKind::CircleFilled).unwrap(),
            "\"circle_filled\""
        );
        assert_eq!(serde_json::to_string(&Align::Center).unwrap(), "\"center\"");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let s: Shape = serde_json::from_str(r#"{"id":"a","kind":"line"}"#).unwrap();
        assert_eq!(s.stroke, "#FFFFFF");
        assert_eq!(s.stroke_width, 1);
        assert_eq!(s.font_size, 12);
        assert_eq!(s.align, Align::Left);
        assert!(s.points.is_empty());
    }
}
