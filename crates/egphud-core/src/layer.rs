use serde::{Deserialize, Serialize};

use crate::shape::{new_id, Shape};

/// Unique layer identifier.
pub type LayerId = String;

fn default_layer_name() -> String {
    "Layer".to_string()
}

fn default_true() -> bool {
    true
}

/// A named, ordered group of shapes. Later shapes draw on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    #[serde(default = "default_layer_name")]
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Optional color override applied to every shape at render and export time.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl Layer {
    pub fn new(name: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            visible: true,
            locked: false,
            color: None,
            shapes: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn contains_shape(&self, id: &str) -> bool {
        self.shapes.iter().any(|s| s.id == id)
    }

    pub fn get_shape(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn get_shape_mut(&mut self, id: &str) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// The layer's color override; an empty string counts as none.
    pub fn override_color(&self) -> Option<&str> {
        self.color.as_deref().filter(|c| !c.is_empty())
    }

    /// Stroke color after applying the layer override.
    pub fn effective_stroke<'a>(&'a self, shape: &'a Shape) -> &'a str {
        self.override_color().unwrap_or(&shape.stroke)
    }

    /// Fill color after applying the layer override. Outline-only kinds never
    /// paint a fill, so they get `None`.
    pub fn effective_fill<'a>(&'a self, shape: &'a Shape) -> Option<&'a str> {
        if !shape.kind.is_filled() {
            return None;
        }
        self.override_color()
            .or(shape.fill.as_deref().filter(|f| !f.is_empty()))
    }
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse `#RRGGBB` (the `#` is optional). Malformed input yields white.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::WHITE;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Self { r, g, b },
            _ => Self::WHITE,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::shape::ShapeKind;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgb::from_hex("#0A84FF"), Rgb { r: 10, g: 132, b: 255 });
        assert_eq!(Rgb::from_hex("ff0000"), Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(Rgb::from_hex("#FFF"), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("#GG0000"), Rgb::WHITE);
        assert_eq!(Rgb::from_hex(""), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("#+F+F+F"), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("#-1 0 0"), Rgb::WHITE);
        assert_eq!(Rgb::from_hex("#0A84FF").to_hex(), "#0A84FF");
    }

    #[test]
    fn test_layer_color_override_is_non_destructive() {
        let layer = Layer::new("hud").with_color("#FF0000");
        let shape = Shape::new(
            ShapeKind::Box,
            vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)],
            "#00FF00",
            1,
        )
        .with_fill(Some("#0000FF"));
        assert_eq!(layer.effective_stroke(&shape), "#FF0000");
        assert_eq!(layer.effective_fill(&shape), Some("#FF0000"));
        assert_eq!(shape.stroke, "#00FF00");
        assert_eq!(shape.fill.as_deref(), Some("#0000FF"));
    }

    #[test]
    fn test_outline_kinds_have_no_fill() {
        let layer = Layer::new("hud").with_color("#FF0000");
        let rect = Shape::new(
            ShapeKind::Rect,
            vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)],
            "#00FF00",
            1,
        )
        .with_fill(Some("#0000FF"));
        assert_eq!(layer.effective_fill(&rect), None);

        let plain = Layer::new("plain");
        assert_eq!(plain.effective_stroke(&rect), "#00FF00");
    }
}
