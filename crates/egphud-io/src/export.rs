//! Expression 2 code generation.
//!
//! Every visible shape becomes one EGP object. Positions are written relative
//! to the project center and multiplied by `Scale`, the ratio between the
//! screen the chip runs on and the project resolution, so the HUD keeps its
//! layout at any runtime resolution.
//!
//! Object ids are assigned in layer order then shape order, starting at 1.
//! Shapes too short for their kind are skipped but still consume an id;
//! hidden layers consume none.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use egphud_core::{BBox, InputType, Layer, Point, Project, Rgb, Shape, ShapeKind};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Alpha written for every object.
const ALPHA: u8 = 255;

/// One decimal place; anything that would print as ±0.0 prints as `0.0`.
pub fn fmt_num(value: f64) -> String {
    if value.abs() < 0.05 {
        "0.0".to_string()
    } else {
        format!("{:.1}", value)
    }
}

fn offset_expr(resolution: (u32, u32), p: Point) -> String {
    let dx = p.x - resolution.0 as f64 / 2.0;
    let dy = p.y - resolution.1 as f64 / 2.0;
    format!(
        "Res+vec2( {}*Scale:x(), {}*Scale:y())",
        fmt_num(dx),
        fmt_num(dy)
    )
}

fn size_expr(width: f64, height: f64) -> String {
    format!(
        "vec2( {}*Scale:x(), {}*Scale:y())",
        fmt_num(width),
        fmt_num(height)
    )
}

/// E2 string literal with backslashes and quotes escaped.
pub fn quote_text(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"%([A-Za-z0-9_]+)%(R(\d))?").expect("invalid token pattern"))
}

/// E2 expression for a text shape's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextExpression {
    pub expr: String,
    /// True when the text references declared inputs and must be refreshed.
    pub dynamic: bool,
}

/// Resolve `%NAME%` and `%NAME%R<d>` tokens against the project's inputs.
///
/// Tokens naming undeclared inputs stay literal. A rounding suffix only
/// applies to normal inputs. A text that is nothing but one normal input is
/// coerced to a string, since `egpSetText` rejects numbers.
pub fn text_expression(project: &Project, text: &str) -> TextExpression {
    let matches: Vec<_> = token_regex().captures_iter(text).collect();
    let mut parts = Vec::new();
    let mut last = 0;
    let mut dynamic = false;

    for caps in &matches {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(input) = project.find_input(name.as_str()) else {
            continue;
        };
        dynamic = true;
        if whole.start() > last {
            parts.push(quote_text(&text[last..whole.start()]));
        }
        parts.push(match (input.input_type, caps.get(3)) {
            (InputType::Normal, Some(digits)) => {
                format!("round({},{})", name.as_str(), digits.as_str())
            }
            _ => name.as_str().to_string(),
        });
        last = whole.end();
    }

    if !dynamic {
        return TextExpression {
            expr: quote_text(text),
            dynamic: false,
        };
    }
    if last < text.len() {
        parts.push(quote_text(&text[last..]));
    }
    let mut expr = parts.join(" + ");

    if let [only] = matches.as_slice() {
        let covers_text = only
            .get(0)
            .map_or(false, |m| m.start() == 0 && m.end() == text.len());
        let is_normal = only
            .get(1)
            .and_then(|n| project.find_input(n.as_str()))
            .map_or(false, |i| i.input_type == InputType::Normal);
        if covers_text && is_normal {
            expr = format!("({}) + \"\"", expr);
        }
    }

    TextExpression {
        expr,
        dynamic: true,
    }
}

/// Streams a project as an Expression 2 chip.
pub struct HudExporter<W: Write> {
    writer: W,
}

impl<W: Write> HudExporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write(&mut self, project: &Project) -> Result<(), ExportError> {
        self.write_header(project)?;

        let mut egp_id = 0u32;
        let mut dynamic_text: Vec<(u32, String)> = Vec::new();
        for layer in project.layers.iter().filter(|l| l.visible) {
            for shape in &layer.shapes {
                egp_id += 1;
                if !shape.is_drawable() {
                    log::debug!(
                        "Skipping {:?} shape {} with {} points",
                        shape.kind,
                        shape.id,
                        shape.points.len()
                    );
                    continue;
                }
                self.write_shape(egp_id, project, layer, shape, &mut dynamic_text)?;
            }
        }

        self.writer.write_all(b"}\n\n")?;
        if !dynamic_text.is_empty() {
            self.write_dynamic_block(&dynamic_text)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn write_header(&mut self, project: &Project) -> Result<(), ExportError> {
        let mut inputs = String::from("EGP:wirelink");
        for input in project.inputs.iter().filter(|i| !i.name.is_empty()) {
            inputs.push_str(&format!(" {}:{}", input.name, input.input_type.keyword()));
        }
        let (w, h) = project.resolution;
        write!(
            self.writer,
            "@name Untitled\n\
             @inputs {inputs}\n\
             @persist X Y Res:vector2 ProjRes:vector2 Scale:vector2\n\
             \n\
             if ( first() )\n\
             {{\n    \
                 EGP:egpClear()\n    \
                 Res = egpScrSize(owner())\n    \
                 X   = Res:x()\n    \
                 Y   = Res:y()\n    \
                 Res /= 2\n    \
                 ProjRes = vec2( {w}, {h} )\n    \
                 Scale = vec2(X/ProjRes:x(), Y/ProjRes:y())\n    \
                 interval(100)\n"
        )?;
        Ok(())
    }

    fn write_shape(
        &mut self,
        id: u32,
        project: &Project,
        layer: &Layer,
        shape: &Shape,
        dynamic_text: &mut Vec<(u32, String)>,
    ) -> Result<(), ExportError> {
        let res = project.resolution;
        let pts = &shape.points;
        let stroke_color = layer.effective_stroke(shape);
        let fill_color = layer
            .override_color()
            .or(shape.fill.as_deref().filter(|f| !f.is_empty()))
            .unwrap_or(&shape.stroke);

        match shape.kind {
            ShapeKind::Line => {
                let (a, b) = (pts[0], pts[1]);
                let (dx, dy) = ((b.x - a.x).abs(), (b.y - a.y).abs());
                let thickness = shape.stroke_width.max(1) as f64;
                // Within half a pixel of axis-aligned: draw as a box of stroke thickness.
                let size = if dy <= 0.5 {
                    Some((dx.max(1.0), thickness))
                } else if dx <= 0.5 {
                    Some((thickness, dy.max(1.0)))
                } else {
                    None
                };
                match size {
                    Some((w, h)) => {
                        let center = BBox::from_corners(a, b).center();
                        writeln!(
                            self.writer,
                            "    EGP:egpBox( {}, {}, {} )",
                            id,
                            offset_expr(res, center),
                            size_expr(w, h)
                        )?;
                    }
                    None => {
                        writeln!(
                            self.writer,
                            "    EGP:egpLine( {}, {}, {} )",
                            id,
                            offset_expr(res, a),
                            offset_expr(res, b)
                        )?;
                    }
                }
                self.write_style(id, stroke_color)
            }
            ShapeKind::Rect | ShapeKind::Box => {
                let bounds = BBox::from_corners(pts[0], pts[1]);
                let (call, color) = if shape.kind == ShapeKind::Rect {
                    ("egpBoxOutline", stroke_color)
                } else {
                    ("egpBox", fill_color)
                };
                writeln!(
                    self.writer,
                    "    EGP:{}( {}, {}, {} )",
                    call,
                    id,
                    offset_expr(res, bounds.center()),
                    size_expr(bounds.width(), bounds.height())
                )?;
                self.write_style(id, color)
            }
            ShapeKind::Circle | ShapeKind::CircleFilled => {
                let bounds = BBox::from_corners(pts[0], pts[1]);
                let call = if shape.kind == ShapeKind::CircleFilled {
                    "egpCircle"
                } else {
                    "egpCircleOutline"
                };
                writeln!(
                    self.writer,
                    "    EGP:{}( {}, {}, {} )",
                    call,
                    id,
                    offset_expr(res, bounds.center()),
                    size_expr(bounds.width() / 2.0, bounds.height() / 2.0)
                )?;
                self.write_style(id, fill_color)
            }
            ShapeKind::Poly => {
                let vertices: Vec<String> = pts.iter().map(|p| offset_expr(res, *p)).collect();
                writeln!(
                    self.writer,
                    "    EGP:egpPoly( {},array( {} ))",
                    id,
                    vertices.join(",")
                )?;
                self.write_style(id, fill_color)
            }
            ShapeKind::Text => {
                let text = text_expression(project, &shape.text);
                writeln!(
                    self.writer,
                    "    EGP:egpText( {}, {}, {} )",
                    id,
                    text.expr,
                    offset_expr(res, pts[0])
                )?;
                self.write_style(id, stroke_color)?;
                let font = if shape.font.is_empty() {
                    "Default"
                } else {
                    shape.font.as_str()
                };
                writeln!(self.writer, "    EGP:egpAlign( {}, {}, 1 )", id, shape.align.code())?;
                writeln!(
                    self.writer,
                    "    EGP:egpFont( {},\"{}\", {} )",
                    id, font, shape.font_size
                )?;
                if text.dynamic {
                    dynamic_text.push((id, text.expr));
                }
                Ok(())
            }
        }
    }

    fn write_style(&mut self, id: u32, color: &str) -> Result<(), ExportError> {
        let rgb = Rgb::from_hex(color);
        writeln!(
            self.writer,
            "    EGP:egpColor( {},vec({}, {}, {}))",
            id, rgb.r, rgb.g, rgb.b
        )?;
        writeln!(self.writer, "    EGP:egpAlpha( {}, {} )", id, ALPHA)?;
        Ok(())
    }

    fn write_dynamic_block(&mut self, dynamic_text: &[(u32, String)]) -> Result<(), ExportError> {
        self.writer.write_all(b"if (clk())\n{\n   interval(100)\n")?;
        for (id, expr) in dynamic_text {
            writeln!(self.writer, "   EGP:egpSetText( {}, {} )", id, expr)?;
        }
        self.writer.write_all(b"}\n")?;
        Ok(())
    }
}

/// Generated chip source, e.g. for a clipboard.
pub fn export_to_string(project: &Project) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    HudExporter::new(&mut buffer).write(project)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn export_to_file(project: &Project, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    HudExporter::new(BufWriter::new(file)).write(project)?;
    log::info!(
        "Exported {} shapes to {}",
        project.shape_count(),
        path.display()
    );
    Ok(())
}
