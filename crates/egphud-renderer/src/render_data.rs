use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use egphud_core::{Align, BBox, Point, Project, Shape, ShapeId, ShapeKind};

use crate::viewport::ViewTransform;

/// Screen-space geometry of a single drawable primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderGeometry {
    Line { from: Point, to: Point },
    Rect { min: Point, max: Point },
    /// Ellipse inscribed in the box spanned by the two shape points.
    Ellipse { min: Point, max: Point },
    Polygon { vertices: Vec<Point> },
    Text {
        anchor: Point,
        text: String,
        font: String,
        /// Display size in points after zoom.
        size: u32,
        align: Align,
    },
}

/// A primitive ready for the host canvas, with layer overrides already applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderShape {
    pub shape_id: ShapeId,
    pub kind: ShapeKind,
    pub geometry: RenderGeometry,
    /// Outline / line / text color as `#RRGGBB`.
    pub stroke: String,
    /// Interior color; `None` for outline-only kinds.
    pub fill: Option<String>,
    pub stroke_width: u32,
    pub selected: bool,
}

/// Everything the host needs to paint one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderFrame {
    pub shapes: Vec<RenderShape>,
    pub view: ViewTransform,
    pub grid: Vec<GridLine>,
    /// Selection bounds in screen space: [min_x, min_y, max_x, max_y].
    pub selection_bbox: Option<[f64; 4]>,
}

/// Font used on the canvas when a text shape names none.
pub const DEFAULT_DISPLAY_FONT: &str = "Segoe UI";

/// On-canvas point size for a text shape at the given zoom.
pub fn text_display_size(font_size: u32, zoom: f64) -> u32 {
    ((font_size as f64 * 0.5 * zoom) as u32).max(1)
}

impl RenderFrame {
    pub fn empty(view: ViewTransform) -> Self {
        Self {
            shapes: Vec::new(),
            view,
            grid: Vec::new(),
            selection_bbox: None,
        }
    }

    /// Build the display list for all visible layers in z-order.
    pub fn build(
        project: &Project,
        view: &ViewTransform,
        selected: &HashSet<ShapeId>,
        selection_bounds: Option<BBox>,
        grid_major: u32,
    ) -> Self {
        let mut frame = Self::empty(*view);
        frame.grid = grid_lines(project.resolution, view, grid_major);
        for layer in project.layers.iter().filter(|l| l.visible) {
            for shape in &layer.shapes {
                if !shape.is_drawable() {
                    continue;
                }
                frame.shapes.push(RenderShape {
                    shape_id: shape.id.clone(),
                    kind: shape.kind,
                    geometry: render_geometry(shape, view),
                    stroke: layer.effective_stroke(shape).to_string(),
                    fill: layer.effective_fill(shape).map(|f| f.to_string()),
                    stroke_width: if shape.kind.is_circle() {
                        1
                    } else {
                        shape.stroke_width.max(1)
                    },
                    selected: selected.contains(&shape.id),
                });
            }
        }
        frame.selection_bbox = selection_bounds.map(|bb| {
            let min = view.world_to_screen(bb.min);
            let max = view.world_to_screen(bb.max);
            [min.x, min.y, max.x, max.y]
        });
        frame
    }
}

fn render_geometry(shape: &Shape, view: &ViewTransform) -> RenderGeometry {
    let pts: Vec<Point> = shape
        .points
        .iter()
        .map(|p| view.world_to_screen(*p))
        .collect();
    match shape.kind {
        ShapeKind::Line => RenderGeometry::Line {
            from: pts[0],
            to: pts[1],
        },
        ShapeKind::Rect | ShapeKind::Box => {
            let bb = BBox::from_corners(pts[0], pts[1]);
            RenderGeometry::Rect {
                min: bb.min,
                max: bb.max,
            }
        }
        ShapeKind::Circle | ShapeKind::CircleFilled => {
            let bb = BBox::from_corners(pts[0], pts[1]);
            RenderGeometry::Ellipse {
                min: bb.min,
                max: bb.max,
            }
        }
        ShapeKind::Poly => RenderGeometry::Polygon { vertices: pts },
        ShapeKind::Text => RenderGeometry::Text {
            anchor: pts[0],
            text: shape.text.clone(),
            font: if shape.font.is_empty() {
                DEFAULT_DISPLAY_FONT.to_string()
            } else {
                shape.font.clone()
            },
            size: text_display_size(shape.font_size, view.zoom),
            align: shape.align,
        },
    }
}

/// Emphasis level of a grid line, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridLevel {
    Eighth,
    Quarter,
    Half,
    Major,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub level: GridLevel,
    pub from: Point,
    pub to: Point,
}

/// Grid subdivisions of the major step, finest first. Only subdivisions that
/// divide the major step evenly are included; the major step is always last.
pub fn grid_steps(major: u32) -> Vec<(u32, GridLevel)> {
    let base = major.max(2);
    let mut steps = Vec::with_capacity(4);
    if base % 8 == 0 {
        steps.push((base / 8, GridLevel::Eighth));
    }
    if base % 4 == 0 {
        steps.push((base / 4, GridLevel::Quarter));
    }
    if base % 2 == 0 {
        steps.push((base / 2, GridLevel::Half));
    }
    steps.push((base, GridLevel::Major));
    steps
}

/// Screen-space grid lines over the visible part of the resolution rectangle,
/// laid out symmetrically about the canvas center, plus the center cross-hair.
pub fn grid_lines(resolution: (u32, u32), view: &ViewTransform, major: u32) -> Vec<GridLine> {
    let (res_w, res_h) = (resolution.0 as f64, resolution.1 as f64);
    let visible = view.visible_world_bounds();
    let min_x = visible.min.x.floor().max(0.0);
    let min_y = visible.min.y.floor().max(0.0);
    let max_x = visible.max.x.ceil().min(res_w);
    let max_y = visible.max.y.ceil().min(res_h);
    let (center_x, center_y) = (res_w / 2.0, res_h / 2.0);

    let mut lines = Vec::new();
    if min_x > max_x || min_y > max_y {
        return lines;
    }
    for (step, level) in grid_steps(major) {
        let step = step as f64;
        let mut x = center_x + ((min_x - center_x) / step).floor() * step;
        while x <= max_x {
            if x >= min_x {
                lines.push(GridLine {
                    level,
                    from: view.world_to_screen(Point::new(x, min_y)),
                    to: view.world_to_screen(Point::new(x, max_y)),
                });
            }
            x += step;
        }
        let mut y = center_y + ((min_y - center_y) / step).floor() * step;
        while y <= max_y {
            if y >= min_y {
                lines.push(GridLine {
                    level,
                    from: view.world_to_screen(Point::new(min_x, y)),
                    to: view.world_to_screen(Point::new(max_x, y)),
                });
            }
            y += step;
        }
    }
    lines.push(GridLine {
        level: GridLevel::Center,
        from: view.world_to_screen(Point::new(0.0, center_y)),
        to: view.world_to_screen(Point::new(res_w, center_y)),
    });
    lines.push(GridLine {
        level: GridLevel::Center,
        from: view.world_to_screen(Point::new(center_x, 0.0)),
        to: view.world_to_screen(Point::new(center_x, res_h)),
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use egphud_core::Layer;

    fn project_with(shapes: Vec<Shape>) -> Project {
        let mut p = Project::new((1920, 1080));
        for s in shapes {
            p.layers[0].add_shape(s);
        }
        p
    }

    fn unit_view() -> ViewTransform {
        let mut v = ViewTransform::new(1920.0, 1080.0);
        v.fit_to_view((1920, 1080));
        v
    }

    #[test]
    fn test_grid_steps() {
        let steps: Vec<u32> = grid_steps(120).iter().map(|s| s.0).collect();
        assert_eq!(steps, vec![15, 30, 60, 120]);
        let steps: Vec<u32> = grid_steps(6).iter().map(|s| s.0).collect();
        assert_eq!(steps, vec![3, 6]);
        let steps: Vec<u32> = grid_steps(7).iter().map(|s| s.0).collect();
        assert_eq!(steps, vec![7]);
    }

    #[test]
    fn test_grid_symmetric_about_center() {
        let view = unit_view();
        let lines = grid_lines((1920, 1080), &view, 120);
        let verticals: Vec<f64> = lines
            .iter()
            .filter(|l| l.level == GridLevel::Major && l.from.x == l.to.x)
            .map(|l| l.from.x)
            .collect();
        assert!(verticals.contains(&960.0));
        assert!(verticals.contains(&840.0));
        assert!(verticals.contains(&1080.0));
        assert_eq!(
            lines.iter().filter(|l| l.level == GridLevel::Center).count(),
            2
        );
    }

    #[test]
    fn test_layer_override_and_hidden_layers() {
        let rect = Shape::new(
            ShapeKind::Rect,
            vec![Point::new(10.0, 10.0), Point::new(20.0, 20.0)],
            "#00FF00",
            3,
        );
        let mut p = project_with(vec![rect.clone()]);
        p.layers[0].color = Some("#FF0000".into());
        let mut hidden = Layer::new("hidden");
        hidden.visible = false;
        hidden.add_shape(rect.duplicate_with_new_id());
        p.layers.push(hidden);

        let frame = RenderFrame::build(&p, &unit_view(), &HashSet::new(), None, 120);
        assert_eq!(frame.shapes.len(), 1);
        assert_eq!(frame.shapes[0].stroke, "#FF0000");
        assert_eq!(frame.shapes[0].fill, None);
        assert_eq!(frame.shapes[0].stroke_width, 3);
        // Override does not touch the model.
        assert_eq!(p.layers[0].shapes[0].stroke, "#00FF00");
    }

    #[test]
    fn test_undrawable_shapes_skipped_and_selection_flagged() {
        let poly = Shape::new(
            ShapeKind::Poly,
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            "#FFFFFF",
            1,
        );
        let circle = Shape::new(
            ShapeKind::CircleFilled,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            "#FFFFFF",
            1,
        )
        .with_fill(Some("#0A84FF"));
        let id = circle.id.clone();
        let p = project_with(vec![poly, circle]);
        let selected: HashSet<ShapeId> = [id.clone()].into_iter().collect();
        let frame = RenderFrame::build(&p, &unit_view(), &selected, None, 120);
        assert_eq!(frame.shapes.len(), 1);
        assert_eq!(frame.shapes[0].shape_id, id);
        assert!(frame.shapes[0].selected);
        assert_eq!(frame.shapes[0].fill.as_deref(), Some("#0A84FF"));
        assert_eq!(frame.shapes[0].stroke_width, 1);
    }

    #[test]
    fn test_text_display_size() {
        assert_eq!(text_display_size(18, 1.0), 9);
        assert_eq!(text_display_size(18, 0.1), 1);
        assert_eq!(text_display_size(18, 2.0), 18);
    }
}
