//! Pointer hit queries against the active layer and the current selection.

use std::collections::HashSet;

use egphud_core::geometry::polygon_contains;
use egphud_core::spatial::SpatialIndex;
use egphud_core::{BBox, Point, Project, Shape, ShapeId, ShapeKind};
use egphud_renderer::ViewTransform;

use crate::measure::{shape_bounds, text_bounds, TextMeasure};

/// Half-size of a scale handle square, screen pixels.
pub const HANDLE_SCREEN_PX: f64 = 8.0;
/// Vertex grab radius, screen pixels.
pub const VERTEX_SCREEN_PX: f64 = 12.0;
/// Slack around the selection box for starting a move, screen pixels.
pub const BODY_SCREEN_PX: f64 = 6.0;
/// Pick tolerance around outlines, screen pixels.
pub const PICK_SCREEN_PX: f64 = 2.0;

/// Corner of the selection box being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleHandle {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl ScaleHandle {
    const ALL: [ScaleHandle; 4] = [
        ScaleHandle::TopLeft,
        ScaleHandle::TopRight,
        ScaleHandle::BottomRight,
        ScaleHandle::BottomLeft,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, ScaleHandle::TopLeft | ScaleHandle::BottomLeft)
    }

    pub fn is_top(self) -> bool {
        matches!(self, ScaleHandle::TopLeft | ScaleHandle::TopRight)
    }

    /// The handle's corner of `bounds`.
    pub fn corner(self, bounds: &BBox) -> Point {
        Point::new(
            if self.is_left() { bounds.min.x } else { bounds.max.x },
            if self.is_top() { bounds.min.y } else { bounds.max.y },
        )
    }
}

/// Union of the rendered bounds of every selected shape.
pub fn selection_bounds(
    project: &Project,
    selection: &HashSet<ShapeId>,
    zoom: f64,
    measure: &dyn TextMeasure,
) -> Option<BBox> {
    project
        .all_shapes()
        .filter(|s| selection.contains(&s.id))
        .filter_map(|s| shape_bounds(s, zoom, measure))
        .reduce(|a, b| a.union(&b))
}

/// Scale handle under the pointer, if any.
pub fn find_scale_handle(bounds: &BBox, view: &ViewTransform, screen: Point) -> Option<ScaleHandle> {
    ScaleHandle::ALL.into_iter().find(|h| {
        let c = view.world_to_screen(h.corner(bounds));
        (screen.x - c.x).abs() <= HANDLE_SCREEN_PX && (screen.y - c.y).abs() <= HANDLE_SCREEN_PX
    })
}

/// First vertex in the visible active layer within grab range.
///
/// With a non-empty selection only selected shapes are considered.
pub fn find_vertex(
    project: &Project,
    selection: &HashSet<ShapeId>,
    view: &ViewTransform,
    screen: Point,
) -> Option<(ShapeId, usize)> {
    let layer = project.active_layer().filter(|l| l.visible)?;
    let world = view.screen_to_world(screen);
    let threshold = view.screen_len_to_world(VERTEX_SCREEN_PX);
    layer
        .shapes
        .iter()
        .filter(|s| selection.is_empty() || selection.contains(&s.id))
        .find_map(|s| {
            s.points
                .iter()
                .position(|p| p.distance_to(&world) <= threshold)
                .map(|i| (s.id.clone(), i))
        })
}

/// Whether the pointer lands on the current selection (to start a move).
pub fn hits_selection_body(
    project: &Project,
    selection: &HashSet<ShapeId>,
    view: &ViewTransform,
    screen: Point,
    measure: &dyn TextMeasure,
) -> bool {
    let Some(bounds) = selection_bounds(project, selection, view.zoom, measure) else {
        return false;
    };
    let world = view.screen_to_world(screen);
    let tol = view.screen_len_to_world(BODY_SCREEN_PX);
    if bounds.expand(tol).contains_point(&world) {
        return true;
    }
    if selection.len() != 1 {
        return false;
    }
    project
        .all_shapes()
        .find(|s| selection.contains(&s.id))
        .filter(|s| s.kind == ShapeKind::Line && s.points.len() >= 2)
        .map_or(false, |s| {
            world.distance_to_segment(&s.points[0], &s.points[1]) <= tol
        })
}

fn near_edges(vertices: &[Point], p: &Point, tol: f64) -> bool {
    (0..vertices.len()).any(|i| {
        let a = &vertices[i];
        let b = &vertices[(i + 1) % vertices.len()];
        p.distance_to_segment(a, b) <= tol
    })
}

fn shape_hit(shape: &Shape, p: &Point, tol: f64, zoom: f64, measure: &dyn TextMeasure) -> bool {
    let reach = tol + shape.stroke_width as f64 / 2.0;
    match shape.kind {
        ShapeKind::Line => {
            shape.points.len() >= 2 && p.distance_to_segment(&shape.points[0], &shape.points[1]) <= reach
        }
        ShapeKind::Rect => shape
            .point_bounds()
            .map_or(false, |b| near_edges(&b.corners(), p, reach)),
        ShapeKind::Box => shape
            .point_bounds()
            .map_or(false, |b| b.expand(tol).contains_point(p)),
        ShapeKind::Circle | ShapeKind::CircleFilled => {
            let Some(b) = shape.point_bounds() else {
                return false;
            };
            let c = b.center();
            let (rx, ry) = (b.width() / 2.0, b.height() / 2.0);
            if rx < 1e-9 || ry < 1e-9 {
                return b.expand(reach).contains_point(p);
            }
            let d = (((p.x - c.x) / rx).powi(2) + ((p.y - c.y) / ry).powi(2)).sqrt();
            if shape.kind == ShapeKind::CircleFilled {
                d <= 1.0 + reach / rx.min(ry)
            } else {
                (d - 1.0).abs() * rx.min(ry) <= reach
            }
        }
        ShapeKind::Poly => {
            polygon_contains(&shape.points, p) || near_edges(&shape.points, p, reach)
        }
        ShapeKind::Text => text_bounds(shape, zoom, measure)
            .map_or(false, |b| b.contains_point(p)),
    }
}

/// Top-most shape of the visible active layer under the pointer.
pub fn pick_shape(
    project: &Project,
    view: &ViewTransform,
    screen: Point,
    measure: &dyn TextMeasure,
) -> Option<ShapeId> {
    let layer = project.active_layer().filter(|l| l.visible)?;
    let world = view.screen_to_world(screen);
    let tol = view.screen_len_to_world(PICK_SCREEN_PX);
    // Pick bounds include half the stroke so thick outlines stay grabbable.
    let index = SpatialIndex::for_layer(layer, |s| {
        shape_bounds(s, view.zoom, measure).map(|b| b.expand(s.stroke_width as f64 / 2.0))
    });
    index
        .near(world, tol)
        .into_iter()
        .filter_map(|e| layer.get_shape(&e.id))
        .find(|s| shape_hit(s, &world, tol, view.zoom, measure))
        .map(|s| s.id.clone())
}

/// Shapes of the visible active layer whose bounds intersect the world rectangle.
pub fn marquee_select(
    project: &Project,
    region: &BBox,
    zoom: f64,
    measure: &dyn TextMeasure,
) -> Vec<ShapeId> {
    let Some(layer) = project.active_layer().filter(|l| l.visible) else {
        return Vec::new();
    };
    SpatialIndex::for_layer(layer, |s| shape_bounds(s, zoom, measure))
        .within(region)
        .into_iter()
        .map(|e| e.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::ApproxTextMeasure;

    fn view() -> ViewTransform {
        let mut v = ViewTransform::new(1920.0, 1080.0);
        v.fit_to_view((1920, 1080));
        v
    }

    fn shape(kind: ShapeKind, pts: &[(f64, f64)]) -> Shape {
        Shape::new(
            kind,
            pts.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            "#FFFFFF",
            1,
        )
    }

    fn fixture() -> (Project, Vec<ShapeId>) {
        let mut project = Project::new((1920, 1080));
        let shapes = vec![
            shape(ShapeKind::Box, &[(100.0, 100.0), (200.0, 200.0)]),
            shape(ShapeKind::Rect, &[(300.0, 300.0), (400.0, 400.0)]),
            shape(ShapeKind::Line, &[(500.0, 100.0), (700.0, 100.0)]),
            shape(ShapeKind::Circle, &[(800.0, 800.0), (900.0, 900.0)]),
        ];
        let ids = shapes.iter().map(|s| s.id.clone()).collect();
        for s in shapes {
            project.layers[0].add_shape(s);
        }
        (project, ids)
    }

    #[test]
    fn test_pick_filled_and_outline() {
        let (project, ids) = fixture();
        let v = view();
        let m = ApproxTextMeasure;
        assert_eq!(pick_shape(&project, &v, Point::new(150.0, 150.0), &m), Some(ids[0].clone()));
        // inside an outline rect is empty space
        assert_eq!(pick_shape(&project, &v, Point::new(350.0, 350.0), &m), None);
        assert_eq!(pick_shape(&project, &v, Point::new(301.0, 350.0), &m), Some(ids[1].clone()));
        assert_eq!(pick_shape(&project, &v, Point::new(600.0, 101.0), &m), Some(ids[2].clone()));
        assert_eq!(pick_shape(&project, &v, Point::new(850.0, 800.5), &m), Some(ids[3].clone()));
        assert_eq!(pick_shape(&project, &v, Point::new(850.0, 850.0), &m), None);
    }

    #[test]
    fn test_pick_prefers_topmost() {
        let (mut project, _) = fixture();
        let top = shape(ShapeKind::Box, &[(150.0, 150.0), (250.0, 250.0)]);
        let top_id = top.id.clone();
        project.layers[0].add_shape(top);
        let hit = pick_shape(&project, &view(), Point::new(175.0, 175.0), &ApproxTextMeasure);
        assert_eq!(hit, Some(top_id));
    }

    #[test]
    fn test_pick_ignores_hidden_active_layer() {
        let (mut project, _) = fixture();
        project.layers[0].visible = false;
        assert!(pick_shape(&project, &view(), Point::new(150.0, 150.0), &ApproxTextMeasure).is_none());
    }

    #[test]
    fn test_marquee_intersection() {
        let (project, ids) = fixture();
        let region = BBox::from_corners(Point::new(150.0, 150.0), Point::new(350.0, 350.0));
        let hits = marquee_select(&project, &region, 1.0, &ApproxTextMeasure);
        assert_eq!(hits, vec![ids[0].clone(), ids[1].clone()]);
    }

    #[test]
    fn test_vertex_restricted_to_selection() {
        let (project, ids) = fixture();
        let v = view();
        let none = HashSet::new();
        assert_eq!(
            find_vertex(&project, &none, &v, Point::new(305.0, 305.0)),
            Some((ids[1].clone(), 0))
        );
        let only_box: HashSet<ShapeId> = [ids[0].clone()].into_iter().collect();
        assert_eq!(find_vertex(&project, &only_box, &v, Point::new(305.0, 305.0)), None);
        assert_eq!(
            find_vertex(&project, &only_box, &v, Point::new(195.0, 205.0)),
            Some((ids[0].clone(), 1))
        );
    }

    #[test]
    fn test_scale_handle_and_body() {
        let (project, ids) = fixture();
        let v = view();
        let m = ApproxTextMeasure;
        let sel: HashSet<ShapeId> = [ids[0].clone()].into_iter().collect();
        let bounds = selection_bounds(&project, &sel, 1.0, &m).unwrap();
        assert_eq!(
            find_scale_handle(&bounds, &v, Point::new(206.0, 95.0)),
            Some(ScaleHandle::TopRight)
        );
        assert_eq!(find_scale_handle(&bounds, &v, Point::new(150.0, 150.0)), None);
        assert!(hits_selection_body(&project, &sel, &v, Point::new(205.0, 150.0), &m));
        assert!(!hits_selection_body(&project, &sel, &v, Point::new(210.0, 150.0), &m));
    }

    #[test]
    fn test_body_hit_on_single_line() {
        let (project, ids) = fixture();
        let sel: HashSet<ShapeId> = [ids[2].clone()].into_iter().collect();
        assert!(hits_selection_body(
            &project,
            &sel,
            &view(),
            Point::new(600.0, 105.0),
            &ApproxTextMeasure
        ));
    }
}
