use egphud_core::{Point, Project, ShapeKind};
use egphud_renderer::grid_steps;

use crate::measure::{text_bounds, TextMeasure};

/// Magnet radius around text guides, in screen pixels.
pub const MAGNET_SCREEN_PX: f64 = 6.0;

/// Snap to the finest grid step, measured from the center of the resolution.
/// Exact midpoints round to the even step.
pub fn snap_to_grid(p: Point, resolution: (u32, u32), major: u32) -> Point {
    let step = grid_steps(major)
        .first()
        .map(|(s, _)| *s as f64)
        .unwrap_or(1.0)
        .max(1.0);
    let cx = resolution.0 as f64 / 2.0;
    let cy = resolution.1 as f64 / 2.0;
    Point::new(
        cx + ((p.x - cx) / step).round_ties_even() * step,
        cy + ((p.y - cy) / step).round_ties_even() * step,
    )
}

/// Pull each axis independently onto the nearest text guide within reach.
///
/// Guides are the left, center and right edges (and top, middle, bottom) of
/// every text shape in a visible layer.
pub fn snap_to_text_guides(
    p: Point,
    project: &Project,
    zoom: f64,
    measure: &dyn TextMeasure,
) -> Point {
    let threshold = MAGNET_SCREEN_PX / zoom.max(0.001);
    let mut best_x: Option<(f64, f64)> = None;
    let mut best_y: Option<(f64, f64)> = None;

    let texts = project
        .layers
        .iter()
        .filter(|l| l.visible)
        .flat_map(|l| l.shapes.iter())
        .filter(|s| s.kind == ShapeKind::Text);

    for shape in texts {
        let Some(b) = text_bounds(shape, zoom, measure) else {
            continue;
        };
        let c = b.center();
        for gx in [b.min.x, c.x, b.max.x] {
            let d = (p.x - gx).abs();
            if d <= threshold && best_x.map_or(true, |(bd, _)| d <= bd) {
                best_x = Some((d, gx));
            }
        }
        for gy in [b.min.y, c.y, b.max.y] {
            let d = (p.y - gy).abs();
            if d <= threshold && best_y.map_or(true, |(bd, _)| d <= bd) {
                best_y = Some((d, gy));
            }
        }
    }

    Point::new(
        best_x.map_or(p.x, |(_, g)| g),
        best_y.map_or(p.y, |(_, g)| g),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::ApproxTextMeasure;
    use egphud_core::{Align, Shape};

    #[test]
    fn test_grid_snap_relative_to_center() {
        // major 120 -> finest step 15
        let p = snap_to_grid(Point::new(967.0, 547.0), (1920, 1080), 120);
        assert_eq!(p, Point::new(960.0, 540.0));
        let p = snap_to_grid(Point::new(969.0, 531.0), (1920, 1080), 120);
        assert_eq!(p, Point::new(975.0, 525.0));
    }

    #[test]
    fn test_grid_snap_ties_round_to_even_step() {
        let p = snap_to_grid(Point::new(967.5, 547.5), (1920, 1080), 120);
        assert_eq!(p, Point::new(960.0, 540.0));
        let p = snap_to_grid(Point::new(982.5, 532.5), (1920, 1080), 120);
        assert_eq!(p, Point::new(990.0, 540.0));
        let p = snap_to_grid(Point::new(952.5, 517.5), (1920, 1080), 120);
        assert_eq!(p, Point::new(960.0, 510.0));
    }

    #[test]
    fn test_grid_snap_odd_major() {
        // major 7 has no finer divisor
        let p = snap_to_grid(Point::new(964.0, 540.0), (1920, 1080), 7);
        assert_eq!(p, Point::new(967.0, 540.0));
    }

    fn project_with_text(hidden: bool) -> Project {
        let mut project = Project::new((1920, 1080));
        project.layers[0].visible = !hidden;
        project.layers[0].add_shape(
            Shape::new(ShapeKind::Text, vec![Point::new(100.0, 50.0)], "#FFFFFF", 1)
                .with_text("ABCD", "Arial", 20, Align::Left),
        );
        project
    }

    #[test]
    fn test_magnet_snaps_to_closest_guide() {
        // bounds at zoom 1: x 99..125 (center 112), y 44..56 (center 50)
        let project = project_with_text(false);
        let p = snap_to_text_guides(Point::new(114.0, 58.0), &project, 1.0, &ApproxTextMeasure);
        assert_eq!(p, Point::new(112.0, 56.0));
    }

    #[test]
    fn test_magnet_ignores_far_points_and_hidden_layers() {
        let project = project_with_text(false);
        let far = Point::new(300.0, 300.0);
        assert_eq!(
            snap_to_text_guides(far, &project, 1.0, &ApproxTextMeasure),
            far
        );

        let hidden = project_with_text(true);
        let near = Point::new(114.0, 58.0);
        assert_eq!(
            snap_to_text_guides(near, &hidden, 1.0, &ApproxTextMeasure),
            near
        );
    }
}
