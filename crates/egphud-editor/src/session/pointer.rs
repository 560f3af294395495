use egphud_core::{BBox, Point, Shape, ShapeId, ShapeKind};

use super::{DragState, EditorSession};
use crate::events::{EditorEvent, Modifiers, Tool};
use crate::hit_test::{self, ScaleHandle};
use crate::snapping::{snap_to_grid, snap_to_text_guides};

/// Marquee drags shorter than this on both axes count as a click, screen pixels.
const CLICK_SCREEN_PX: f64 = 4.0;

/// Circle corners; with ctrl the press point is the center.
fn drag_corners(tool: Tool, start: Point, world: Point, mods: Modifiers) -> (Point, Point) {
    if tool.is_circle() && mods.ctrl {
        let (dx, dy) = (world.x - start.x, world.y - start.y);
        (start.translate(-dx, -dy), start.translate(dx, dy))
    } else {
        (start, world)
    }
}

impl EditorSession {
    /// Ctrl snaps to the grid, then to nearby text guides (circles excepted).
    fn snap_world(&self, world: Point, mods: Modifiers) -> Point {
        if !mods.ctrl {
            return world;
        }
        let snapped = snap_to_grid(world, self.project.resolution, self.grid.major);
        if self.tool.is_circle() {
            return snapped;
        }
        snap_to_text_guides(snapped, &self.project, self.view.zoom, self.measure.as_ref())
    }

    pub(super) fn active_layer_locked(&self) -> bool {
        self.project.active_layer().map_or(true, |l| l.locked)
    }

    fn snapshot_selection(&self) -> Vec<(ShapeId, Vec<Point>)> {
        self.project
            .all_shapes()
            .filter(|s| self.selection.contains(&s.id))
            .map(|s| (s.id.clone(), s.points.clone()))
            .collect()
    }

    fn restore_points(&mut self, originals: &[(ShapeId, Vec<Point>)]) {
        for (id, points) in originals {
            if let Some(shape) = self.project.find_shape_mut(id) {
                shape.points = points.clone();
            }
        }
    }

    /// Add a shape to the active layer, select it and record the edit.
    fn insert_created(&mut self, shape: Shape) {
        let Some(layer) = self.project.active_layer_mut() else {
            return;
        };
        let id = shape.id.clone();
        log::debug!("Created {:?} shape {}", shape.kind, id);
        layer.add_shape(shape);
        self.events.push(EditorEvent::ShapeCreated(id.clone()));
        self.set_selection([id]);
        self.commit();
    }

    fn begin_vertex_drag(&mut self, shape_id: ShapeId, index: usize) {
        let Some(start) = self
            .project
            .find_shape(&shape_id)
            .and_then(|s| s.points.get(index).copied())
        else {
            return;
        };
        self.set_selection([shape_id.clone()]);
        self.drag = DragState::Vertex {
            shape_id,
            index,
            start,
        };
    }

    pub fn pointer_down(&mut self, screen: Point, mods: Modifiers) {
        if self.tool == Tool::Select {
            self.select_pointer_down(screen, mods);
            return;
        }
        if self.active_layer_locked() {
            log::debug!("Active layer is locked; ignoring {:?}", self.tool);
            return;
        }
        let world = self.snap_world(self.view.screen_to_world(screen), mods);
        match self.tool {
            Tool::Poly => self.poly_points.push(world),
            Tool::Text => self.create_text(world),
            _ => {
                self.drag = DragState::Draw {
                    start: world,
                    p1: world,
                    p2: world,
                }
            }
        }
    }

    fn select_pointer_down(&mut self, screen: Point, mods: Modifiers) {
        // A lone selected line is edited by its endpoints, not scaled.
        let lone_line = self.selection.len() == 1
            && self
                .selected_shapes()
                .first()
                .map_or(false, |s| s.kind == ShapeKind::Line);
        if lone_line {
            if let Some((id, index)) =
                hit_test::find_vertex(&self.project, &self.selection, &self.view, screen)
            {
                self.begin_vertex_drag(id, index);
                return;
            }
        }

        if let Some(bounds) = self.selection_bounds() {
            if let Some(handle) = hit_test::find_scale_handle(&bounds, &self.view, screen) {
                self.drag = DragState::Scale {
                    handle,
                    bounds,
                    originals: self.snapshot_selection(),
                };
                return;
            }
        }

        if let Some((id, index)) =
            hit_test::find_vertex(&self.project, &self.selection, &self.view, screen)
        {
            self.begin_vertex_drag(id, index);
            return;
        }

        if hit_test::hits_selection_body(
            &self.project,
            &self.selection,
            &self.view,
            screen,
            self.measure.as_ref(),
        ) {
            self.drag = DragState::Move {
                anchor: self.view.screen_to_world(screen),
                originals: self.snapshot_selection(),
            };
            return;
        }

        match hit_test::pick_shape(&self.project, &self.view, screen, self.measure.as_ref()) {
            Some(id) if mods.shift => self.toggle_selected(id),
            Some(id) => self.set_selection([id]),
            None => {
                self.clear_selection();
                self.drag = DragState::Marquee {
                    start: screen,
                    current: screen,
                };
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Point, mods: Modifiers) {
        let world = self.view.screen_to_world(screen);
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Idle => {}
            DragState::Draw { start, .. } => {
                let (p1, p2) = drag_corners(self.tool, start, self.snap_world(world, mods), mods);
                self.drag = DragState::Draw { start, p1, p2 };
            }
            DragState::Marquee { start, .. } => {
                self.drag = DragState::Marquee {
                    start,
                    current: screen,
                };
            }
            DragState::Move { anchor, originals } => {
                let target = self.snap_world(world, mods);
                let (mut dx, mut dy) = (target.x - anchor.x, target.y - anchor.y);
                if mods.shift {
                    if dx.abs() >= dy.abs() {
                        dy = 0.0;
                    } else {
                        dx = 0.0;
                    }
                }
                for (id, points) in &originals {
                    if let Some(shape) = self.project.find_shape_mut(id) {
                        shape.points = points.iter().map(|p| p.translate(dx, dy)).collect();
                    }
                }
                self.drag = DragState::Move { anchor, originals };
            }
            DragState::Scale {
                handle,
                bounds,
                originals,
            } => {
                self.scale_selection(handle, &bounds, &originals, world);
                self.drag = DragState::Scale {
                    handle,
                    bounds,
                    originals,
                };
            }
            DragState::Vertex {
                shape_id,
                index,
                start,
            } => {
                let mut target = self.snap_world(world, mods);
                if mods.shift {
                    if (target.x - start.x).abs() >= (target.y - start.y).abs() {
                        target.y = start.y;
                    } else {
                        target.x = start.x;
                    }
                }
                if let Some(p) = self
                    .project
                    .find_shape_mut(&shape_id)
                    .and_then(|s| s.points.get_mut(index))
                {
                    *p = target;
                }
                self.drag = DragState::Vertex {
                    shape_id,
                    index,
                    start,
                };
            }
        }
    }

    /// Scale originals about the bounds center so the grabbed corner follows the pointer.
    fn scale_selection(
        &mut self,
        handle: ScaleHandle,
        bounds: &BBox,
        originals: &[(ShapeId, Vec<Point>)],
        world: Point,
    ) {
        let center = bounds.center();
        let old = handle.corner(bounds);
        let old_dx = (old.x - center.x).abs().max(1e-6);
        let old_dy = (old.y - center.y).abs().max(1e-6);
        let new_dx = (world.x - center.x).abs().max(1e-6);
        let new_dy = (world.y - center.y).abs().max(1e-6);
        let (sx, sy) = (new_dx / old_dx, new_dy / old_dy);
        for (id, points) in originals {
            if let Some(shape) = self.project.find_shape_mut(id) {
                shape.points = points
                    .iter()
                    .map(|p| {
                        Point::new(
                            (p.x - center.x) * sx + center.x,
                            (p.y - center.y) * sy + center.y,
                        )
                    })
                    .collect();
            }
        }
    }

    pub fn pointer_up(&mut self, screen: Point, mods: Modifiers) {
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Idle => {}
            DragState::Move { .. } | DragState::Scale { .. } | DragState::Vertex { .. } => {
                self.commit();
            }
            DragState::Marquee { start, .. } => self.finish_marquee(start, screen),
            DragState::Draw { start, .. } => {
                let world = self.snap_world(self.view.screen_to_world(screen), mods);
                let (p1, p2) = drag_corners(self.tool, start, world, mods);
                self.finish_drag_shape(p1, p2);
            }
        }
    }

    fn finish_marquee(&mut self, start: Point, end: Point) {
        if (end.x - start.x).abs() < CLICK_SCREEN_PX && (end.y - start.y).abs() < CLICK_SCREEN_PX {
            self.clear_selection();
            return;
        }
        let region = BBox::from_corners(
            self.view.screen_to_world(start),
            self.view.screen_to_world(end),
        );
        let hits = hit_test::marquee_select(
            &self.project,
            &region,
            self.view.zoom,
            self.measure.as_ref(),
        );
        self.set_selection(hits);
    }

    fn finish_drag_shape(&mut self, p1: Point, p2: Point) {
        if self.active_layer_locked() || p1 == p2 {
            return;
        }
        let Some(kind) = self.tool.drag_kind() else {
            return;
        };
        let d = &self.defaults;
        let fill = if kind.is_filled() { d.fill.as_deref() } else { None };
        let shape = Shape::new(kind, vec![p1, p2], &d.stroke, d.stroke_width).with_fill(fill);
        self.insert_created(shape);
    }

    fn create_text(&mut self, at: Point) {
        let Some(text) = self.prompt.prompt_text(&self.defaults.text) else {
            return;
        };
        let d = &self.defaults;
        let shape = Shape::new(ShapeKind::Text, vec![at], &d.stroke, d.stroke_width)
            .with_text(&text, &d.font, d.font_size, d.align);
        self.insert_created(shape);
    }

    pub fn double_click(&mut self, _screen: Point) {
        if self.tool == Tool::Poly {
            self.finish_poly();
        }
    }

    /// Close the polygon being drawn. Fewer than three points discards it.
    pub(super) fn finish_poly(&mut self) {
        if self.tool != Tool::Poly {
            return;
        }
        let points = std::mem::take(&mut self.poly_points);
        if points.len() < ShapeKind::Poly.min_points() || self.active_layer_locked() {
            return;
        }
        let d = &self.defaults;
        let shape = Shape::new(ShapeKind::Poly, points, &d.stroke, d.stroke_width)
            .with_fill(d.fill.as_deref());
        self.insert_created(shape);
    }

    /// Drop temporary geometry. Drags already applied to shapes are rolled back
    /// to the last committed state.
    pub(super) fn cancel_interaction(&mut self) {
        self.poly_points.clear();
        match std::mem::replace(&mut self.drag, DragState::Idle) {
            DragState::Move { originals, .. } | DragState::Scale { originals, .. } => {
                self.restore_points(&originals);
            }
            DragState::Vertex {
                shape_id,
                index,
                start,
            } => {
                if let Some(p) = self
                    .project
                    .find_shape_mut(&shape_id)
                    .and_then(|s| s.points.get_mut(index))
                {
                    *p = start;
                }
            }
            _ => {}
        }
    }
}
