use egphud_core::{Point, Shape, ShapeId};

use super::EditorSession;
use crate::events::{EditorEvent, MirrorAxis};
use crate::settings::{SettingChange, PASTE_OFFSET};

fn apply_change(shape: &mut Shape, change: &SettingChange) {
    match change {
        SettingChange::Stroke(c) => shape.stroke = c.clone(),
        SettingChange::StrokeWidth(w) => shape.set_stroke_width(*w),
        SettingChange::Fill(f) => shape.fill = f.clone().filter(|f| !f.is_empty()),
        SettingChange::Text(t) => shape.text = t.clone(),
        SettingChange::Font(f) => shape.font = f.clone(),
        SettingChange::FontSize(s) => shape.font_size = (*s).max(1),
        SettingChange::Align(a) => shape.align = *a,
    }
}

impl EditorSession {
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let mut removed = 0;
        for layer in &mut self.project.layers {
            let before = layer.shapes.len();
            layer.shapes.retain(|s| !self.selection.contains(&s.id));
            removed += before - layer.shapes.len();
        }
        self.clear_selection();
        self.commit();
        removed
    }

    /// Copy the selected shapes to the internal clipboard.
    pub fn copy_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        self.clipboard = self.selected_shapes();
        self.clipboard.len()
    }

    /// Paste clipboard copies into the active layer, offset and selected.
    pub fn paste(&mut self) -> usize {
        if self.clipboard.is_empty() || self.active_layer_locked() {
            return 0;
        }
        let copies: Vec<Shape> = self
            .clipboard
            .iter()
            .map(|s| {
                let mut copy = s.duplicate_with_new_id();
                copy.translate(PASTE_OFFSET.0, PASTE_OFFSET.1);
                copy
            })
            .collect();
        let ids: Vec<ShapeId> = copies.iter().map(|s| s.id.clone()).collect();
        let Some(layer) = self.project.active_layer_mut() else {
            return 0;
        };
        layer.shapes.extend(copies);
        self.set_selection(ids.iter().cloned());
        self.commit();
        ids.len()
    }

    /// Reflect the selection across the resolution midline. With `copy` the
    /// reflections are new shapes appended to each source layer and selected.
    pub fn mirror_selected(&mut self, axis: MirrorAxis, copy: bool) {
        if self.selection.is_empty() {
            return;
        }
        let resolution = self.project.resolution;
        let mut new_ids = Vec::new();
        for layer in &mut self.project.layers {
            let mut mirrored = Vec::new();
            for shape in layer.shapes.iter_mut() {
                if !self.selection.contains(&shape.id) {
                    continue;
                }
                let points = shape
                    .points
                    .iter()
                    .map(|p| axis.reflect(*p, resolution))
                    .collect();
                if copy {
                    let mut dup = shape.duplicate_with_new_id();
                    dup.points = points;
                    new_ids.push(dup.id.clone());
                    mirrored.push(dup);
                } else {
                    shape.points = points;
                }
            }
            layer.shapes.extend(mirrored);
        }
        if copy {
            self.set_selection(new_ids);
        }
        self.commit();
    }

    /// Update one tool default and push it to every selected shape.
    pub fn apply_setting(&mut self, change: SettingChange) {
        self.defaults.apply(&change);
        if self.selection.is_empty() {
            return;
        }
        let change = self.normalized_change(change);
        self.apply_to_selection(std::slice::from_ref(&change));
    }

    /// Push every tool default to the selected shapes.
    pub fn apply_defaults_to_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        let changes = self.defaults.all_changes();
        self.apply_to_selection(&changes);
    }

    // Clamped value as stored in the defaults.
    fn normalized_change(&self, change: SettingChange) -> SettingChange {
        match change {
            SettingChange::StrokeWidth(_) => SettingChange::StrokeWidth(self.defaults.stroke_width),
            SettingChange::Fill(_) => SettingChange::Fill(self.defaults.fill.clone()),
            SettingChange::FontSize(_) => SettingChange::FontSize(self.defaults.font_size),
            other => other,
        }
    }

    fn apply_to_selection(&mut self, changes: &[SettingChange]) {
        for layer in &mut self.project.layers {
            for shape in layer.shapes.iter_mut() {
                if !self.selection.contains(&shape.id) {
                    continue;
                }
                for change in changes {
                    apply_change(shape, change);
                }
            }
        }
        self.commit();
        self.events
            .push(EditorEvent::SelectionChanged(self.selected_shapes()));
    }

    /// Mean of all selected points.
    fn selection_centroid(&self) -> Option<Point> {
        let points: Vec<Point> = self
            .project
            .all_shapes()
            .filter(|s| self.selection.contains(&s.id))
            .flat_map(|s| s.points.iter().copied())
            .collect();
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Some(Point::new(sx / n, sy / n))
    }

    /// Selection centroid relative to the center of the resolution.
    pub fn selection_center_offset(&self) -> Option<Point> {
        let c = self.selection_centroid()?;
        let (cx, cy) = self.project.center();
        Some(Point::new(c.x - cx, c.y - cy))
    }

    /// Translate the selection so its centroid sits at `offset` from the center.
    pub fn move_selection_to_center_offset(&mut self, offset: Point) -> bool {
        let Some(c) = self.selection_centroid() else {
            return false;
        };
        let (cx, cy) = self.project.center();
        let (dx, dy) = (cx + offset.x - c.x, cy + offset.y - c.y);
        for layer in &mut self.project.layers {
            for shape in layer.shapes.iter_mut() {
                if self.selection.contains(&shape.id) {
                    shape.translate(dx, dy);
                }
            }
        }
        self.commit();
        true
    }
}
