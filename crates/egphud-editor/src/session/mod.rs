//! The interactive editing session: one project, its view, selection, tool
//! state and undo history, driven by pointer and keyboard events.

mod ops;
mod pointer;

use std::collections::HashSet;

use egphud_core::{BBox, LayerId, Point, Project, ProjectError, Shape, ShapeId, SnapshotHistory};
use egphud_renderer::viewport::ZOOM_STEP;
use egphud_renderer::{RenderFrame, ViewTransform};

use crate::events::{EditorEvent, Key, Preview, Tool};
use crate::hit_test::{self, ScaleHandle};
use crate::measure::{AcceptDefaultPrompt, ApproxTextMeasure, TextMeasure, TextPrompt};
use crate::settings::{EditorSettings, GridSettings, ToolDefaults};

/// In-progress pointer interaction.
#[derive(Debug, Clone)]
enum DragState {
    Idle,
    /// Two-point shape being dragged out; corners in world space.
    Draw { start: Point, p1: Point, p2: Point },
    /// Rubber band in screen space.
    Marquee { start: Point, current: Point },
    Move {
        anchor: Point,
        originals: Vec<(ShapeId, Vec<Point>)>,
    },
    Scale {
        handle: ScaleHandle,
        bounds: BBox,
        originals: Vec<(ShapeId, Vec<Point>)>,
    },
    Vertex {
        shape_id: ShapeId,
        index: usize,
        start: Point,
    },
}

pub struct EditorSession {
    project: Project,
    view: ViewTransform,
    tool: Tool,
    defaults: ToolDefaults,
    grid: GridSettings,
    default_resolution: (u32, u32),
    selection: HashSet<ShapeId>,
    clipboard: Vec<Shape>,
    history: SnapshotHistory,
    dirty: bool,
    drag: DragState,
    poly_points: Vec<Point>,
    events: Vec<EditorEvent>,
    measure: Box<dyn TextMeasure>,
    prompt: Box<dyn TextPrompt>,
}

impl EditorSession {
    pub fn new(project: Project, viewport_width: f64, viewport_height: f64) -> Self {
        Self::with_settings(project, viewport_width, viewport_height, EditorSettings::default())
    }

    pub fn with_settings(
        mut project: Project,
        viewport_width: f64,
        viewport_height: f64,
        settings: EditorSettings,
    ) -> Self {
        project.repair();
        let mut view = ViewTransform::new(viewport_width, viewport_height);
        view.fit_to_view(project.resolution);
        let mut session = Self {
            project,
            view,
            tool: Tool::Select,
            defaults: settings.tools,
            grid: GridSettings::new(settings.grid.minor, settings.grid.major),
            default_resolution: settings.default_resolution,
            selection: HashSet::new(),
            clipboard: Vec::new(),
            history: SnapshotHistory::new(),
            dirty: false,
            drag: DragState::Idle,
            poly_points: Vec::new(),
            events: Vec::new(),
            measure: Box::new(ApproxTextMeasure),
            prompt: Box::new(AcceptDefaultPrompt),
        };
        session.reset_history();
        session
    }

    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    pub fn with_text_prompt(mut self, prompt: impl TextPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn defaults(&self) -> &ToolDefaults {
        &self.defaults
    }

    pub fn grid(&self) -> GridSettings {
        self.grid
    }

    pub fn set_grid(&mut self, minor: u32, major: u32) {
        self.grid = GridSettings::new(minor, major);
        self.events.push(EditorEvent::ViewChanged);
    }

    pub fn selection(&self) -> &HashSet<ShapeId> {
        &self.selection
    }

    /// Selected shapes in layer and z-order.
    pub fn selected_shapes(&self) -> Vec<Shape> {
        self.project
            .all_shapes()
            .filter(|s| self.selection.contains(&s.id))
            .cloned()
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Whether replacing the project would lose unsaved edits.
    pub fn confirm_discard_needed(&self) -> bool {
        self.dirty
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Take every queued notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Selection ─────────────────────────────────────────────────────

    /// Replace the selection; ids that resolve to no shape are dropped.
    pub fn set_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = ShapeId>,
    {
        let project = &self.project;
        let selection: HashSet<ShapeId> = ids
            .into_iter()
            .filter(|id| project.find_shape(id).is_some())
            .collect();
        self.replace_selection(selection);
    }

    pub fn clear_selection(&mut self) {
        self.replace_selection(HashSet::new());
    }

    fn replace_selection(&mut self, selection: HashSet<ShapeId>) {
        if selection == self.selection {
            return;
        }
        self.selection = selection;
        self.events
            .push(EditorEvent::SelectionChanged(self.selected_shapes()));
    }

    fn toggle_selected(&mut self, id: ShapeId) {
        let mut selection = self.selection.clone();
        if !selection.remove(&id) {
            selection.insert(id);
        }
        self.replace_selection(selection);
    }

    fn selection_bounds(&self) -> Option<BBox> {
        hit_test::selection_bounds(
            &self.project,
            &self.selection,
            self.view.zoom,
            self.measure.as_ref(),
        )
    }

    // ── Tools and view ────────────────────────────────────────────────

    /// Switch tools, discarding any half-drawn shape.
    pub fn set_tool(&mut self, tool: Tool) {
        self.cancel_interaction();
        self.tool = tool;
    }

    pub fn key(&mut self, key: Key) {
        match key {
            Key::Escape => self.cancel_interaction(),
            Key::Enter => self.finish_poly(),
        }
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.view.pan_by(dx, dy);
        self.events.push(EditorEvent::ViewChanged);
    }

    /// Mouse-wheel zoom about the pointer. Positive `delta` zooms in.
    pub fn wheel(&mut self, screen: Point, delta: f64) {
        let factor = if delta > 0.0 {
            ZOOM_STEP
        } else {
            1.0 / ZOOM_STEP
        };
        if self.view.zoom_at(screen, factor) {
            self.events.push(EditorEvent::ViewChanged);
        }
    }

    /// Zoom by one step about the viewport centre.
    pub fn zoom_in(&mut self) {
        if self.view.zoom_in() {
            self.events.push(EditorEvent::ViewChanged);
        }
    }

    pub fn zoom_out(&mut self) {
        if self.view.zoom_out() {
            self.events.push(EditorEvent::ViewChanged);
        }
    }

    pub fn fit_view(&mut self) {
        self.view.fit_to_view(self.project.resolution);
        self.events.push(EditorEvent::ViewChanged);
    }

    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.view.resize(width, height, self.project.resolution);
        self.events.push(EditorEvent::ViewChanged);
    }

    /// Uncommitted geometry to draw over the scene.
    pub fn preview(&self) -> Option<Preview> {
        match &self.drag {
            DragState::Draw { p1, p2, .. } => self.tool.drag_kind().map(|kind| Preview::Shape {
                kind,
                start: *p1,
                end: *p2,
            }),
            DragState::Marquee { start, current } => Some(Preview::Marquee {
                start: *start,
                end: *current,
            }),
            _ if self.poly_points.len() >= 2 => Some(Preview::Polyline(self.poly_points.clone())),
            _ => None,
        }
    }

    pub fn render_frame(&self) -> RenderFrame {
        RenderFrame::build(
            &self.project,
            &self.view,
            &self.selection,
            self.selection_bounds(),
            self.grid.major,
        )
    }

    // ── History ───────────────────────────────────────────────────────

    /// Record the current project as a history step after an edit.
    fn commit(&mut self) {
        match self.history.push(&self.project) {
            Ok(true) => {
                self.dirty = true;
                self.events.push(EditorEvent::ProjectChanged);
            }
            Ok(false) => {}
            Err(e) => log::error!("Failed to snapshot project: {}", e),
        }
    }

    fn reset_history(&mut self) {
        if let Err(e) = self.history.reset(&self.project) {
            log::error!("Failed to snapshot project: {}", e);
        }
    }

    /// Step back one snapshot. Zoom and pan are kept; the selection is cleared.
    pub fn undo(&mut self) -> bool {
        let restored = match self.history.undo() {
            Some(Ok(project)) => project,
            Some(Err(e)) => {
                log::error!("Failed to restore snapshot: {}", e);
                return false;
            }
            None => return false,
        };
        self.history.begin_restore();
        self.cancel_interaction();
        self.project = restored;
        self.project.repair();
        self.view.auto_fit = false;
        self.clear_selection();
        self.history.end_restore();
        self.dirty = true;
        self.events.push(EditorEvent::ProjectChanged);
        log::debug!("Undo; {} snapshots remain", self.history.len());
        true
    }

    // ── Project lifecycle ─────────────────────────────────────────────

    /// Replace the project with a fresh one at the configured default resolution.
    pub fn new_project(&mut self) {
        self.new_project_at(self.default_resolution);
    }

    pub fn new_project_at(&mut self, resolution: (u32, u32)) {
        self.load_project(Project::new(resolution));
    }

    /// Replace the project, resetting selection, history, view and dirty state.
    pub fn load_project(&mut self, mut project: Project) {
        project.repair();
        self.cancel_interaction();
        self.project = project;
        self.clear_selection();
        self.clipboard.clear();
        self.reset_history();
        self.dirty = false;
        self.view.fit_to_view(self.project.resolution);
        self.events.push(EditorEvent::ProjectChanged);
        self.events.push(EditorEvent::ViewChanged);
    }

    /// Rescale the project to a new resolution and refit the view.
    pub fn set_resolution(&mut self, width: u32, height: u32) -> Result<(), ProjectError> {
        if self.project.resolution == (width, height) {
            return Ok(());
        }
        self.project.set_resolution(width, height)?;
        self.view.fit_to_view(self.project.resolution);
        self.events.push(EditorEvent::ViewChanged);
        self.commit();
        Ok(())
    }

    // ── Layers ────────────────────────────────────────────────────────

    /// Make a layer active; selected shapes outside it are deselected.
    pub fn set_active_layer(&mut self, id: &str) -> Result<(), ProjectError> {
        self.project.set_active_layer(id)?;
        self.cancel_interaction();
        self.retain_active_layer_selection();
        Ok(())
    }

    fn retain_active_layer_selection(&mut self) {
        let keep: HashSet<ShapeId> = match self.project.active_layer() {
            Some(layer) => self
                .selection
                .iter()
                .filter(|id| layer.contains_shape(id))
                .cloned()
                .collect(),
            None => HashSet::new(),
        };
        self.replace_selection(keep);
    }

    pub fn add_layer(&mut self, name: &str) -> LayerId {
        let id = self.project.add_layer(name);
        self.retain_active_layer_selection();
        self.commit();
        id
    }

    pub fn duplicate_layer(&mut self, index: usize) -> Option<LayerId> {
        let id = self.project.duplicate_layer(index)?;
        self.retain_active_layer_selection();
        self.commit();
        Some(id)
    }

    pub fn delete_layer(&mut self, index: usize) -> Result<(), ProjectError> {
        let removed = self.project.delete_layer(index)?;
        let selection = self
            .selection
            .iter()
            .filter(|id| !removed.contains_shape(id))
            .cloned()
            .collect();
        self.replace_selection(selection);
        self.retain_active_layer_selection();
        self.commit();
        Ok(())
    }

    pub fn move_layer(&mut self, index: usize, direction: isize) -> Option<usize> {
        let moved = self.project.move_layer(index, direction)?;
        self.commit();
        Some(moved)
    }

    pub fn rename_layer(&mut self, index: usize, name: &str) -> bool {
        let changed = self.project.rename_layer(index, name);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn set_layer_color(&mut self, index: usize, color: Option<&str>) -> bool {
        let changed = self.project.set_layer_color(index, color);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn toggle_layer_visibility(&mut self, index: usize) -> bool {
        let changed = self.project.toggle_layer_visibility(index);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn toggle_layer_lock(&mut self, index: usize) -> bool {
        let changed = self.project.toggle_layer_lock(index);
        if changed {
            self.commit();
        }
        changed
    }

    // ── Inputs ────────────────────────────────────────────────────────

    /// Add or retype an input from a `NAME:type` spec.
    pub fn add_input(&mut self, spec: &str) -> Result<(), ProjectError> {
        self.project.add_input_spec(spec)?;
        self.commit();
        Ok(())
    }

    pub fn remove_input(&mut self, index: usize) -> bool {
        let removed = self.project.remove_input(index).is_some();
        if removed {
            self.commit();
        }
        removed
    }
}
