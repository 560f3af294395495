use serde::{Deserialize, Serialize};

use crate::error::{InputDefError, ProjectError};
use crate::layer::{Layer, LayerId};
use crate::shape::Shape;

/// Value type of an external input wired into the exported chip.
///
/// Loading is lenient: any spelling of "normal" is `Normal`, every other
/// type string is treated as `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum InputType {
    #[default]
    Normal,
    String,
}

impl From<String> for InputType {
    fn from(raw: String) -> Self {
        if raw.trim().eq_ignore_ascii_case("normal") {
            InputType::Normal
        } else {
            InputType::String
        }
    }
}

impl InputType {
    /// Keyword used in the `@inputs` directive.
    pub fn keyword(self) -> &'static str {
        match self {
            InputType::Normal => "normal",
            InputType::String => "string",
        }
    }
}

/// Declaration of a dynamic value that text shapes can reference as `%NAME%`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDef {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub input_type: InputType,
}

impl InputDef {
    pub fn new(name: &str, input_type: InputType) -> Self {
        Self {
            name: name.to_string(),
            input_type,
        }
    }

    /// Parse a `NAME:TYPE` declaration. The type is case-insensitive.
    pub fn parse(spec: &str) -> Result<Self, InputDefError> {
        let parts: Vec<&str> = spec.split(':').collect();
        if parts.len() != 2 {
            return Err(InputDefError::Format);
        }
        let name = parts[0].trim();
        let input_type = match parts[1].trim().to_lowercase().as_str() {
            "normal" => InputType::Normal,
            "string" => InputType::String,
            other => return Err(InputDefError::UnknownType(other.to_string())),
        };
        if name.is_empty() {
            return Err(InputDefError::EmptyName);
        }
        Ok(Self::new(name, input_type))
    }
}

/// Resolution given to new projects and to files that omit one.
pub const DEFAULT_RESOLUTION: (u32, u32) = (1920, 1080);

/// Common HUD resolutions offered by hosts.
pub const RESOLUTION_PRESETS: [(u32, u32); 6] = [
    (1280, 720),
    (1600, 900),
    (1920, 1080),
    (2560, 1440),
    (3440, 1440),
    (3840, 2160),
];

fn default_resolution() -> (u32, u32) {
    DEFAULT_RESOLUTION
}

/// Whether `resolution` is one of [`RESOLUTION_PRESETS`].
pub fn is_preset_resolution(resolution: (u32, u32)) -> bool {
    RESOLUTION_PRESETS.contains(&resolution)
}

/// The complete editable document: resolution, layer stack and input declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default = "default_resolution")]
    pub resolution: (u32, u32),
    #[serde(default)]
    pub active_layer_id: LayerId,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub inputs: Vec<InputDef>,
}

impl Project {
    /// New project with a single empty layer.
    pub fn new(resolution: (u32, u32)) -> Self {
        let layer = Layer::new("Layer 1");
        Self {
            resolution,
            active_layer_id: layer.id.clone(),
            layers: vec![layer],
            inputs: Vec::new(),
        }
    }

    /// Guarantee at least one layer and an active layer id that resolves.
    /// Returns true when anything had to be fixed.
    pub fn repair(&mut self) -> bool {
        let mut repaired = false;
        if self.layers.is_empty() {
            log::warn!("Project has no layers; creating a default layer");
            self.layers.push(Layer::new("Layer 1"));
            repaired = true;
        }
        if self.get_layer(&self.active_layer_id).is_none() {
            log::warn!(
                "Active layer '{}' missing; falling back to first layer",
                self.active_layer_id
            );
            self.active_layer_id = self.layers[0].id.clone();
            repaired = true;
        }
        if self.resolution.0 == 0 || self.resolution.1 == 0 {
            log::warn!("Invalid resolution {:?}; using default", self.resolution);
            self.resolution = default_resolution();
            repaired = true;
        }
        repaired
    }

    pub fn center(&self) -> (f64, f64) {
        (
            self.resolution.0 as f64 / 2.0,
            self.resolution.1 as f64 / 2.0,
        )
    }

    // ── Layer management ──────────────────────────────────────────────

    pub fn get_layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn layer_index(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.get_layer(&self.active_layer_id)
    }

    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active_layer_id.clone();
        self.get_layer_mut(&id)
    }

    pub fn set_active_layer(&mut self, id: &str) -> Result<(), ProjectError> {
        if self.get_layer(id).is_none() {
            return Err(ProjectError::LayerNotFound(id.to_string()));
        }
        self.active_layer_id = id.to_string();
        Ok(())
    }

    /// Append a new layer and make it active. An empty name becomes "Layer N".
    pub fn add_layer(&mut self, name: &str) -> LayerId {
        let name = if name.trim().is_empty() {
            format!("Layer {}", self.layers.len() + 1)
        } else {
            name.to_string()
        };
        let layer = Layer::new(&name);
        let id = layer.id.clone();
        log::debug!("Adding layer '{}' ({})", name, id);
        self.layers.push(layer);
        self.active_layer_id = id.clone();
        id
    }

    /// Copy the layer at `index` right after it and make the copy active. The
    /// copy and its shapes get fresh ids.
    pub fn duplicate_layer(&mut self, index: usize) -> Option<LayerId> {
        let src = self.layers.get(index)?;
        let mut layer = Layer::new(&format!("{} Copy", src.name));
        layer.visible = src.visible;
        layer.locked = src.locked;
        layer.color = src.color.clone();
        layer.shapes = src.shapes.iter().map(Shape::duplicate_with_new_id).collect();
        let id = layer.id.clone();
        self.layers.insert(index + 1, layer);
        self.active_layer_id = id.clone();
        Some(id)
    }

    /// Remove the layer at `index`. The last remaining layer cannot be deleted.
    pub fn delete_layer(&mut self, index: usize) -> Result<Layer, ProjectError> {
        if self.layers.len() <= 1 {
            log::warn!("Refusing to delete the last layer");
            return Err(ProjectError::LastLayer);
        }
        if index >= self.layers.len() {
            return Err(ProjectError::LayerNotFound(format!("#{}", index)));
        }
        let removed = self.layers.remove(index);
        let next = index.min(self.layers.len() - 1);
        self.active_layer_id = self.layers[next].id.clone();
        log::debug!("Deleted layer '{}'", removed.name);
        Ok(removed)
    }

    /// Swap the layer at `index` with its neighbour in `direction` (-1 or +1).
    /// Returns the new index, or `None` at the ends of the stack.
    pub fn move_layer(&mut self, index: usize, direction: isize) -> Option<usize> {
        let new_index = index.checked_add_signed(direction)?;
        if index >= self.layers.len() || new_index >= self.layers.len() {
            return None;
        }
        self.layers.swap(index, new_index);
        Some(new_index)
    }

    pub fn rename_layer(&mut self, index: usize, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_layer_color(&mut self, index: usize, color: Option<&str>) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.color = color.map(str::to_string);
                true
            }
            None => false,
        }
    }

    pub fn toggle_layer_visibility(&mut self, index: usize) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.visible = !layer.visible;
                true
            }
            None => false,
        }
    }

    pub fn toggle_layer_lock(&mut self, index: usize) -> bool {
        match self.layers.get_mut(index) {
            Some(layer) => {
                layer.locked = !layer.locked;
                true
            }
            None => false,
        }
    }

    // ── Shapes ────────────────────────────────────────────────────────

    pub fn all_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.layers.iter().flat_map(|l| l.shapes.iter())
    }

    pub fn find_shape(&self, id: &str) -> Option<&Shape> {
        self.all_shapes().find(|s| s.id == id)
    }

    pub fn find_shape_mut(&mut self, id: &str) -> Option<&mut Shape> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.shapes.iter_mut())
            .find(|s| s.id == id)
    }

    /// Layer that owns the shape with the given id.
    pub fn layer_of_shape(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.contains_shape(id))
    }

    pub fn shape_count(&self) -> usize {
        self.layers.iter().map(Layer::shape_count).sum()
    }

    // ── Resolution ────────────────────────────────────────────────────

    /// Change the project resolution, rescaling every shape point per axis and
    /// stroke widths by the average axis factor (never below 1).
    pub fn set_resolution(&mut self, width: u32, height: u32) -> Result<(), ProjectError> {
        if width == 0 || height == 0 {
            return Err(ProjectError::InvalidResolution { width, height });
        }
        let (old_w, old_h) = self.resolution;
        if (old_w, old_h) == (width, height) {
            return Ok(());
        }
        let scale_x = width as f64 / old_w as f64;
        let scale_y = height as f64 / old_h as f64;
        let scale_avg = (scale_x + scale_y) / 2.0;
        for layer in &mut self.layers {
            for shape in &mut layer.shapes {
                for p in &mut shape.points {
                    p.x *= scale_x;
                    p.y *= scale_y;
                }
                let scaled = (shape.stroke_width as f64 * scale_avg) as u32;
                shape.stroke_width = scaled.max(1);
            }
        }
        log::info!(
            "Rescaled project from {}x{} to {}x{}",
            old_w,
            old_h,
            width,
            height
        );
        self.resolution = (width, height);
        Ok(())
    }

    // ── Inputs ────────────────────────────────────────────────────────

    /// Add an input, or overwrite the type of an existing input with the same name.
    pub fn upsert_input(&mut self, input: InputDef) {
        if let Some(existing) = self.inputs.iter_mut().find(|i| i.name == input.name) {
            existing.input_type = input.input_type;
            return;
        }
        self.inputs.push(input);
    }

    /// Parse and add an input declared as `NAME:TYPE`.
    pub fn add_input_spec(&mut self, spec: &str) -> Result<(), ProjectError> {
        let input = InputDef::parse(spec).map_err(|e| {
            log::warn!("Rejected input '{}': {}", spec, e);
            e
        })?;
        self.upsert_input(input);
        Ok(())
    }

    pub fn remove_input(&mut self, index: usize) -> Option<InputDef> {
        if index < self.inputs.len() {
            Some(self.inputs.remove(index))
        } else {
            None
        }
    }

    pub fn find_input(&self, name: &str) -> Option<&InputDef> {
        self.inputs.iter().find(|i| i.name == name)
    }

    // ── Serialization ────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize, then repair missing layers and a dangling active layer.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut project: Project = serde_json::from_str(json)?;
        project.repair();
        Ok(project)
    }
}
