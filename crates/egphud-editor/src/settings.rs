use serde::{Deserialize, Serialize};

use egphud_core::{Align, DEFAULT_RESOLUTION};

pub const DEFAULT_STROKE: &str = "#E6E6E6";
pub const DEFAULT_FILL: &str = "#0A84FF";
pub const DEFAULT_STROKE_WIDTH: u32 = 2;
pub const DEFAULT_FONT: &str = "Segoe UI";
pub const DEFAULT_FONT_SIZE: u32 = 18;
pub const DEFAULT_TEXT: &str = "HUD";

pub const GRID_MAJOR_STEP: u32 = 120;
pub const GRID_MINOR_STEP: u32 = 25;

/// World-space offset applied to pasted shapes.
pub const PASTE_OFFSET: (f64, f64) = (10.0, 10.0);

/// Attributes given to newly drawn shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefaults {
    pub stroke: String,
    pub stroke_width: u32,
    pub fill: Option<String>,
    pub text: String,
    pub font: String,
    pub font_size: u32,
    pub align: Align,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            stroke: DEFAULT_STROKE.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            fill: Some(DEFAULT_FILL.to_string()),
            text: DEFAULT_TEXT.to_string(),
            font: DEFAULT_FONT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            align: Align::Left,
        }
    }
}

/// A single tool-default field update.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    Stroke(String),
    StrokeWidth(u32),
    /// `None` or an empty string clears the fill.
    Fill(Option<String>),
    Text(String),
    Font(String),
    FontSize(u32),
    Align(Align),
}

impl ToolDefaults {
    pub fn apply(&mut self, change: &SettingChange) {
        match change {
            SettingChange::Stroke(c) => self.stroke = c.clone(),
            SettingChange::StrokeWidth(w) => self.stroke_width = (*w).max(1),
            SettingChange::Fill(f) => self.fill = f.clone().filter(|f| !f.is_empty()),
            SettingChange::Text(t) => self.text = t.clone(),
            SettingChange::Font(f) => self.font = f.clone(),
            SettingChange::FontSize(s) => self.font_size = (*s).max(1),
            SettingChange::Align(a) => self.align = *a,
        }
    }

    /// Every field as a change, in declaration order.
    pub fn all_changes(&self) -> Vec<SettingChange> {
        vec![
            SettingChange::Stroke(self.stroke.clone()),
            SettingChange::StrokeWidth(self.stroke_width),
            SettingChange::Fill(self.fill.clone()),
            SettingChange::Text(self.text.clone()),
            SettingChange::Font(self.font.clone()),
            SettingChange::FontSize(self.font_size),
            SettingChange::Align(self.align),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSettings {
    pub minor: u32,
    pub major: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            minor: GRID_MINOR_STEP,
            major: GRID_MAJOR_STEP,
        }
    }
}

impl GridSettings {
    /// Minor step is at least 5 and the major step never smaller than the minor.
    pub fn new(minor: u32, major: u32) -> Self {
        let minor = minor.max(5);
        Self {
            minor,
            major: major.max(minor),
        }
    }
}

/// Host-persistable editor preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub tools: ToolDefaults,
    pub grid: GridSettings,
    pub default_resolution: (u32, u32),
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tools: ToolDefaults::default(),
            grid: GridSettings::default(),
            default_resolution: DEFAULT_RESOLUTION,
        }
    }
}

impl EditorSettings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse settings; a zero-sized default resolution falls back to
    /// [`DEFAULT_RESOLUTION`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        let (w, h) = settings.default_resolution;
        if w == 0 || h == 0 {
            settings.default_resolution = DEFAULT_RESOLUTION;
        }
        Ok(settings)
    }
}
