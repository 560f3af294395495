//! # EGP HUD Editor
//!
//! Headless scene editor: tool selection, pointer-driven drawing, selection,
//! move/scale/vertex drags, clipboard and mirror operations, and snapshot undo.
//! The host forwards input events and paints the [`RenderFrame`] it gets back.
//!
//! [`RenderFrame`]: egphud_renderer::RenderFrame

pub mod events;
pub mod hit_test;
pub mod measure;
pub mod session;
pub mod settings;
pub mod snapping;

pub use events::{EditorEvent, Key, MirrorAxis, Modifiers, Preview, Tool};
pub use measure::{AcceptDefaultPrompt, ApproxTextMeasure, TextMeasure, TextPrompt};
pub use session::EditorSession;
pub use settings::{EditorSettings, GridSettings, SettingChange, ToolDefaults};
