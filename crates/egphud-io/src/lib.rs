//! # EGP HUD I/O
//!
//! JSON project files and the Expression 2 exporter that turns a project into
//! a self-scaling EGP chip.

pub mod export;
pub mod project;

pub use export::{export_to_file, export_to_string, ExportError, HudExporter};
pub use project::{
    load_project, save_project, with_project_extension, ProjectFileError, PROJECT_EXTENSION,
};
