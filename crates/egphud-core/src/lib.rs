//! # EGP HUD Core
//!
//! Document model for the HUD designer: projects with a fixed virtual resolution,
//! ordered layers of geometric primitives, declared dynamic inputs, a snapshot
//! based undo history and an R-tree over shape bounds for hit queries.

pub mod error;
pub mod geometry;
pub mod history;
pub mod layer;
pub mod project;
pub mod shape;
pub mod spatial;

pub use error::{InputDefError, ProjectError};
pub use geometry::{BBox, Point};
pub use history::SnapshotHistory;
pub use layer::{Layer, LayerId, Rgb};
pub use project::{
    is_preset_resolution, InputDef, InputType, Project, DEFAULT_RESOLUTION, RESOLUTION_PRESETS,
};
pub use shape::{Align, Shape, ShapeId, ShapeKind};
