//! # EGP HUD Renderer
//!
//! Canvas-side contracts for the HUD designer: the world/screen view transform
//! (zoom, pan, fit-to-view) and screen-space display lists that a host canvas
//! paints. Layer color overrides are resolved here so hosts never see raw
//! shape colors for overridden layers.

pub mod render_data;
pub mod viewport;

pub use render_data::{grid_steps, GridLevel, GridLine, RenderFrame, RenderGeometry, RenderShape};
pub use viewport::ViewTransform;
