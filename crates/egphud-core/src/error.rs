use thiserror::Error;

/// Validation failures for an input declaration typed as `NAME:TYPE`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputDefError {
    #[error("Format must be NAME:TYPE")]
    Format,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Type must be Normal or String, got '{0}'")]
    UnknownType(String),
}

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("At least one layer is required")]
    LastLayer,

    #[error("Layer '{0}' not found")]
    LayerNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputDefError),

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Project serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
