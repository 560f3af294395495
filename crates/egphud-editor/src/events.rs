use egphud_core::{Point, Shape, ShapeId, ShapeKind};

/// Active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Select,
    Line,
    Rect,
    Box,
    Circle,
    CircleFilled,
    Poly,
    Text,
}

impl Tool {
    /// Shape kind produced by the two-point drag tools.
    pub fn drag_kind(self) -> Option<ShapeKind> {
        match self {
            Tool::Line => Some(ShapeKind::Line),
            Tool::Rect => Some(ShapeKind::Rect),
            Tool::Box => Some(ShapeKind::Box),
            Tool::Circle => Some(ShapeKind::Circle),
            Tool::CircleFilled => Some(ShapeKind::CircleFilled),
            _ => None,
        }
    }

    pub fn is_circle(self) -> bool {
        matches!(self, Tool::Circle | Tool::CircleFilled)
    }
}

/// Keyboard modifier state accompanying a pointer event.
///
/// `ctrl` snaps to the grid (and center-anchors circles); `shift` constrains
/// drags to the dominant axis and toggles selection membership on click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
}

/// Notifications queued for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The selection set changed; carries the resolved shapes.
    SelectionChanged(Vec<Shape>),
    /// The committed project changed.
    ProjectChanged,
    /// Zoom or pan changed.
    ViewChanged,
    ShapeCreated(ShapeId),
}

/// Temporary, uncommitted geometry the host should draw on top of the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// A two-point shape being dragged out, world space.
    Shape {
        kind: ShapeKind,
        start: Point,
        end: Point,
    },
    /// Accumulated polygon vertices, world space.
    Polyline(Vec<Point>),
    /// Marquee rectangle corners, screen space.
    Marquee { start: Point, end: Point },
}

/// Reflection axis across the resolution rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAxis {
    /// Flip horizontally: `x' = width - x`.
    X,
    /// Flip vertically: `y' = height - y`.
    Y,
}

impl MirrorAxis {
    pub fn reflect(self, p: Point, resolution: (u32, u32)) -> Point {
        match self {
            MirrorAxis::X => Point::new(resolution.0 as f64 - p.x, p.y),
            MirrorAxis::Y => Point::new(p.x, resolution.1 as f64 - p.y),
        }
    }
}
