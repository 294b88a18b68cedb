use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Entity identifier inside a document. `0` is never assigned.
pub type EntityId = u64;

/// Sentinel returned by constructors that reject their input
pub const INVALID_ENTITY: EntityId = 0;

/// Kind tag of an entity, derived from its geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Line,
    Polyline,
    Circle,
    Arc,
    Box,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Line => "Line",
            EntityKind::Polyline => "Polyline",
            EntityKind::Circle => "Circle",
            EntityKind::Arc => "Arc",
            EntityKind::Box => "Box",
        }
    }

    /// Curved kinds whose tessellation depends on zoom
    pub fn is_curve(self) -> bool {
        matches!(self, EntityKind::Circle | EntityKind::Arc)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Geometry payload of an entity
///
/// Circles and arcs lie in the plane `z = center.z`. Arc angles are in
/// radians, counter-clockwise from +X.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Line {
        p0: Vec3,
        p1: Vec3,
    },
    Polyline {
        points: Vec<Vec3>,
        closed: bool,
    },
    Circle {
        center: Vec3,
        radius: f32,
    },
    Arc {
        center: Vec3,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
    },
    /// Axis-aligned cube with edge length `size`
    Box {
        center: Vec3,
        size: f32,
    },
}

impl Geometry {
    pub fn kind(&self) -> EntityKind {
        match self {
            Geometry::Line { .. } => EntityKind::Line,
            Geometry::Polyline { .. } => EntityKind::Polyline,
            Geometry::Circle { .. } => EntityKind::Circle,
            Geometry::Arc { .. } => EntityKind::Arc,
            Geometry::Box { .. } => EntityKind::Box,
        }
    }
}

/// Display style: packed `0xRRGGBBAA` color plus a nominal line width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub rgba: u32,
    pub line_width: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            rgba: 0xFFFF_FFFF,
            line_width: 1.0,
        }
    }
}

impl Style {
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            rgba: pack_rgba(r, g, b, a),
            ..Self::default()
        }
    }

    /// Color as normalized floats
    pub fn color(&self) -> [f32; 4] {
        unpack_rgba(self.rgba)
    }
}

/// Pack 8-bit channels into `0xRRGGBBAA`
pub fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (u32::from(r) << 24) | (u32::from(g) << 16) | (u32::from(b) << 8) | u32::from(a)
}

/// Unpack `0xRRGGBBAA` into normalized floats
pub fn unpack_rgba(rgba: u32) -> [f32; 4] {
    [
        ((rgba >> 24) & 0xFF) as f32 / 255.0,
        ((rgba >> 16) & 0xFF) as f32 / 255.0,
        ((rgba >> 8) & 0xFF) as f32 / 255.0,
        (rgba & 0xFF) as f32 / 255.0,
    ]
}

/// A drawable CAD primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub style: Style,
    pub geometry: Geometry,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Needs GPU re-upload since the last render sync
    #[serde(skip, default = "default_true")]
    pub dirty: bool,
    #[serde(skip)]
    pub selected: bool,
}

fn default_true() -> bool {
    true
}

impl Entity {
    /// New unassigned entity (id 0), visible and dirty
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: INVALID_ENTITY,
            style: Style::default(),
            geometry,
            visible: true,
            dirty: true,
            selected: false,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.geometry.kind()
    }
}
