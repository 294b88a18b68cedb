//! Factory functions for sample documents used by the viewer and tests.

use glam::Vec3;
use shared::{EntityId, Style};

use crate::state::document::Document;

// ── Styles ──────────────────────────────────────────────────────

pub fn red() -> Style {
    Style::from_rgba(255, 0, 0, 255)
}

pub fn green() -> Style {
    Style::from_rgba(0, 255, 0, 255)
}

pub fn blue() -> Style {
    Style::from_rgba(0, 0, 255, 255)
}

pub fn yellow() -> Style {
    Style::from_rgba(255, 255, 0, 255)
}

pub fn cyan() -> Style {
    Style::from_rgba(0, 255, 255, 255)
}

// ── Point sets ──────────────────────────────────────────────────

/// Corners of the axis-aligned square with half-width `h` on z = 0
pub fn square_points(h: f32) -> Vec<Vec3> {
    vec![
        Vec3::new(-h, -h, 0.0),
        Vec3::new(h, -h, 0.0),
        Vec3::new(h, h, 0.0),
        Vec3::new(-h, h, 0.0),
    ]
}

/// Open zig-zag below the origin
pub fn zigzag_points() -> Vec<Vec3> {
    vec![
        Vec3::new(-3.0, -3.0, 0.0),
        Vec3::new(-2.0, -2.5, 0.0),
        Vec3::new(-1.0, -3.0, 0.0),
        Vec3::new(0.0, -2.0, 0.0),
    ]
}

// ── Documents ───────────────────────────────────────────────────

/// Append the five sample entities. Returns ids in creation order:
/// square, circle, line, arc, zig-zag.
pub fn add_test_entities(doc: &mut Document) -> Vec<EntityId> {
    vec![
        doc.add_polyline(square_points(2.0), true, red()),
        doc.add_circle(Vec3::ZERO, 1.5, blue()),
        doc.add_line(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0), green()),
        doc.add_arc(Vec3::new(2.0, 2.0, 0.0), 1.0, 0.0, 90f32.to_radians(), yellow()),
        doc.add_polyline(zigzag_points(), false, cyan()),
    ]
}

/// Fresh document holding the sample entities
pub fn sample_document() -> Document {
    let mut doc = Document::new();
    add_test_entities(&mut doc);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{EntityKind, INVALID_ENTITY};

    #[test]
    fn test_sample_entities() {
        let mut doc = Document::new();
        let ids = add_test_entities(&mut doc);
        assert!(ids.iter().all(|id| *id != INVALID_ENTITY));
        let kinds: Vec<EntityKind> = ids.iter().map(|id| doc.get(*id).unwrap().kind()).collect();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Polyline,
                EntityKind::Circle,
                EntityKind::Line,
                EntityKind::Arc,
                EntityKind::Polyline,
            ]
        );
    }

    #[test]
    fn test_sample_document_is_dirty() {
        let doc = sample_document();
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.dirty_count(), 5);
    }
}
