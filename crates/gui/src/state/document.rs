//! In-memory entity store
//!
//! Entities are keyed by a monotonically assigned id. Every mutation marks the
//! touched entity dirty so the renderer knows to re-upload it.

use std::collections::HashMap;

use glam::Vec3;
use shared::{Entity, EntityId, Geometry, Style, INVALID_ENTITY};

/// Id-keyed store of all entities in the session
#[derive(Debug)]
pub struct Document {
    entities: HashMap<EntityId, Entity>,
    next_id: EntityId,
    /// Monotonically increasing version counter, bumped on every mutation
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
            next_id: 1,
            version: 0,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable access. Callers changing geometry must call `mark_dirty`.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Snapshot of all entities in ascending id order
    pub fn all(&self) -> Vec<&Entity> {
        let mut out: Vec<&Entity> = self.entities.values().collect();
        out.sort_by_key(|e| e.id);
        out
    }

    /// All live ids in ascending order
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Current document version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of entities waiting for a GPU upload
    pub fn dirty_count(&self) -> usize {
        self.entities.values().filter(|e| e.dirty).count()
    }

    // ── Mutation ─────────────────────────────────────────────

    /// Insert an entity, assigning a fresh id when it has none.
    /// Returns 0 if an explicit id is already taken or ids are exhausted.
    pub fn add(&mut self, mut entity: Entity) -> EntityId {
        if entity.id == INVALID_ENTITY {
            entity.id = self.next_id;
        } else if self.entities.contains_key(&entity.id) {
            tracing::warn!("Entity id {} already in use", entity.id);
            return INVALID_ENTITY;
        }
        if entity.id >= self.next_id {
            let Some(next) = entity.id.checked_add(1) else {
                tracing::warn!("Entity id space exhausted");
                return INVALID_ENTITY;
            };
            self.next_id = next;
        }
        entity.dirty = true;
        // Selection is owned by the selection set
        entity.selected = false;
        let id = entity.id;
        self.entities.insert(id, entity);
        self.version += 1;
        id
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        let removed = self.entities.remove(&id).is_some();
        if removed {
            self.version += 1;
        }
        removed
    }

    /// Replace an entity's payload, keeping its id and selection flag
    pub fn update(&mut self, id: EntityId, entity: Entity) -> bool {
        let Some(slot) = self.entities.get_mut(&id) else {
            return false;
        };
        let selected = slot.selected;
        *slot = entity;
        slot.id = id;
        slot.selected = selected;
        slot.dirty = true;
        self.version += 1;
        true
    }

    /// Remove everything and restart id assignment at 1
    pub fn clear(&mut self) {
        self.entities.clear();
        self.next_id = 1;
        self.version += 1;
    }

    pub fn mark_dirty(&mut self, id: EntityId) -> bool {
        match self.entities.get_mut(&id) {
            Some(e) => {
                e.dirty = true;
                self.version += 1;
                true
            }
            None => false,
        }
    }

    /// Called by the renderer once every dirty entity has been uploaded
    pub fn clear_all_dirty_flags(&mut self) {
        for e in self.entities.values_mut() {
            e.dirty = false;
        }
    }

    /// Show or hide an entity. Returns false for unknown ids.
    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> bool {
        let Some(e) = self.entities.get_mut(&id) else {
            return false;
        };
        if e.visible != visible {
            e.visible = visible;
            e.dirty = true;
            self.version += 1;
        }
        true
    }

    /// Set the selection flag, marking the entity dirty only when it flips
    pub(crate) fn set_selected(&mut self, id: EntityId, selected: bool) {
        if let Some(e) = self.entities.get_mut(&id) {
            if e.selected != selected {
                e.selected = selected;
                e.dirty = true;
            }
        }
    }

    /// Move the second endpoint of a line (rubber-band drawing)
    pub fn update_end_line_point(&mut self, id: EntityId, point: Vec3) -> bool {
        let Some(e) = self.entities.get_mut(&id) else {
            return false;
        };
        match &mut e.geometry {
            Geometry::Line { p1, .. } => {
                *p1 = point;
                e.dirty = true;
                self.version += 1;
                true
            }
            _ => false,
        }
    }

    // ── Convenience constructors ─────────────────────────────

    pub fn add_line(&mut self, a: Vec3, b: Vec3, style: Style) -> EntityId {
        self.add(Entity::new(Geometry::Line { p0: a, p1: b }).with_style(style))
    }

    /// Returns `INVALID_ENTITY` for fewer than two points
    pub fn add_polyline(&mut self, points: Vec<Vec3>, closed: bool, style: Style) -> EntityId {
        if points.len() < 2 {
            tracing::warn!("Rejected polyline with {} point(s)", points.len());
            return INVALID_ENTITY;
        }
        self.add(Entity::new(Geometry::Polyline { points, closed }).with_style(style))
    }

    /// Returns `INVALID_ENTITY` for a non-positive radius
    pub fn add_circle(&mut self, center: Vec3, radius: f32, style: Style) -> EntityId {
        if !is_positive(radius) {
            tracing::warn!("Rejected circle with radius {radius}");
            return INVALID_ENTITY;
        }
        self.add(Entity::new(Geometry::Circle { center, radius }).with_style(style))
    }

    /// Angles in radians. Returns `INVALID_ENTITY` for a non-positive radius.
    pub fn add_arc(
        &mut self,
        center: Vec3,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        style: Style,
    ) -> EntityId {
        if !is_positive(radius) {
            tracing::warn!("Rejected arc with radius {radius}");
            return INVALID_ENTITY;
        }
        self.add(
            Entity::new(Geometry::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            })
            .with_style(style),
        )
    }

    /// Returns `INVALID_ENTITY` for a non-positive size
    pub fn add_box(&mut self, center: Vec3, size: f32, style: Style) -> EntityId {
        if !is_positive(size) {
            tracing::warn!("Rejected box with size {size}");
            return INVALID_ENTITY;
        }
        self.add(Entity::new(Geometry::Box { center, size }).with_style(style))
    }
}

fn is_positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut doc = Document::new();
        let a = doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        let b = doc.add_circle(Vec3::ZERO, 1.0, Style::default());
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_get_after_add_is_dirty_and_equal() {
        let mut doc = Document::new();
        let geom = Geometry::Arc {
            center: Vec3::new(1.0, 2.0, 0.0),
            radius: 3.0,
            start_angle: 0.0,
            end_angle: 1.2,
        };
        let id = doc.add(Entity::new(geom.clone()));
        let e = doc.get(id).unwrap();
        assert_eq!(e.geometry, geom);
        assert!(e.dirty);
    }

    #[test]
    fn test_add_forces_dirty() {
        let mut doc = Document::new();
        let mut e = Entity::new(Geometry::Line { p0: Vec3::ZERO, p1: Vec3::Y });
        e.dirty = false;
        let id = doc.add(e);
        assert!(doc.get(id).unwrap().dirty);
    }

    #[test]
    fn test_add_with_explicit_id_advances_counter() {
        let mut doc = Document::new();
        let mut e = Entity::new(Geometry::Line { p0: Vec3::ZERO, p1: Vec3::Y });
        e.id = 10;
        assert_eq!(doc.add(e), 10);
        let next = doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        assert_eq!(next, 11);
    }

    #[test]
    fn test_add_rejects_taken_id() {
        let mut doc = Document::new();
        let id = doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        let mut e = Entity::new(Geometry::Circle { center: Vec3::ZERO, radius: 1.0 });
        e.id = id;
        assert_eq!(doc.add(e), INVALID_ENTITY);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get(id).unwrap().kind(), shared::EntityKind::Line);
    }

    #[test]
    fn test_add_clears_selected_flag() {
        let mut doc = Document::new();
        let mut e = Entity::new(Geometry::Line { p0: Vec3::ZERO, p1: Vec3::Y });
        e.selected = true;
        let id = doc.add(e);
        assert!(!doc.get(id).unwrap().selected);
    }

    #[test]
    fn test_add_at_max_id_is_rejected() {
        let mut doc = Document::new();
        let mut e = Entity::new(Geometry::Line { p0: Vec3::ZERO, p1: Vec3::Y });
        e.id = EntityId::MAX;
        assert_eq!(doc.add(e), INVALID_ENTITY);
        assert!(doc.is_empty());
        assert_eq!(doc.add_line(Vec3::ZERO, Vec3::X, Style::default()), 1);
    }

    #[test]
    fn test_clear_resets_ids() {
        let mut doc = Document::new();
        doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        doc.add_line(Vec3::ZERO, Vec3::Y, Style::default());
        doc.clear();
        assert!(doc.all().is_empty());
        assert_eq!(doc.add_line(Vec3::ZERO, Vec3::Z, Style::default()), 1);
    }

    #[test]
    fn test_ids_never_reused_before_clear() {
        let mut doc = Document::new();
        let a = doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        assert!(doc.remove(a));
        let b = doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_missing() {
        let mut doc = Document::new();
        assert!(!doc.remove(42));
    }

    #[test]
    fn test_update_preserves_id_and_sets_dirty() {
        let mut doc = Document::new();
        let id = doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        doc.clear_all_dirty_flags();

        let mut replacement = Entity::new(Geometry::Circle { center: Vec3::ZERO, radius: 2.0 });
        replacement.id = 99;
        assert!(doc.update(id, replacement));

        let e = doc.get(id).unwrap();
        assert_eq!(e.id, id);
        assert!(e.dirty);
        assert!(doc.get(99).is_none());
        assert!(!doc.update(1234, Entity::new(Geometry::Box { center: Vec3::ZERO, size: 1.0 })));
    }

    #[test]
    fn test_convenience_constructors_reject_bad_input() {
        let mut doc = Document::new();
        assert_eq!(doc.add_polyline(vec![Vec3::ZERO], false, Style::default()), INVALID_ENTITY);
        assert_eq!(doc.add_circle(Vec3::ZERO, 0.0, Style::default()), INVALID_ENTITY);
        assert_eq!(doc.add_arc(Vec3::ZERO, -1.0, 0.0, 1.0, Style::default()), INVALID_ENTITY);
        assert_eq!(doc.add_box(Vec3::ZERO, 0.0, Style::default()), INVALID_ENTITY);
        assert_eq!(doc.add_circle(Vec3::ZERO, f32::NAN, Style::default()), INVALID_ENTITY);
        assert!(doc.is_empty());
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_update_end_line_point() {
        let mut doc = Document::new();
        let a = Vec3::new(1.0, 1.0, 0.0);
        let id = doc.add_line(a, Vec3::new(2.0, 2.0, 0.0), Style::default());
        doc.clear_all_dirty_flags();

        let c = Vec3::new(5.0, -3.0, 0.0);
        assert!(doc.update_end_line_point(id, c));
        let e = doc.get(id).unwrap();
        assert_eq!(e.geometry, Geometry::Line { p0: a, p1: c });
        assert!(e.dirty);
    }

    #[test]
    fn test_update_end_line_point_wrong_kind() {
        let mut doc = Document::new();
        let id = doc.add_circle(Vec3::ZERO, 1.0, Style::default());
        assert!(!doc.update_end_line_point(id, Vec3::ONE));
        assert!(!doc.update_end_line_point(77, Vec3::ONE));
    }

    #[test]
    fn test_dirty_flags() {
        let mut doc = Document::new();
        let a = doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        doc.add_line(Vec3::ZERO, Vec3::Y, Style::default());
        assert_eq!(doc.dirty_count(), 2);
        doc.clear_all_dirty_flags();
        assert_eq!(doc.dirty_count(), 0);
        assert!(doc.mark_dirty(a));
        assert_eq!(doc.dirty_count(), 1);
        assert!(!doc.mark_dirty(500));
    }

    #[test]
    fn test_set_visible_marks_dirty_on_change() {
        let mut doc = Document::new();
        let id = doc.add_line(Vec3::ZERO, Vec3::X, Style::default());
        doc.clear_all_dirty_flags();
        assert!(doc.set_visible(id, true));
        assert!(!doc.get(id).unwrap().dirty);
        assert!(doc.set_visible(id, false));
        assert!(doc.get(id).unwrap().dirty);
        assert!(!doc.get(id).unwrap().visible);
    }

    #[test]
    fn test_all_sorted_by_id() {
        let mut doc = Document::new();
        for i in 0..10 {
            doc.add_circle(Vec3::ZERO, 1.0 + i as f32, Style::default());
        }
        let ids: Vec<EntityId> = doc.all().iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(doc.ids(), ids);
    }
}
