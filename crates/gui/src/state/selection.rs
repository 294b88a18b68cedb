//! Entity selection set
//!
//! Every mutating call validates ids against the document, resyncs the
//! `selected` flag of every entity and queues a [`SelectionChanged`]
//! notification. Calls that leave the set unchanged are silent.

use std::collections::BTreeSet;

use shared::EntityId;

use super::document::Document;

/// Notification emitted after every effective selection change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub count: usize,
    /// Selected ids in ascending order
    pub ids: Vec<EntityId>,
}

/// How a pick result combines with the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// Replace the selection
    #[default]
    Replace,
    /// Add to the selection (Shift+click)
    Add,
    /// Toggle membership (Ctrl+click)
    Toggle,
}

/// Selected entity ids, mirrored onto `Entity::selected`
#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: BTreeSet<EntityId>,
    /// Notifications not yet consumed by the presentation layer
    pending: Vec<SelectionChanged>,
    /// Version counter for selection changes (for cache invalidation)
    version: u64,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<EntityId> {
        self.selected.iter().copied().collect()
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Drain queued change notifications
    pub fn take_changes(&mut self) -> Vec<SelectionChanged> {
        std::mem::take(&mut self.pending)
    }

    // ── Mutation ─────────────────────────────────────────────

    /// Clear all selection
    pub fn clear(&mut self, doc: &mut Document) {
        if self.selected.is_empty() {
            return;
        }
        self.commit(doc, BTreeSet::new());
        tracing::debug!("Selection cleared");
    }

    /// Select a single entity, replacing the previous selection
    pub fn select(&mut self, doc: &mut Document, id: EntityId) {
        if !doc.contains(id) {
            tracing::warn!("Cannot select non-existent entity {id}");
            return;
        }
        self.commit(doc, BTreeSet::from([id]));
    }

    /// Replace the selection with every valid id in `ids`
    pub fn select_many(&mut self, doc: &mut Document, ids: &[EntityId]) {
        let next: BTreeSet<EntityId> = ids.iter().copied().filter(|id| doc.contains(*id)).collect();
        self.commit(doc, next);
    }

    pub fn add(&mut self, doc: &mut Document, id: EntityId) {
        if !doc.contains(id) {
            tracing::warn!("Cannot add non-existent entity {id} to selection");
            return;
        }
        let mut next = self.selected.clone();
        next.insert(id);
        self.commit(doc, next);
    }

    pub fn add_many(&mut self, doc: &mut Document, ids: &[EntityId]) {
        let mut next = self.selected.clone();
        next.extend(ids.iter().copied().filter(|id| doc.contains(*id)));
        self.commit(doc, next);
    }

    pub fn remove(&mut self, doc: &mut Document, id: EntityId) {
        let mut next = self.selected.clone();
        next.remove(&id);
        self.commit(doc, next);
    }

    pub fn remove_many(&mut self, doc: &mut Document, ids: &[EntityId]) {
        let mut next = self.selected.clone();
        for id in ids {
            next.remove(id);
        }
        self.commit(doc, next);
    }

    /// Toggle selection (Ctrl+click behavior)
    pub fn toggle(&mut self, doc: &mut Document, id: EntityId) {
        if !doc.contains(id) {
            return;
        }
        let mut next = self.selected.clone();
        if !next.remove(&id) {
            next.insert(id);
        }
        self.commit(doc, next);
    }

    pub fn select_all(&mut self, doc: &mut Document) {
        let next: BTreeSet<EntityId> = doc.ids().into_iter().collect();
        self.commit(doc, next);
    }

    /// Select exactly the entities that are currently not selected
    pub fn invert(&mut self, doc: &mut Document) {
        let next: BTreeSet<EntityId> = doc
            .ids()
            .into_iter()
            .filter(|id| !self.selected.contains(id))
            .collect();
        self.commit(doc, next);
    }

    pub fn select_with_mode(&mut self, doc: &mut Document, id: EntityId, mode: SelectMode) {
        match mode {
            SelectMode::Replace => self.select(doc, id),
            SelectMode::Add => self.add(doc, id),
            SelectMode::Toggle => self.toggle(doc, id),
        }
    }

    pub fn select_many_with_mode(&mut self, doc: &mut Document, ids: &[EntityId], mode: SelectMode) {
        match mode {
            SelectMode::Replace => self.select_many(doc, ids),
            SelectMode::Add => self.add_many(doc, ids),
            SelectMode::Toggle => {
                let mut next = self.selected.clone();
                for &id in ids {
                    if doc.contains(id) && !next.remove(&id) {
                        next.insert(id);
                    }
                }
                self.commit(doc, next);
            }
        }
    }

    /// Drop ids whose entities were removed from the document
    pub fn prune(&mut self, doc: &mut Document) {
        let next: BTreeSet<EntityId> = self
            .selected
            .iter()
            .copied()
            .filter(|id| doc.contains(*id))
            .collect();
        self.commit(doc, next);
    }

    // ── Internal ─────────────────────────────────────────────

    fn commit(&mut self, doc: &mut Document, next: BTreeSet<EntityId>) {
        if next == self.selected {
            return;
        }
        self.selected = next;
        self.sync_to_document(doc);
        self.version += 1;

        let change = SelectionChanged {
            count: self.selected.len(),
            ids: self.ids(),
        };
        tracing::debug!("Selection changed: {} entities", change.count);
        self.pending.push(change);
    }

    /// Full resync of the `selected` flag across the document
    fn sync_to_document(&self, doc: &mut Document) {
        for id in doc.ids() {
            doc.set_selected(id, self.selected.contains(&id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use shared::Style;

    fn doc_with(n: usize) -> (Document, Vec<EntityId>) {
        let mut doc = Document::new();
        let ids = (0..n)
            .map(|i| doc.add_line(Vec3::ZERO, Vec3::new(i as f32 + 1.0, 0.0, 0.0), Style::default()))
            .collect();
        (doc, ids)
    }

    fn selected_flags(doc: &Document) -> Vec<EntityId> {
        doc.all().iter().filter(|e| e.selected).map(|e| e.id).collect()
    }

    #[test]
    fn test_initial_empty() {
        let s = SelectionManager::new();
        assert!(s.is_empty());
        assert_eq!(s.count(), 0);
        assert!(s.ids().is_empty());
    }

    #[test]
    fn test_select_single_mirrors_flag() {
        let (mut doc, ids) = doc_with(3);
        let mut s = SelectionManager::new();
        s.select(&mut doc, ids[1]);
        assert_eq!(s.ids(), vec![ids[1]]);
        assert_eq!(selected_flags(&doc), vec![ids[1]]);
    }

    #[test]
    fn test_select_clears_previous() {
        let (mut doc, ids) = doc_with(3);
        let mut s = SelectionManager::new();
        s.select(&mut doc, ids[0]);
        s.select(&mut doc, ids[2]);
        assert_eq!(s.count(), 1);
        assert!(!s.is_selected(ids[0]));
        assert_eq!(selected_flags(&doc), vec![ids[2]]);
    }

    #[test]
    fn test_select_missing_is_ignored() {
        let (mut doc, _) = doc_with(2);
        let mut s = SelectionManager::new();
        s.select(&mut doc, 999);
        assert!(s.is_empty());
        assert!(s.take_changes().is_empty());
    }

    #[test]
    fn test_select_many_filters_invalid() {
        let (mut doc, ids) = doc_with(3);
        let mut s = SelectionManager::new();
        s.select_many(&mut doc, &[ids[0], 555, ids[2]]);
        assert_eq!(s.ids(), vec![ids[0], ids[2]]);
    }

    #[test]
    fn test_toggle_add_and_remove() {
        let (mut doc, ids) = doc_with(2);
        let mut s = SelectionManager::new();
        s.select(&mut doc, ids[0]);
        s.toggle(&mut doc, ids[1]);
        assert_eq!(s.count(), 2);
        s.toggle(&mut doc, ids[0]);
        assert_eq!(s.ids(), vec![ids[1]]);
        assert_eq!(selected_flags(&doc), vec![ids[1]]);
    }

    #[test]
    fn test_select_all_then_invert_is_empty() {
        let (mut doc, _) = doc_with(4);
        let mut s = SelectionManager::new();
        s.select_all(&mut doc);
        assert_eq!(s.count(), 4);
        s.invert(&mut doc);
        assert!(s.is_empty());
        assert!(selected_flags(&doc).is_empty());
    }

    #[test]
    fn test_invert_selects_complement() {
        let (mut doc, ids) = doc_with(5);
        let mut s = SelectionManager::new();
        s.select_many(&mut doc, &[ids[1], ids[3]]);
        s.invert(&mut doc);
        assert_eq!(s.ids(), vec![ids[0], ids[2], ids[4]]);
        assert_eq!(selected_flags(&doc), vec![ids[0], ids[2], ids[4]]);
    }

    #[test]
    fn test_notifications_carry_count_and_ids() {
        let (mut doc, ids) = doc_with(3);
        let mut s = SelectionManager::new();
        s.select(&mut doc, ids[0]);
        s.add(&mut doc, ids[2]);
        let changes = s.take_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1], SelectionChanged { count: 2, ids: vec![ids[0], ids[2]] });
        assert!(s.take_changes().is_empty());
    }

    #[test]
    fn test_redundant_calls_are_suppressed() {
        let (mut doc, ids) = doc_with(2);
        let mut s = SelectionManager::new();
        s.clear(&mut doc);
        s.select(&mut doc, ids[0]);
        s.select(&mut doc, ids[0]);
        s.add(&mut doc, ids[0]);
        s.remove(&mut doc, ids[1]);
        assert_eq!(s.take_changes().len(), 1);
        assert_eq!(s.version(), 1);
    }

    #[test]
    fn test_flag_change_marks_dirty() {
        let (mut doc, ids) = doc_with(2);
        doc.clear_all_dirty_flags();
        let mut s = SelectionManager::new();
        s.select(&mut doc, ids[0]);
        assert!(doc.get(ids[0]).unwrap().dirty);
        assert!(!doc.get(ids[1]).unwrap().dirty);
    }

    #[test]
    fn test_select_with_mode() {
        let (mut doc, ids) = doc_with(3);
        let mut s = SelectionManager::new();
        s.select_with_mode(&mut doc, ids[0], SelectMode::Replace);
        s.select_with_mode(&mut doc, ids[1], SelectMode::Add);
        s.select_with_mode(&mut doc, ids[0], SelectMode::Toggle);
        assert_eq!(s.ids(), vec![ids[1]]);

        s.select_many_with_mode(&mut doc, &[ids[1], ids[2]], SelectMode::Toggle);
        assert_eq!(s.ids(), vec![ids[2]]);
    }

    #[test]
    fn test_prune_after_remove() {
        let (mut doc, ids) = doc_with(3);
        let mut s = SelectionManager::new();
        s.select_all(&mut doc);
        doc.remove(ids[1]);
        s.prune(&mut doc);
        assert_eq!(s.ids(), vec![ids[0], ids[2]]);
    }
}
