//! Incremental document → GPU batch planning
//!
//! [`BatchTracker`] decides which entities need a new batch and which batches
//! must be freed. It never touches GL; the GL renderer applies the resulting
//! [`SyncPlan`].

use std::collections::BTreeSet;

use shared::EntityId;

use super::tessellate::{build_batch, BatchData};
use crate::state::document::Document;

/// Work for the GPU side of one sync
#[derive(Debug, Default)]
pub struct SyncPlan {
    /// Free every batch before applying the rest
    pub free_all: bool,
    /// Batches to free (entity hidden, removed, or no longer drawable)
    pub removals: Vec<EntityId>,
    /// Batches to create or replace
    pub uploads: Vec<(EntityId, BatchData)>,
    /// Curves were re-tessellated because the zoom level changed
    pub retessellated: bool,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        !self.free_all && self.removals.is_empty() && self.uploads.is_empty()
    }
}

/// Tracks which entities own a batch and the zoom level curves were built at
#[derive(Debug)]
pub struct BatchTracker {
    resident: BTreeSet<EntityId>,
    last_world_per_pixel: f32,
    /// Relative world-per-pixel change that triggers curve re-tessellation
    pub rezoom_threshold: f32,
    /// Color used for selected entities
    pub selection_color: u32,
}

impl Default for BatchTracker {
    fn default() -> Self {
        Self {
            resident: BTreeSet::new(),
            last_world_per_pixel: 0.0,
            rezoom_threshold: 0.5,
            selection_color: shared::pack_rgba(0, 220, 255, 255),
        }
    }
}

impl BatchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_batch(&self, id: EntityId) -> bool {
        self.resident.contains(&id)
    }

    pub fn batch_count(&self) -> usize {
        self.resident.len()
    }

    pub fn last_world_per_pixel(&self) -> f32 {
        self.last_world_per_pixel
    }

    /// Forget every batch (after the GPU side freed them)
    pub fn reset(&mut self) {
        self.resident.clear();
        self.last_world_per_pixel = 0.0;
    }

    /// Drop one entity from the resident set so the next sync re-uploads it
    pub fn forget(&mut self, id: EntityId) {
        self.resident.remove(&id);
    }

    /// True if the zoom changed enough since the last re-tessellation
    pub fn needs_retessellation(&self, world_per_pixel: f32) -> bool {
        if world_per_pixel.is_nan() || world_per_pixel <= 0.0 {
            return false;
        }
        (world_per_pixel - self.last_world_per_pixel).abs() / world_per_pixel
            > self.rezoom_threshold
    }

    /// Plan the batch changes for the current document and zoom level, then
    /// clear the document's dirty flags.
    pub fn sync(&mut self, doc: &mut Document, world_per_pixel: f32, force_rebuild: bool) -> SyncPlan {
        let mut plan = SyncPlan::default();

        let retessellate = force_rebuild || self.needs_retessellation(world_per_pixel);
        if retessellate {
            self.last_world_per_pixel = world_per_pixel;
            plan.retessellated = true;
        }

        if force_rebuild {
            plan.free_all = true;
            self.resident.clear();
        }

        // Entities removed from the document since the last sync
        let stale: Vec<EntityId> = self
            .resident
            .iter()
            .copied()
            .filter(|id| !doc.contains(*id))
            .collect();
        for id in stale {
            self.resident.remove(&id);
            plan.removals.push(id);
        }

        for entity in doc.all() {
            if !entity.visible {
                if self.resident.remove(&entity.id) {
                    plan.removals.push(entity.id);
                }
                continue;
            }

            let needs_update = entity.dirty || (retessellate && entity.kind().is_curve());
            if !needs_update && self.resident.contains(&entity.id) {
                continue;
            }

            let rgba = if entity.selected {
                self.selection_color
            } else {
                entity.style.rgba
            };
            match build_batch(entity, world_per_pixel, rgba) {
                Some(batch) => {
                    self.resident.insert(entity.id);
                    plan.uploads.push((entity.id, batch));
                }
                None => {
                    if self.resident.remove(&entity.id) {
                        plan.removals.push(entity.id);
                    }
                }
            }
        }

        doc.clear_all_dirty_flags();

        if !plan.is_empty() {
            tracing::debug!(
                "Sync plan: {} upload(s), {} removal(s), free_all={}",
                plan.uploads.len(),
                plan.removals.len(),
                plan.free_all
            );
        }
        plan
    }
}
