//! Headless test harness for programmatic scene manipulation.
//!
//! Drives a [`CadScene`] exactly like the viewer does, but applies sync plans
//! to an in-memory batch table instead of GPU buffers.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use shared::{EntityId, Style};

use crate::scene::{CadScene, SceneStatus};
use crate::state::{AppSettings, SelectMode};
use crate::viewport::camera::CameraMovement;
use crate::viewport::sync::{BatchTracker, SyncPlan};
use crate::viewport::tessellate::BatchData;

/// Headless stand-in for viewer plus renderer
pub struct TestHarness {
    pub scene: CadScene,
    tracker: BatchTracker,
    batches: HashMap<EntityId, BatchData>,
    uploads: usize,
    frees: usize,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// 800×600 view with default settings
    pub fn new() -> Self {
        Self::with_size(800.0, 600.0)
    }

    pub fn with_size(width: f32, height: f32) -> Self {
        Self::with_settings(AppSettings::default(), width, height)
    }

    pub fn with_settings(settings: AppSettings, width: f32, height: f32) -> Self {
        let mut tracker = BatchTracker::new();
        tracker.rezoom_threshold = settings.tessellation.rezoom_threshold;
        tracker.selection_color = settings.viewport.selection_color;

        let mut scene = CadScene::new(settings);
        scene.resize(width, height);
        scene.update(0.0);
        Self {
            scene,
            tracker,
            batches: HashMap::new(),
            uploads: 0,
            frees: 0,
        }
    }

    // ── Document ──────────────────────────────────────────────

    pub fn add_test_entities(&mut self) -> Vec<EntityId> {
        self.scene.add_test_entities()
    }

    pub fn add_line(&mut self, a: Vec3, b: Vec3) -> EntityId {
        self.scene.document_mut().add_line(a, b, Style::default())
    }

    pub fn add_circle(&mut self, center: Vec3, radius: f32) -> EntityId {
        self.scene.document_mut().add_circle(center, radius, Style::default())
    }

    pub fn add_box(&mut self, center: Vec3, size: f32) -> EntityId {
        self.scene.document_mut().add_box(center, size, Style::default())
    }

    pub fn remove(&mut self, id: EntityId) -> bool {
        self.scene.document_mut().remove(id)
    }

    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> bool {
        self.scene.document_mut().set_visible(id, visible)
    }

    pub fn entity_count(&self) -> usize {
        self.scene.document().len()
    }

    // ── Frame ─────────────────────────────────────────────────

    /// One viewer frame: refresh the view, then sync when the document
    /// changed or the zoom moved far enough to re-tessellate curves.
    pub fn frame(&mut self) -> Option<SyncPlan> {
        self.scene.update(1.0 / 60.0);
        let zoomed = self
            .tracker
            .needs_retessellation(self.scene.viewport().world_per_pixel);
        if !self.scene.take_document_dirty() && !zoomed {
            return None;
        }
        Some(self.sync(false))
    }

    /// Sync unconditionally and apply the plan to the batch table
    pub fn sync(&mut self, force_rebuild: bool) -> SyncPlan {
        let (doc, vp) = self.scene.render_inputs();
        let plan = self.tracker.sync(doc, vp.world_per_pixel, force_rebuild);
        self.apply(&plan);
        plan
    }

    fn apply(&mut self, plan: &SyncPlan) {
        if plan.free_all {
            self.frees += self.batches.len();
            self.batches.clear();
        }
        for id in &plan.removals {
            if self.batches.remove(id).is_some() {
                self.frees += 1;
            }
        }
        for (id, data) in &plan.uploads {
            if self.batches.insert(*id, data.clone()).is_some() {
                self.frees += 1;
            }
            self.uploads += 1;
        }
    }

    pub fn batch(&self, id: EntityId) -> Option<&BatchData> {
        self.batches.get(&id)
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Total uploads so far
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    /// Total batches freed so far (replacements included)
    pub fn free_count(&self) -> usize {
        self.frees
    }

    pub fn tracker(&self) -> &BatchTracker {
        &self.tracker
    }

    // ── Input ─────────────────────────────────────────────────

    pub fn click(&mut self, x: f32, y: f32) -> Option<EntityId> {
        self.scene.click_select(Vec2::new(x, y), SelectMode::Replace)
    }

    pub fn click_with_mode(&mut self, x: f32, y: f32, mode: SelectMode) -> Option<EntityId> {
        self.scene.click_select(Vec2::new(x, y), mode)
    }

    pub fn box_select(&mut self, from: Vec2, to: Vec2) -> Vec<EntityId> {
        self.scene.box_select(from, to, SelectMode::Replace)
    }

    /// Press, move in one step, release
    pub fn drag(&mut self, from: Vec2, to: Vec2) {
        self.scene.pointer_press(from);
        self.scene.pointer_move(to);
        self.scene.pointer_release();
    }

    /// Wheel notches (positive zooms in)
    pub fn scroll(&mut self, notches: f32) {
        self.scene.wheel(notches * 120.0);
    }

    pub fn key(&mut self, movement: CameraMovement, dt: f32) {
        self.scene.key(movement, dt);
    }

    /// Draw a line with the line tool between two pixels
    pub fn draw_line(&mut self, from: Vec2, to: Vec2) -> Option<EntityId> {
        self.scene.begin_line(from)?;
        self.scene.drag_line(to);
        self.scene.finish_line()
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn selected(&self) -> Vec<EntityId> {
        self.scene.selection().ids()
    }

    pub fn world_per_pixel(&self) -> f32 {
        self.scene.viewport().world_per_pixel
    }

    /// Pixel position of a world point
    pub fn screen_of(&self, p: Vec3) -> Vec2 {
        self.scene.viewport().world_to_screen(p)
    }

    pub fn status(&self) -> SceneStatus {
        self.scene.status()
    }
}
