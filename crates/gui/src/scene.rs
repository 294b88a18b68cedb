//! Per-frame orchestration of document, camera, work plane and picking
//!
//! `CadScene` has no GL state. The presentation layer reduces its input to the
//! calls below and feeds the renderer from [`CadScene::document_mut`] and
//! [`CadScene::viewport`].

use glam::{Vec2, Vec3};
use shared::{EntityId, Style, INVALID_ENTITY};

use crate::fixtures;
use crate::state::{AppSettings, AppState, Document, SelectMode, SelectionManager};
use crate::viewport::camera::{Camera, CameraMode, CameraMovement};
use crate::viewport::picking::{self, BoxSelectMode};
use crate::viewport::view_state::ViewportState;
use crate::viewport::work_plane::WorkPlane;

/// Eye position of a fresh or reset view
const HOME_POSITION: Vec3 = Vec3::new(0.0, 0.0, 10.0);

/// Orbit degrees per dragged pixel
const ORBIT_DRAG_SCALE: f32 = 0.5;

/// Wheel units per notch
const WHEEL_NOTCH: f32 = 120.0;

/// What an active pointer drag does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragAction {
    Orbit,
    Pan,
    Look,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    last: Vec2,
    action: DragAction,
}

/// Snapshot for status bars
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneStatus {
    pub entity_count: usize,
    pub world_per_pixel: f32,
    pub camera_mode: CameraMode,
    pub fov: f32,
    pub selection_count: usize,
}

impl std::fmt::Display for SceneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entities: {} | World/Pixel: {:.4} | Camera: {} | FOV: {:.1}° | Selected: {}",
            self.entity_count, self.world_per_pixel, self.camera_mode, self.fov, self.selection_count
        )
    }
}

/// CAD scene: document, selection, camera and viewport of one view
pub struct CadScene {
    state: AppState,
    camera: Camera,
    work_plane: WorkPlane,
    viewport: ViewportState,
    /// Document changed since the presentation layer last synced
    document_dirty: bool,
    drag: Option<Drag>,
    /// Line being rubber-banded by the line tool
    active_line: Option<EntityId>,
    pub line_style: Style,
}

impl Default for CadScene {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}

impl CadScene {
    pub fn new(settings: AppSettings) -> Self {
        let mut camera = Camera::new(CameraMode::Orbit);
        camera.apply_settings(&settings.camera);
        camera.set_target(Vec3::ZERO);
        camera.set_position(HOME_POSITION);

        Self {
            state: AppState::with_settings(settings),
            camera,
            work_plane: WorkPlane::new(),
            viewport: ViewportState::default(),
            document_dirty: true,
            drag: None,
            active_line: None,
            line_style: Style::from_rgba(255, 255, 255, 255),
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    /// Mutable document access; marks the document dirty
    pub fn document_mut(&mut self) -> &mut Document {
        self.document_dirty = true;
        &mut self.state.document
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.state.selection
    }

    pub fn settings(&self) -> &AppSettings {
        &self.state.settings
    }

    pub fn settings_mut(&mut self) -> &mut AppSettings {
        &mut self.state.settings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn work_plane(&self) -> &WorkPlane {
        &self.work_plane
    }

    pub fn work_plane_mut(&mut self) -> &mut WorkPlane {
        &mut self.work_plane
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn is_document_dirty(&self) -> bool {
        self.document_dirty
    }

    /// Read and clear the dirty flag (the caller is about to sync)
    pub fn take_document_dirty(&mut self) -> bool {
        std::mem::take(&mut self.document_dirty)
    }

    /// Document and viewport split-borrowed for a renderer sync
    pub fn render_inputs(&mut self) -> (&mut Document, &ViewportState) {
        (&mut self.state.document, &self.viewport)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn active_line(&self) -> Option<EntityId> {
        self.active_line
    }

    // ── Frame ────────────────────────────────────────────────

    pub fn resize(&mut self, width: f32, height: f32) {
        if width == self.viewport.width && height == self.viewport.height {
            return;
        }
        self.viewport.refresh(&self.camera, width, height);
        tracing::debug!("Viewport resized to {width}x{height}");
    }

    /// Pull camera state into the viewport and let the work plane follow
    pub fn update(&mut self, _dt: f32) {
        let (w, h) = (self.viewport.width, self.viewport.height);
        self.viewport.refresh(&self.camera, w, h);
        self.work_plane
            .update_follow(self.camera.position(), self.camera.front(), self.camera.target());
    }

    fn refresh_viewport(&mut self) {
        let (w, h) = (self.viewport.width, self.viewport.height);
        self.viewport.refresh(&self.camera, w, h);
    }

    // ── Input ────────────────────────────────────────────────

    pub fn key(&mut self, movement: CameraMovement, dt: f32) {
        if movement == CameraMovement::Reset {
            self.reset_view();
            return;
        }
        self.camera.process_keyboard(movement, dt);
        self.refresh_viewport();
    }

    /// Start a navigation drag at a pixel position
    pub fn pointer_press(&mut self, pos: Vec2) {
        let action = match self.camera.mode() {
            CameraMode::Orbit => DragAction::Orbit,
            CameraMode::Ortho2D => DragAction::Pan,
            CameraMode::Fps | CameraMode::Free => DragAction::Look,
        };
        self.drag = Some(Drag { last: pos, action });
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let delta = pos - drag.last;
        drag.last = pos;
        let action = drag.action;

        match action {
            DragAction::Orbit | DragAction::Look => {
                // screen y grows downward
                self.camera
                    .process_mouse_movement(delta.x * ORBIT_DRAG_SCALE, -delta.y * ORBIT_DRAG_SCALE);
            }
            DragAction::Pan => {
                self.camera.pan_2d(delta.x, delta.y, self.viewport.world_per_pixel);
            }
        }
        self.refresh_viewport();
    }

    pub fn pointer_release(&mut self) {
        self.drag = None;
    }

    /// Zoom by a raw wheel offset (120 per notch, positive zooms in)
    pub fn wheel(&mut self, offset: f32) {
        self.camera.process_mouse_scroll(offset / WHEEL_NOTCH);
        self.refresh_viewport();
    }

    // ── Selection ────────────────────────────────────────────

    /// Pick tolerance in world units for the current zoom
    pub fn pick_threshold(&self) -> f32 {
        self.state.settings.picking.radius_px * self.viewport.world_per_pixel
    }

    /// Select the entity under a pixel. A miss clears the selection in
    /// replace mode and leaves it alone otherwise.
    pub fn click_select(&mut self, pos: Vec2, mode: SelectMode) -> Option<EntityId> {
        let threshold = self.pick_threshold();
        let hit = picking::pick_at_screen(pos.x, pos.y, &self.state.document, &self.viewport, threshold);
        let before = self.state.selection.version();
        let AppState {
            document, selection, ..
        } = &mut self.state;

        match &hit {
            Some(hit) => selection.select_with_mode(document, hit.id, mode),
            None if mode == SelectMode::Replace => selection.clear(document),
            None => {}
        }
        if self.state.selection.version() != before {
            self.document_dirty = true;
        }
        hit.map(|h| h.id)
    }

    /// Rectangle selection between two pixel corners. Dragging right
    /// requires full containment, dragging left accepts any overlap.
    pub fn box_select(&mut self, start: Vec2, end: Vec2, mode: SelectMode) -> Vec<EntityId> {
        let box_mode = if end.x >= start.x {
            BoxSelectMode::Contain
        } else {
            BoxSelectMode::Intersect
        };
        let min = start.min(end);
        let max = start.max(end);
        let ids = picking::pick_box(min.x, min.y, max.x, max.y, &self.state.document, &self.viewport, box_mode);

        let before = self.state.selection.version();
        let AppState {
            document, selection, ..
        } = &mut self.state;
        selection.select_many_with_mode(document, &ids, mode);
        if self.state.selection.version() != before {
            self.document_dirty = true;
        }
        tracing::debug!("Box select ({box_mode:?}) admitted {} entity(ies)", ids.len());
        ids
    }

    /// True if a drag between two pixels is long enough to be a box select
    pub fn is_box_drag(&self, start: Vec2, end: Vec2) -> bool {
        start.distance(end) >= self.state.settings.picking.box_drag_px
    }

    pub fn select_all(&mut self) {
        let AppState {
            document, selection, ..
        } = &mut self.state;
        selection.select_all(document);
        self.document_dirty = true;
    }

    pub fn clear_selection(&mut self) {
        let AppState {
            document, selection, ..
        } = &mut self.state;
        selection.clear(document);
        self.document_dirty = true;
    }

    /// Remove every selected entity
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.state.selection.ids();
        let AppState {
            document, selection, ..
        } = &mut self.state;
        let removed = ids.iter().filter(|id| document.remove(**id)).count();
        selection.prune(document);
        if removed > 0 {
            self.document_dirty = true;
        }
        removed
    }

    // ── Line tool ────────────────────────────────────────────

    /// Point on the work plane under a pixel
    pub fn work_plane_point(&self, pos: Vec2) -> Option<Vec3> {
        let ray = self.viewport.screen_ray(pos.x, pos.y)?;
        self.work_plane
            .ray_intersection(ray.origin, ray.direction)
            .map(|(p, _)| p)
    }

    /// Start a zero-length line on the work plane under the pixel
    pub fn begin_line(&mut self, pos: Vec2) -> Option<EntityId> {
        if self.active_line.is_some() {
            self.finish_line();
        }
        let p = self.work_plane_point(pos)?;
        let style = self.line_style;
        let id = self.document_mut().add_line(p, p, style);
        if id == INVALID_ENTITY {
            return None;
        }
        self.active_line = Some(id);
        Some(id)
    }

    /// Move the free end of the active line
    pub fn drag_line(&mut self, pos: Vec2) -> bool {
        let Some(id) = self.active_line else {
            return false;
        };
        let Some(p) = self.work_plane_point(pos) else {
            return false;
        };
        self.document_mut().update_end_line_point(id, p)
    }

    /// Commit the active line. Zero-length lines are discarded.
    pub fn finish_line(&mut self) -> Option<EntityId> {
        let id = self.active_line.take()?;
        let degenerate = match self.state.document.get(id).map(|e| &e.geometry) {
            Some(shared::Geometry::Line { p0, p1 }) => p0.distance(*p1) < 1e-6,
            _ => true,
        };
        if degenerate {
            self.document_mut().remove(id);
            tracing::debug!("Discarded zero-length line {id}");
            return None;
        }
        Some(id)
    }

    // ── View ─────────────────────────────────────────────────

    pub fn set_2d_mode(&mut self, enable: bool) {
        self.camera.set_2d_mode(enable);
        self.drag = None;
        self.refresh_viewport();
    }

    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        if mode == CameraMode::Ortho2D {
            self.set_2d_mode(true);
            return;
        }
        self.camera.set_2d_mode(false);
        self.camera.set_mode(mode);
        self.drag = None;
        self.refresh_viewport();
    }

    /// Back to the home view looking down onto the XY plane
    pub fn reset_view(&mut self) {
        self.camera.set_2d_mode(false);
        self.camera.set_mode(CameraMode::Orbit);
        self.camera.set_target(Vec3::ZERO);
        self.camera.set_position(HOME_POSITION);
        self.camera.reset();
        self.refresh_viewport();
        tracing::info!("View reset");
    }

    // ── Document ─────────────────────────────────────────────

    /// Append the five sample entities
    pub fn add_test_entities(&mut self) -> Vec<EntityId> {
        let ids = fixtures::add_test_entities(self.document_mut());
        tracing::info!("Added {} test entities", ids.len());
        ids
    }

    pub fn clear_document(&mut self) {
        self.active_line = None;
        let AppState {
            document, selection, ..
        } = &mut self.state;
        selection.clear(document);
        document.clear();
        self.document_dirty = true;
        tracing::info!("Document cleared");
    }

    pub fn status(&self) -> SceneStatus {
        SceneStatus {
            entity_count: self.state.document.len(),
            world_per_pixel: self.viewport.world_per_pixel,
            camera_mode: self.camera.mode(),
            fov: self.camera.fov(),
            selection_count: self.state.selection.count(),
        }
    }
}
