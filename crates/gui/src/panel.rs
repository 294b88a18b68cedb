//! Viewport panel: egui input → scene calls, scene → GL paint callback

use std::sync::{Arc, Mutex};

use eframe::egui;
use glam::Vec2;

use crate::scene::CadScene;
use crate::state::SelectMode;
use crate::viewport::{GlRenderer, RenderParams};

/// egui scroll points per wheel notch
const SCROLL_POINTS_PER_NOTCH: f32 = 50.0;

/// Rubber-band colors
const BOX_CONTAIN_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);
const BOX_INTERSECT_COLOR: egui::Color32 = egui::Color32::from_rgb(90, 220, 120);

/// Active pointer tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Navigate,
    Line,
}

impl Tool {
    pub fn label(self) -> &'static str {
        match self {
            Tool::Navigate => "Navigate",
            Tool::Line => "Line",
        }
    }
}

/// Pointer gesture in progress
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Navigate,
    BoxSelect { start: Vec2, current: Vec2 },
    DrawLine,
}

pub struct ViewportPanel {
    renderer: Option<Arc<Mutex<GlRenderer>>>,
    gesture: Option<Gesture>,
    pub tool: Tool,
    /// Force a full batch rebuild on the next sync
    rebuild_requested: bool,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            renderer: None,
            gesture: None,
            tool: Tool::default(),
            rebuild_requested: false,
        }
    }

    /// Create the renderer (must be called with a GL context)
    pub fn init_gl(&mut self, gl: &glow::Context, scene: &CadScene) {
        let mut renderer = GlRenderer::new();
        if let Err(e) = renderer.initialize(gl) {
            tracing::error!("Viewport renders nothing: {e}");
        }
        let tracker = renderer.tracker_mut();
        tracker.rezoom_threshold = scene.settings().tessellation.rezoom_threshold;
        tracker.selection_color = scene.settings().viewport.selection_color;
        self.renderer = Some(Arc::new(Mutex::new(renderer)));
    }

    pub fn request_rebuild(&mut self) {
        self.rebuild_requested = true;
    }

    /// Release GPU resources while the context is still alive
    pub fn shutdown(&mut self, gl: &glow::Context) {
        if let Some(renderer) = self.renderer.take() {
            if let Ok(mut r) = renderer.lock() {
                r.shutdown(gl);
            }
        }
    }

    /// Upload document changes. Runs once per frame before painting.
    pub fn sync_renderer(&mut self, gl: &glow::Context, scene: &mut CadScene) {
        let Some(renderer) = &self.renderer else {
            return;
        };
        let Ok(mut r) = renderer.lock() else {
            return;
        };
        let selection_color = scene.settings().viewport.selection_color;
        let force = std::mem::take(&mut self.rebuild_requested)
            || r.tracker_mut().selection_color != selection_color;
        r.tracker_mut().selection_color = selection_color;

        let zoomed = r
            .tracker_mut()
            .needs_retessellation(scene.viewport().world_per_pixel);
        if scene.take_document_dirty() || zoomed || force {
            let (doc, vp) = scene.render_inputs();
            r.sync_from_document(gl, doc, vp, force);
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, scene: &mut CadScene) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

        scene.resize(rect.width(), rect.height());
        let local = |p: egui::Pos2| Vec2::new(p.x - rect.min.x, p.y - rect.min.y);
        let modifiers = ui.input(|i| i.modifiers);

        // ── Drag gestures ────────────────────────────────────
        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos().map(local) {
                self.gesture = Some(self.start_gesture(scene, pos, modifiers));
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos().map(local) {
                self.continue_gesture(scene, pos);
            }
        }
        if response.drag_stopped() {
            self.finish_gesture(scene, modifiers);
        }

        // ── Click selection ──────────────────────────────────
        if response.clicked() && self.tool == Tool::Navigate {
            if let Some(pos) = response.interact_pointer_pos().map(local) {
                scene.click_select(pos, select_mode(modifiers));
            }
        }

        // ── Scroll zoom ──────────────────────────────────────
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > 0.1 {
                scene.wheel(scroll / SCROLL_POINTS_PER_NOTCH * 120.0);
            }
        }

        scene.update(ui.input(|i| i.stable_dt));

        if !ui.is_rect_visible(rect) {
            return;
        }

        self.paint(ui, rect, scene);

        // ── Rubber band ──────────────────────────────────────
        if let Some(Gesture::BoxSelect { start, current }) = self.gesture {
            let color = if current.x >= start.x {
                BOX_CONTAIN_COLOR
            } else {
                BOX_INTERSECT_COLOR
            };
            let a = rect.min + egui::vec2(start.x, start.y);
            let b = rect.min + egui::vec2(current.x, current.y);
            let band = egui::Rect::from_two_pos(a, b);
            ui.painter().rect_filled(band, 0.0, color.gamma_multiply(0.15));
            ui.painter()
                .rect_stroke(band, 0.0, egui::Stroke::new(1.0, color), egui::StrokeKind::Inside);
        }
    }

    fn start_gesture(&mut self, scene: &mut CadScene, pos: Vec2, modifiers: egui::Modifiers) -> Gesture {
        if self.tool == Tool::Line {
            if scene.begin_line(pos).is_some() {
                return Gesture::DrawLine;
            }
            tracing::debug!("Line start missed the work plane");
        }
        if modifiers.shift || modifiers.command {
            return Gesture::BoxSelect {
                start: pos,
                current: pos,
            };
        }
        scene.pointer_press(pos);
        Gesture::Navigate
    }

    fn continue_gesture(&mut self, scene: &mut CadScene, pos: Vec2) {
        match &mut self.gesture {
            Some(Gesture::Navigate) => scene.pointer_move(pos),
            Some(Gesture::BoxSelect { current, .. }) => *current = pos,
            Some(Gesture::DrawLine) => {
                scene.drag_line(pos);
            }
            None => {}
        }
    }

    fn finish_gesture(&mut self, scene: &mut CadScene, modifiers: egui::Modifiers) {
        match self.gesture.take() {
            Some(Gesture::Navigate) => scene.pointer_release(),
            Some(Gesture::BoxSelect { start, current }) => {
                if scene.is_box_drag(start, current) {
                    let mode = if modifiers.command {
                        SelectMode::Toggle
                    } else {
                        SelectMode::Add
                    };
                    scene.box_select(start, current, mode);
                }
            }
            Some(Gesture::DrawLine) => {
                scene.finish_line();
            }
            None => {}
        }
    }

    fn paint(&self, ui: &mut egui::Ui, rect: egui::Rect, scene: &CadScene) {
        let Some(renderer) = &self.renderer else {
            return;
        };
        let renderer = renderer.clone();
        let viewport = scene.viewport().clone();
        let grid = scene.settings().grid.clone();
        let axes = scene.settings().axes.clone();
        let bg_color = scene.settings().viewport.background_color;

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(eframe::egui_glow::CallbackFn::new(move |info, painter| {
                let gl = painter.gl();
                let clip = info.clip_rect_in_pixels();
                let params = RenderParams {
                    viewport: [
                        clip.left_px as f32,
                        clip.from_bottom_px as f32,
                        clip.width_px as f32,
                        clip.height_px as f32,
                    ],
                    bg_color,
                    grid: &grid,
                    axes: &axes,
                };
                if let Ok(r) = renderer.lock() {
                    r.paint(gl, &viewport, &params);
                }
            })),
        };
        ui.painter().add(callback);
    }
}

/// Shift adds, Ctrl/Cmd toggles, plain click replaces
fn select_mode(modifiers: egui::Modifiers) -> SelectMode {
    if modifiers.command {
        SelectMode::Toggle
    } else if modifiers.shift {
        SelectMode::Add
    } else {
        SelectMode::Replace
    }
}
