//! Main application module

mod keyboard;
mod styles;

use eframe::egui;

use crate::panel::ViewportPanel;
use crate::scene::CadScene;
use crate::state::AppSettings;
use crate::ui::{controls, status_bar};

/// Main application
pub struct CadApp {
    scene: CadScene,
    viewport: ViewportPanel,
}

impl CadApp {
    pub fn new(cc: &eframe::CreationContext<'_>, with_samples: bool) -> Self {
        styles::configure_styles(&cc.egui_ctx);

        let mut scene = CadScene::new(AppSettings::load());
        if with_samples {
            scene.add_test_entities();
        }

        let mut viewport = ViewportPanel::new();

        // Initialize GL renderer if glow context is available
        if let Some(gl) = cc.gl.as_ref() {
            viewport.init_gl(gl, &scene);
        } else {
            tracing::warn!("No glow context; the viewport will stay empty");
        }

        Self { scene, viewport }
    }
}

impl eframe::App for CadApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        keyboard::handle_keyboard(ctx, &mut self.scene);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Save settings").clicked() {
                        self.scene.settings().save();
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Edit", |ui| {
                    if ui.button("Select all").clicked() {
                        self.scene.select_all();
                        ui.close_menu();
                    }
                    if ui.button("Clear selection").clicked() {
                        self.scene.clear_selection();
                        ui.close_menu();
                    }
                    if ui.button("Delete selected").clicked() {
                        self.scene.delete_selected();
                        ui.close_menu();
                    }
                });
            });
        });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.scene, self.viewport.tool);
            });

        // ── Left panel: controls ─────────────────────────────
        egui::SidePanel::left("controls")
            .default_width(230.0)
            .width_range(180.0..=400.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)))
            .show(ctx, |ui| {
                controls::show(ui, &mut self.scene, &mut self.viewport);
            });

        // ── Central viewport ─────────────────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.viewport.show(ui, &mut self.scene);
            });

        if let Some(gl) = frame.gl() {
            self.viewport.sync_renderer(gl, &mut self.scene);
        }

        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.viewport.shutdown(gl);
        }
    }
}
