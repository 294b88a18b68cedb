//! Keyboard shortcut handling

use eframe::egui;

use crate::scene::CadScene;
use crate::viewport::CameraMovement;

/// Held keys that move the camera every frame
const MOVEMENT_KEYS: [(egui::Key, CameraMovement); 6] = [
    (egui::Key::W, CameraMovement::Forward),
    (egui::Key::S, CameraMovement::Backward),
    (egui::Key::A, CameraMovement::Left),
    (egui::Key::D, CameraMovement::Right),
    (egui::Key::E, CameraMovement::Up),
    (egui::Key::Q, CameraMovement::Down),
];

/// Handle keyboard shortcuts for the application
pub fn handle_keyboard(ctx: &egui::Context, scene: &mut CadScene) {
    // Don't handle shortcuts when a text field is focused
    if ctx.memory(|m| m.focused().is_some()) {
        return;
    }

    ctx.input(|i| {
        let dt = i.stable_dt;
        if !i.modifiers.command {
            for (key, movement) in MOVEMENT_KEYS {
                if i.key_down(key) {
                    scene.key(movement, dt);
                }
            }
        }
        // R — reset view
        if i.key_pressed(egui::Key::R) && !i.modifiers.command {
            scene.key(CameraMovement::Reset, dt);
        }
        // Tab — toggle 2D
        if i.key_pressed(egui::Key::Tab) {
            let is_2d = scene.camera().is_2d();
            scene.set_2d_mode(!is_2d);
        }
        // Escape — cancel line / clear selection
        if i.key_pressed(egui::Key::Escape) {
            if scene.active_line().is_some() {
                scene.finish_line();
            } else {
                scene.clear_selection();
            }
        }
        // Delete — remove selected entities
        if i.key_pressed(egui::Key::Delete) {
            scene.delete_selected();
        }
        // Ctrl+A — select all
        if i.modifiers.command && i.key_pressed(egui::Key::A) {
            scene.select_all();
        }
    });
}
