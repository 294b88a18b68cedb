use egui::Ui;

use crate::panel::Tool;
use crate::scene::CadScene;

pub fn show(ui: &mut Ui, scene: &CadScene, tool: Tool) {
    let status = scene.status();
    ui.horizontal(|ui| {
        ui.weak(format!("Entities: {}", status.entity_count));
        ui.separator();
        ui.weak(format!("Selected: {}", status.selection_count));
        ui.separator();
        ui.weak(format!("Camera: {}", status.camera_mode));
        if !scene.camera().is_2d() {
            ui.weak(format!("FOV {:.0}°", status.fov));
        }
        ui.separator();
        ui.weak(format!("World/Pixel: {:.4}", status.world_per_pixel));
        ui.separator();
        ui.weak(format!("Tool: {}", tool.label()));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let target = scene.camera().target();
            ui.weak(format!("Target ({:.2}, {:.2}, {:.2})", target.x, target.y, target.z));
        });
    });
}
