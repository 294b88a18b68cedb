//! Side panel: view options, camera, document and selection controls

use egui::Ui;

use crate::panel::{Tool, ViewportPanel};
use crate::scene::CadScene;
use crate::viewport::{CameraMode, View2DOrientation};

/// Distance used by the preset view buttons
const PRESET_DISTANCE: f32 = 10.0;

pub fn show(ui: &mut Ui, scene: &mut CadScene, viewport: &mut ViewportPanel) {
    egui::ScrollArea::vertical().show(ui, |ui| {
        view_options(ui, scene);
        ui.add_space(8.0);
        camera_controls(ui, scene);
        ui.add_space(8.0);
        work_plane_controls(ui, scene);
        ui.add_space(8.0);
        document_controls(ui, scene, viewport);
        ui.add_space(8.0);
        selection_info(ui, scene);
    });
}

fn view_options(ui: &mut Ui, scene: &mut CadScene) {
    ui.heading("View");
    let settings = scene.settings_mut();
    ui.checkbox(&mut settings.grid.visible, "Show grid");
    ui.checkbox(&mut settings.axes.visible, "Show axes");
    ui.horizontal(|ui| {
        ui.label("Grid spacing (px)");
        ui.add(egui::DragValue::new(&mut settings.grid.target_spacing_px).range(20.0..=300.0));
    });
    ui.horizontal(|ui| {
        ui.label("Pick radius (px)");
        ui.add(egui::DragValue::new(&mut settings.picking.radius_px).range(1.0..=30.0));
    });
    if ui.button("Reset view").clicked() {
        scene.reset_view();
    }
}

fn camera_controls(ui: &mut Ui, scene: &mut CadScene) {
    ui.heading("Camera");

    let current = scene.camera().mode();
    egui::ComboBox::from_label("Mode")
        .selected_text(current.label())
        .show_ui(ui, |ui| {
            for mode in CameraMode::ALL {
                if ui.selectable_label(current == mode, mode.label()).clicked() && mode != current {
                    scene.set_camera_mode(mode);
                }
            }
        });

    let mut is_2d = scene.camera().is_2d();
    if ui.checkbox(&mut is_2d, "2D mode").changed() {
        scene.set_2d_mode(is_2d);
    }

    ui.horizontal(|ui| {
        let camera = scene.camera_mut();
        if ui.button("Top").clicked() {
            camera.set_top_view(PRESET_DISTANCE);
        }
        if ui.button("Front").clicked() {
            camera.set_front_view(PRESET_DISTANCE);
        }
        if ui.button("Right").clicked() {
            camera.set_right_view(PRESET_DISTANCE);
        }
        if ui.button("Iso").clicked() {
            camera.set_isometric_view(PRESET_DISTANCE);
        }
    });

    if scene.camera().is_2d() {
        let current = scene.camera().orientation_2d();
        ui.horizontal(|ui| {
            for orientation in [View2DOrientation::Top, View2DOrientation::Front, View2DOrientation::Right] {
                let label = format!("{orientation:?}");
                if ui.selectable_label(current == orientation, label).clicked() {
                    scene.camera_mut().set_2d_orientation(orientation);
                }
            }
        });
    }

    let camera = scene.camera();
    let pos = camera.position();
    ui.weak(format!("Eye ({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z));
    ui.weak(format!(
        "Yaw {:.1}°  Pitch {:.1}°  Radius {:.2}",
        camera.yaw(),
        camera.pitch(),
        camera.radius()
    ));
}

fn work_plane_controls(ui: &mut Ui, scene: &mut CadScene) {
    ui.heading("Work plane");
    let plane = scene.work_plane_mut();
    ui.horizontal(|ui| {
        if ui.button("XY").clicked() {
            plane.set_xy(0.0);
        }
        if ui.button("XZ").clicked() {
            plane.set_xz(0.0);
        }
        if ui.button("YZ").clicked() {
            plane.set_yz(0.0);
        }
    });
    let mut follow = plane.follow.enabled;
    if ui.checkbox(&mut follow, "Follow camera").changed() {
        plane.follow.follow_position = follow;
        plane.set_follow_enabled(follow);
    }
    let n = plane.normal();
    ui.weak(format!("Normal ({:.2}, {:.2}, {:.2})", n.x, n.y, n.z));
}

fn document_controls(ui: &mut Ui, scene: &mut CadScene, viewport: &mut ViewportPanel) {
    ui.heading("Document");
    ui.horizontal(|ui| {
        ui.label("Tool");
        for tool in [Tool::Navigate, Tool::Line] {
            ui.selectable_value(&mut viewport.tool, tool, tool.label());
        }
    });
    ui.horizontal(|ui| {
        if ui.button("Add test entities").clicked() {
            scene.add_test_entities();
        }
        if ui.button("Clear").clicked() {
            scene.clear_document();
        }
    });
    if ui.button("Rebuild batches").clicked() {
        viewport.request_rebuild();
    }
}

fn selection_info(ui: &mut Ui, scene: &mut CadScene) {
    ui.heading("Selection");
    let ids = scene.selection().ids();
    if ids.is_empty() {
        ui.weak("Nothing selected");
        return;
    }
    for id in ids.iter().take(20) {
        if let Some(entity) = scene.document().get(*id) {
            ui.label(format!("#{id} {}", entity.kind()));
        }
    }
    if ids.len() > 20 {
        ui.weak(format!("… and {} more", ids.len() - 20));
    }
    ui.horizontal(|ui| {
        if ui.button("Hide").clicked() {
            let doc = scene.document_mut();
            for id in &ids {
                doc.set_visible(*id, false);
            }
        }
        if ui.button("Show all").clicked() {
            let doc = scene.document_mut();
            for id in doc.ids() {
                doc.set_visible(id, true);
            }
        }
        if ui.button("Delete").clicked() {
            scene.delete_selected();
        }
    });
}
