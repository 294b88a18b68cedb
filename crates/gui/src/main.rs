mod app;
mod panel;
mod ui;

// Re-export library modules so that `crate::state`, `crate::viewport`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use cadscene_lib::scene;
pub use cadscene_lib::state;
pub use cadscene_lib::viewport;

use app::CadApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadscene_gui=info,cadscene_lib=info".into()),
        )
        .init();

    let with_samples = std::env::args().skip(1).any(|a| a == "--samples");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CAD Scene")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "cadscene-gui",
        native_options,
        Box::new(move |cc| Ok(Box::new(CadApp::new(cc, with_samples)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}
