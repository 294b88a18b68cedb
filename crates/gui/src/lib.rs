// Library crate: the scene engine plus the headless harness used by integration tests.
// The egui application shell (app, panel, ui) remains in the binary crate.

pub mod error;
pub mod fixtures;
pub mod harness;
pub mod scene;
pub mod state;
pub mod viewport;
