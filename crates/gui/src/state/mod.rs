pub mod document;
pub mod selection;
pub mod settings;

pub use document::Document;
pub use selection::{SelectMode, SelectionChanged, SelectionManager};
pub use settings::AppSettings;

/// Document, selection and settings of one session
pub struct AppState {
    pub document: Document,
    pub selection: SelectionManager,
    pub settings: AppSettings,
}

impl AppState {
    /// State with settings read from the user's config directory
    pub fn load() -> Self {
        Self::with_settings(AppSettings::load())
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            document: Document::new(),
            selection: SelectionManager::new(),
            settings,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_settings(AppSettings::default())
    }
}
