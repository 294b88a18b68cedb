//! Application settings

use serde::{Deserialize, Serialize};
use shared::pack_rgba;

/// Grid display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    /// Show grid
    pub visible: bool,
    /// Desired on-screen spacing between minor lines, in pixels
    pub target_spacing_px: f32,
    /// Every n-th line is drawn as a major line
    pub major_every: u32,
    /// Minor line color (0xRRGGBBAA)
    pub minor_color: u32,
    /// Major line color (0xRRGGBBAA)
    pub major_color: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            target_spacing_px: 80.0,
            major_every: 5,
            minor_color: pack_rgba(64, 64, 64, 255),
            major_color: pack_rgba(100, 100, 100, 255),
        }
    }
}

/// Axis display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisSettings {
    /// Show axes
    pub visible: bool,
    /// Axis line length in world units
    pub length: f32,
    pub x_color: u32,
    pub y_color: u32,
    pub z_color: u32,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            visible: true,
            length: 100.0,
            x_color: pack_rgba(230, 50, 50, 255),
            y_color: pack_rgba(50, 200, 50, 255),
            z_color: pack_rgba(50, 80, 230, 255),
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Color used for selected entities (0xRRGGBBAA)
    pub selection_color: u32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [30, 30, 35],
            selection_color: pack_rgba(0, 220, 255, 255),
        }
    }
}

/// Picking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickSettings {
    /// Click tolerance in pixels, converted to world units per frame
    pub radius_px: f32,
    /// Minimum drag distance in pixels before a press turns into a box select
    pub box_drag_px: f32,
}

impl Default for PickSettings {
    fn default() -> Self {
        Self {
            radius_px: 6.0,
            box_drag_px: 4.0,
        }
    }
}

/// Camera control settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Degrees of rotation per unit of mouse delta
    pub mouse_sensitivity: f32,
    /// Orbit distance change per wheel step
    pub scroll_sensitivity: f32,
    /// Multiplier on 2D panning
    pub pan_sensitivity: f32,
    /// Keyboard movement speed in world units per second
    pub move_speed: f32,
    /// Fractional 2D zoom per wheel step
    pub zoom_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 1.0,
            scroll_sensitivity: 2.0,
            pan_sensitivity: 1.0,
            move_speed: 2.5,
            zoom_speed: 0.1,
        }
    }
}

/// Curve tessellation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TessellationSettings {
    /// Relative world-per-pixel change that triggers re-tessellation of curves
    pub rezoom_threshold: f32,
}

impl Default for TessellationSettings {
    fn default() -> Self {
        Self {
            rezoom_threshold: 0.5,
        }
    }
}

/// All application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppSettings {
    /// Grid settings
    #[serde(default)]
    pub grid: GridSettings,
    /// Axis settings
    #[serde(default)]
    pub axes: AxisSettings,
    /// Viewport settings
    #[serde(default)]
    pub viewport: ViewportSettings,
    /// Picking settings
    #[serde(default)]
    pub picking: PickSettings,
    /// Camera control settings
    #[serde(default)]
    pub camera: CameraSettings,
    /// Tessellation settings
    #[serde(default)]
    pub tessellation: TessellationSettings,
}

impl AppSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "cadscene", "cadscene") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match serde_json::from_str(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!("Ignoring malformed {}: {e}", config_path.display()),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) {
        if let Some(dirs) = directories::ProjectDirs::from("com", "cadscene", "cadscene") {
            let config_dir = dirs.config_dir();
            if std::fs::create_dir_all(config_dir).is_ok() {
                let config_path = config_dir.join("settings.json");
                if let Ok(json) = serde_json::to_string_pretty(self) {
                    if let Err(e) = std::fs::write(&config_path, json) {
                        tracing::warn!("Failed to write {}: {e}", config_path.display());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let json = r#"{ "grid": { "visible": false, "target_spacing_px": 40.0, "major_every": 10,
                        "minor_color": 1, "major_color": 2 } }"#;
        let s: AppSettings = serde_json::from_str(json).unwrap();
        assert!(!s.grid.visible);
        assert_eq!(s.grid.major_every, 10);
        assert_eq!(s.picking.radius_px, PickSettings::default().radius_px);
        assert_eq!(s.tessellation.rezoom_threshold, 0.5);
    }
}
