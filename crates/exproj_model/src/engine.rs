//! Engine configuration stored with the project.

use serde::{Deserialize, Serialize};

/// Default canvas background.
pub const EXCALIBUR_BLUE: &str = "#7cbaeb";

/// Canvas size in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

/// How the canvas is fitted to its container or the screen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum DisplayMode {
    #[default]
    Fixed,
    FitContainerAndFill,
    FitScreenAndFill,
    FitContainerAndZoom,
    FitScreenAndZoom,
    FitScreen,
    FillScreen,
    FitContainer,
    FillContainer,
}

/// Engine settings applied when the game boots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Canvas size.
    pub size: CanvasSize,
    /// Device pixel ratio.
    pub pixel_ratio: f64,
    /// Canvas display mode.
    #[serde(rename = "DisplayMode")]
    pub display_mode: DisplayMode,
    /// Whether antialiasing is enabled.
    pub anti_aliasing: bool,
    /// Whether pixel-art sampling is enabled.
    pub pixel_art: bool,
    /// CSS color string.
    pub background_color: String,
    /// Target frame rate.
    pub fps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            size: CanvasSize::default(),
            pixel_ratio: 1.0,
            display_mode: DisplayMode::Fixed,
            anti_aliasing: true,
            pixel_art: true,
            background_color: EXCALIBUR_BLUE.to_string(),
            fps: 60,
        }
    }
}
