//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::render::style::{ColorArgb, Style};

/// Layout sizes
///
/// Heights are hundredths of a percent of the viewport height, padding is
/// in hundredths of a percent and em paddings are tenths of an em.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Font height (FONT.HEIGHT_VH)
    pub font_height_vh: i32,

    /// Line height (LINE.HEIGHT_VH)
    pub line_height_vh: i32,

    /// Safe-area padding applied on every edge (SCREEN.PADDING)
    pub screen_padding: i32,

    /// Horizontal padding around line text (FONT.HPAD_EM)
    pub horizontal_padding_em: i32,

    /// Vertical padding around line text (FONT.VPAD_EM)
    pub vertical_padding_em: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_height_vh: 463, // 50px at 1080 lines
            line_height_vh: 521, // 9/8 of the font height
            screen_padding: 500,
            horizontal_padding_em: 5,
            vertical_padding_em: 0,
        }
    }
}

/// Font family and default colours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Font family (FONT.FAMILY)
    pub family: String,

    /// Default text colour name (FONT.COLOUR)
    pub text_colour: String,

    /// Default background colour name (BG.COLOUR)
    pub bg_colour: String,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Cinecav Sans".to_string(),
            text_colour: "WHITE".to_string(),
            bg_colour: "BLACK".to_string(),
        }
    }
}

impl FontConfig {
    /// Style for text without markup
    pub fn base_style(&self) -> Style {
        let text = ColorArgb::from_name(&self.text_colour).unwrap_or_else(|| {
            tracing::warn!("Unknown text colour {:?}, using white", self.text_colour);
            ColorArgb::WHITE
        });
        let bg = ColorArgb::from_name(&self.bg_colour).unwrap_or_else(|| {
            tracing::warn!("Unknown background colour {:?}, using black", self.bg_colour);
            ColorArgb::BLACK
        });
        Style::with_colours(text, bg)
    }
}

/// Viewport and polling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Surface width in pixels
    pub width: i32,

    /// Surface height in pixels
    pub height: i32,

    /// Poll interval while cues are live
    pub tick_interval_ms: u64,

    /// Poll interval while paused
    pub paused_interval_ms: u64,

    /// Sleep used when the engine reports no wait time
    pub idle_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            tick_interval_ms: 25,
            paused_interval_ms: 250,
            idle_interval_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub layout: LayoutConfig,

    pub font: FontConfig,

    pub player: PlayerConfig,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            font: FontConfig::default(),
            player: PlayerConfig::default(),
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
