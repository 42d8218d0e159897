//! Configuration file support
//!
//! Loads engine configuration from TOML files. Layout sizes are written the
//! way people think about them (`font_height_vh = 4.63` percent, `0.5` em)
//! and converted to the integer units the layout code works in.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{EngineConfig, FontConfig, LayoutConfig, PlayerConfig};
use crate::error::{Result, WebVttError};

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Font family and colours
    pub font: Option<FontSettings>,
    /// Layout sizes
    pub layout: Option<LayoutSettings>,
    /// Viewport and polling intervals
    pub engine: Option<EngineSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontSettings {
    pub family: Option<String>,
    /// Text colour name (white, lime, cyan, red, yellow, magenta, blue, black)
    pub text_colour: Option<String>,
    /// Background colour name
    pub bg_colour: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Font height, percent of the viewport height
    pub font_height_vh: Option<f64>,
    /// Line height, percent of the viewport height
    pub line_height_vh: Option<f64>,
    /// Safe-area padding, percent
    pub screen_padding: Option<f64>,
    /// Horizontal padding in ems
    pub horizontal_padding_em: Option<f64>,
    /// Vertical padding in ems
    pub vertical_padding_em: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSettings {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub tick_interval_ms: Option<u64>,
    pub paused_interval_ms: Option<u64>,
    pub idle_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

/// `round(scale × value)`, or `default` with a warning when out of range
fn fractional(key: &str, value: Option<f64>, scale: f64, default: i32) -> i32 {
    let Some(value) = value else {
        return default;
    };
    let scaled = (value * scale).round();
    if !scaled.is_finite() || scaled < 0.0 || scaled > i32::MAX as f64 {
        tracing::warn!("Bad value {} for {}, using default {}", value, key, default);
        return default;
    }
    scaled as i32
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| WebVttError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        Self {
            font: Some(FontSettings {
                family: Some("Cinecav Sans".to_string()),
                text_colour: Some("WHITE".to_string()),
                bg_colour: Some("BLACK".to_string()),
            }),
            layout: Some(LayoutSettings {
                font_height_vh: Some(4.63),
                line_height_vh: Some(5.21),
                screen_padding: Some(5.0),
                horizontal_padding_em: Some(0.5),
                vertical_padding_em: Some(0.0),
            }),
            engine: Some(EngineSettings {
                width: Some(1920),
                height: Some(1080),
                tick_interval_ms: Some(25),
                paused_interval_ms: Some(250),
                idle_interval_ms: Some(100),
            }),
            logging: Some(LoggingSettings {
                level: "info".to_string(),
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to EngineConfig, filling gaps with defaults
    pub fn into_engine_config(self) -> EngineConfig {
        let mut config = EngineConfig::new();

        if let Some(font) = self.font {
            let defaults = FontConfig::default();
            config.font = FontConfig {
                family: font.family.unwrap_or(defaults.family),
                text_colour: font.text_colour.unwrap_or(defaults.text_colour),
                bg_colour: font.bg_colour.unwrap_or(defaults.bg_colour),
            };
        }

        if let Some(layout) = self.layout {
            let d = LayoutConfig::default();
            config.layout = LayoutConfig {
                font_height_vh: fractional("font_height_vh", layout.font_height_vh, 100.0, d.font_height_vh),
                line_height_vh: fractional("line_height_vh", layout.line_height_vh, 100.0, d.line_height_vh),
                screen_padding: fractional("screen_padding", layout.screen_padding, 100.0, d.screen_padding),
                horizontal_padding_em: fractional(
                    "horizontal_padding_em",
                    layout.horizontal_padding_em,
                    10.0,
                    d.horizontal_padding_em,
                ),
                vertical_padding_em: fractional(
                    "vertical_padding_em",
                    layout.vertical_padding_em,
                    10.0,
                    d.vertical_padding_em,
                ),
            };
        }

        if let Some(engine) = self.engine {
            let d = PlayerConfig::default();
            config.player = PlayerConfig {
                width: engine.width.filter(|w| *w > 0).unwrap_or(d.width),
                height: engine.height.filter(|h| *h > 0).unwrap_or(d.height),
                tick_interval_ms: engine.tick_interval_ms.unwrap_or(d.tick_interval_ms),
                paused_interval_ms: engine.paused_interval_ms.unwrap_or(d.paused_interval_ms),
                idle_interval_ms: engine.idle_interval_ms.unwrap_or(d.idle_interval_ms),
            };
        }

        if let Some(logging) = self.logging {
            config.log_json = logging.format.as_deref() == Some("json");
            config.log_level = logging.level;
        }

        config
    }
}

/// Generate default configuration file at the specified path
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let config = ConfigFile::default_config();
    config.to_file(path)?;
    Ok(())
}
