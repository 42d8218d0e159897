//! Region model
//!
//! Regions are named areas of the viewport shared by several cues, used for
//! roll-up style captions. All extents are hundredths of a percent.

use std::collections::HashMap;

use serde::Serialize;

use crate::parser::settings::{parse_anchor, parse_percentage_hundredths, SettingsMap};

/// More lines than any font size class fits on screen
pub const MAX_REGION_LINES: i32 = 100;

/// Regions keyed by id
pub type RegionMap = HashMap<String, Region>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Scroll {
    #[default]
    None,
    Up,
}

/// Anchor point, hundredths of a percent on each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
}

impl Default for Anchor {
    fn default() -> Self {
        Self { x: 0, y: 10000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: String,
    /// Width as a share of the viewport width
    pub width: i32,
    /// Maximum number of lines shown at once
    pub lines: i32,
    pub region_anchor: Anchor,
    pub viewport_anchor: Anchor,
    pub scroll: Scroll,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            id: String::new(),
            width: 10000,
            lines: 3,
            region_anchor: Anchor::default(),
            viewport_anchor: Anchor::default(),
            scroll: Scroll::None,
        }
    }
}

impl Region {
    /// Build a region from the `key:value` lines of a REGION block
    ///
    /// Values that fail to parse keep their defaults.
    pub fn from_settings(settings: &SettingsMap) -> Self {
        let mut region = Region::default();

        for (key, value) in settings {
            match key.as_str() {
                "id" => region.id = value.clone(),
                "width" => match parse_percentage_hundredths(value) {
                    Ok(width) => region.width = width,
                    Err(e) => tracing::info!("Failed to parse region width {:?}: {}", value, e),
                },
                "lines" => match value.trim().parse::<i32>() {
                    Ok(lines) if lines < 0 => tracing::info!("Negative region lines {:?} ignored", value),
                    Ok(lines) if lines > MAX_REGION_LINES => {
                        tracing::info!("Region lines {} capped at {}", lines, MAX_REGION_LINES);
                        region.lines = MAX_REGION_LINES;
                    }
                    Ok(lines) => region.lines = lines,
                    Err(e) => tracing::info!("Failed to parse region lines {:?}: {}", value, e),
                },
                "regionanchor" => match parse_anchor(value) {
                    Ok((x, y)) => region.region_anchor = Anchor { x, y },
                    Err(e) => tracing::info!("Failed to parse region anchor {:?}: {}", value, e),
                },
                "viewportanchor" => match parse_anchor(value) {
                    Ok((x, y)) => region.viewport_anchor = Anchor { x, y },
                    Err(e) => tracing::info!("Failed to parse viewport anchor {:?}: {}", value, e),
                },
                "scroll" => {
                    if value == "up" {
                        region.scroll = Scroll::Up;
                    }
                }
                _ => tracing::info!("Bad property/value pair in region settings: {}/{}", key, value),
            }
        }

        region
    }
}
