//! Viewport unit conversion
//!
//! Cue geometry is expressed in hundredths of a percent of the viewport
//! (`vw`/`vh`). The converter maps those onto pixels of the padded display
//! area, i.e. the surface minus the safe-area padding on each edge.

use crate::config::{EngineConfig, LayoutConfig};
use crate::cue::Align;
use crate::render::attributes::Attributes;

/// Font height per font size class, hundredths of vh (34/50/80/100 px at 1080)
pub const FONT_HEIGHT: [i32; 4] = [315, 463, 741, 926];
/// Line height per font size class, 9/8 of the font height
pub const LINE_HEIGHT: [i32; 4] = [354, 521, 833, 1042];
/// Top of auto-positioned cues per font size class (870/860/790/770 px at 1080)
pub const TOP_POSITIONING: [i32; 4] = [8056, 7963, 7315, 7130];

#[derive(Debug, Clone)]
pub struct Converter {
    width: i32,
    height: i32,
    screen_padding: i32,
    default_font_height: i32,
    default_line_height: i32,
    font_height: i32,
    line_height: i32,
    top_positioning: Option<i32>,
    horizontal_padding_em: f64,
    vertical_padding_em: f64,
}

/// Surface dimension minus `padding` on both edges
fn display_dimension(dimension: i32, padding: i32) -> i32 {
    (dimension as f64 * (10000.0 - 2.0 * padding as f64) / 10000.0) as i32
}

impl Converter {
    pub fn new(width: i32, height: i32, config: &EngineConfig, attributes: &Attributes) -> Self {
        let layout = &config.layout;
        let mut converter = Self::from_layout(width, height, layout);
        converter.set_attributes(attributes);
        converter
    }

    /// Converter using the built-in layout defaults
    pub fn with_defaults(width: i32, height: i32) -> Self {
        Self::from_layout(width, height, &LayoutConfig::default())
    }

    fn from_layout(width: i32, height: i32, layout: &LayoutConfig) -> Self {
        Self {
            width: display_dimension(width, layout.screen_padding),
            height: display_dimension(height, layout.screen_padding),
            screen_padding: layout.screen_padding,
            default_font_height: layout.font_height_vh,
            default_line_height: layout.line_height_vh,
            font_height: layout.font_height_vh,
            line_height: layout.line_height_vh,
            top_positioning: None,
            horizontal_padding_em: layout.horizontal_padding_em as f64,
            vertical_padding_em: layout.vertical_padding_em as f64,
        }
    }

    /// Padded display width in pixels
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Padded display height in pixels
    pub fn height(&self) -> i32 {
        self.height
    }

    fn vw_pixels(&self, hundredths: f64) -> i32 {
        (self.width as f64 * hundredths / 10000.0) as i32
    }

    fn vh_pixels(&self, hundredths: f64) -> i32 {
        (self.height as f64 * hundredths / 10000.0) as i32
    }

    pub fn vw_to_width_pixels(&self, width: f64) -> i32 {
        self.vw_pixels(width)
    }

    pub fn vh_to_height_pixels(&self, height: f64) -> i32 {
        self.vh_pixels(height)
    }

    pub fn screen_padding_width_pixels(&self) -> i32 {
        self.vw_pixels(self.screen_padding as f64)
    }

    pub fn screen_padding_height_pixels(&self) -> i32 {
        self.vh_pixels(self.screen_padding as f64)
    }

    pub fn font_size_pixels(&self) -> i32 {
        self.vh_pixels(self.font_height as f64)
    }

    pub fn line_height_pixels(&self) -> i32 {
        self.vh_pixels(self.line_height as f64)
    }

    pub fn line_height_vh(&self) -> i32 {
        self.line_height
    }

    pub fn horizontal_padding(&self) -> i32 {
        self.vh_pixels(self.font_height as f64 * self.horizontal_padding_em / 10.0)
    }

    pub fn vertical_padding(&self) -> i32 {
        self.vh_pixels(self.font_height as f64 * self.vertical_padding_em / 10.0)
    }

    /// Left edge of a box `line_width` wide anchored at `position` by `align`
    pub fn x_for_text_box(&self, line_width: i32, align: Align, position: i32) -> i32 {
        match align {
            Align::Left | Align::Start => position,
            Align::Right | Align::End => position - line_width,
            Align::Center => position - line_width / 2,
        }
    }

    pub fn is_top_positioning_set(&self) -> bool {
        self.top_positioning.is_some()
    }

    pub fn top_positioning_pixels(&self) -> i32 {
        self.vh_pixels(self.top_positioning.unwrap_or(0) as f64)
    }

    /// Pick font and line heights from the font size class, if one is set
    pub fn set_attributes(&mut self, attributes: &Attributes) {
        match attributes.font_size_class() {
            Some(class) => {
                self.font_height = FONT_HEIGHT[class];
                self.line_height = LINE_HEIGHT[class];
                self.top_positioning = Some(TOP_POSITIONING[class]);
            }
            None => {
                self.font_height = self.default_font_height;
                self.line_height = self.default_line_height;
                self.top_positioning = None;
            }
        }
    }
}
