//! Collaborator interfaces for drawing and font measurement
//!
//! The engine does not rasterize anything itself. A [`DrawBackend`] paints
//! rectangles and glyph runs onto the subtitle surface and a [`FontMetrics`]
//! provider measures text so lines can be wrapped.

use serde::Serialize;

use crate::render::style::ColorArgb;

/// Pixel rectangle on the subtitle surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

/// Font selection: family name (with face suffix) and pixel size
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontHandle {
    pub family: String,
    pub size_px: i32,
}

impl FontHandle {
    pub fn new(family: impl Into<String>, size_px: i32) -> Self {
        Self {
            family: family.into(),
            size_px,
        }
    }
}

/// Text measurement
pub trait FontMetrics: Send + Sync {
    /// Horizontal advance of `text` in pixels
    fn text_width(&self, font: &FontHandle, text: &str) -> i32;

    /// Distance below the baseline, positive
    fn descender(&self, font: &FontHandle) -> i32 {
        font.size_px / 5
    }
}

/// Every character advances by the same amount
///
/// Stands in for real glyph metrics in the demo player and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceFont {
    pub advance_px: i32,
}

impl FontMetrics for FixedAdvanceFont {
    fn text_width(&self, _font: &FontHandle, text: &str) -> i32 {
        text.chars().count() as i32 * self.advance_px
    }
}

/// Paint target for rendered lines
pub trait DrawBackend: Send {
    fn fill_rectangle(&mut self, colour: ColorArgb, rect: Rect);

    fn draw_glyph_run(
        &mut self,
        font: &FontHandle,
        rect: Rect,
        text: &str,
        fg: ColorArgb,
        bg: ColorArgb,
    );

    fn clear(&mut self);

    /// Present what was drawn since the last update
    fn update(&mut self);

    fn set_visible(&mut self, visible: bool);

    /// Surface size preferred by the display, if it has one
    fn preferred_size(&self) -> Option<(i32, i32)> {
        None
    }
}
