//! Paints laid-out lines through a [`DrawBackend`]

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::cue::Cue;
use crate::region::RegionMap;
use crate::render::attributes::{AttributeType, Attributes, EdgeStyle};
use crate::render::backend::{DrawBackend, FontMetrics, Rect};
use crate::render::line_builder::{Line, LineBuilder};
use crate::render::style::{ColorArgb, FontFace};

/// Offset of the edge pass in pixels
const SHADOW_EDGE: i32 = 2;

pub struct Renderer {
    config: EngineConfig,
    attributes: Attributes,
    metrics: Arc<dyn FontMetrics>,
    backend: Box<dyn DrawBackend>,
    surface_size: (i32, i32),
    reset: bool,
    last_lines: Vec<Line>,
}

impl Renderer {
    pub fn new(config: EngineConfig, backend: Box<dyn DrawBackend>, metrics: Arc<dyn FontMetrics>) -> Self {
        let surface_size = (config.player.width, config.player.height);
        let mut renderer = Self {
            config,
            attributes: Attributes::new(),
            metrics,
            backend,
            surface_size,
            reset: false,
            last_lines: Vec::new(),
        };
        renderer.backend.set_visible(true);
        renderer
    }

    pub fn set_related_video_size(&mut self, width: i32, height: i32) {
        tracing::debug!("Related video size {}x{}", width, height);
        self.surface_size = (width, height);
    }

    pub fn surface_size(&self) -> (i32, i32) {
        self.surface_size
    }

    /// Merge in new attributes; later values win
    pub fn set_attributes(&mut self, attributes: &Attributes) {
        self.attributes.update(attributes);
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Lay out and paint the shown cues; returns the number of lines left on screen
    pub fn render_document(&mut self, cues: &[Arc<Cue>], regions: &RegionMap) -> usize {
        if let Some(size) = self.backend.preferred_size() {
            self.surface_size = size;
        }
        let (width, height) = self.surface_size;
        tracing::debug!("Rendering {} cues at {}x{}", cues.len(), width, height);

        let builder = LineBuilder::new(width, height, &self.config, &self.attributes, self.metrics.as_ref());
        let lines = builder.build_output_lines(cues, regions);
        for line in &lines {
            self.paint_line(line);
        }

        if self.reset {
            tracing::info!("Renderer was reset, clearing after render");
            self.clear_screen();
        } else {
            self.last_lines = lines;
        }

        self.last_lines.len()
    }

    /// Lines painted by the last render, empty once the screen is cleared
    pub fn last_lines(&self) -> &[Line] {
        &self.last_lines
    }

    /// Window colour from the attributes, transparent when unset
    fn window_colour(&self) -> ColorArgb {
        let colour = ColorArgb::from_u32(self.attributes.get(AttributeType::WindowColor).unwrap_or(0));
        match self.attributes.opacity(AttributeType::WindowOpacity) {
            Some(opacity) => colour.with_alpha(opacity.window_alpha()),
            None => colour,
        }
    }

    fn paint_line(&mut self, line: &Line) {
        let edge_style = self.attributes.edge_style();
        let (off_x, off_y) = match edge_style {
            EdgeStyle::None => (0, 0),
            EdgeStyle::Raised => (-SHADOW_EDGE, -SHADOW_EDGE),
            EdgeStyle::Depressed => (SHADOW_EDGE, SHADOW_EDGE),
            EdgeStyle::LeftDropShadow => (-SHADOW_EDGE, 0),
            EdgeStyle::RightDropShadow => (SHADOW_EDGE, 0),
            EdgeStyle::Uniform => (-SHADOW_EDGE / 2, -SHADOW_EDGE / 2),
        };
        let mut x = line.rect.x + off_x;
        let y = line.rect.y + off_y + line.padding_y;
        let height = line.rect.h - 2 * line.padding_y;

        let window = self.window_colour();
        self.backend.fill_rectangle(window, line.rect);

        for token in &line.tokens {
            let style = token.style;
            let mut rect = Rect::new(x + line.padding_x, y, token.width, height);
            self.backend.fill_rectangle(style.bg_colour, rect);

            if style.face == FontFace::Underline {
                let descender = self.metrics.descender(&token.font).abs();
                let thickness = (descender as f64 / 4.0).ceil() as i32;
                let bar = Rect::new(rect.x, y + token.font.size_px - 2 * thickness, token.width, thickness);
                self.backend.fill_rectangle(style.text_colour, bar);
            }

            if edge_style != EdgeStyle::None {
                self.backend
                    .draw_glyph_run(&token.font, rect, &token.text, style.edge_colour, ColorArgb::TRANSPARENT);
                rect = rect.translate(-off_x, -off_y);
                if edge_style == EdgeStyle::Uniform {
                    let outer = rect.translate(SHADOW_EDGE / 2, SHADOW_EDGE / 2);
                    self.backend
                        .draw_glyph_run(&token.font, outer, &token.text, style.edge_colour, ColorArgb::TRANSPARENT);
                }
            }
            self.backend
                .draw_glyph_run(&token.font, rect, &token.text, style.text_colour, ColorArgb::TRANSPARENT);

            x += token.width;
        }
    }

    pub fn clear_screen(&mut self) {
        self.last_lines.clear();
        self.backend.clear();
    }

    pub fn update(&mut self) {
        self.backend.update();
    }

    pub fn show(&mut self) {
        self.reset = false;
        self.backend.set_visible(true);
    }

    pub fn hide(&mut self) {
        self.backend.set_visible(false);
    }

    /// Forget attributes; renders until the next `show` are wiped
    pub fn clear_state(&mut self) {
        self.reset = true;
        self.attributes.reset();
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("surface_size", &self.surface_size)
            .field("attributes", &self.attributes)
            .field("reset", &self.reset)
            .finish()
    }
}
