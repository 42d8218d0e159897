//! Cue layout
//!
//! Turns the shown cues into positioned [`Line`]s. Cues sharing a region are
//! stacked inside that region's box (with roll-up when the region scrolls);
//! the rest are placed from their own computed box, either on a line grid
//! counted from the bottom of the display or at a percentage of its height.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::cue::{Align, Cue, LineAlign};
use crate::error::WebVttError;
use crate::region::{Region, RegionMap, Scroll};
use crate::render::attributes::{AttributeType, Attributes, Opacity};
use crate::render::backend::{FontHandle, FontMetrics, Rect};
use crate::render::converter::Converter;
use crate::render::style::{parse_styles, ColorArgb, Style, StyledSegment};

/// A word (with its trailing whitespace) in one style
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub width: i32,
    pub style: Style,
    pub font: FontHandle,
}

/// One output line: its tokens and the background rectangle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Line {
    pub tokens: Vec<Token>,
    /// Width of the tokens, without padding
    pub width: i32,
    pub padding_x: i32,
    pub padding_y: i32,
    pub rect: Rect,
}

impl Line {
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn push(&mut self, token: Token) {
        self.width += token.width;
        self.tokens.push(token);
    }
}

/// Lays out cues for one viewport size, config and attribute set
pub struct LineBuilder<'a> {
    converter: Converter,
    metrics: &'a dyn FontMetrics,
    attributes: Attributes,
    family: String,
    base_style: Style,
}

impl<'a> LineBuilder<'a> {
    pub fn new(
        width: i32,
        height: i32,
        config: &EngineConfig,
        attributes: &Attributes,
        metrics: &'a dyn FontMetrics,
    ) -> Self {
        let family = attributes
            .font_style()
            .map(|style| style.family().to_string())
            .unwrap_or_else(|| config.font.family.clone());

        Self {
            converter: Converter::new(width, height, config, attributes),
            metrics,
            attributes: attributes.clone(),
            family,
            base_style: config.font.base_style(),
        }
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Lay out all shown cues
    pub fn build_output_lines(&self, cues: &[Arc<Cue>], regions: &RegionMap) -> Vec<Line> {
        let mut output = Vec::new();

        for (region_id, group) in group_by_region(cues) {
            let lines = match region_id {
                Some(id) => match regions.get(id) {
                    Some(region) => self.region_lines(&group, region),
                    None => {
                        let err = WebVttError::RegionMissing(id.to_string());
                        tracing::warn!("{}, using default layout", err);
                        self.output_lines(&group)
                    }
                },
                None => self.output_lines(&group),
            };
            output.extend(lines);
        }

        let vertical_padding = self.converter.vertical_padding();
        if vertical_padding > 0 {
            for line in &mut output {
                line.padding_y = vertical_padding;
                line.rect.y -= vertical_padding;
                line.rect.h += 2 * vertical_padding;
            }
        }

        output
    }

    /// Stack the lines of a region's cues inside the region box
    fn region_lines(&self, cues: &[&Arc<Cue>], region: &Region) -> Vec<Line> {
        let converter = &self.converter;
        let lines_vh = converter.line_height_vh() as f64 * region.lines as f64;
        let lines_px = converter.vh_to_height_pixels(lines_vh);
        let width = region.width as f64;
        let left = region.viewport_anchor.x as f64 - region.region_anchor.x as f64 * width / 10000.0;
        let left_px = converter.vw_to_width_pixels(left);
        let top = region.viewport_anchor.y as f64 - region.region_anchor.y as f64 * lines_vh / 10000.0;
        let top_px = converter.vh_to_height_pixels(top);
        let region_width_px = converter.vw_to_width_pixels(width);
        let max_lines = region.lines.max(0) as usize;

        let mut region_lines: VecDeque<Line> = VecDeque::new();

        // Roll-up regions fill oldest first and scroll, others fill from the newest cue
        let ordered: Vec<&Arc<Cue>> = match region.scroll {
            Scroll::Up => cues.to_vec(),
            Scroll::None => cues.iter().rev().copied().collect(),
        };

        for cue in ordered {
            let mut lines = self.build_lines(cue.lines(), region_width_px);
            if region.scroll == Scroll::None && region_lines.len() + lines.len() > max_lines {
                break;
            }

            let cue_box = cue.cue_box();
            let offset = cue_box.position as f64 * width / 10000.0;
            let offset_px = converter.vw_to_width_pixels(offset);
            self.position_lines(&mut lines, cue_box.text_align, 0, offset_px + left_px, false);
            region_lines.extend(lines);

            let excess = region_lines.len().saturating_sub(max_lines);
            region_lines.drain(..excess);
        }

        let line_height = converter.line_height_pixels();
        let mut y = top_px;
        for line in region_lines.iter_mut() {
            line.rect.y = y;
            y += line_height;
        }

        // Sit the lines at the bottom of the region
        let delta = lines_px - region_lines.len() as i32 * line_height;
        if delta > 0 {
            for line in region_lines.iter_mut() {
                line.rect.y += delta;
            }
        }

        region_lines.into()
    }

    /// Place cues that are not in a region
    fn output_lines(&self, cues: &[&Arc<Cue>]) -> Vec<Line> {
        let converter = &self.converter;
        let viewport_height = converter.height();
        let line_height = converter.line_height_pixels();
        let starting_y = converter.screen_padding_height_pixels();
        let mut auto_line = 0;
        let mut output = Vec::new();

        for cue in cues {
            let cue_box = cue.cue_box();
            let position_px = converter.vw_to_width_pixels(cue_box.position as f64);
            let size_px = converter.vw_to_width_pixels(cue_box.size as f64);
            let mut boxes = self.build_lines(cue.lines(), size_px);

            match cue_box.line.filter(|_| !cue_box.snap_to_lines) {
                Some(line_percent) => {
                    let line_px = converter.vh_to_height_pixels(line_percent as f64);
                    let total_height = boxes.len() as i32 * line_height;
                    self.position_lines(&mut boxes, cue_box.text_align, line_px, position_px, true);
                    let shift = match cue_box.line_align {
                        LineAlign::Start => 0,
                        LineAlign::Center => total_height / 2,
                        LineAlign::End => total_height,
                    };
                    shift_lines(&mut boxes, -shift);

                    // Nudge back on screen one line at a time
                    if total_height <= viewport_height {
                        let mut direction = 0;
                        while needs_adjustment(&boxes, viewport_height) {
                            let step = if boxes[0].rect.y < 0 { line_height } else { -line_height };
                            if step == 0 || (direction != 0 && step != direction) {
                                // Off the line grid; pin to the nearest edge instead of bouncing
                                clamp_lines(&mut boxes, viewport_height);
                                break;
                            }
                            direction = step;
                            shift_lines(&mut boxes, step);
                        }
                    }
                }
                None => {
                    self.position_lines(&mut boxes, cue_box.text_align, 0, position_px, true);
                    let is_auto = cue_box.line.is_none();
                    let line = match cue_box.line {
                        Some(line) => line,
                        None => {
                            auto_line -= 1;
                            auto_line
                        }
                    };
                    // Anything past the last screen line is pulled back the same way
                    let max_line = viewport_height / line_height.max(1) + 1;
                    let line = line.clamp(-max_line, max_line);
                    let mut step = line_height;
                    let mut position = step * line;
                    if line < 0 {
                        position += viewport_height;
                        step = -step;
                    }
                    shift_lines(&mut boxes, position);

                    if is_auto && converter.is_top_positioning_set() {
                        if let Some(first) = boxes.first() {
                            let delta = converter.top_positioning_pixels() - first.rect.y;
                            shift_lines(&mut boxes, delta);
                        }
                    }

                    let mut switched = false;
                    while needs_adjustment(&boxes, viewport_height) {
                        if step == 0 || switch_position(&boxes, step, viewport_height) {
                            if switched || step == 0 {
                                tracing::debug!("Cue {} does not fit the display, dropping its lines", cue);
                                boxes.clear();
                                break;
                            }
                            step = -step;
                            switched = true;
                        }
                        shift_lines(&mut boxes, step);
                    }
                }
            }

            output.extend(boxes);
        }

        shift_lines(&mut output, starting_y);
        output
    }

    /// Set x (and optionally stacked y) of each line from the alignment
    fn position_lines(&self, lines: &mut [Line], align: Align, starting_y: i32, position_px: i32, set_y: bool) {
        let converter = &self.converter;
        let padding = converter.horizontal_padding();
        let line_height = converter.line_height_pixels();
        let mut y = starting_y;

        for line in lines.iter_mut() {
            let width = line.width + padding * 2;
            let x = converter.x_for_text_box(width, align, position_px) + converter.screen_padding_width_pixels();
            line.rect = Rect::new(x, y, width, line_height);
            line.padding_x = padding;
            if set_y {
                y += line_height;
            }
        }
    }

    /// Style, tokenize and wrap the text lines of one cue
    fn build_lines(&self, text_lines: &[String], max_width: i32) -> Vec<Line> {
        let mut lines = Vec::new();
        for text in text_lines {
            let segments = parse_styles(text, self.base_style);
            let full = self.tokens_for_line(&segments);
            if full.tokens.is_empty() {
                continue;
            }
            if full.width > max_width {
                let wrapped = self.wrap_line(full, max_width);
                tracing::trace!("Wrapped {:?} into {} lines", text, wrapped.len());
                lines.extend(wrapped);
            } else {
                lines.push(full);
            }
        }
        lines
    }

    fn tokens_for_line(&self, segments: &[StyledSegment]) -> Line {
        let mut line = Line::default();
        let font_size = self.converter.font_size_pixels();

        for segment in segments {
            let style = self.apply_user_colours(segment.style);
            let family = match style.face.family_suffix() {
                "" => self.family.clone(),
                suffix => format!("{} {}", self.family, suffix),
            };
            let font = FontHandle::new(family, font_size);
            for word in segment.text.split_inclusive(char::is_whitespace) {
                line.push(Token {
                    text: word.to_string(),
                    width: self.metrics.text_width(&font, word),
                    style,
                    font: font.clone(),
                });
            }
        }

        line
    }

    /// Greedy word packing; a word wider than `max_width` overflows alone
    fn wrap_line(&self, full: Line, max_width: i32) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut current = Line::default();

        for token in full.tokens {
            if current.tokens.is_empty() && token.text.trim().is_empty() {
                continue;
            }
            let visible = self.metrics.text_width(&token.font, token.text.trim_end());
            if !current.tokens.is_empty() && current.width + visible > max_width {
                lines.push(self.finish_line(current));
                current = Line::default();
                if token.text.trim().is_empty() {
                    continue;
                }
            }
            current.push(token);
        }
        if !current.tokens.is_empty() {
            lines.push(self.finish_line(current));
        }

        lines
    }

    /// Drop whitespace at the end of a wrapped line
    fn finish_line(&self, mut line: Line) -> Line {
        while let Some(last) = line.tokens.last_mut() {
            let trimmed = last.text.trim_end();
            if trimmed.len() == last.text.len() {
                break;
            }
            if trimmed.is_empty() {
                line.width -= last.width;
                line.tokens.pop();
                continue;
            }
            let width = self.metrics.text_width(&last.font, trimmed);
            line.width += width - last.width;
            last.text.truncate(trimmed.len());
            last.width = width;
            break;
        }
        line
    }

    /// Override cue colours with the user's colour and opacity choices
    fn apply_user_colours(&self, mut style: Style) -> Style {
        let attributes = &self.attributes;

        let text = attributes
            .get(AttributeType::FontColor)
            .map(ColorArgb::from_u32)
            .unwrap_or(style.text_colour);
        let text_opacity = attributes.opacity(AttributeType::FontOpacity).unwrap_or_default();
        style.text_colour = text.with_alpha(text_opacity.text_alpha());

        let bg = attributes
            .get(AttributeType::BackgroundColor)
            .map(ColorArgb::from_u32)
            .unwrap_or(style.bg_colour);
        // Background follows the text opacity unless set on its own
        let bg_opacity = attributes
            .opacity(AttributeType::BackgroundOpacity)
            .unwrap_or(text_opacity);
        style.bg_colour = bg.with_alpha(bg_opacity.text_alpha());

        let edge = attributes
            .get(AttributeType::EdgeColor)
            .map(ColorArgb::from_u32)
            .unwrap_or(style.edge_colour);
        style.edge_colour = edge.with_alpha(Opacity::Solid.text_alpha());

        style
    }
}

/// Group cues by region id, in order of first appearance
fn group_by_region(cues: &[Arc<Cue>]) -> Vec<(Option<&str>, Vec<&Arc<Cue>>)> {
    let mut groups: Vec<(Option<&str>, Vec<&Arc<Cue>>)> = Vec::new();
    for cue in cues {
        let id = cue.region_id();
        match groups.iter_mut().find(|(group_id, _)| *group_id == id) {
            Some((_, members)) => members.push(cue),
            None => groups.push((id, vec![cue])),
        }
    }
    groups
}

fn shift_lines(lines: &mut [Line], dy: i32) {
    for line in lines {
        line.rect.y += dy;
    }
}

fn needs_adjustment(lines: &[Line], viewport_height: i32) -> bool {
    match (lines.first(), lines.last()) {
        (Some(first), Some(last)) => first.rect.y < 0 || last.rect.bottom() > viewport_height,
        _ => false,
    }
}

/// Shift a block that fits the viewport so it lies fully inside it
fn clamp_lines(lines: &mut [Line], viewport_height: i32) {
    let (Some(top), Some(bottom)) = (lines.first().map(|l| l.rect.y), lines.last().map(|l| l.rect.bottom())) else {
        return;
    };
    if top < 0 {
        shift_lines(lines, -top);
    } else if bottom > viewport_height {
        shift_lines(lines, viewport_height - bottom);
    }
}

/// True when stepping further in the current direction cannot help
fn switch_position(lines: &[Line], step: i32, viewport_height: i32) -> bool {
    if step < 0 {
        lines.first().is_some_and(|first| first.rect.y < 0)
    } else {
        lines.last().is_some_and(|last| last.rect.y > viewport_height)
    }
}
