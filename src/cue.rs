//! Cue model
//!
//! A cue is one timed block of subtitle text plus its positioning settings.
//! The computed box (final position, size and alignment in hundredths of a
//! percent of the viewport) is derived once, when the parser applies the
//! settings line, and never changes afterwards.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, WebVttError};
use crate::parser::settings::{parse_percentage_hundredths, SettingsMap};
use crate::timing::Timing;

/// Full width/height in hundredths of a percent
pub const FULL_EXTENT: i32 = 10000;

/// Cue text alignment (`align:`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Align {
    Start,
    #[default]
    Center,
    End,
    Left,
    Right,
}

impl FromStr for Align {
    type Err = WebVttError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Align::Start),
            "center" => Ok(Align::Center),
            "end" => Ok(Align::End),
            "left" => Ok(Align::Left),
            "right" => Ok(Align::Right),
            _ => Err(WebVttError::setting("align", s, "unknown alignment")),
        }
    }
}

/// Alignment of the cue box relative to its position (`position:x%,<align>`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum PositionAlign {
    LineLeft,
    Center,
    LineRight,
    #[default]
    Auto,
}

impl FromStr for PositionAlign {
    type Err = WebVttError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "line-left" => Ok(PositionAlign::LineLeft),
            "center" => Ok(PositionAlign::Center),
            "line-right" => Ok(PositionAlign::LineRight),
            "auto" => Ok(PositionAlign::Auto),
            _ => Err(WebVttError::setting("position", s, "unknown position alignment")),
        }
    }
}

/// Alignment of the cue box relative to its line (`line:x,<align>`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum LineAlign {
    #[default]
    Start,
    Center,
    End,
}

impl FromStr for LineAlign {
    type Err = WebVttError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(LineAlign::Start),
            "center" => Ok(LineAlign::Center),
            "end" => Ok(LineAlign::End),
            _ => Err(WebVttError::setting("line", s, "unknown line alignment")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TextDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Final layout values of a cue
///
/// `line` is `None` for `auto`. When `snap_to_lines` is set a `Some` line is
/// a line number (negative counts up from the bottom), otherwise it is a
/// percentage of the viewport height in hundredths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CueBox {
    pub position: i32,
    pub line: Option<i32>,
    pub size: i32,
    pub text_align: Align,
    pub line_align: LineAlign,
    pub snap_to_lines: bool,
}

impl Default for CueBox {
    fn default() -> Self {
        Self {
            position: FULL_EXTENT / 2,
            line: None,
            size: FULL_EXTENT,
            text_align: Align::Center,
            line_align: LineAlign::Start,
            snap_to_lines: true,
        }
    }
}

/// One subtitle cue
#[derive(Debug, Clone)]
pub struct Cue {
    identifier: Option<String>,
    timing: Timing,
    line: Option<i32>,
    snap_to_lines: bool,
    size: Option<i32>,
    position: Option<i32>,
    align: Align,
    position_align: PositionAlign,
    line_align: LineAlign,
    region_id: Option<String>,
    text_direction: TextDirection,
    lines: Vec<String>,
    cue_box: CueBox,
    offset_ms: i64,
}

impl Cue {
    pub fn new(timing: Timing) -> Self {
        Self::with_text_direction(timing, TextDirection::default())
    }

    /// Empty cue laid out for the given writing direction
    pub fn with_text_direction(timing: Timing, text_direction: TextDirection) -> Self {
        let mut cue = Self {
            identifier: None,
            timing,
            line: None,
            snap_to_lines: true,
            size: None,
            position: None,
            align: Align::default(),
            position_align: PositionAlign::default(),
            line_align: LineAlign::default(),
            region_id: None,
            text_direction,
            lines: Vec::new(),
            cue_box: CueBox::default(),
            offset_ms: 0,
        };
        cue.cue_box = cue.compute_box();
        cue
    }

    /// Build a cue from a settings line and its text, as the parser would
    pub fn with_settings(timing: Timing, settings: &str, lines: &[&str]) -> Self {
        let mut cue = Self::new(timing);
        cue.apply_settings(&crate::parser::settings::parse_settings_line(settings));
        for line in lines {
            cue.add_text_line(line);
        }
        cue
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn region_id(&self) -> Option<&str> {
        self.region_id.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cue_box(&self) -> &CueBox {
        &self.cue_box
    }

    pub fn align(&self) -> Align {
        self.align
    }

    pub fn text_direction(&self) -> TextDirection {
        self.text_direction
    }

    /// Offset applied to the parsed timestamps, in ms
    pub fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    pub(crate) fn set_identifier(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        self.identifier = (!identifier.is_empty()).then_some(identifier);
    }

    pub(crate) fn add_text_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    pub(crate) fn apply_offset(&mut self, offset_ms: i64) {
        self.timing.apply_offset(offset_ms);
        self.offset_ms += offset_ms;
    }

    /// Apply a parsed settings line and finalize the computed box
    ///
    /// A setting that fails to parse is logged and skipped; the other
    /// settings still apply.
    pub(crate) fn apply_settings(&mut self, settings: &SettingsMap) {
        for (key, value) in settings {
            let applied = match key.as_str() {
                "line" => self.set_line(value),
                "size" => parse_percentage_hundredths(value).map(|size| self.size = Some(size)),
                "position" => self.set_position(value),
                "align" => value.parse().map(|align| self.align = align),
                "region" => {
                    self.region_id = Some(value.clone());
                    Ok(())
                }
                _ => {
                    tracing::debug!("Ignoring unsupported cue setting {}:{}", key, value);
                    Ok(())
                }
            };
            if let Err(e) = applied {
                tracing::info!("Failed to parse cue setting {}:{} ({}), continuing", key, value, e);
            }
        }

        self.cue_box = self.compute_box();
    }

    fn set_line(&mut self, value: &str) -> Result<()> {
        let mut parts = value.split(',');
        let token = parts.next().unwrap_or_default();

        let (line, snap) = if token == "auto" {
            (None, true)
        } else if token.ends_with('%') {
            match parse_percentage_hundredths(token) {
                Ok(percent) => (Some(percent), false),
                Err(_) => (None, true),
            }
        } else {
            match token.parse::<i32>() {
                Ok(number) => (Some(number), true),
                Err(e) => {
                    tracing::debug!("Line number {:?} not parsed ({}), using auto", token, e);
                    (None, true)
                }
            }
        };
        self.line = line;
        self.snap_to_lines = snap;

        if let Some(align) = parts.next() {
            self.line_align = align.parse()?;
        }
        Ok(())
    }

    fn set_position(&mut self, value: &str) -> Result<()> {
        let mut parts = value.split(',');
        let token = parts.next().unwrap_or_default();

        if token == "auto" {
            self.position = None;
        } else if token.ends_with('%') {
            self.position = Some(parse_percentage_hundredths(token)?);
        } else {
            return Err(WebVttError::setting(
                "position",
                value,
                "first position argument has to be a percentage",
            ));
        }

        if let Some(align) = parts.next() {
            self.position_align = align.parse()?;
        }
        Ok(())
    }

    fn computed_position_align(&self) -> PositionAlign {
        let ltr = self.text_direction == TextDirection::LeftToRight;
        match (self.position_align, self.align) {
            (PositionAlign::Auto, Align::Left) => PositionAlign::LineLeft,
            (PositionAlign::Auto, Align::Right) => PositionAlign::LineRight,
            (PositionAlign::Auto, Align::Start) if ltr => PositionAlign::LineLeft,
            (PositionAlign::Auto, Align::Start) => PositionAlign::LineRight,
            (PositionAlign::Auto, Align::End) if ltr => PositionAlign::LineRight,
            (PositionAlign::Auto, Align::End) => PositionAlign::LineLeft,
            (PositionAlign::Auto, Align::Center) => PositionAlign::Center,
            (explicit, _) => explicit,
        }
    }

    fn computed_position(&self) -> i32 {
        match (self.position, self.align) {
            (Some(position), _) => position,
            (None, Align::Left | Align::Start) => 0,
            (None, Align::Right | Align::End) => FULL_EXTENT,
            (None, Align::Center) => FULL_EXTENT / 2,
        }
    }

    fn computed_max_size(&self, position: i32) -> i32 {
        match self.computed_position_align() {
            PositionAlign::LineLeft => FULL_EXTENT - position,
            PositionAlign::LineRight => position,
            PositionAlign::Center if position <= FULL_EXTENT / 2 => position * 2,
            PositionAlign::Center => (FULL_EXTENT - position) * 2,
            PositionAlign::Auto => FULL_EXTENT,
        }
    }

    fn compute_box(&self) -> CueBox {
        let position = self.computed_position();
        let max_size = self.computed_max_size(position);
        CueBox {
            position,
            line: self.line,
            size: self.size.unwrap_or(FULL_EXTENT).min(max_size),
            text_align: self.align,
            line_align: self.line_align,
            snap_to_lines: self.snap_to_lines,
        }
    }
}

/// Compares everything the cue file said, never the applied offset
impl PartialEq for Cue {
    fn eq(&self, other: &Self) -> bool {
        self.timing == other.timing
            && self.identifier == other.identifier
            && self.line == other.line
            && self.snap_to_lines == other.snap_to_lines
            && self.size == other.size
            && self.position == other.position
            && self.align == other.align
            && self.position_align == other.position_align
            && self.line_align == other.line_align
            && self.region_id == other.region_id
            && self.text_direction == other.text_direction
            && self.lines == other.lines
    }
}

impl Eq for Cue {}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.identifier {
            write!(f, "[{}] ", id)?;
        }
        write!(f, "{} {:?}", self.timing, self.lines.join("|"))
    }
}
