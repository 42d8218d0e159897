//! Cue text markup
//!
//! Supports the simple WebVTT span tags `<i>`, `<b>`, `<u>` and colour class
//! spans such as `<c.yellow.bg_blue>`. Other tags (voice, timestamps, ruby)
//! are accepted and ignored.

use serde::Serialize;

/// 32-bit colour, alpha first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ColorArgb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorArgb {
    pub const WHITE: ColorArgb = ColorArgb::from_u32(0xFFFF_FFFF);
    pub const LIME: ColorArgb = ColorArgb::from_u32(0xFF00_FF00);
    pub const CYAN: ColorArgb = ColorArgb::from_u32(0xFF00_FFFF);
    pub const RED: ColorArgb = ColorArgb::from_u32(0xFFFF_0000);
    pub const YELLOW: ColorArgb = ColorArgb::from_u32(0xFFFF_FF00);
    pub const MAGENTA: ColorArgb = ColorArgb::from_u32(0xFFFF_00FF);
    pub const BLUE: ColorArgb = ColorArgb::from_u32(0xFF00_00FF);
    pub const BLACK: ColorArgb = ColorArgb::from_u32(0xFF00_0000);
    pub const TRANSPARENT: ColorArgb = ColorArgb::from_u32(0);

    /// Unpack `0xAARRGGBB`
    pub const fn from_u32(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Look up a WebVTT colour class name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "white" => Self::WHITE,
            "lime" => Self::LIME,
            "cyan" => Self::CYAN,
            "red" => Self::RED,
            "yellow" => Self::YELLOW,
            "magenta" => Self::MAGENTA,
            "blue" => Self::BLUE,
            "black" => Self::BLACK,
            _ => return None,
        })
    }
}

/// Face requested by `<i>`, `<b>` or `<u>`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum FontFace {
    #[default]
    Normal,
    Bold,
    Italic,
    Underline,
}

impl FontFace {
    /// Suffix appended to the family name when picking a font
    ///
    /// Underline uses the regular face and draws a bar under it.
    pub fn family_suffix(self) -> &'static str {
        match self {
            FontFace::Bold => "Bold",
            FontFace::Italic => "Italic",
            FontFace::Normal | FontFace::Underline => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Style {
    pub face: FontFace,
    pub text_colour: ColorArgb,
    pub bg_colour: ColorArgb,
    pub edge_colour: ColorArgb,
}

impl Default for Style {
    fn default() -> Self {
        Self::with_colours(ColorArgb::WHITE, ColorArgb::BLACK)
    }
}

impl Style {
    pub fn with_colours(text_colour: ColorArgb, bg_colour: ColorArgb) -> Self {
        Self {
            face: FontFace::Normal,
            text_colour,
            bg_colour,
            edge_colour: text_colour,
        }
    }

    /// Apply one open tag such as `b` or `c.lime.bg_black`
    fn apply_tag(&mut self, tag: &str) {
        let name = tag.split(&['.', ' ', '\t'][..]).next().unwrap_or_default();
        match name {
            "i" => self.face = FontFace::Italic,
            "b" => self.face = FontFace::Bold,
            "u" => self.face = FontFace::Underline,
            "c" => {
                // Later classes override earlier ones
                for class in tag.split('.').skip(1) {
                    if let Some(bg) = class.strip_prefix("bg_") {
                        self.bg_colour = ColorArgb::from_name(bg).unwrap_or_else(|| {
                            tracing::info!("Background class {} not found - using black", class);
                            ColorArgb::BLACK
                        });
                    } else {
                        self.text_colour = ColorArgb::from_name(class).unwrap_or_else(|| {
                            tracing::info!("Colour class {} not found - using white", class);
                            ColorArgb::WHITE
                        });
                    }
                }
            }
            _ => tracing::trace!("Unsupported style tag {:?}", tag),
        }
    }
}

/// A run of text sharing one style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSegment {
    pub text: String,
    pub style: Style,
}

#[derive(Debug)]
struct MalformedTag;

/// Split one cue text line into styled runs
///
/// Badly formed markup degrades to the tag-stripped text in `base` style.
pub fn parse_styles(line: &str, base: Style) -> Vec<StyledSegment> {
    match parse_tags(line, base) {
        Ok(segments) => segments,
        Err(MalformedTag) => {
            tracing::info!("Badly formed tags in {:?}", line);
            let text = unescape(&strip_tags(line));
            if text.is_empty() {
                Vec::new()
            } else {
                vec![StyledSegment { text, style: base }]
            }
        }
    }
}

fn parse_tags(line: &str, base: Style) -> Result<Vec<StyledSegment>, MalformedTag> {
    let mut segments = Vec::new();
    let mut open: Vec<&str> = Vec::new();
    let mut rest = line;

    loop {
        let (text, tail) = match rest.find('<') {
            Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
            None => (rest, None),
        };

        if !text.is_empty() {
            let mut style = base;
            for tag in &open {
                style.apply_tag(tag);
            }
            segments.push(StyledSegment {
                text: unescape(text),
                style,
            });
        }

        let Some(tail) = tail else {
            break;
        };
        let end = tail.find('>').ok_or(MalformedTag)?;
        let tag = &tail[..end];
        match tag.strip_prefix('/') {
            Some(closing) => close_tag(&mut open, closing),
            None => open.push(tag),
        }
        rest = &tail[end + 1..];
    }

    Ok(segments)
}

/// Close the innermost open tag with this name
fn close_tag(open: &mut Vec<&str>, closing: &str) {
    let name_of = |tag: &str| tag.split(&['.', ' ', '\t'][..]).next().unwrap_or_default().to_string();
    let target = name_of(closing);
    if let Some(idx) = open.iter().rposition(|tag| name_of(*tag) == target) {
        open.remove(idx);
    }
}

/// Remove `<...>` tags, leaving an unterminated `<` and what follows
fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find('<') {
        match rest[start..].find('>') {
            Some(len) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + len + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    const ENTITIES: [(&str, char); 5] = [
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&amp;", '&'),
        ("&quot;", '"'),
        ("&apos;", '\''),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
