//! Presentation attribute overrides
//!
//! User or platform preferences (caption font size, colours, opacity, edge
//! style) that override what the cue file asks for. Values are stored as raw
//! integers keyed by [`AttributeType`], the way they arrive from the control
//! plane, and decoded on use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    FontColor,
    BackgroundColor,
    FontOpacity,
    BackgroundOpacity,
    FontStyle,
    FontSize,
    WindowColor,
    WindowOpacity,
    EdgeStyle,
    EdgeColor,
}

/// Font size classes; anything else means "use the configured size"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSize {
    Small = 0,
    Medium,
    Large,
    ExtraLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Default = 0,
    MonospacedWithSerifs,
    ProportionalWithSerifs,
    MonospacedWithoutSerifs,
    ProportionalWithoutSerifs,
    Casual,
    Cursive,
    SmallCapitals,
}

impl FontStyle {
    fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => FontStyle::Default,
            1 => FontStyle::MonospacedWithSerifs,
            2 => FontStyle::ProportionalWithSerifs,
            3 => FontStyle::MonospacedWithoutSerifs,
            4 => FontStyle::ProportionalWithoutSerifs,
            5 => FontStyle::Casual,
            6 => FontStyle::Cursive,
            7 => FontStyle::SmallCapitals,
            _ => return None,
        })
    }

    /// Font family implementing this style
    pub fn family(self) -> &'static str {
        match self {
            FontStyle::Casual => "Cinecav Casual",
            FontStyle::Cursive => "Cinecav Script",
            FontStyle::MonospacedWithoutSerifs => "Cinecav Mono",
            FontStyle::MonospacedWithSerifs => "Cinecav Type",
            FontStyle::ProportionalWithoutSerifs => "Cinecav Sans",
            FontStyle::ProportionalWithSerifs => "Cinecav Serif",
            FontStyle::SmallCapitals => "Cinecav Smallcaps",
            FontStyle::Default => "Cinecav Mono",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeStyle {
    #[default]
    None = 0,
    Raised,
    Depressed,
    Uniform,
    LeftDropShadow,
    RightDropShadow,
}

impl EdgeStyle {
    fn from_u32(value: u32) -> Self {
        match value {
            1 => EdgeStyle::Raised,
            2 => EdgeStyle::Depressed,
            3 => EdgeStyle::Uniform,
            4 => EdgeStyle::LeftDropShadow,
            5 => EdgeStyle::RightDropShadow,
            _ => EdgeStyle::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Opacity {
    #[default]
    Solid = 0,
    Flashing,
    Translucent,
    Transparent,
}

impl Opacity {
    fn from_u32(value: u32) -> Self {
        match value {
            1 => Opacity::Flashing,
            2 => Opacity::Translucent,
            3 => Opacity::Transparent,
            _ => Opacity::Solid,
        }
    }

    /// Alpha for text and text backgrounds, which cannot flash
    pub fn text_alpha(self) -> u8 {
        match self {
            Opacity::Solid | Opacity::Flashing => 255,
            Opacity::Translucent => 100,
            Opacity::Transparent => 0,
        }
    }

    /// Alpha for the window behind a line
    pub fn window_alpha(self) -> u8 {
        match self {
            Opacity::Solid => 255,
            Opacity::Flashing => 250,
            Opacity::Translucent => 100,
            Opacity::Transparent => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    values: BTreeMap<AttributeType, u32>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: AttributeType, value: u32) -> &mut Self {
        self.values.insert(kind, value);
        self
    }

    pub fn get(&self, kind: AttributeType) -> Option<u32> {
        self.values.get(&kind).copied()
    }

    pub fn is_set(&self, kind: AttributeType) -> bool {
        self.values.contains_key(&kind)
    }

    /// Merge `other` in, its values win
    pub fn update(&mut self, other: &Attributes) {
        self.values.extend(other.values.iter().map(|(k, v)| (*k, *v)));
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Font size class index, if one of the known classes is selected
    pub fn font_size_class(&self) -> Option<usize> {
        self.get(AttributeType::FontSize)
            .map(|v| v as usize)
            .filter(|&v| v <= FontSize::ExtraLarge as usize)
    }

    pub fn font_style(&self) -> Option<FontStyle> {
        self.get(AttributeType::FontStyle).and_then(FontStyle::from_u32)
    }

    pub fn edge_style(&self) -> EdgeStyle {
        self.get(AttributeType::EdgeStyle)
            .map(EdgeStyle::from_u32)
            .unwrap_or_default()
    }

    pub fn opacity(&self, kind: AttributeType) -> Option<Opacity> {
        self.get(kind).map(Opacity::from_u32)
    }
}
