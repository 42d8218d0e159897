//! WebVTT parsing
//!
//! Pure, stateless parsing of one payload at a time:
//! - `settings`: `key:value` tokens and percentages
//! - `timestamp`: cue clock times and `X-TIMESTAMP-MAP`
//! - `document`: header, preamble blocks and cue scanning

pub mod document;
pub mod settings;
pub mod timestamp;

pub use document::{parse_document, ParsedDocument};
pub use settings::{parse_percentage_hundredths, parse_property_value_pair, SettingsMap};
