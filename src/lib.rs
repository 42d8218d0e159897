//! WebVTT subtitle engine
//!
//! Parses WebVTT payloads as they arrive (typically one per HLS segment),
//! keeps the cues on a media-time timeline that survives pause and seek, and
//! lays out the active cues into pixel rectangles for a draw backend.
//!
//! The entry point is [`WebVttEngine`], driven through the [`SubtitleEngine`]
//! trait by a player's scheduler thread.

pub mod config;
pub mod config_file;
pub mod cue;
pub mod engine;
pub mod error;
pub mod parser;
pub mod region;
pub mod render;
pub mod timeline;
pub mod timing;

#[cfg(test)]
mod integration;

pub use config::EngineConfig;
pub use cue::Cue;
pub use engine::{SubtitleEngine, WebVttEngine};
pub use error::{Result, WebVttError};
pub use region::Region;
pub use timing::{TimePoint, Timing};
