//! Test fixtures for integration tests
//!
//! Provides sample cue files, a draw backend that records what it is asked
//! to paint and an engine wired to a manual clock.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::engine::WebVttEngine;
use crate::render::backend::{DrawBackend, FixedAdvanceFont, FontHandle, Rect};
use crate::render::style::ColorArgb;
use crate::timeline::ManualClock;

/// Two plain cues, one second apart
pub const SIMPLE_VTT: &str = "WEBVTT

00:01.000 --> 00:03.000
First cue

00:04.000 --> 00:06.000
Second cue
";

/// Roll-up captions in a three line region
pub const ROLL_UP_VTT: &str = "WEBVTT

REGION
id:bill
width:40%
lines:3
regionanchor:0%,100%
viewportanchor:10%,90%
scroll:up

00:00.000 --> 00:10.000 region:bill
one

00:01.000 --> 00:10.000 region:bill
two

00:02.000 --> 00:10.000 region:bill
three

00:03.000 --> 00:10.000 region:bill
four
";

/// HLS segment style payload rebased by X-TIMESTAMP-MAP
pub const TIMESTAMP_MAP_VTT: &str = "WEBVTT
X-TIMESTAMP-MAP=MPEGTS:900000,LOCAL:00:00:00.000

00:00:01.000 --> 00:00:02.000
Rebased
";

/// One broken header between two good cues
pub const BROKEN_CUE_VTT: &str = "WEBVTT

00:01.000 --> 00:02.000
good

00:0x.000 --> 00:04.000
bad

00:05.000 --> 00:06.000 align:wibble line:100%
also good
";

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill {
        colour: ColorArgb,
        rect: Rect,
    },
    Glyphs {
        font: FontHandle,
        rect: Rect,
        text: String,
        fg: ColorArgb,
        bg: ColorArgb,
    },
    Clear,
    Update,
}

#[derive(Debug, Default)]
struct Recording {
    calls: Vec<DrawCall>,
    visible: bool,
    preferred_size: Option<(i32, i32)>,
}

/// Draw backend that records every call; clones share the recording
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    inner: Arc<Mutex<Recording>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DrawCall> {
        self.inner.lock().calls.clone()
    }

    /// Calls since the last clear
    pub fn frame(&self) -> Vec<DrawCall> {
        let calls = self.calls();
        match calls.iter().rposition(|call| *call == DrawCall::Clear) {
            Some(idx) => calls[idx + 1..].to_vec(),
            None => calls,
        }
    }

    /// Texts of the glyph runs drawn in `fg` since the last clear
    pub fn frame_texts(&self, fg: ColorArgb) -> Vec<String> {
        self.frame()
            .into_iter()
            .filter_map(|call| match call {
                DrawCall::Glyphs { text, fg: colour, .. } if colour == fg => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn is_visible(&self) -> bool {
        self.inner.lock().visible
    }

    pub fn set_preferred_size(&self, size: Option<(i32, i32)>) {
        self.inner.lock().preferred_size = size;
    }

    fn record(&self, call: DrawCall) {
        self.inner.lock().calls.push(call);
    }
}

impl DrawBackend for RecordingBackend {
    fn fill_rectangle(&mut self, colour: ColorArgb, rect: Rect) {
        self.record(DrawCall::Fill { colour, rect });
    }

    fn draw_glyph_run(&mut self, font: &FontHandle, rect: Rect, text: &str, fg: ColorArgb, bg: ColorArgb) {
        self.record(DrawCall::Glyphs {
            font: font.clone(),
            rect,
            text: text.to_string(),
            fg,
            bg,
        });
    }

    fn clear(&mut self) {
        self.record(DrawCall::Clear);
    }

    fn update(&mut self) {
        self.record(DrawCall::Update);
    }

    fn set_visible(&mut self, visible: bool) {
        self.inner.lock().visible = visible;
    }

    fn preferred_size(&self) -> Option<(i32, i32)> {
        self.inner.lock().preferred_size
    }
}

/// Engine with default config, a 20px fixed-advance font and a manual clock
pub fn engine_with_clock() -> (WebVttEngine, Arc<ManualClock>, RecordingBackend) {
    engine_with_config(EngineConfig::new())
}

pub fn engine_with_config(config: EngineConfig) -> (WebVttEngine, Arc<ManualClock>, RecordingBackend) {
    let clock = Arc::new(ManualClock::new());
    let backend = RecordingBackend::new();
    let engine = WebVttEngine::with_clock(
        config,
        Box::new(backend.clone()),
        Arc::new(FixedAdvanceFont { advance_px: 20 }),
        clock.clone(),
    );
    (engine, clock, backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_backend_shares_calls() {
        let backend = RecordingBackend::new();
        let mut boxed: Box<dyn DrawBackend> = Box::new(backend.clone());
        boxed.fill_rectangle(ColorArgb::BLACK, Rect::new(0, 0, 10, 10));
        boxed.clear();
        boxed.draw_glyph_run(
            &FontHandle::new("Cinecav Sans", 45),
            Rect::new(0, 0, 20, 50),
            "x",
            ColorArgb::WHITE,
            ColorArgb::TRANSPARENT,
        );
        boxed.set_visible(true);

        assert_eq!(backend.calls().len(), 3);
        assert_eq!(backend.frame().len(), 1);
        assert_eq!(backend.frame_texts(ColorArgb::WHITE), vec!["x"]);
        assert!(backend.is_visible());
    }
}
