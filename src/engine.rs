//! Subtitle engine
//!
//! Glues the parser, timeline and renderer together behind the control
//! surface a player drives: payloads come in through [`SubtitleEngine::add_data`]
//! on any thread, while a single scheduler thread reports the media position
//! and calls [`SubtitleEngine::process`] every [`SubtitleEngine::get_wait_time`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::parser::parse_document;
use crate::render::{Attributes, DrawBackend, FontMetrics, Line, Renderer};
use crate::timeline::{SystemClock, Timeline, WallClock};

/// Control surface of a subtitle engine
pub trait SubtitleEngine: Send + Sync {
    /// Reset to a clean state
    fn init(&self);

    fn start(&self);

    fn stop(&self);

    fn pause(&self);

    fn resume(&self);

    /// Parse one cue-file payload and queue its cues; returns how many were added
    fn add_data(&self, data: &[u8], display_offset_ms: i64) -> usize;

    /// Update the screen for the current media position; true if it was redrawn
    fn process(&self) -> bool;

    fn current_mediatime(&self, media_ms: u64);

    fn set_related_video_size(&self, width: i32, height: i32);

    fn set_attributes(&self, attributes: &Attributes);

    fn mute(&self);

    fn unmute(&self);

    fn is_muted(&self) -> bool;

    /// How long the scheduler should sleep; zero means "use your own default"
    fn get_wait_time(&self) -> Duration;
}

pub struct WebVttEngine {
    timeline: Mutex<Timeline>,
    renderer: Mutex<Renderer>,
    clock: Arc<dyn WallClock>,
    muted: AtomicBool,
}

impl WebVttEngine {
    pub fn new(config: EngineConfig, backend: Box<dyn DrawBackend>, metrics: Arc<dyn FontMetrics>) -> Self {
        Self::with_clock(config, backend, metrics, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: EngineConfig,
        backend: Box<dyn DrawBackend>,
        metrics: Arc<dyn FontMetrics>,
        clock: Arc<dyn WallClock>,
    ) -> Self {
        let mut timeline = Timeline::new(clock.now());
        timeline.set_wait_intervals(
            Duration::from_millis(config.player.tick_interval_ms),
            Duration::from_millis(config.player.paused_interval_ms),
        );

        tracing::info!(
            width = config.player.width,
            height = config.player.height,
            font = %config.font.family,
            "WebVTT engine created"
        );

        Self {
            timeline: Mutex::new(timeline),
            renderer: Mutex::new(Renderer::new(config, backend, metrics)),
            clock,
            muted: AtomicBool::new(false),
        }
    }

    /// Lines currently on screen
    pub fn rendered_lines(&self) -> Vec<Line> {
        self.renderer.lock().last_lines().to_vec()
    }

    /// Number of cues waiting to be shown and on screen
    pub fn cue_counts(&self) -> (usize, usize) {
        let timeline = self.timeline.lock();
        (timeline.pending().count(), timeline.shown().len())
    }

    /// Wipe the screen and forget all cues and timing
    fn clear(&self) {
        {
            let mut renderer = self.renderer.lock();
            renderer.clear_state();
            renderer.clear_screen();
            renderer.update();
        }
        self.timeline.lock().clear(self.clock.now());
    }
}

/// Decode a payload and normalize line endings and NUL padding
fn normalize_payload(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let text = if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.into_owned()
    };
    text.trim_end_matches('\0').to_string()
}

impl SubtitleEngine for WebVttEngine {
    fn init(&self) {
        tracing::info!("init");
        self.clear();
    }

    fn start(&self) {
        tracing::info!("start");
        self.clear();
        if !self.is_muted() {
            self.renderer.lock().show();
        }
    }

    fn stop(&self) {
        tracing::info!("stop");
        self.clear();
        self.renderer.lock().hide();
    }

    fn pause(&self) {
        tracing::debug!("pause received");
        self.timeline.lock().pause(self.clock.now());
    }

    fn resume(&self) {
        tracing::debug!("resume received");
        let mut timeline = self.timeline.lock();
        timeline.resume(self.clock.now());
        tracing::debug!("Accumulated pause {}ms", timeline.clock().accumulated_pause_ms());
    }

    fn add_data(&self, data: &[u8], display_offset_ms: i64) -> usize {
        tracing::trace!(size = data.len(), display_offset_ms, "add_data");

        let text = normalize_payload(data);
        let document = match parse_document(&text, display_offset_ms) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Rejected WebVTT payload: {}", e);
                return 0;
            }
        };

        let added = self.timeline.lock().add_document(document);
        if added == 0 {
            tracing::info!("no data added, empty document received?");
        } else {
            tracing::debug!("Added {} cues", added);
        }
        added
    }

    fn process(&self) -> bool {
        let now = self.clock.now();
        let (cues, regions) = {
            let mut timeline = self.timeline.lock();
            let Some(media_now) = timeline.tick_time(now) else {
                return false;
            };
            if !timeline.advance(media_now) {
                return false;
            }
            (timeline.shown().to_vec(), timeline.regions().clone())
        };

        let mut renderer = self.renderer.lock();
        renderer.clear_screen();
        let lines = renderer.render_document(&cues, &regions);
        renderer.update();
        tracing::debug!("Rendered {} cues as {} lines", cues.len(), lines);
        true
    }

    fn current_mediatime(&self, media_ms: u64) {
        let media_ms = i64::try_from(media_ms).unwrap_or(i64::MAX);
        self.timeline.lock().set_media_time(media_ms, self.clock.now());
        tracing::debug!("mediatime={}ms", media_ms);
    }

    fn set_related_video_size(&self, width: i32, height: i32) {
        self.renderer.lock().set_related_video_size(width, height);
    }

    fn set_attributes(&self, attributes: &Attributes) {
        self.renderer.lock().set_attributes(attributes);
    }

    fn mute(&self) {
        tracing::debug!("mute received");
        self.muted.store(true, Ordering::SeqCst);
        self.renderer.lock().hide();
    }

    fn unmute(&self) {
        tracing::debug!("unmute received");
        self.muted.store(false, Ordering::SeqCst);
        self.renderer.lock().show();
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    fn get_wait_time(&self) -> Duration {
        self.timeline.lock().wait_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::fixtures::{engine_with_clock, SIMPLE_VTT};

    #[test]
    fn test_normalize_payload() {
        assert_eq!(normalize_payload(b"WEBVTT\r\n\r\nx\ry\0\0"), "WEBVTT\n\nx\ny");
        assert_eq!(normalize_payload(b"plain\n"), "plain\n");
        assert_eq!(normalize_payload(b"bad \xff byte"), "bad \u{fffd} byte");
    }

    #[test]
    fn test_add_data_crlf_payload() {
        let (engine, _clock, _backend) = engine_with_clock();
        let payload = SIMPLE_VTT.replace('\n', "\r\n");
        assert_eq!(engine.add_data(payload.as_bytes(), 0), 2);
        assert_eq!(engine.cue_counts(), (2, 0));
    }

    #[test]
    fn test_bad_header_adds_nothing() {
        let (engine, _clock, _backend) = engine_with_clock();
        assert_eq!(engine.add_data(SIMPLE_VTT.as_bytes(), 0), 2);
        assert_eq!(engine.add_data(b"WEBVTX\n\n00:01.000 --> 00:02.000\nx\n", 0), 0);
        assert_eq!(engine.cue_counts(), (2, 0));
    }

    #[test]
    fn test_process_needs_media_time() {
        let (engine, clock, _backend) = engine_with_clock();
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        clock.advance_ms(5000);
        assert!(!engine.process());
        assert_eq!(engine.get_wait_time(), Duration::ZERO);

        engine.current_mediatime(1000);
        assert_eq!(engine.get_wait_time(), Duration::from_millis(25));
        assert!(engine.process());
        assert_eq!(engine.cue_counts(), (1, 1));
    }

    #[test]
    fn test_huge_media_time() {
        let (engine, clock, _backend) = engine_with_clock();
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(u64::MAX);
        clock.advance_ms(100);

        // Both cues are long gone
        assert!(!engine.process());
        assert_eq!(engine.cue_counts(), (0, 0));
    }

    #[test]
    fn test_mute_only_hides() {
        let (engine, clock, backend) = engine_with_clock();
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(1000);

        engine.mute();
        assert!(engine.is_muted());
        assert!(!backend.is_visible());

        clock.advance_ms(100);
        assert!(engine.process());
        assert_eq!(engine.cue_counts().1, 1);

        engine.unmute();
        assert!(!engine.is_muted());
        assert!(backend.is_visible());
    }

    #[test]
    fn test_start_keeps_muted_hidden() {
        let (engine, _clock, backend) = engine_with_clock();
        engine.mute();
        engine.start();
        assert!(!backend.is_visible());
        assert!(engine.is_muted());
    }

    #[test]
    fn test_stop_clears_everything() {
        let (engine, _clock, backend) = engine_with_clock();
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(1000);
        assert!(engine.process());

        engine.stop();
        assert_eq!(engine.cue_counts(), (0, 0));
        assert!(engine.rendered_lines().is_empty());
        assert!(!backend.is_visible());
        assert_eq!(engine.get_wait_time(), Duration::ZERO);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WebVttEngine>();
    }
}
