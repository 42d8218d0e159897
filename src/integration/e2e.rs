//! End-to-end integration tests
//!
//! Drive the engine the way a player does: payloads in, media time updates,
//! `process` on every tick, and check what reached the draw backend.

use crate::engine::{SubtitleEngine, WebVttEngine};
use crate::integration::fixtures::RecordingBackend;
use crate::render::style::ColorArgb;
use crate::timeline::ManualClock;

/// Move the wall clock on and run one scheduler tick
pub fn tick(engine: &WebVttEngine, clock: &ManualClock, ms: u64) -> bool {
    clock.advance_ms(ms);
    engine.process()
}

/// Text currently on screen, one string per drawn line
pub fn screen_text(engine: &WebVttEngine) -> Vec<String> {
    engine.rendered_lines().iter().map(|line| line.text()).collect()
}

/// White glyph runs of the last frame joined together
pub fn frame_text(backend: &RecordingBackend) -> String {
    backend.frame_texts(ColorArgb::WHITE).concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::EngineConfig;
    use crate::integration::fixtures::{
        engine_with_clock, engine_with_config, BROKEN_CUE_VTT, ROLL_UP_VTT, SIMPLE_VTT, TIMESTAMP_MAP_VTT,
    };
    use crate::render::attributes::{AttributeType, Attributes, FontSize};
    use crate::render::backend::Rect;
    use crate::render::converter::Converter;

    #[test]
    fn test_cue_lifecycle() {
        let (engine, clock, backend) = engine_with_clock();
        engine.start();
        assert_eq!(engine.add_data(SIMPLE_VTT.as_bytes(), 0), 2);
        engine.current_mediatime(1000);

        assert!(tick(&engine, &clock, 500));
        assert_eq!(screen_text(&engine), vec!["First cue"]);
        assert_eq!(frame_text(&backend), "First cue");

        // Nothing to redraw while the same cue stays up
        assert!(!tick(&engine, &clock, 100));

        assert!(tick(&engine, &clock, 1900));
        assert!(screen_text(&engine).is_empty());
        assert_eq!(frame_text(&backend), "");

        assert!(tick(&engine, &clock, 1000));
        assert_eq!(screen_text(&engine), vec!["Second cue"]);

        assert!(tick(&engine, &clock, 2000));
        assert_eq!(engine.cue_counts(), (0, 0));
        assert_eq!(engine.get_wait_time(), Duration::ZERO);
    }

    #[test]
    fn test_pause_spanning_cue_end() {
        let (engine, clock, _backend) = engine_with_clock();
        engine.start();
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(1000);
        assert!(tick(&engine, &clock, 500));

        clock.advance_ms(1000);
        engine.pause();
        assert!(!tick(&engine, &clock, 1000));
        assert_eq!(engine.get_wait_time(), Duration::from_millis(250));

        engine.resume();
        // Media time is 2500 even though the wall clock passed the cue end
        assert!(!engine.process());
        assert_eq!(screen_text(&engine), vec!["First cue"]);

        assert!(tick(&engine, &clock, 600));
        assert!(screen_text(&engine).is_empty());
    }

    #[test]
    fn test_seek_resets_drift() {
        let (engine, clock, _backend) = engine_with_clock();
        engine.start();
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(1000);
        assert!(tick(&engine, &clock, 200));

        clock.advance_ms(300);
        engine.pause();
        clock.advance_ms(300);
        engine.resume();

        engine.current_mediatime(4500);
        assert!(engine.process());
        assert_eq!(screen_text(&engine), vec!["Second cue"]);
    }

    #[test]
    fn test_jump_past_cue_drops_it() {
        let (engine, _clock, _backend) = engine_with_clock();
        engine.start();
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(5000);

        assert!(engine.process());
        assert_eq!(screen_text(&engine), vec!["Second cue"]);
        assert_eq!(engine.cue_counts(), (0, 1));
    }

    #[test]
    fn test_payloads_out_of_order() {
        let (engine, clock, _backend) = engine_with_clock();
        engine.start();
        engine.add_data(b"WEBVTT\n\n00:04.000 --> 00:05.000\nlater\n", 0);
        engine.add_data(b"WEBVTT\n\n00:01.000 --> 00:02.000\nearlier\n", 0);
        engine.current_mediatime(0);

        assert!(tick(&engine, &clock, 1500));
        assert_eq!(screen_text(&engine), vec!["earlier"]);
        assert!(tick(&engine, &clock, 3000));
        assert_eq!(screen_text(&engine), vec!["later"]);
    }

    #[test]
    fn test_repeated_payload_shown_once() {
        let (engine, clock, backend) = engine_with_clock();
        engine.start();
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(1000);
        assert!(tick(&engine, &clock, 100));

        // Segments often repeat the cue that straddles their boundary
        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        assert!(!tick(&engine, &clock, 100));
        assert_eq!(screen_text(&engine), vec!["First cue"]);
        assert_eq!(frame_text(&backend), "First cue");
    }

    #[test]
    fn test_timestamp_map_rebasing() {
        let (engine, clock, _backend) = engine_with_clock();
        engine.start();
        engine.add_data(TIMESTAMP_MAP_VTT.as_bytes(), 0);
        engine.current_mediatime(10500);
        assert!(!engine.process());

        assert!(tick(&engine, &clock, 1000));
        assert_eq!(screen_text(&engine), vec!["Rebased"]);

        // A display offset moves the cue back onto the presentation timeline
        let (engine, _clock, _backend) = engine_with_clock();
        engine.start();
        engine.add_data(TIMESTAMP_MAP_VTT.as_bytes(), 10000);
        engine.current_mediatime(1500);
        assert!(engine.process());
        assert_eq!(screen_text(&engine), vec!["Rebased"]);
    }

    #[test]
    fn test_broken_cue_skipped() {
        let (engine, _clock, _backend) = engine_with_clock();
        assert_eq!(engine.add_data(BROKEN_CUE_VTT.as_bytes(), 0), 2);

        engine.current_mediatime(5500);
        assert!(engine.process());
        assert_eq!(screen_text(&engine), vec!["also good"]);

        // line:100% survives the bad align setting and is pulled on screen
        let lines = engine.rendered_lines();
        let converter = Converter::with_defaults(1920, 1080);
        let bottom = converter.height() + converter.screen_padding_height_pixels();
        assert_eq!(lines[0].rect.bottom(), bottom);
    }

    #[test]
    fn test_roll_up_region() {
        let (engine, clock, backend) = engine_with_clock();
        engine.start();
        engine.add_data(ROLL_UP_VTT.as_bytes(), 0);
        engine.current_mediatime(0);

        assert!(tick(&engine, &clock, 500));
        assert_eq!(screen_text(&engine), vec!["one"]);
        assert!(tick(&engine, &clock, 1000));
        assert_eq!(screen_text(&engine), vec!["one", "two"]);
        assert!(tick(&engine, &clock, 1000));
        assert_eq!(screen_text(&engine), vec!["one", "two", "three"]);

        assert!(tick(&engine, &clock, 1000));
        assert_eq!(screen_text(&engine), vec!["two", "three", "four"]);
        assert_eq!(frame_text(&backend), "twothreefour");

        // Lines fill the region from its bottom edge, one line height apart
        let lines = engine.rendered_lines();
        let ys: Vec<i32> = lines.iter().map(|line| line.rect.y).collect();
        let line_height = lines[0].rect.h;
        assert_eq!(ys[1] - ys[0], line_height);
        assert_eq!(ys[2] - ys[1], line_height);

        // Centred at half the 40% region width, 10% in from the left
        let converter = Converter::with_defaults(1920, 1080);
        let centre = converter.vw_to_width_pixels(1000.0)
            + converter.vw_to_width_pixels(2000.0)
            + converter.screen_padding_width_pixels();
        assert_eq!(lines[0].rect.x, centre - lines[0].rect.w / 2);
    }

    #[test]
    fn test_region_cached_across_payloads() {
        let (engine, _clock, _backend) = engine_with_clock();
        engine.start();
        engine.add_data(ROLL_UP_VTT.as_bytes(), 0);
        engine.add_data(b"WEBVTT\n\n00:03.500 --> 00:10.000 region:bill\nfive\n", 0);
        engine.current_mediatime(3600);

        assert!(engine.process());
        assert_eq!(screen_text(&engine), vec!["three", "four", "five"]);
    }

    #[test]
    fn test_font_size_attribute() {
        let (engine, _clock, backend) = engine_with_clock();
        engine.start();
        let mut attributes = Attributes::new();
        attributes.set(AttributeType::FontSize, FontSize::Large as u32);
        engine.set_attributes(&attributes);

        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(1000);
        assert!(engine.process());

        let mut converter = Converter::with_defaults(1920, 1080);
        converter.set_attributes(&attributes);
        let glyph = backend
            .frame()
            .into_iter()
            .find_map(|call| match call {
                crate::integration::fixtures::DrawCall::Glyphs { font, .. } => Some(font),
                _ => None,
            })
            .unwrap();
        assert_eq!(glyph.size_px, converter.font_size_pixels());

        // Auto-positioned cue sits at the large-font top position
        let lines = engine.rendered_lines();
        let top = converter.top_positioning_pixels() + converter.screen_padding_height_pixels();
        assert_eq!(lines[0].rect.y, top);
    }

    #[test]
    fn test_stop_resets_attributes() {
        let (engine, _clock, _backend) = engine_with_clock();
        let mut attributes = Attributes::new();
        attributes.set(AttributeType::FontColor, 0xFFFF_0000);
        engine.set_attributes(&attributes);
        engine.stop();
        engine.start();

        engine.add_data(SIMPLE_VTT.as_bytes(), 0);
        engine.current_mediatime(1000);
        assert!(engine.process());
        let token = &engine.rendered_lines()[0].tokens[0];
        assert_eq!(token.style.text_colour, ColorArgb::WHITE);
    }

    #[test]
    fn test_related_video_size() {
        let mut config = EngineConfig::new();
        config.layout.screen_padding = 0;
        let (engine, _clock, _backend) = engine_with_config(config);
        engine.start();
        engine.set_related_video_size(1280, 720);
        engine.add_data(b"WEBVTT\n\n00:00.000 --> 00:01.000 line:0 align:start\nx\n", 0);
        engine.current_mediatime(0);
        assert!(engine.process());

        let line = &engine.rendered_lines()[0];
        assert_eq!((line.rect.x, line.rect.y), (0, 0));
        assert_eq!(line.rect.h, (720.0 * 521.0 / 10000.0) as i32);
        assert_ne!(line.rect, Rect::default());
    }
}
