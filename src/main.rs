//! WebVTT engine demo player
//!
//! Plays a WebVTT file against a wall-clock media timeline and logs what the
//! engine paints. `--json` prints every frame's laid-out lines instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webvtt_engine::config_file::ConfigFile;
use webvtt_engine::render::{ColorArgb, DrawBackend, FixedAdvanceFont, FontHandle, Rect};
use webvtt_engine::{EngineConfig, Result, SubtitleEngine, WebVttEngine, WebVttError};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "webvtt-engine";

/// Draw backend that logs every call
#[derive(Debug, Default)]
struct LoggingBackend;

impl DrawBackend for LoggingBackend {
    fn fill_rectangle(&mut self, colour: ColorArgb, rect: Rect) {
        if colour.a > 0 {
            tracing::debug!(?rect, ?colour, "fill");
        }
    }

    fn draw_glyph_run(&mut self, font: &FontHandle, rect: Rect, text: &str, fg: ColorArgb, _bg: ColorArgb) {
        tracing::info!(x = rect.x, y = rect.y, size = font.size_px, ?fg, "{:?}", text);
    }

    fn clear(&mut self) {
        tracing::trace!("clear");
    }

    fn update(&mut self) {
        tracing::trace!("update");
    }

    fn set_visible(&mut self, visible: bool) {
        tracing::debug!("visible={}", visible);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut json = false;
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            paths.push(arg);
        }
    }
    let Some(vtt_path) = paths.first().cloned() else {
        eprintln!("usage: {} <file.vtt> [config.toml] [--json]", APP_NAME);
        std::process::exit(2);
    };

    let config_path = paths.get(1).map(String::as_str);
    let (config, load_error) = load_config(config_path);
    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    if let (Some(path), Some(e)) = (config_path, load_error) {
        tracing::warn!("Failed to load config file {}: {}. Using defaults.", path, e);
    }
    tracing::info!("Configuration loaded: {:?}", config);

    let data = Bytes::from(tokio::fs::read(&vtt_path).await?);
    let idle = Duration::from_millis(config.player.idle_interval_ms);

    let engine = WebVttEngine::new(
        config,
        Box::new(LoggingBackend),
        Arc::new(FixedAdvanceFont { advance_px: 20 }),
    );
    engine.start();

    let added = engine.add_data(&data, 0);
    tracing::info!("Loaded {} cues from {}", added, vtt_path);

    let started = Instant::now();
    loop {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        engine.current_mediatime(elapsed_ms);

        if engine.process() && json {
            match serde_json::to_string(&engine.rendered_lines()) {
                Ok(frame) => println!("{}", frame),
                Err(e) => tracing::warn!("Failed to encode frame: {}", e),
            }
        }

        if engine.cue_counts() == (0, 0) {
            break;
        }

        let wait = match engine.get_wait_time() {
            Duration::ZERO => idle,
            wait => wait,
        };
        tokio::time::sleep(wait).await;
    }

    engine.stop();
    tracing::info!("Finished after {}ms", started.elapsed().as_millis());
    Ok(())
}

/// Config from the given TOML file, or defaults plus the reason they were used
fn load_config(path: Option<&str>) -> (EngineConfig, Option<WebVttError>) {
    let Some(path) = path else {
        return (EngineConfig::default(), None);
    };
    match ConfigFile::from_file(path) {
        Ok(cf) => (cf.into_engine_config(), None),
        Err(e) => (EngineConfig::default(), Some(e)),
    }
}

/// Initialize logging with tracing
fn init_logging(config: &EngineConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("webvtt_engine={}", config.log_level).into());

    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
