//! Media clock reconciliation
//!
//! The media position is only reported occasionally; in between it is
//! extrapolated from the wall clock, minus any time spent paused.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::timing::TimePoint;

/// Source of wall-clock instants
pub trait WallClock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// The real monotonic clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        *self.elapsed.lock() += Duration::from_millis(ms);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.elapsed.lock()
    }
}

/// Last reported media position and pause bookkeeping
#[derive(Debug, Clone)]
pub struct ClockState {
    last_media_time_ms: Option<i64>,
    last_media_wall: Instant,
    paused: bool,
    pause_entered_at: Instant,
    accumulated_pause_ms: u64,
}

impl ClockState {
    pub fn new(now: Instant) -> Self {
        Self {
            last_media_time_ms: None,
            last_media_wall: now,
            paused: false,
            pause_entered_at: now,
            accumulated_pause_ms: 0,
        }
    }

    /// Record a media position; discards pause time accumulated so far
    pub fn set_media_time(&mut self, media_ms: i64, now: Instant) {
        self.last_media_time_ms = Some(media_ms);
        self.last_media_wall = now;
        self.accumulated_pause_ms = 0;
    }

    pub fn pause(&mut self, now: Instant) {
        if !self.paused {
            self.pause_entered_at = now;
        }
        self.paused = true;
    }

    pub fn resume(&mut self, now: Instant) {
        if self.paused {
            let paused_for = now.saturating_duration_since(self.pause_entered_at);
            self.accumulated_pause_ms = self
                .accumulated_pause_ms
                .saturating_add(u64::try_from(paused_for.as_millis()).unwrap_or(u64::MAX));
        }
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn has_media_time(&self) -> bool {
        self.last_media_time_ms.is_some()
    }

    pub fn accumulated_pause_ms(&self) -> u64 {
        self.accumulated_pause_ms
    }

    /// Extrapolated media position, `None` until a media time is known
    pub fn media_now(&self, now: Instant) -> Option<TimePoint> {
        let last = self.last_media_time_ms?;
        let since_report = i64::try_from(now.saturating_duration_since(self.last_media_wall).as_millis())
            .unwrap_or(i64::MAX);
        let paused = i64::try_from(self.accumulated_pause_ms).unwrap_or(i64::MAX);
        Some(TimePoint::from_millis(
            last.saturating_add(since_report).saturating_sub(paused),
        ))
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }
}
