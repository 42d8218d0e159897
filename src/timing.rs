//! Media time values
//!
//! A [`TimePoint`] is a signed millisecond offset from the stream epoch and a
//! [`Timing`] is the half-open `[begin, end)` interval a cue is visible for.

use std::fmt;
use std::ops::{Add, Sub};

use serde::Serialize;

/// Millisecond position on the media timeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimePoint(i64);

impl TimePoint {
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Shift by a signed offset, saturating at the i64 range
    pub fn offset_by(self, offset_ms: i64) -> Self {
        Self(self.0.saturating_add(offset_ms))
    }
}

impl Add<i64> for TimePoint {
    type Output = TimePoint;

    fn add(self, rhs: i64) -> TimePoint {
        self.offset_by(rhs)
    }
}

impl Sub for TimePoint {
    type Output = i64;

    fn sub(self, rhs: TimePoint) -> i64 {
        self.0.saturating_sub(rhs.0)
    }
}

impl From<i64> for TimePoint {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let ms = self.0.unsigned_abs();
        write!(
            f,
            "{}{:02}:{:02}:{:02}.{:03}",
            sign,
            ms / 3_600_000,
            (ms / 60_000) % 60,
            (ms / 1000) % 60,
            ms % 1000
        )
    }
}

/// Visibility interval of a cue
///
/// Ordered by `(begin, end)`; the derive relies on field order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timing {
    pub begin: TimePoint,
    pub end: TimePoint,
}

impl Timing {
    pub fn new(begin: TimePoint, end: TimePoint) -> Self {
        Self { begin, end }
    }

    pub fn from_millis(begin_ms: i64, end_ms: i64) -> Self {
        Self::new(TimePoint(begin_ms), TimePoint(end_ms))
    }

    /// Two intervals overlap iff `max(begin) < min(end)`
    pub fn overlaps(&self, other: &Timing) -> bool {
        self.begin.max(other.begin) < self.end.min(other.end)
    }

    /// `begin <= now < end`
    pub fn contains(&self, now: TimePoint) -> bool {
        self.begin <= now && now < self.end
    }

    /// An interval that can never be visible
    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    pub fn duration_ms(&self) -> i64 {
        self.end - self.begin
    }

    pub fn apply_offset(&mut self, offset_ms: i64) {
        self.begin = self.begin + offset_ms;
        self.end = self.end + offset_ms;
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.begin, self.end)
    }
}
