//! Cue clock times and `X-TIMESTAMP-MAP` headers

use crate::error::{Result, WebVttError};
use crate::parser::settings::parse_property_value_pair;

macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// MPEG-TS presentation timestamps tick at 90kHz
const MPEGTS_TICKS_PER_MS: u64 = 90;

/// A `(HH:)?MM:SS(.mmm)?` clock reading, unnormalized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTime {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub millis: i64,
}

impl ClockTime {
    /// Total milliseconds, `None` when it does not fit an i64
    pub fn checked_total_millis(&self) -> Option<i64> {
        let minutes = self.hours.checked_mul(60)?.checked_add(self.minutes)?;
        let seconds = minutes.checked_mul(60)?.checked_add(self.seconds)?;
        seconds.checked_mul(1000)?.checked_add(self.millis)
    }

    /// Total milliseconds, saturating at the i64 range
    pub fn total_millis(&self) -> i64 {
        self.checked_total_millis().unwrap_or(i64::MAX)
    }

    /// Milliseconds from `local` to `self`
    ///
    /// Borrowing field by field (ms from s, s from min, min from h) and
    /// recombining gives the plain difference of the totals, which is what
    /// is computed here. Negative when `self` is before `local`.
    pub fn relative_to(&self, local: &ClockTime) -> i64 {
        self.total_millis().saturating_sub(local.total_millis())
    }
}

/// Parse a cue timestamp; the whole string must match
pub fn parse_hhmmss(value: &str) -> Result<ClockTime> {
    let re = regex!(r"^(?:([0-9]*):)?([0-9][0-9]):([0-9][0-9])(?:\.([0-9][0-9][0-9]))?$");
    let caps = re
        .captures(value)
        .ok_or_else(|| WebVttError::Timestamp(format!("failed to parse time: {value}")))?;

    let field = |idx: usize| -> Result<i64> {
        match caps.get(idx).map(|m| m.as_str()) {
            None | Some("") => Ok(0),
            Some(digits) => digits
                .parse::<i64>()
                .map_err(|e| WebVttError::Timestamp(format!("{value}: {e}"))),
        }
    };

    let time = ClockTime {
        hours: field(1)?,
        minutes: field(2)?,
        seconds: field(3)?,
        millis: field(4)?,
    };
    if time.checked_total_millis().is_none() {
        return Err(WebVttError::Timestamp(format!("time out of range: {value}")));
    }
    Ok(time)
}

/// Contents of an `X-TIMESTAMP-MAP=MPEGTS:<ticks>,LOCAL:<time>` header line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimestampMap {
    /// `MPEGTS / 90`, 0 when missing or malformed
    pub pts_offset_ms: i64,
    /// `LOCAL` anchor; `None` when the line was not a timestamp map at all
    pub local: Option<ClockTime>,
}

/// Parse an `X-TIMESTAMP-MAP` line
///
/// Malformed values degrade to zero rather than failing: a bad `MPEGTS`
/// gives a 0 offset and a bad `LOCAL` anchors at `00:00:00.000`.
pub fn parse_timestamp_map(line: &str) -> TimestampMap {
    let mut parts = line.split('=');
    if parts.next() != Some("X-TIMESTAMP-MAP") {
        tracing::warn!("Malformed timestamp map line {:?}", line);
        return TimestampMap::default();
    }

    let mut mpegts: Option<u64> = None;
    let mut local: Option<ClockTime> = None;

    for setting in parts.next().unwrap_or_default().split(',') {
        let Ok((key, value)) = parse_property_value_pair(setting) else {
            continue;
        };
        match key {
            "MPEGTS" if mpegts.is_none() => {
                mpegts = Some(value.trim().parse().unwrap_or_else(|_| {
                    tracing::warn!("Bad MPEGTS value {:?}, using 0", value);
                    0
                }));
            }
            "LOCAL" if local.is_none() => {
                local = Some(parse_hhmmss(value.trim()).unwrap_or_else(|e| {
                    tracing::warn!("Bad LOCAL value: {}, using 00:00:00.000", e);
                    ClockTime::default()
                }));
            }
            _ => {}
        }
    }

    TimestampMap {
        pts_offset_ms: (mpegts.unwrap_or(0) / MPEGTS_TICKS_PER_MS) as i64,
        local: Some(local.unwrap_or_default()),
    }
}
