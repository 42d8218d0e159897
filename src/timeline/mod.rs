//! Live cue timeline
//!
//! Owns the cues that are waiting to be shown (`pending`, sorted by
//! `(begin, end)`), the cues on screen (`shown`), the region cache and the
//! media clock. All methods take the current wall-clock instant so the
//! timeline itself never reads a clock.

pub mod clock;

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cue::Cue;
use crate::parser::ParsedDocument;
use crate::region::RegionMap;
use crate::timing::TimePoint;

pub use clock::{ClockState, ManualClock, SystemClock, WallClock};

/// Poll interval while cues are live
pub const ACTIVE_WAIT: Duration = Duration::from_millis(25);
/// Poll interval while paused
pub const PAUSED_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct Timeline {
    pending: VecDeque<Arc<Cue>>,
    shown: Vec<Arc<Cue>>,
    region_cache: RegionMap,
    clock: ClockState,
    active_wait: Duration,
    paused_wait: Duration,
}

impl Timeline {
    pub fn new(now: Instant) -> Self {
        Self {
            pending: VecDeque::new(),
            shown: Vec::new(),
            region_cache: RegionMap::new(),
            clock: ClockState::new(now),
            active_wait: ACTIVE_WAIT,
            paused_wait: PAUSED_WAIT,
        }
    }

    /// Override the poll intervals reported by [`Timeline::wait_time`]
    pub fn set_wait_intervals(&mut self, active: Duration, paused: Duration) {
        self.active_wait = active;
        self.paused_wait = paused;
    }

    pub fn pending(&self) -> impl Iterator<Item = &Arc<Cue>> {
        self.pending.iter()
    }

    pub fn shown(&self) -> &[Arc<Cue>] {
        &self.shown
    }

    pub fn regions(&self) -> &RegionMap {
        &self.region_cache
    }

    pub fn clock(&self) -> &ClockState {
        &self.clock
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.shown.is_empty()
    }

    /// Merge a parsed document; returns the number of cues added
    pub fn add_document(&mut self, document: ParsedDocument) -> usize {
        let ParsedDocument { mut cues, regions } = document;
        let added = cues.len();

        cues.sort_by_key(|cue| cue.timing());
        let incoming: Vec<Arc<Cue>> = cues.into_iter().map(Arc::new).collect();
        self.pending = merge_sorted(std::mem::take(&mut self.pending), incoming);

        self.region_cache.extend(regions);
        self.collect_regions();

        added
    }

    /// Drop cached regions no cue refers to, warn about missing ones
    fn collect_regions(&mut self) {
        let referenced: HashSet<&str> = self
            .pending
            .iter()
            .chain(self.shown.iter())
            .filter_map(|cue| cue.region_id())
            .collect();

        for id in &referenced {
            if !self.region_cache.contains_key(*id) {
                tracing::warn!("Region id {:?} not found in document or cache", id);
            }
        }

        let before = self.region_cache.len();
        self.region_cache.retain(|id, _| referenced.contains(id.as_str()));
        if self.region_cache.len() != before {
            tracing::debug!(
                "Dropped {} unreferenced regions",
                before - self.region_cache.len()
            );
        }
    }

    pub fn set_media_time(&mut self, media_ms: i64, now: Instant) {
        self.clock.set_media_time(media_ms, now);
    }

    pub fn pause(&mut self, now: Instant) {
        self.clock.pause(now);
    }

    pub fn resume(&mut self, now: Instant) {
        self.clock.resume(now);
    }

    /// Media position used by the next tick, if ticking is possible
    pub fn tick_time(&self, now: Instant) -> Option<TimePoint> {
        if self.clock.is_paused() {
            return None;
        }
        self.clock.media_now(now)
    }

    /// Evict expired cues and promote due ones; true if `shown` changed
    pub fn advance(&mut self, media_now: TimePoint) -> bool {
        let before = self.shown.len();
        self.shown.retain(|cue| cue.timing().end > media_now);
        let mut changed = self.shown.len() != before;

        while let Some(front) = self.pending.front() {
            let timing = front.timing();
            if timing.begin > media_now {
                break;
            }
            let Some(cue) = self.pending.pop_front() else {
                break;
            };
            if timing.contains(media_now) {
                if !self.shown.iter().any(|shown| **shown == *cue) {
                    tracing::debug!("Showing cue {}", cue);
                    self.shown.push(cue);
                    changed = true;
                }
            } else {
                tracing::warn!("Dropping stale cue {} at {}", cue, media_now);
            }
        }

        changed
    }

    pub fn wait_time(&self) -> Duration {
        if self.clock.is_paused() {
            self.paused_wait
        } else if !self.is_empty() && self.clock.has_media_time() {
            self.active_wait
        } else {
            Duration::ZERO
        }
    }

    /// Forget all cues and regions and reset the clock
    pub fn clear(&mut self, now: Instant) {
        self.pending.clear();
        self.shown.clear();
        self.region_cache.clear();
        self.clock.reset(now);
    }
}

/// Stable merge of two `(begin, end)`-sorted lists, `existing` first on ties
fn merge_sorted(existing: VecDeque<Arc<Cue>>, incoming: Vec<Arc<Cue>>) -> VecDeque<Arc<Cue>> {
    let mut merged = VecDeque::with_capacity(existing.len() + incoming.len());
    let mut left = existing.into_iter().peekable();
    let mut right = incoming.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.timing() <= r.timing(),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }

    merged
}
