/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Wall clock driven by a free-running millisecond tick.
//!
//! The clock counts whole epoch seconds and keeps the sub-second remainder
//! separately.  Every poll hands it the current tick value; each elapsed
//! whole second advances `seconds` by one.  The tick counter is a `u32` that
//! wraps after ~49.7 days, so all tick arithmetic is modular.
//!
//! # Sync scheduling
//! When `seconds` reaches `next_sync` the clock latches `should_sync` and, if
//! auto-sync has been enabled, reports the sync as due.  The owner runs its
//! sync handler and then calls [`Clock::complete_sync`], which schedules the
//! next one `sync_interval` seconds later and clears the latch.  While the
//! latch is set no further sync is reported.

use tracing::debug;

use super::parse::parse_ulong;
use super::{FieldContext, Module};
use crate::store::layout::{self, le_u32};
use crate::store::{Record, Region};

/// Factory default time: 2000-01-01T00:00:00Z.
pub const DEFAULT_SECONDS: u32 = 946_684_800;

/// Factory default sync interval, seconds.
pub const DEFAULT_SYNC_INTERVAL: u32 = 1;

const MILLIS_PER_SECOND: u32 = 1_000;

// ── Record ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRecord {
    /// Epoch seconds.
    pub seconds: u32,
    /// Seconds between sync callbacks; `0` disables them.
    pub sync_interval: u32,
}

impl Default for ClockRecord {
    fn default() -> Self {
        Self {
            seconds: DEFAULT_SECONDS,
            sync_interval: DEFAULT_SYNC_INTERVAL,
        }
    }
}

impl Record for ClockRecord {
    const REGION: Region = layout::CLOCK;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::REGION.len);
        out.extend_from_slice(&self.seconds.to_le_bytes());
        out.extend_from_slice(&self.sync_interval.to_le_bytes());
        out
    }

    fn decode(bytes: &[u8]) -> Self {
        Self {
            seconds: le_u32(bytes, 0),
            sync_interval: le_u32(bytes, 4),
        }
    }
}

// ── Live state ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockFlags {
    /// A sync is due and has not completed yet.
    pub should_sync: bool,
    /// The owner has installed its sync handler.
    pub auto_sync: bool,
    /// The last sync attempt failed; local time may have drifted.
    pub time_inaccurate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clock {
    seconds: u32,
    subsecond_ms: u16,
    last_tick_ms: u32,
    sync_interval: u32,
    next_sync: u32,
    flags: ClockFlags,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time, epoch seconds.
    pub fn now(&self) -> u32 {
        self.seconds
    }

    /// Milliseconds elapsed in the current second.
    pub fn subsecond_ms(&self) -> u16 {
        self.subsecond_ms
    }

    pub fn sync_interval(&self) -> u32 {
        self.sync_interval
    }

    pub fn next_sync(&self) -> u32 {
        self.next_sync
    }

    pub fn flags(&self) -> ClockFlags {
        self.flags
    }

    /// Sets the time and restarts the sub-second phase at `tick_ms`.
    pub fn set(&mut self, now: u32, tick_ms: u32) {
        self.seconds = now;
        self.last_tick_ms = tick_ms;
        self.subsecond_ms = 0;
        self.next_sync = self.seconds.wrapping_add(self.sync_interval);
    }

    pub fn set_sync_interval(&mut self, sync_interval: u32) {
        self.sync_interval = sync_interval;
        self.next_sync = self.seconds.wrapping_add(self.sync_interval);
    }

    /// Aligns the sub-second phase with the tick source without changing the
    /// time.  Called once before the first [`update`](Self::update).
    pub fn anchor(&mut self, tick_ms: u32) {
        self.last_tick_ms = tick_ms;
        self.subsecond_ms = 0;
    }

    /// Allows [`update`](Self::update) to report due syncs.
    pub fn enable_auto_sync(&mut self) {
        self.flags.auto_sync = true;
    }

    pub fn set_time_inaccurate(&mut self, inaccurate: bool) {
        self.flags.time_inaccurate = inaccurate;
    }

    /// Advances the clock to `tick_ms`.
    ///
    /// Returns `true` when a sync has just become due and auto-sync is
    /// enabled.  Without auto-sync the due sync only latches `should_sync`.
    pub fn update(&mut self, tick_ms: u32) -> bool {
        while tick_ms.wrapping_sub(self.last_tick_ms) >= MILLIS_PER_SECOND {
            self.seconds = self.seconds.wrapping_add(1);
            self.last_tick_ms = self.last_tick_ms.wrapping_add(MILLIS_PER_SECOND);
        }
        self.subsecond_ms = tick_ms.wrapping_sub(self.last_tick_ms) as u16;

        if self.sync_interval > 0 && self.seconds >= self.next_sync && !self.flags.should_sync {
            self.flags.should_sync = true;
            return self.flags.auto_sync;
        }
        false
    }

    /// Finishes a sync callback: adopts `epoch` (possibly unchanged),
    /// schedules the next sync and clears the latch.
    pub fn complete_sync(&mut self, epoch: u32) {
        self.seconds = epoch;
        self.next_sync = epoch.wrapping_add(self.sync_interval);
        self.flags.should_sync = false;
    }
}

impl Module for Clock {
    type Record = ClockRecord;

    fn serialize(&self) -> ClockRecord {
        ClockRecord {
            seconds: self.seconds,
            sync_interval: self.sync_interval,
        }
    }

    fn configure(&mut self, record: &ClockRecord) {
        self.sync_interval = record.sync_interval;
        self.seconds = record.seconds;
        self.next_sync = self.seconds.wrapping_add(self.sync_interval);
    }

    fn apply_field(
        working: &mut ClockRecord,
        old: &ClockRecord,
        key: &[u8],
        value: &[u8],
        ctx: &FieldContext,
    ) {
        if key.eq_ignore_ascii_case(b"time") {
            working.seconds = parse_ulong(value);
            if working.seconds < ctx.countdown_target {
                debug!(
                    requested = working.seconds,
                    countdown_target = ctx.countdown_target,
                    "clock time earlier than countdown target, keeping old value"
                );
                working.seconds = old.seconds;
            }
        } else if key.eq_ignore_ascii_case(b"sync_interval") {
            working.sync_interval = parse_ulong(value);
        }
    }

    fn describe(&self, record: &ClockRecord) -> Vec<String> {
        vec![
            record.seconds.to_string(),
            record.sync_interval.to_string(),
            u8::from(self.flags.time_inaccurate).to_string(),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_at(seconds: u32, sync_interval: u32) -> Clock {
        let mut clock = Clock::new();
        clock.configure(&ClockRecord {
            seconds,
            sync_interval,
        });
        clock
    }

    // ── Ticking ───────────────────────────────────────────────────────────────

    #[test]
    fn whole_seconds_advance_and_remainder_is_kept() {
        let mut clock = clock_at(100, 0);
        clock.anchor(0);

        clock.update(999);
        assert_eq!(clock.now(), 100);
        assert_eq!(clock.subsecond_ms(), 999);

        clock.update(3_250);
        assert_eq!(clock.now(), 103);
        assert_eq!(clock.subsecond_ms(), 250);
    }

    #[test]
    fn tick_counter_wraparound_is_handled() {
        let mut clock = clock_at(100, 0);
        clock.anchor(u32::MAX - 499);
        clock.update(500);
        assert_eq!(clock.now(), 101);
        assert_eq!(clock.subsecond_ms(), 0);
    }

    // ── Sync scheduling ───────────────────────────────────────────────────────

    #[test]
    fn due_sync_is_reported_once_until_completed() {
        let mut clock = clock_at(100, 2);
        clock.anchor(0);
        clock.enable_auto_sync();

        assert!(!clock.update(1_000)); // 101
        assert!(clock.update(2_000)); // 102 == next_sync
        assert!(clock.flags().should_sync);
        assert!(!clock.update(3_000), "latch suppresses re-entry");

        clock.complete_sync(clock.now());
        assert!(!clock.flags().should_sync);
        assert_eq!(clock.next_sync(), 105);
        assert!(clock.update(5_000));
    }

    #[test]
    fn without_auto_sync_the_latch_is_set_but_not_reported() {
        let mut clock = clock_at(100, 1);
        clock.anchor(0);
        assert!(!clock.update(1_000));
        assert!(clock.flags().should_sync);
    }

    #[test]
    fn zero_interval_never_syncs() {
        let mut clock = clock_at(100, 0);
        clock.anchor(0);
        clock.enable_auto_sync();
        assert!(!clock.update(10_000));
        assert!(!clock.flags().should_sync);
    }

    #[test]
    fn set_restarts_phase_and_reschedules() {
        let mut clock = clock_at(100, 60);
        clock.anchor(0);
        clock.update(1_500);
        clock.set(5_000, 1_500);
        assert_eq!(clock.now(), 5_000);
        assert_eq!(clock.subsecond_ms(), 0);
        assert_eq!(clock.next_sync(), 5_060);
        clock.update(2_499);
        assert_eq!(clock.now(), 5_000);
    }

    // ── Module contract ───────────────────────────────────────────────────────

    #[test]
    fn configure_serialize_is_idempotent() {
        let mut clock = clock_at(1_000, 30);
        let before = clock.clone();
        clock.configure(&clock.serialize());
        assert_eq!(clock, before);
    }

    #[test]
    fn time_earlier_than_countdown_target_is_rejected() {
        let old = ClockRecord {
            seconds: 5_000,
            sync_interval: 1,
        };
        let ctx = FieldContext {
            clock_now: 5_000,
            countdown_target: 4_000,
        };

        let mut working = old;
        Clock::apply_field(&mut working, &old, b"time", b"3999", &ctx);
        assert_eq!(working.seconds, 5_000);

        Clock::apply_field(&mut working, &old, b"time", b"4000", &ctx);
        assert_eq!(working.seconds, 4_000);
    }

    #[test]
    fn sync_interval_is_always_accepted() {
        let old = ClockRecord::default();
        let mut working = old;
        Clock::apply_field(&mut working, &old, b"sync_interval", b"0x10", &FieldContext::default());
        assert_eq!(working.sync_interval, 16);
    }

    #[test]
    fn describe_includes_inaccurate_flag() {
        let mut clock = clock_at(7, 3);
        assert_eq!(clock.describe(&clock.serialize()), vec!["7", "3", "0"]);
        clock.set_time_inaccurate(true);
        assert_eq!(clock.describe(&clock.serialize()), vec!["7", "3", "1"]);
    }

    #[test]
    fn record_round_trips_through_bytes() {
        let rec = ClockRecord {
            seconds: 0xDEAD_BEEF,
            sync_interval: 3_600,
        };
        assert_eq!(ClockRecord::decode(&rec.encode()), rec);
    }
}
