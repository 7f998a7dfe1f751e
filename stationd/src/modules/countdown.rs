/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Countdown target module and the derived remaining-time state.
//!
//! Only the target timestamp is persisted.  The remaining days / hours /
//! minutes / seconds are recomputed from the clock on every poll until the
//! target is reached; after that the state is terminal and the numeric fields
//! stay at zero.

use tracing::{debug, info};

use super::parse::parse_ulong;
use super::{FieldContext, Module};
use crate::store::layout::{self, le_u32};
use crate::store::{Record, Region};

/// Factory default target (epoch seconds).
pub const DEFAULT_TARGET: u32 = 1_327_626_000;

// ── Record ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownRecord {
    /// Target timestamp, epoch seconds.
    pub target: u32,
}

impl Default for CountdownRecord {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
        }
    }
}

impl Record for CountdownRecord {
    const REGION: Region = layout::COUNTDOWN;

    fn encode(&self) -> Vec<u8> {
        self.target.to_le_bytes().to_vec()
    }

    fn decode(bytes: &[u8]) -> Self {
        Self {
            target: le_u32(bytes, 0),
        }
    }
}

// ── Live state ────────────────────────────────────────────────────────────────

/// Countdown towards a fixed target timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Countdown {
    target: u32,
    pub days: u32,
    pub hours: u32,
    pub mins: u32,
    pub secs: u32,
    /// Milliseconds left in the current second.
    pub subsecond: u32,
    reached: bool,
}

impl Countdown {
    pub fn new(target: u32) -> Self {
        Self {
            target,
            ..Default::default()
        }
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Returns `true` once the clock has reached the target.  Terminal until
    /// a new target is configured.
    pub fn reached(&self) -> bool {
        self.reached
    }

    /// Recomputes the remaining time from the clock.
    ///
    /// `subsecond_ms` is the clock's progress into the current second.
    pub fn update(&mut self, now: u32, subsecond_ms: u16) {
        if self.reached {
            return;
        }

        if now >= self.target {
            self.days = 0;
            self.hours = 0;
            self.mins = 0;
            self.secs = 0;
            self.subsecond = 0;
            self.reached = true;
            info!(target_ts = self.target, now, "countdown target reached");
            return;
        }

        let s = self.target - now;
        let m = s / 60;
        let h = m / 60;
        self.secs = s % 60;
        self.mins = m % 60;
        self.hours = h % 24;
        self.days = h / 24;
        self.subsecond = (1000 - u32::from(subsecond_ms.min(1000))) % 1000;
    }

    /// `DD:HH:MM:SS.mmmm`, as reported by `get/countdown`.
    pub fn remaining_text(&self) -> String {
        format!(
            "{:02}:{:02}:{:02}:{:02}.{:04}",
            self.days, self.hours, self.mins, self.secs, self.subsecond
        )
    }
}

impl Module for Countdown {
    type Record = CountdownRecord;

    fn serialize(&self) -> CountdownRecord {
        CountdownRecord {
            target: self.target,
        }
    }

    fn configure(&mut self, record: &CountdownRecord) {
        // A new target re-arms the countdown; the same target keeps the
        // derived state untouched.
        if record.target != self.target {
            debug!(old = self.target, new = record.target, "countdown target replaced");
            *self = Countdown::new(record.target);
        }
    }

    fn apply_field(
        working: &mut CountdownRecord,
        old: &CountdownRecord,
        key: &[u8],
        value: &[u8],
        ctx: &FieldContext,
    ) {
        if key.eq_ignore_ascii_case(b"time") {
            working.target = parse_ulong(value);
            if working.target < ctx.clock_now {
                debug!(
                    requested = working.target,
                    clock_now = ctx.clock_now,
                    "countdown target earlier than clock, keeping old value"
                );
                working.target = old.target;
            }
        }
    }

    fn describe(&self, record: &CountdownRecord) -> Vec<String> {
        vec![record.target.to_string(), self.remaining_text()]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(clock_now: u32) -> FieldContext {
        FieldContext {
            clock_now,
            countdown_target: 0,
        }
    }

    // ── Derivation ────────────────────────────────────────────────────────────

    #[test]
    fn remaining_time_is_split_into_units() {
        let mut cd = Countdown::new(1_000_000);
        // 2 days, 3 hours, 4 minutes, 5 seconds before the target
        let delta = 2 * 86_400 + 3 * 3_600 + 4 * 60 + 5;
        cd.update(1_000_000 - delta, 250);

        assert!(!cd.reached());
        assert_eq!((cd.days, cd.hours, cd.mins, cd.secs), (2, 3, 4, 5));
        assert_eq!(cd.subsecond, 750);
        assert_eq!(cd.remaining_text(), "02:03:04:05.0750");
    }

    #[test]
    fn zero_subsecond_progress_reports_zero_remainder() {
        let mut cd = Countdown::new(100);
        cd.update(90, 0);
        assert_eq!(cd.subsecond, 0);
        assert_eq!(cd.secs, 10);
    }

    #[test]
    fn reached_on_the_same_poll_that_now_equals_target() {
        let mut cd = Countdown::new(5_000);
        cd.update(4_999, 0);
        assert!(!cd.reached());
        assert_eq!(cd.secs, 1);

        cd.update(5_000, 0);
        assert!(cd.reached());
        assert_eq!((cd.days, cd.hours, cd.mins, cd.secs), (0, 0, 0, 0));
    }

    #[test]
    fn reached_is_terminal() {
        let mut cd = Countdown::new(5_000);
        cd.update(5_001, 0);
        assert!(cd.reached());

        // even if the clock is later set backwards
        cd.update(10, 0);
        assert!(cd.reached());
        assert_eq!((cd.days, cd.hours, cd.mins, cd.secs), (0, 0, 0, 0));
    }

    #[test]
    fn target_one_below_now_is_reached_not_136_years() {
        let mut cd = Countdown::new(u32::MAX - 1);
        cd.update(u32::MAX, 0);
        assert!(cd.reached());
        assert_eq!(cd.days, 0);
    }

    // ── Module contract ───────────────────────────────────────────────────────

    #[test]
    fn configure_serialize_is_idempotent() {
        let mut cd = Countdown::new(9_000);
        cd.update(8_000, 100);
        let before = cd.clone();
        cd.configure(&cd.serialize());
        assert_eq!(cd, before);
    }

    #[test]
    fn configure_new_target_rearms() {
        let mut cd = Countdown::new(10);
        cd.update(20, 0);
        assert!(cd.reached());

        cd.configure(&CountdownRecord { target: 50 });
        assert!(!cd.reached());
        assert_eq!(cd.target(), 50);
    }

    #[test]
    fn earlier_than_clock_target_is_rejected() {
        let old = CountdownRecord { target: 2000 };
        let mut working = old;
        Countdown::apply_field(&mut working, &old, b"time", b"500", &ctx(1000));
        assert_eq!(working.target, 2000);
    }

    #[test]
    fn later_target_is_accepted_case_insensitively() {
        let old = CountdownRecord { target: 2000 };
        let mut working = old;
        Countdown::apply_field(&mut working, &old, b"TIME", b"3000", &ctx(1000));
        assert_eq!(working.target, 3000);

        // equal to the clock is not "earlier"
        Countdown::apply_field(&mut working, &old, b"time", b"1000", &ctx(1000));
        assert_eq!(working.target, 1000);
    }

    #[test]
    fn unknown_key_is_ignored() {
        let old = CountdownRecord { target: 2000 };
        let mut working = old;
        Countdown::apply_field(&mut working, &old, b"target", b"9999", &ctx(0));
        assert_eq!(working, old);
    }

    #[test]
    fn record_encoding_is_little_endian() {
        let rec = CountdownRecord { target: 0x0102_0304 };
        assert_eq!(rec.encode(), vec![4, 3, 2, 1]);
        assert_eq!(CountdownRecord::decode(&rec.encode()), rec);
    }

    #[test]
    fn describe_lists_target_then_remaining() {
        let mut cd = Countdown::new(3_661);
        cd.update(0, 0);
        assert_eq!(cd.describe(&cd.serialize()), vec!["3661", "00:01:01:01.0000"]);
    }
}
