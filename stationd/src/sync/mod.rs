/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Clock synchronisation against an external time source.
//!
//! ```text
//! attempt 1..=max_tries
//!   ├── status "<host> (<n>)"
//!   ├── query(host, timeout) ── Some(t) ──► clock.set(t), "Delta: ±Ns", done
//!   └── None ──► next attempt
//! all failed ──► time_inaccurate = true, "Error syncing time."
//! ```
//!
//! A failed sync is never fatal; the clock keeps counting from its last
//! value.

pub mod sntp;

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::display::{self, DisplaySink};
use crate::modules::clock::Clock;

pub use sntp::SntpClient;

// ── Tick source ───────────────────────────────────────────────────────────────

/// Free-running millisecond counter.  Wraps at `u32::MAX`.
pub trait TickSource {
    fn now_ms(&self) -> u32;
}

/// Milliseconds since construction, truncated to 32 bits.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTicks {
    start: Instant,
}

impl MonotonicTicks {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicTicks {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

// ── Time source ───────────────────────────────────────────────────────────────

/// An external authority for the current time.
#[allow(async_fn_in_trait)]
pub trait TimeSource {
    /// Asks `host` for the current epoch seconds.  `None` on timeout, network
    /// failure or an empty answer.
    async fn query(&mut self, host: &str, timeout: Duration) -> Option<u32>;
}

// ── Sync routine ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    pub max_tries: u32,
    /// Per-attempt wait for an answer.
    pub timeout: Duration,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            max_tries: 5,
            timeout: Duration::from_millis(1_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// `delta` is the correction applied, new minus old, in seconds.
    Synced { delta: i64, tries: u32 },
    Unavailable { tries: u32 },
}

/// Runs one bounded-retry sync and applies the result to `clock`.
pub async fn synchronize<T, K>(
    clock: &mut Clock,
    source: &mut T,
    ticks: &K,
    policy: &SyncPolicy,
    host: &str,
    sink: &mut dyn DisplaySink,
) -> SyncOutcome
where
    T: TimeSource,
    K: TickSource,
{
    for attempt in 1..=policy.max_tries {
        sink.status(&display::sync_attempt_status(host, attempt));
        debug!(host, attempt, "querying time source");

        if let Some(epoch) = source.query(host, policy.timeout).await {
            let delta = i64::from(epoch) - i64::from(clock.now());
            clock.set(epoch, ticks.now_ms());
            clock.set_time_inaccurate(false);
            sink.status(&display::sync_delta_status(delta));
            info!(host, attempt, epoch, delta, "clock synchronised");
            return SyncOutcome::Synced {
                delta,
                tries: attempt,
            };
        }
    }

    clock.set_time_inaccurate(true);
    sink.status(display::STATUS_SYNC_FAILED);
    warn!(host, tries = policy.max_tries, "time source unavailable, keeping local clock");
    SyncOutcome::Unavailable {
        tries: policy.max_tries,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;

    use super::*;
    use crate::display::RecordingDisplay;
    use crate::modules::clock::ClockRecord;
    use crate::modules::Module;

    /// Replays a fixed list of answers, then `None` forever.
    struct ScriptedSource {
        answers: VecDeque<Option<u32>>,
        queries: u32,
    }

    impl ScriptedSource {
        fn new(answers: &[Option<u32>]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                queries: 0,
            }
        }
    }

    impl TimeSource for ScriptedSource {
        async fn query(&mut self, _host: &str, _timeout: Duration) -> Option<u32> {
            self.queries += 1;
            self.answers.pop_front().flatten()
        }
    }

    struct FixedTicks(Cell<u32>);

    impl TickSource for FixedTicks {
        fn now_ms(&self) -> u32 {
            self.0.get()
        }
    }

    fn clock_at(seconds: u32) -> Clock {
        let mut clock = Clock::new();
        clock.configure(&ClockRecord {
            seconds,
            sync_interval: 1,
        });
        clock
    }

    #[tokio::test]
    async fn first_answer_sets_clock_and_reports_delta() {
        let mut clock = clock_at(1_000);
        let mut source = ScriptedSource::new(&[None, Some(1_042)]);
        let rec = RecordingDisplay::new();
        let mut sink = rec.clone();

        let outcome = synchronize(
            &mut clock,
            &mut source,
            &FixedTicks(Cell::new(7)),
            &SyncPolicy::default(),
            "pool.ntp.org",
            &mut sink,
        )
        .await;

        assert_eq!(outcome, SyncOutcome::Synced { delta: 42, tries: 2 });
        assert_eq!(clock.now(), 1_042);
        assert_eq!(clock.next_sync(), 1_043);
        assert!(!clock.flags().time_inaccurate);
        assert_eq!(
            rec.log().statuses,
            vec!["pool.ntp.org (1)", "pool.ntp.org (2)", "Delta: +42s"]
        );
    }

    #[tokio::test]
    async fn exhausted_retries_mark_time_inaccurate() {
        let mut clock = clock_at(1_000);
        let mut source = ScriptedSource::new(&[]);
        let rec = RecordingDisplay::new();
        let mut sink = rec.clone();
        let policy = SyncPolicy {
            max_tries: 3,
            timeout: Duration::from_millis(1),
        };

        let outcome = synchronize(
            &mut clock,
            &mut source,
            &FixedTicks(Cell::new(0)),
            &policy,
            "h",
            &mut sink,
        )
        .await;

        assert_eq!(outcome, SyncOutcome::Unavailable { tries: 3 });
        assert_eq!(source.queries, 3);
        assert_eq!(clock.now(), 1_000);
        assert!(clock.flags().time_inaccurate);
        assert_eq!(rec.log().statuses.last().map(String::as_str), Some("Error syncing time."));
    }

    #[tokio::test]
    async fn success_clears_previous_inaccuracy() {
        let mut clock = clock_at(1_000);
        clock.set_time_inaccurate(true);
        let mut source = ScriptedSource::new(&[Some(900)]);
        let mut sink = RecordingDisplay::new();

        let outcome = synchronize(
            &mut clock,
            &mut source,
            &FixedTicks(Cell::new(0)),
            &SyncPolicy::default(),
            "h",
            &mut sink,
        )
        .await;

        assert_eq!(outcome, SyncOutcome::Synced { delta: -100, tries: 1 });
        assert!(!clock.flags().time_inaccurate);
    }

    #[test]
    fn monotonic_ticks_start_near_zero() {
        let ticks = MonotonicTicks::new();
        assert!(ticks.now_ms() < 1_000);
    }
}
