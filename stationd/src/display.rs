/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Display sinks.
//!
//! The station drives three areas: a one-line status area, the countdown
//! line and the free-text message (with its backlight colour).  Sinks only
//! receive already-formatted strings; all formatting lives in the helpers
//! below so that it can be tested without hardware.

use std::sync::{Arc, Mutex};

use tracing::{info, trace};

use crate::modules::countdown::Countdown;
use crate::modules::display::DisplayMessage;

/// Idle status line: unit legend aligned under the countdown digits.
pub const STATUS_LEGEND: &str = "       d      h       m      s    cs";

/// Idle status line after a failed sync.
pub const STATUS_INACCURATE: &str = "Time slightly inaccurate.";

/// Status line after every sync attempt has failed.
pub const STATUS_SYNC_FAILED: &str = "Error syncing time.";

/// Countdown line once the target has been reached.
pub const COUNTDOWN_REACHED: &str = " RIGHT NOW!";

pub trait DisplaySink {
    fn status(&mut self, text: &str);
    fn countdown(&mut self, text: &str);
    fn message(&mut self, message: &DisplayMessage);
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// ` DD:HH:MM:SS.cc` with the colon visible, ` DD HH MM SS cc` without.
pub fn render_countdown(countdown: &Countdown, colon: bool) -> String {
    if countdown.reached() {
        return COUNTDOWN_REACHED.to_string();
    }
    let cs = countdown.subsecond / 10;
    if colon {
        format!(
            " {:02}:{:02}:{:02}:{:02}.{:02}",
            countdown.days, countdown.hours, countdown.mins, countdown.secs, cs
        )
    } else {
        format!(
            " {:02} {:02} {:02} {:02} {:02}",
            countdown.days, countdown.hours, countdown.mins, countdown.secs, cs
        )
    }
}

pub fn idle_status(time_inaccurate: bool) -> &'static str {
    if time_inaccurate {
        STATUS_INACCURATE
    } else {
        STATUS_LEGEND
    }
}

pub fn sync_attempt_status(host: &str, attempt: u32) -> String {
    format!("{host} ({attempt})")
}

pub fn sync_delta_status(delta: i64) -> String {
    format!("Delta: {delta:+}s")
}

// ── Sinks ─────────────────────────────────────────────────────────────────────

/// Writes display updates to the log.  Repeated identical lines are dropped.
#[derive(Debug, Default)]
pub struct LogDisplay {
    last_status: String,
    last_countdown: String,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for LogDisplay {
    fn status(&mut self, text: &str) {
        if self.last_status != text {
            info!(target: "display", status = text);
            self.last_status = text.to_string();
        }
    }

    fn countdown(&mut self, text: &str) {
        if self.last_countdown != text {
            trace!(target: "display", countdown = text);
            self.last_countdown = text.to_string();
        }
    }

    fn message(&mut self, message: &DisplayMessage) {
        let (r, g, b) = message.color();
        info!(target: "display", text = %message.text(), r, g, b, "message");
    }
}

/// Everything a [`RecordingDisplay`] has been sent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DisplayLog {
    pub statuses: Vec<String>,
    pub countdowns: Vec<String>,
    pub messages: Vec<String>,
}

/// Sink that keeps every update; the log stays reachable through
/// [`RecordingDisplay::log`] after the sink has been handed over.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> DisplayLog {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn with_log(&self, f: impl FnOnce(&mut DisplayLog)) {
        if let Ok(mut log) = self.log.lock() {
            f(&mut log);
        }
    }
}

impl DisplaySink for RecordingDisplay {
    fn status(&mut self, text: &str) {
        self.with_log(|log| log.statuses.push(text.to_string()));
    }

    fn countdown(&mut self, text: &str) {
        self.with_log(|log| log.countdowns.push(text.to_string()));
    }

    fn message(&mut self, message: &DisplayMessage) {
        self.with_log(|log| log.messages.push(message.text()));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
