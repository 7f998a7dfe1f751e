/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The station as one owning aggregate.
//!
//! [`Device`] holds the store, every module's live state and the display.
//! Nothing else keeps references into it; the dispatcher and the clock's
//! heartbeat borrow it for one call at a time.
//!
//! ```text
//! boot()   header guard → hydrate countdown, clock, net, ntp → pull lcd
//! start()  network bring-up → first sync → enable auto-sync
//! poll()   clock tick → heartbeat (if due) → countdown → display
//! handle() route → get | set (diff-and-write) → response
//! ```

use tracing::{debug, info, warn};

use crate::display::{self, DisplaySink};
use crate::modules::clock::{Clock, ClockRecord};
use crate::modules::countdown::{Countdown, CountdownRecord};
use crate::modules::display::{DisplayMessage, DisplayRecord};
use crate::modules::network::{NetworkIdentity, NetworkRecord};
use crate::modules::time_server::{TimeServer, TimeServerRecord};
use crate::modules::{FieldContext, Module, ModuleKind};
use crate::net::{self, AddressSet, NetworkBackend};
use crate::protocol::{self, ProtocolError, Response, Route};
use crate::store::{
    factory_reset, initialize_or_reset, read_record, PersistentStore, StoreError, StoreStatus,
};
use crate::sync::{self, SyncOutcome, SyncPolicy, TickSource, TimeSource};

// ── Settings ──────────────────────────────────────────────────────────────────

/// How often the heartbeat (one per clock sync callback) does its chores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatCadence {
    /// Query the time source every this many heartbeats.
    pub sync_every: u32,
    /// Write the clock record every this many heartbeats.
    pub persist_every: u32,
}

impl Default for HeartbeatCadence {
    fn default() -> Self {
        Self {
            sync_every: 3_600,
            persist_every: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceSettings {
    pub policy: SyncPolicy,
    pub cadence: HeartbeatCadence,
}

fn is_due(index: u32, every: u32) -> bool {
    every != 0 && index % every == 0
}

// ── Device ────────────────────────────────────────────────────────────────────

pub struct Device<S: PersistentStore> {
    store: S,
    countdown: Countdown,
    clock: Clock,
    lcd: DisplayMessage,
    network: NetworkIdentity,
    time_server: TimeServer,
    display: Box<dyn DisplaySink>,
    settings: DeviceSettings,
    /// Countdown separator visibility, toggled every heartbeat.
    colon: bool,
    sync_index: u32,
    addresses: Option<AddressSet>,
}

impl<S: PersistentStore> Device<S> {
    /// Verifies the store (or wipes it when `force_reset` is set) and
    /// hydrates every module from it.
    pub fn boot(
        mut store: S,
        settings: DeviceSettings,
        mut display: Box<dyn DisplaySink>,
        force_reset: bool,
    ) -> Result<Self, StoreError> {
        if force_reset {
            display.status("Resetting store.");
            factory_reset(&mut store)?;
        }

        display.status("Loading configuration.");
        let status = initialize_or_reset(&mut store)?;
        if status == StoreStatus::FactoryReset {
            info!("store restored to factory defaults");
        }

        let mut countdown = Countdown::default();
        countdown.configure(&read_record::<CountdownRecord, _>(&mut store)?);

        let mut clock = Clock::new();
        clock.configure(&read_record::<ClockRecord, _>(&mut store)?);

        let mut network = NetworkIdentity::new();
        network.configure(&read_record::<NetworkRecord, _>(&mut store)?);

        let mut time_server = TimeServer::new();
        time_server.configure(&read_record::<TimeServerRecord, _>(&mut store)?);

        let mut lcd = DisplayMessage::new();
        lcd.configure(&read_record::<DisplayRecord, _>(&mut store)?);
        display.message(&lcd);

        info!(
            countdown_target = countdown.target(),
            clock = clock.now(),
            sync_interval = clock.sync_interval(),
            time_server = %time_server.hostname(),
            "modules hydrated"
        );

        Ok(Self {
            store,
            countdown,
            clock,
            lcd,
            network,
            time_server,
            display,
            settings,
            colon: false,
            sync_index: 1,
            addresses: None,
        })
    }

    /// Brings the network up, runs the first sync and arms auto-sync.
    pub async fn start<K, T, B>(&mut self, ticks: &K, source: &mut T, backend: &mut B) -> SyncOutcome
    where
        K: TickSource,
        T: TimeSource,
        B: NetworkBackend + ?Sized,
    {
        self.clock.anchor(ticks.now_ms());
        self.addresses = Some(net::bring_up(backend, &self.network, self.display.as_mut()));

        self.display.status("Syncing local clock...");
        let outcome = self.sync_now(ticks, source).await;
        self.display
            .status(&format!("Interval: {}s", self.clock.sync_interval()));

        self.clock.enable_auto_sync();
        self.show_idle_status();
        outcome
    }

    /// One iteration of the main loop, minus connection handling.
    pub async fn poll<K, T>(&mut self, ticks: &K, source: &mut T)
    where
        K: TickSource,
        T: TimeSource,
    {
        if self.clock.update(ticks.now_ms()) {
            self.heartbeat(ticks, source).await;
        }

        if !self.countdown.reached() {
            self.countdown
                .update(self.clock.now(), self.clock.subsecond_ms());
            let line = display::render_countdown(&self.countdown, self.colon);
            self.display.countdown(&line);
        }
    }

    /// Sync callback: periodic sync and persistence, colon blink.
    async fn heartbeat<K, T>(&mut self, ticks: &K, source: &mut T)
    where
        K: TickSource,
        T: TimeSource,
    {
        if is_due(self.sync_index, self.settings.cadence.sync_every) {
            self.sync_now(ticks, source).await;
            self.show_idle_status();
            self.sync_index = 0;
        }

        if is_due(self.sync_index, self.settings.cadence.persist_every) {
            match protocol::persist(&self.clock, &mut self.store) {
                Ok(()) => debug!(seconds = self.clock.now(), "clock persisted"),
                Err(e) => warn!(error = %e, "failed to persist clock"),
            }
        }

        self.colon = !self.colon;
        self.sync_index = self.sync_index.wrapping_add(1);
        let now = self.clock.now();
        self.clock.complete_sync(now);
    }

    async fn sync_now<K, T>(&mut self, ticks: &K, source: &mut T) -> SyncOutcome
    where
        K: TickSource,
        T: TimeSource,
    {
        let host = self.time_server.hostname();
        sync::synchronize(
            &mut self.clock,
            source,
            ticks,
            &self.settings.policy,
            &host,
            self.display.as_mut(),
        )
        .await
    }

    fn show_idle_status(&mut self) {
        let text = display::idle_status(self.clock.flags().time_inaccurate);
        self.display.status(text);
    }

    // ── Control requests ──────────────────────────────────────────────────────

    /// Serves one raw request path.  Every failure maps onto an error
    /// response.
    pub fn handle<P: AsRef<[u8]>>(&mut self, path: P) -> Response {
        let path = path.as_ref();
        let result = protocol::parse_route(path).and_then(|route| self.dispatch(route));
        match result {
            Ok(resp) => resp,
            Err(ProtocolError::Storage(e)) => {
                warn!(
                    path = %String::from_utf8_lossy(path),
                    error = %e,
                    "update accepted but not persisted"
                );
                Response::from(&ProtocolError::Storage(e))
            }
            Err(e) => {
                debug!(path = %String::from_utf8_lossy(path), error = %e, "request rejected");
                Response::from(&e)
            }
        }
    }

    fn dispatch(&mut self, route: Route) -> Result<Response, ProtocolError> {
        let kind = match route {
            Route::Get(kind) => kind,
            Route::Set(kind, query) => {
                self.apply(kind, &query)?;
                kind
            }
        };
        Ok(self.describe(kind))
    }

    fn apply(&mut self, kind: ModuleKind, query: &[u8]) -> Result<(), StoreError> {
        let ctx = FieldContext {
            clock_now: self.clock.now(),
            countdown_target: self.countdown.target(),
        };
        let store = &mut self.store;

        match kind {
            ModuleKind::Countdown => {
                protocol::apply_update(&mut self.countdown, store, query, &ctx)?;
            }
            ModuleKind::Display => {
                if protocol::apply_update(&mut self.lcd, store, query, &ctx)? {
                    self.display.message(&self.lcd);
                }
            }
            ModuleKind::Network => {
                protocol::apply_update(&mut self.network, store, query, &ctx)?;
            }
            ModuleKind::TimeServer => {
                protocol::apply_update(&mut self.time_server, store, query, &ctx)?;
            }
            ModuleKind::Clock => {
                protocol::apply_update(&mut self.clock, store, query, &ctx)?;
            }
        }
        Ok(())
    }

    fn describe(&self, kind: ModuleKind) -> Response {
        match kind {
            ModuleKind::Countdown => protocol::get_response(&self.countdown),
            ModuleKind::Display => protocol::get_response(&self.lcd),
            ModuleKind::Network => protocol::get_response(&self.network),
            ModuleKind::TimeServer => protocol::get_response(&self.time_server),
            ModuleKind::Clock => protocol::get_response(&self.clock),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn display_message(&self) -> &DisplayMessage {
        &self.lcd
    }

    pub fn network(&self) -> &NetworkIdentity {
        &self.network
    }

    pub fn time_server(&self) -> &TimeServer {
        &self.time_server
    }

    pub fn colon(&self) -> bool {
        self.colon
    }

    pub fn sync_index(&self) -> u32 {
        self.sync_index
    }

    /// Addresses in effect, once [`start`](Self::start) has run.
    pub fn addresses(&self) -> Option<AddressSet> {
        self.addresses
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
