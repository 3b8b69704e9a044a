//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the button machine and the configuration record,
//! and orchestrates one control tick: sample the button, classify the
//! gesture, dispatch the alarm or run the factory reset. All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  ButtonPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService        │ ──▶ TransportPort
//!     LedPort ◀── │  ButtonMachine · Config │ ──▶ StoragePort
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{AlarmConfig, RECONNECT_BLINK_MS};
use crate::dispatch::{self, DispatchResult};
use crate::drivers::feedback;
use crate::input::{ButtonMachine, InputEvent};

use super::events::AppEvent;
use super::ports::{
    ButtonPort, ClockPort, ConnectivityPort, ConnectivityState, EventSink, LedPort, StoragePort,
    TransportPort,
};

/// What the control loop must do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing happened, keep looping.
    Idle,
    /// An alarm trigger was handled (successfully or not).
    Dispatched(DispatchResult),
    /// Factory reset completed — restart into provisioning mode.
    RestartRequested,
}

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: AlarmConfig,
    button: ButtonMachine,
    /// Last connectivity state observed, for change events.
    link_seen: ConnectivityState,
}

impl AppService {
    pub fn new(config: AlarmConfig) -> Self {
        Self {
            config,
            button: ButtonMachine::new(),
            link_seen: ConnectivityState::Unprovisioned,
        }
    }

    pub fn config(&self) -> &AlarmConfig {
        &self.config
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce startup with the initial link state.
    pub fn start(&mut self, link: ConnectivityState, sink: &mut impl EventSink) {
        self.link_seen = link;
        sink.emit(&AppEvent::Started(link));
        info!("AppService started ({:?})", link);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: observe the link, sample the button, and
    /// act on the classified gesture.
    ///
    /// The `hw` parameter satisfies **both** [`ButtonPort`] and
    /// [`LedPort`] — this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl ButtonPort + LedPort),
        wifi: &mut impl ConnectivityPort,
        transport: &mut impl TransportPort,
        storage: &mut impl StoragePort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> TickOutcome {
        self.observe_link(wifi.state(), sink);

        let raw = hw.is_pressed();
        match self.button.tick(raw, now_ms) {
            Some(InputEvent::AlarmTriggered) => {
                let result = dispatch::trigger(wifi.state(), transport, &self.config);
                sink.emit(&AppEvent::AlarmDispatched(result));
                feedback::run(&result.feedback(), hw, clock);
                TickOutcome::Dispatched(result)
            }
            Some(InputEvent::ResetRequested) => {
                if let Err(e) =
                    crate::reset::perform_factory_reset(storage, wifi, hw, clock, sink)
                {
                    // Restart anyway — limbo is worse than a reset that
                    // must be repeated.
                    warn!("factory reset incomplete: {}", e);
                }
                TickOutcome::RestartRequested
            }
            None => TickOutcome::Idle,
        }
    }

    /// Block until the link is up, blinking the LED at the 500 ms wait
    /// cadence between attempts. Returns immediately when unprovisioned —
    /// the caller must run the portal instead.
    ///
    /// This is the device's entire job while offline, so the indefinite
    /// retry loop is deliberate.
    pub fn ensure_connected(
        &mut self,
        wifi: &mut impl ConnectivityPort,
        hw: &mut impl LedPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> ConnectivityState {
        if !wifi.has_credentials() {
            return ConnectivityState::Unprovisioned;
        }

        while wifi.state() != ConnectivityState::Connected {
            if let Err(e) = wifi.connect() {
                warn!("connect attempt failed: {}", e);
                hw.set_lit(true);
                clock.sleep_ms(RECONNECT_BLINK_MS);
                hw.set_lit(false);
                clock.sleep_ms(RECONNECT_BLINK_MS);
            }
        }
        hw.set_lit(false);
        self.observe_link(ConnectivityState::Connected, sink);
        ConnectivityState::Connected
    }

    // ── Internal ──────────────────────────────────────────────

    fn observe_link(&mut self, link: ConnectivityState, sink: &mut impl EventSink) {
        if link != self.link_seen {
            sink.emit(&AppEvent::ConnectivityChanged {
                from: self.link_seen,
                to: link,
            });
            self.link_seen = link;
        }
    }
}
