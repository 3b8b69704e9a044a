//! Mock adapters for integration tests.
//!
//! Records every LED transition and transport call so tests can assert on
//! the full command history without touching real GPIO or the network.
//! The fake clock advances instantly, so timing scenarios (a 6-second
//! hold, a 500 ms blink cadence) run in microseconds.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use panicbutton::app::events::AppEvent;
use panicbutton::app::ports::{
    ButtonPort, ClockPort, EventSink, LedPort, StorageError, StoragePort, TransportError,
    TransportPort,
};
use panicbutton::dispatch::AlarmRequest;

// ── Shared fake timeline ──────────────────────────────────────

/// Millisecond clock shared between the mock clock and the LED trace.
pub type Timeline = Rc<Cell<u64>>;

pub fn timeline() -> Timeline {
    Rc::new(Cell::new(0))
}

pub struct FakeClock {
    now: Timeline,
    pub slept: Vec<u32>,
}

impl FakeClock {
    pub fn new(now: Timeline) -> Self {
        Self {
            now,
            slept: Vec::new(),
        }
    }
}

impl ClockPort for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now.set(self.now.get() + u64::from(ms));
        self.slept.push(ms);
    }
}

// ── Button + LED ──────────────────────────────────────────────

pub struct MockHardware {
    pressed: bool,
    lit: bool,
    now: Timeline,
    /// (timestamp, lit) for every LED transition.
    pub led_trace: Vec<(u64, bool)>,
}

impl MockHardware {
    pub fn new(now: Timeline) -> Self {
        Self {
            pressed: false,
            lit: false,
            now,
            led_trace: Vec::new(),
        }
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Count of lit→unlit cycles (completed blinks).
    pub fn blink_count(&self) -> usize {
        self.led_trace.iter().filter(|(_, lit)| *lit).count()
    }
}

impl ButtonPort for MockHardware {
    fn is_pressed(&mut self) -> bool {
        self.pressed
    }
}

impl LedPort for MockHardware {
    fn set_lit(&mut self, lit: bool) {
        if lit != self.lit {
            self.led_trace.push((self.now.get(), lit));
        }
        self.lit = lit;
    }

    fn is_lit(&self) -> bool {
        self.lit
    }
}

// ── Storage ───────────────────────────────────────────────────

pub struct MockStorage {
    store: HashMap<String, Vec<u8>>,
    pub writes: u32,
}

impl MockStorage {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
            writes: 0,
        }
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StoragePort for MockStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        match self.store.get(&format!("{}::{}", namespace, key)) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.writes += 1;
        self.store
            .insert(format!("{}::{}", namespace, key), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }
}

// ── Transport ─────────────────────────────────────────────────

pub struct MockTransport {
    pub response: Result<u16, TransportError>,
    pub sent: Vec<AlarmRequest>,
}

impl MockTransport {
    pub fn replying(status: u16) -> Self {
        Self {
            response: Ok(status),
            sent: Vec::new(),
        }
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            response: Err(error),
            sent: Vec::new(),
        }
    }
}

impl TransportPort for MockTransport {
    fn send(&mut self, request: &AlarmRequest) -> Result<u16, TransportError> {
        self.sent.push(request.clone());
        self.response
    }
}

// ── Event sink ────────────────────────────────────────────────

pub struct EventSpy {
    pub events: Vec<AppEvent>,
}

impl EventSpy {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl Default for EventSpy {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventSpy {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
