//! Input state machine — debounced button with long-press reset detection.
//!
//! Converts raw, noisy digital samples into two discrete events:
//!
//! | Gesture      | Condition                         | Event            |
//! |--------------|-----------------------------------|------------------|
//! | Short press  | Released before the 5 s hold time | `AlarmTriggered` |
//! | Long press   | Raw level held >= 5 s             | `ResetRequested` |
//!
//! The machine is polled: the control loop calls [`ButtonMachine::tick`]
//! with the instantaneous level every iteration. A press shorter than the
//! debounce window never produces a stable transition and is silently
//! ignored (contact bounce suppression).
//!
//! Hold duration is measured from the first raw high reading of a press
//! episode, before debounce completes, so the measurement is not skewed by
//! debounce latency. Consequence: a sub-debounce raw blip immediately
//! followed by a sustained press measures the hold from the blip. See
//! `press_start_tracks_first_raw_edge` below.

use crate::config::{DEBOUNCE_DELAY_MS, RESET_HOLD_MS};

/// Discrete events emitted after debounce and gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Confirmed short press — fire the alarm dispatch.
    AlarmTriggered,
    /// Sustained long press — perform a factory reset. Emitted exactly
    /// once per physical press (edge-triggered, not level-triggered).
    ResetRequested,
}

/// Debounce + gesture state. All timestamps are monotonic milliseconds.
#[derive(Debug, Clone)]
pub struct ButtonMachine {
    raw_level: bool,
    debounced_level: bool,
    /// Last time the raw level changed in either direction.
    last_change_ms: u64,
    /// First raw high reading of the current press episode (pre-debounce).
    press_start_ms: u64,
    /// A press episode is open: a raw rising edge was seen and the level
    /// has not yet settled low again.
    press_active: bool,
    /// Latch so a held button requests reset only once.
    reset_emitted: bool,
}

impl ButtonMachine {
    pub fn new() -> Self {
        Self {
            raw_level: false,
            debounced_level: false,
            last_change_ms: 0,
            press_start_ms: 0,
            press_active: false,
            reset_emitted: false,
        }
    }

    /// Last accepted stable level.
    pub fn debounced_level(&self) -> bool {
        self.debounced_level
    }

    /// Feed one raw sample. Returns a classified gesture event, if any.
    pub fn tick(&mut self, raw: bool, now_ms: u64) -> Option<InputEvent> {
        if raw != self.raw_level {
            if raw && !self.press_active {
                // Raw rising edge opens the press episode; the timestamp
                // is captured here, independent of debounce completion.
                self.press_active = true;
                self.press_start_ms = now_ms;
            }
            self.raw_level = raw;
            self.last_change_ms = now_ms;
        }

        // Long-press detection runs on the raw level so a bouncing
        // contact cannot postpone the reset threshold.
        if self.raw_level
            && self.press_active
            && !self.reset_emitted
            && now_ms.saturating_sub(self.press_start_ms) >= RESET_HOLD_MS
        {
            self.reset_emitted = true;
            return Some(InputEvent::ResetRequested);
        }

        // Accept the raw level once it has been stable for the window.
        if now_ms.saturating_sub(self.last_change_ms) >= DEBOUNCE_DELAY_MS {
            if self.debounced_level != self.raw_level {
                self.debounced_level = self.raw_level;
                if !self.debounced_level && self.press_active {
                    // Confirmed release. Held duration is measured to the
                    // raw falling edge, not to debounce completion.
                    let held = self.last_change_ms.saturating_sub(self.press_start_ms);
                    let already_reset = self.reset_emitted;
                    self.press_active = false;
                    self.reset_emitted = false;
                    if !already_reset {
                        if held < RESET_HOLD_MS {
                            return Some(InputEvent::AlarmTriggered);
                        }
                        // The hold crossed the threshold between samples;
                        // classify it as the reset it was.
                        return Some(InputEvent::ResetRequested);
                    }
                }
            } else if !self.raw_level && self.press_active {
                // A raw blip that never debounced; the episode ends once
                // the level is stably low again.
                self.press_active = false;
                self.reset_emitted = false;
            }
        }

        None
    }
}

impl Default for ButtonMachine {
    fn default() -> Self {
        Self::new()
    }
}
