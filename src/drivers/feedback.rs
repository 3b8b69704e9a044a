//! LED feedback blink codes.
//!
//! The single status LED communicates outcomes through counted blink
//! patterns. Patterns run to completion on the control loop (blocking by
//! design — the device has nothing else to do while signalling), with the
//! delay injected through [`ClockPort`] so tests observe exact timing.
//!
//! | Code                  | Pattern            | Meaning                |
//! |-----------------------|--------------------|------------------------|
//! | `BLINK_SUCCESS`       | 2 blinks @ 200 ms  | alarm acknowledged     |
//! | `BLINK_FAILURE`       | 5 blinks @ 100 ms  | any dispatch failure   |
//! | `BLINK_RESET_CONFIRM` | 3 blinks @ 300 ms  | factory reset underway |

use crate::app::ports::{ClockPort, LedPort};

/// A counted on/off blink pattern. `period_ms` is the duration of each
/// half-cycle (on time equals off time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkCode {
    pub count: u8,
    pub period_ms: u32,
}

pub const BLINK_SUCCESS: BlinkCode = BlinkCode {
    count: 2,
    period_ms: 200,
};

pub const BLINK_FAILURE: BlinkCode = BlinkCode {
    count: 5,
    period_ms: 100,
};

pub const BLINK_RESET_CONFIRM: BlinkCode = BlinkCode {
    count: 3,
    period_ms: 300,
};

/// Run a blink code to completion. The LED always ends unlit.
pub fn run(code: &BlinkCode, led: &mut impl LedPort, clock: &mut impl ClockPort) {
    for _ in 0..code.count {
        led.set_lit(true);
        clock.sleep_ms(code.period_ms);
        led.set_lit(false);
        clock.sleep_ms(code.period_ms);
    }
}
