//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the button GPIO and the status LED driver, exposing them through
//! [`ButtonPort`] and [`LedPort`]. This is the only module in the system
//! that touches actual I/O pins. On non-espidf targets, the underlying
//! driver uses cfg-gated simulation stubs and the button level can be set
//! from tests.

use crate::app::ports::{ButtonPort, LedPort};
use crate::drivers::status_led::StatusLed;

/// Concrete adapter that combines the board's I/O behind port traits.
pub struct HardwareAdapter {
    button_gpio: i32,
    led: StatusLed,
    #[cfg(not(target_os = "espidf"))]
    sim_pressed: bool,
}

impl HardwareAdapter {
    pub fn new(button_gpio: i32, led: StatusLed) -> Self {
        Self {
            button_gpio,
            led,
            #[cfg(not(target_os = "espidf"))]
            sim_pressed: false,
        }
    }

    /// GPIO pin the button is attached to.
    pub fn button_gpio(&self) -> i32 {
        self.button_gpio
    }

    /// Simulation: force the raw button level for host-side runs.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_pressed(&mut self, pressed: bool) {
        self.sim_pressed = pressed;
    }
}

// ── ButtonPort implementation ─────────────────────────────────

impl ButtonPort for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn is_pressed(&mut self) -> bool {
        // External pull-down: raw high = contact closed.
        crate::drivers::hw_init::gpio_read(self.button_gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_pressed(&mut self) -> bool {
        self.sim_pressed
    }
}

// ── LedPort implementation ────────────────────────────────────

impl LedPort for HardwareAdapter {
    fn set_lit(&mut self, lit: bool) {
        self.led.set_lit(lit);
    }

    fn is_lit(&self) -> bool {
        self.led.is_lit()
    }
}
