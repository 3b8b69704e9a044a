//! Status LED driver.
//!
//! One discrete LED wired active-low (logic low = lit). The driver keeps
//! the logical state so callers never reason about the inversion.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct StatusLed {
    gpio: i32,
    lit: bool,
}

impl StatusLed {
    pub fn new(gpio: i32) -> Self {
        // Park unlit (electrically high).
        hw_init::gpio_write(gpio, true);
        Self { gpio, lit: false }
    }

    pub fn set_lit(&mut self, lit: bool) {
        hw_init::gpio_write(self.gpio, !lit);
        self.lit = lit;
    }

    pub fn off(&mut self) {
        self.set_lit(false);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
