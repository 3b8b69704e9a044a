//! System clock adapter.
//!
//! Implements [`ClockPort`] — monotonic time plus blocking delay.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` (monotonic,
//!   microsecond precision) and the FreeRTOS task delay. The delay path
//!   also resets the task watchdog, because every legitimate blocking
//!   wait in the firmware funnels through this port.
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` and
//!   `std::thread::sleep` for host-side simulation. Tests use their own
//!   fake clocks instead.

use crate::app::ports::ClockPort;

/// Clock adapter for the ESP32 platform.
pub struct EspClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for EspClock {
    fn default() -> Self {
        Self::new()
    }
}

impl EspClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

impl ClockPort for EspClock {
    #[cfg(target_os = "espidf")]
    fn now_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_os = "espidf")]
    fn sleep_ms(&mut self, ms: u32) {
        // The control-loop task stays subscribed to the TWDT across
        // blocking waits; reset it so a legitimate 500 ms retry delay or
        // 5 s HTTP timeout never trips the 15 s window.
        unsafe {
            esp_idf_svc::sys::esp_task_wdt_reset();
        }
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
