//! GPIO pin assignments for the panic button main board.
//!
//! Single source of truth — every driver references this module rather
//! than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Panic button (external pull-down; contact closes to 3V3)
// ---------------------------------------------------------------------------

/// Momentary push-button. Raw high = pressed.
pub const BUTTON_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Status LED (active-low: logic low = lit)
// ---------------------------------------------------------------------------

/// Single status LED, driven through a current-limiting resistor to 3V3.
pub const LED_GPIO: i32 = 5;
