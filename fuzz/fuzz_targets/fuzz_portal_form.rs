//! Fuzz target: portal form parser
//!
//! Feeds arbitrary bytes to `parse_form` and verifies it never panics and
//! that any accepted submission passes config validation.
//!
//! cargo fuzz run fuzz_portal_form

#![no_main]

use libfuzzer_sys::fuzz_target;
use panicbutton::adapters::portal::parse_form;
use panicbutton::config::{self, AlarmConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = core::str::from_utf8(data) else {
        return;
    };
    let current = AlarmConfig::default();

    if let Ok(form) = parse_form(body, &current) {
        assert!(!form.ssid.is_empty());
        assert!(config::validate(&form.config).is_ok());
    }
});
