//! Fuzz target: config region decoder
//!
//! Drives `store::decode` with arbitrary region images and verifies:
//! - No panics under arbitrary byte inputs
//! - Every decoded field is non-empty (corruption degrades to defaults)
//! - Encode of the decoded record round-trips to the same record
//!
//! cargo fuzz run fuzz_config_region

#![no_main]

use libfuzzer_sys::fuzz_target;
use panicbutton::store;

fuzz_target!(|data: &[u8]| {
    let mut region = [0u8; store::REGION_SIZE];
    let n = data.len().min(store::REGION_SIZE);
    region[..n].copy_from_slice(&data[..n]);

    let cfg = store::decode(&region);

    assert!(!cfg.server_address.is_empty());
    assert!(cfg.server_port != 0);
    assert!(!cfg.user_id.is_empty());
    assert!(!cfg.password.is_empty());
    assert!(!cfg.alarm_port_suffix.is_empty());

    // A decoded record always survives its own encoding.
    let reencoded = store::encode(&cfg);
    assert_eq!(store::decode(&reencoded), cfg);
});
