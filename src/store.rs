//! Durable config store — fixed-offset field layout over [`StoragePort`].
//!
//! The five NVR fields live at fixed byte offsets inside one fixed-size
//! region, each as length-bounded bytes followed by a NUL terminator. The
//! region persists as a single storage blob, so one commit covers all
//! fields (no partial-field visibility across commits).
//!
//! Decoding is forgiving by design: an empty or unreadable slot falls back
//! to its documented default, never to an error. A power loss mid-erase
//! leaves a partially-zeroed record, which therefore degrades safely to
//! defaults on the next boot.
//!
//! WiFi credentials are persisted separately in the `auth` namespace and
//! are erased together with the region on factory reset.

use log::{info, warn};

use crate::app::ports::{StorageError, StoragePort};
use crate::config::{self, AlarmConfig, clamp_str};

// ── Durable layout ────────────────────────────────────────────

pub const STORE_NAMESPACE: &str = "valarm";
pub const STORE_KEY: &str = "nvrcfg";

pub const CRED_NAMESPACE: &str = "auth";
pub const CRED_KEY_SSID: &str = "ssid";
pub const CRED_KEY_PASSPHRASE: &str = "pass";

/// One fixed-offset, length-bounded field window. `len` includes the
/// NUL terminator, so the payload is at most `len - 1` bytes.
pub struct FieldSlot {
    pub name: &'static str,
    pub offset: usize,
    pub len: usize,
}

pub const SLOT_ADDRESS: FieldSlot = FieldSlot {
    name: "server_address",
    offset: 0,
    len: config::MAX_ADDRESS_LEN + 1,
};
pub const SLOT_PORT: FieldSlot = FieldSlot {
    name: "server_port",
    offset: 48,
    len: 8,
};
pub const SLOT_USER: FieldSlot = FieldSlot {
    name: "user_id",
    offset: 56,
    len: config::MAX_USER_LEN + 1,
};
pub const SLOT_PASSWORD: FieldSlot = FieldSlot {
    name: "password",
    offset: 88,
    len: config::MAX_PASSWORD_LEN + 1,
};
pub const SLOT_SUFFIX: FieldSlot = FieldSlot {
    name: "alarm_port_suffix",
    offset: 120,
    len: config::MAX_SUFFIX_LEN + 1,
};

/// Total size of the storage region.
pub const REGION_SIZE: usize = 128;

// The layout is validated at compile time — no scattered magic numbers.
const _: () = {
    assert!(SLOT_ADDRESS.offset + SLOT_ADDRESS.len <= SLOT_PORT.offset);
    assert!(SLOT_PORT.offset + SLOT_PORT.len <= SLOT_USER.offset);
    assert!(SLOT_USER.offset + SLOT_USER.len <= SLOT_PASSWORD.offset);
    assert!(SLOT_PASSWORD.offset + SLOT_PASSWORD.len <= SLOT_SUFFIX.offset);
    assert!(SLOT_SUFFIX.offset + SLOT_SUFFIX.len <= REGION_SIZE);
};

// ── Slot codec ────────────────────────────────────────────────

/// Decode one slot. `None` when the slot is empty (first byte NUL) or not
/// valid UTF-8 — the caller substitutes the field default.
fn decode_slot<'a>(region: &'a [u8], slot: &FieldSlot) -> Option<&'a str> {
    let window = &region[slot.offset..slot.offset + slot.len];
    if window[0] == 0 {
        return None;
    }
    let end = window.iter().position(|&b| b == 0).unwrap_or(window.len());
    match core::str::from_utf8(&window[..end]) {
        Ok(s) => Some(s),
        Err(_) => {
            warn!("store: slot '{}' is not UTF-8, using default", slot.name);
            None
        }
    }
}

/// Encode `value` into its slot, truncated to the window with a NUL
/// terminator. The window is zero-filled first so shorter values leave
/// no residue from a previous record.
fn encode_slot(region: &mut [u8], slot: &FieldSlot, value: &str) {
    let window = &mut region[slot.offset..slot.offset + slot.len];
    window.fill(0);
    let payload = value.as_bytes();
    let n = payload.len().min(slot.len - 1);
    window[..n].copy_from_slice(&payload[..n]);
}

// ── Record operations ─────────────────────────────────────────

/// Read the whole record. Missing blob, short blob, or any empty/corrupt
/// slot degrades to the documented defaults — first-boot safety.
pub fn load(storage: &impl StoragePort) -> AlarmConfig {
    let mut region = [0u8; REGION_SIZE];
    match storage.read(STORE_NAMESPACE, STORE_KEY, &mut region) {
        Ok(n) => {
            if n < REGION_SIZE {
                warn!("store: short record ({} of {} bytes)", n, REGION_SIZE);
                region[n..].fill(0);
            }
        }
        Err(StorageError::NotFound) => {
            info!("store: no stored record, using defaults");
        }
        Err(e) => {
            warn!("store: read failed ({}), using defaults", e);
            region.fill(0);
        }
    }
    decode(&region)
}

/// Decode a raw region into a record, applying defaults per empty field.
pub fn decode(region: &[u8; REGION_SIZE]) -> AlarmConfig {
    let defaults = AlarmConfig::default();
    AlarmConfig {
        server_address: decode_slot(region, &SLOT_ADDRESS)
            .map(clamp_str)
            .unwrap_or(defaults.server_address),
        server_port: decode_slot(region, &SLOT_PORT)
            .and_then(|s| s.parse::<u16>().ok())
            .filter(|&p| p != 0)
            .unwrap_or(config::DEFAULT_SERVER_PORT),
        user_id: decode_slot(region, &SLOT_USER)
            .map(clamp_str)
            .unwrap_or(defaults.user_id),
        password: decode_slot(region, &SLOT_PASSWORD)
            .map(clamp_str)
            .unwrap_or(defaults.password),
        alarm_port_suffix: decode_slot(region, &SLOT_SUFFIX)
            .map(clamp_str)
            .unwrap_or(defaults.alarm_port_suffix),
    }
}

/// Encode a record into its region image.
pub fn encode(config: &AlarmConfig) -> [u8; REGION_SIZE] {
    use core::fmt::Write;

    let mut region = [0u8; REGION_SIZE];
    // u16 always fits 5 digits.
    let mut port = heapless::String::<6>::new();
    let _ = write!(port, "{}", config.server_port);
    encode_slot(&mut region, &SLOT_ADDRESS, &config.server_address);
    encode_slot(&mut region, &SLOT_PORT, &port);
    encode_slot(&mut region, &SLOT_USER, &config.user_id);
    encode_slot(&mut region, &SLOT_PASSWORD, &config.password);
    encode_slot(&mut region, &SLOT_SUFFIX, &config.alarm_port_suffix);
    region
}

/// Persist the whole record with one commit. Only call on explicit user
/// action — flash write-endurance.
pub fn save(storage: &mut impl StoragePort, config: &AlarmConfig) -> Result<(), StorageError> {
    let region = encode(config);
    storage.write(STORE_NAMESPACE, STORE_KEY, &region)?;
    info!("store: record saved ({} bytes)", REGION_SIZE);
    Ok(())
}

/// Overwrite the entire region with zero bytes and commit.
pub fn erase(storage: &mut impl StoragePort) -> Result<(), StorageError> {
    let zeros = [0u8; REGION_SIZE];
    storage.write(STORE_NAMESPACE, STORE_KEY, &zeros)?;
    info!("store: record erased");
    Ok(())
}

// ── WiFi credentials ──────────────────────────────────────────

pub fn save_credentials(
    storage: &mut impl StoragePort,
    ssid: &str,
    passphrase: &str,
) -> Result<(), StorageError> {
    storage.write(CRED_NAMESPACE, CRED_KEY_SSID, ssid.as_bytes())?;
    storage.write(CRED_NAMESPACE, CRED_KEY_PASSPHRASE, passphrase.as_bytes())?;
    info!("store: WiFi credentials saved (SSID '{}')", ssid);
    Ok(())
}

/// `None` when no SSID is stored (first boot or post-reset).
pub fn load_credentials(
    storage: &impl StoragePort,
) -> Option<(heapless::String<32>, heapless::String<64>)> {
    let mut ssid_buf = [0u8; 32];
    let n = match storage.read(CRED_NAMESPACE, CRED_KEY_SSID, &mut ssid_buf) {
        Ok(n) if n > 0 => n,
        _ => return None,
    };
    let ssid = core::str::from_utf8(&ssid_buf[..n]).ok()?;

    let mut pass_buf = [0u8; 64];
    let pass = match storage.read(CRED_NAMESPACE, CRED_KEY_PASSPHRASE, &mut pass_buf) {
        Ok(n) => core::str::from_utf8(&pass_buf[..n]).unwrap_or(""),
        Err(_) => "",
    };

    Some((clamp_str(ssid), clamp_str(pass)))
}

pub fn erase_credentials(storage: &mut impl StoragePort) -> Result<(), StorageError> {
    storage.delete(CRED_NAMESPACE, CRED_KEY_SSID)?;
    storage.delete(CRED_NAMESPACE, CRED_KEY_PASSPHRASE)?;
    info!("store: WiFi credentials erased");
    Ok(())
}
