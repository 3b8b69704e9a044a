//! System configuration parameters
//!
//! The five NVR fields collected by the provisioning portal, plus the fixed
//! timing constants of the control loop. Field values persist in NVS (see
//! [`crate::store`]) and are overridden only by a portal save.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

// --- Field capacities (payload bytes, excluding the NUL terminator) ---
pub const MAX_ADDRESS_LEN: usize = 47;
pub const MAX_USER_LEN: usize = 31;
pub const MAX_PASSWORD_LEN: usize = 31;
pub const MAX_SUFFIX_LEN: usize = 7;

// --- Documented defaults (applied per-field when storage is empty) ---
pub const DEFAULT_SERVER_ADDRESS: &str = "192.168.0.100";
pub const DEFAULT_SERVER_PORT: u16 = 80;
pub const DEFAULT_USER_ID: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "123456";
pub const DEFAULT_ALARM_SUFFIX: &str = "9";

// --- Input timing ---
/// Raw level must hold this long before the debounced level follows.
pub const DEBOUNCE_DELAY_MS: u64 = 50;
/// Continuous hold past this threshold requests a factory reset.
pub const RESET_HOLD_MS: u64 = 5000;
/// Control loop period — button sampling resolution.
pub const CONTROL_TICK_MS: u32 = 10;

// --- Network timing ---
/// Bound on the alarm POST transaction.
pub const HTTP_TIMEOUT_MS: u32 = 5000;
/// LED cadence while blocking on (re)connection.
pub const RECONNECT_BLINK_MS: u32 = 500;
/// Link status poll interval during normal operation.
pub const LINK_POLL_INTERVAL_MS: u32 = 1000;

// --- Provisioning access point (fixed, printed on the enclosure) ---
pub const PROVISIONING_AP_SSID: &str = "PanicButton-Setup";
pub const PROVISIONING_AP_PASSPHRASE: &str = "provision";

/// The persisted NVR endpoint record.
///
/// The password is held in clear at this layer; the NVR API requires it
/// verbatim for HTTP Basic Authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// NVR host name or IP address.
    pub server_address: heapless::String<MAX_ADDRESS_LEN>,
    /// NVR HTTP port (1–65535).
    pub server_port: u16,
    /// NVR account user name.
    pub user_id: heapless::String<MAX_USER_LEN>,
    /// NVR account password.
    pub password: heapless::String<MAX_PASSWORD_LEN>,
    /// Virtual alarm endpoint selector (`/TriggerVirtualAlarm/{suffix}`).
    pub alarm_port_suffix: heapless::String<MAX_SUFFIX_LEN>,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            server_address: clamp_str(DEFAULT_SERVER_ADDRESS),
            server_port: DEFAULT_SERVER_PORT,
            user_id: clamp_str(DEFAULT_USER_ID),
            password: clamp_str(DEFAULT_PASSWORD),
            alarm_port_suffix: clamp_str(DEFAULT_ALARM_SUFFIX),
        }
    }
}

/// Copy `s` into a fixed-capacity string, truncating on a char boundary.
pub fn clamp_str<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Range-check a record before persisting it.
///
/// The portal rejects invalid submissions with the returned message;
/// stored records never fail this (empty fields fall back to defaults on
/// load instead).
pub fn validate(config: &AlarmConfig) -> Result<(), ConfigError> {
    if config.server_address.is_empty() {
        return Err(ConfigError::ValidationFailed("server address is empty"));
    }
    if !crate::adapters::utils::is_printable_ascii(&config.server_address)
        || config.server_address.contains(' ')
    {
        return Err(ConfigError::ValidationFailed(
            "server address must be printable ASCII without spaces",
        ));
    }
    if config.server_port == 0 {
        return Err(ConfigError::ValidationFailed("server port must be 1–65535"));
    }
    if config.user_id.is_empty() {
        return Err(ConfigError::ValidationFailed("user id is empty"));
    }
    if config.alarm_port_suffix.is_empty() {
        return Err(ConfigError::ValidationFailed("alarm port suffix is empty"));
    }
    if !config
        .alarm_port_suffix
        .bytes()
        .all(|b| b.is_ascii_alphanumeric())
    {
        return Err(ConfigError::ValidationFailed(
            "alarm port suffix must be alphanumeric",
        ));
    }
    Ok(())
}
