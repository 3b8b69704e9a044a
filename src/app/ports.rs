//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (GPIO, NVS, WiFi, HTTP, portal) implement these traits.
//! The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::config::AlarmConfig;
use crate::dispatch::AlarmRequest;

// ───────────────────────────────────────────────────────────────
// Physical I/O ports (driven adapters: hardware ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: instantaneous electrical level of the panic button.
pub trait ButtonPort {
    /// `true` while the button contact is closed (raw, pre-debounce).
    fn is_pressed(&mut self) -> bool;
}

/// Write-side port: the status LED.
///
/// `lit` is the logical state; the driver underneath handles the
/// active-low electrical inversion.
pub trait LedPort {
    fn set_lit(&mut self, lit: bool);
    fn is_lit(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Clock port (injectable time source for deterministic tests)
// ───────────────────────────────────────────────────────────────

/// Monotonic time and blocking delay.
///
/// Every blocking wait in the firmware funnels through this port, which
/// lets tests substitute a fake clock and run timing scenarios instantly.
pub trait ClockPort {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the control loop for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value byte storage.
///
/// Write operations MUST be atomic — the committed value is either the
/// old or the new bytes, never a torn mix. The ESP-IDF NVS API
/// guarantees this natively; the in-memory simulation achieves it
/// trivially. Callers must not write on every loop iteration
/// (flash write-endurance) — only on explicit user action.
pub trait StoragePort {
    /// Read a value. Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value and commit it durably.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Connectivity port (driven adapter: domain ↔ WiFi station)
// ───────────────────────────────────────────────────────────────

/// WiFi association lifecycle, owned exclusively by the connectivity
/// manager. Every other component reads the state and never mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    /// No stored credentials — provisioning portal required.
    Unprovisioned,
    /// Association attempt in flight.
    Connecting,
    Connected,
    /// Credentials exist but the link is down.
    Disconnected,
}

pub trait ConnectivityPort {
    fn state(&self) -> ConnectivityState;

    fn has_credentials(&self) -> bool;

    fn set_credentials(&mut self, ssid: &str, passphrase: &str)
    -> Result<(), ConnectivityError>;

    /// One association attempt. On success the state is `Connected`;
    /// on failure it is `Disconnected` and the caller decides the retry
    /// policy (the control loop retries indefinitely).
    fn connect(&mut self) -> Result<(), ConnectivityError>;

    fn disconnect(&mut self);

    /// Periodic link status check — drives `Connected → Disconnected`
    /// on link loss. Not event-driven.
    fn poll(&mut self);

    /// Forget in-RAM credentials and drop the link (factory reset path;
    /// the persisted copies are erased through [`StoragePort`]).
    fn clear_credentials(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → NVR HTTP endpoint)
// ───────────────────────────────────────────────────────────────

/// One-shot HTTP POST capability.
///
/// A single bounded-timeout request: open, authenticate, send, return the
/// response status code. No retry, no queueing — the dispatcher's policy.
pub trait TransportPort {
    fn send(&mut self, request: &AlarmRequest) -> Result<u16, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Portal port (driven adapter: provisioning UI → domain)
// ───────────────────────────────────────────────────────────────

/// A validated provisioning submission: network credentials plus the
/// five NVR fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningForm {
    pub ssid: heapless::String<32>,
    pub passphrase: heapless::String<64>,
    pub config: AlarmConfig,
}

/// The captive configuration portal, treated purely as a capability that
/// yields validated configuration values. Same pending-handoff shape as
/// the WiFi credential flow: the adapter accumulates a submission, the
/// control loop takes it.
pub trait PortalPort {
    /// Serve the configuration form, pre-populated with `current`.
    fn start(&mut self, current: &AlarmConfig) -> Result<(), PortalError>;

    fn stop(&mut self);

    fn is_active(&self) -> bool;

    /// Consume the most recent valid submission, if any.
    fn take_submission(&mut self) -> Option<ProvisioningForm>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial log today;
/// a future uplink would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

/// Errors from [`ConnectivityPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassphrase,
    ConnectFailed,
}

/// Errors from [`TransportPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Could not establish the request channel.
    OpenFailed,
    /// Channel opened but the transaction did not complete.
    RequestFailed,
}

/// Errors from [`PortalPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalError {
    StartFailed,
    /// A submitted field failed validation.
    InvalidField(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassphrase => {
                write!(f, "passphrase invalid (8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OpenFailed => write!(f, "could not open request channel"),
            Self::RequestFailed => write!(f, "request did not complete"),
        }
    }
}

impl core::fmt::Display for PortalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StartFailed => write!(f, "portal failed to start"),
            Self::InvalidField(msg) => write!(f, "invalid field: {}", msg),
        }
    }
}
