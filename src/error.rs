//! Unified error types for the panic button firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the top-level control loop's error handling uniform. All variants are
//! `Copy` so they pass through the control loop without allocation.
//!
//! Storage corruption is deliberately absent: an unreadable config field
//! is replaced by its default at load time and never surfaces as an error.

use core::fmt;

use crate::app::ports::{ConnectivityError, PortalError, StorageError, TransportError};

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Persistent storage failed.
    Storage(StorageError),
    /// The WiFi subsystem failed.
    Connectivity(ConnectivityError),
    /// The alarm HTTP transaction failed.
    Transport(TransportError),
    /// The provisioning portal failed.
    Portal(PortalError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Connectivity(e) => write!(f, "connectivity: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Portal(e) => write!(f, "portal: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Connectivity(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<PortalError> for Error {
    fn from(e: PortalError) -> Self {
        Self::Portal(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
