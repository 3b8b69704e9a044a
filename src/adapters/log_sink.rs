//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! A future network uplink would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::dispatch::DispatchResult;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(link) => {
                info!("START | link={:?}", link);
            }
            AppEvent::ConnectivityChanged { from, to } => {
                info!("LINK  | {:?} -> {:?}", from, to);
            }
            AppEvent::AlarmDispatched(result) => match result {
                DispatchResult::Success => info!("ALARM | dispatched, {}", result),
                _ => warn!("ALARM | lost, {}", result),
            },
            AppEvent::ProvisioningStarted => {
                info!("PROV  | portal active");
            }
            AppEvent::ConfigSaved => {
                info!("PROV  | configuration saved");
            }
            AppEvent::FactoryReset => {
                warn!("RESET | wiping configuration");
            }
        }
    }
}
