//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them — today they go to the serial log.

use crate::app::ports::ConnectivityState;
use crate::dispatch::DispatchResult;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The application service has started (carries the link state).
    Started(ConnectivityState),

    /// The connectivity manager moved between states.
    ConnectivityChanged {
        from: ConnectivityState,
        to: ConnectivityState,
    },

    /// An alarm trigger was dispatched (or refused offline).
    AlarmDispatched(DispatchResult),

    /// The provisioning access point and portal are up.
    ProvisioningStarted,

    /// A portal submission was persisted.
    ConfigSaved,

    /// Long-press factory reset is underway.
    FactoryReset,
}
