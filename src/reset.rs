//! Reset coordinator — long-press factory reset.
//!
//! Invoked exactly once per qualifying long-press edge. The step order is
//! load-bearing for crash-safety: confirmation blink, forget WiFi
//! credentials, zero the config region, then the caller restarts the
//! device into provisioning mode. A power loss mid-erase leaves a
//! partially-zeroed record, which [`crate::store::load`] degrades to
//! defaults instead of corrupting behaviour.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, ConnectivityPort, EventSink, LedPort, StoragePort};
use crate::drivers::feedback::{self, BLINK_RESET_CONFIRM};
use crate::error::Result;
use crate::store;

/// Wipe persisted configuration and credentials. The caller restarts the
/// device afterwards regardless of the result — a failed wipe must not
/// leave the device in error-state limbo.
pub fn perform_factory_reset(
    storage: &mut impl StoragePort,
    wifi: &mut impl ConnectivityPort,
    led: &mut impl LedPort,
    clock: &mut impl ClockPort,
    sink: &mut impl EventSink,
) -> Result<()> {
    info!("reset: factory reset requested");
    sink.emit(&AppEvent::FactoryReset);
    feedback::run(&BLINK_RESET_CONFIRM, led, clock);

    wifi.clear_credentials();

    if let Err(e) = store::erase_credentials(storage) {
        warn!("reset: credential erase failed ({})", e);
        return Err(e.into());
    }
    store::erase(storage)?;

    info!("reset: storage wiped, restart into provisioning");
    Ok(())
}
