//! Panic button firmware — main entry point.
//!
//! Hexagonal architecture with a single-threaded cooperative control loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  HardwareAdapter   LogEventSink    NvsAdapter    EspClock    │
//! │  (Button+Led)      (EventSink)     (Storage)     (Clock)     │
//! │  WifiAdapter       PortalAdapter   HttpTransport             │
//! │  (Connectivity)    (Provisioning)  (Transport)               │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │             AppService (pure logic)                │      │
//! │  │  ButtonMachine · Dispatcher · Reset coordinator    │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot flow: load config → reconnect with stored credentials, or run the
//! provisioning portal when there are none → sample the button at the
//! control tick until an alarm or reset gesture arrives. The loop is the
//! only execution context; the POST and the reconnect retries block it by
//! design (the device has no other concurrent obligation).
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use panicbutton::adapters::hardware::HardwareAdapter;
use panicbutton::adapters::http::HttpTransport;
use panicbutton::adapters::log_sink::LogEventSink;
use panicbutton::adapters::nvs::NvsAdapter;
use panicbutton::adapters::portal::PortalAdapter;
use panicbutton::adapters::time::EspClock;
use panicbutton::adapters::wifi::WifiAdapter;
use panicbutton::app::events::AppEvent;
use panicbutton::app::ports::{
    ClockPort, ConnectivityPort, ConnectivityState, EventSink, PortalPort,
};
use panicbutton::app::service::{AppService, TickOutcome};
use panicbutton::config::{CONTROL_TICK_MS, LINK_POLL_INTERVAL_MS};
use panicbutton::drivers::feedback::{self, BLINK_RESET_CONFIRM};
use panicbutton::drivers::status_led::StatusLed;
use panicbutton::drivers::hw_init;
use panicbutton::drivers::watchdog::Watchdog;
use panicbutton::{pins, store};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Panic Button v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // GPIO init failure is unrecoverable — restart and retry.
        log::error!("HAL init failed: {} — restarting", e);
        restart();
    }

    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let nvs_partition = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;

    let mut clock = EspClock::new();
    let mut hw = HardwareAdapter::new(pins::BUTTON_GPIO, StatusLed::new(pins::LED_GPIO));
    let mut sink = LogEventSink::new();

    // ── 3. Load config (or defaults) from NVS ─────────────────
    let mut nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            // Continue without NVS — nothing persists this session.
            // On next reboot, NVS should self-heal.
            NvsAdapter::default()
        }
    };
    let config = store::load(&nvs);
    info!(
        "Config: NVR {}:{} alarm port {}",
        config.server_address, config.server_port, config.alarm_port_suffix
    );

    // ── 4. WiFi station ───────────────────────────────────────
    let driver = esp_idf_svc::wifi::BlockingWifi::wrap(
        esp_idf_svc::wifi::EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?,
        sysloop,
    )?;
    let mut wifi = WifiAdapter::new(driver);

    if let Some((ssid, passphrase)) = store::load_credentials(&nvs) {
        if let Err(e) = wifi.set_credentials(ssid.as_str(), passphrase.as_str()) {
            // Stored credentials that fail validation are unusable;
            // treat as unprovisioned.
            warn!("stored credentials rejected ({}), re-provisioning", e);
        }
    }

    // ── 5. First boot / post-reset: provisioning portal ───────
    if !wifi.has_credentials() {
        run_provisioning(&mut wifi, &mut nvs, &mut clock, &mut hw, &mut sink, &config);
        // run_provisioning only returns to restart.
        restart();
    }

    // ── 6. Connect and enter the control loop ─────────────────
    let watchdog = Watchdog::new();
    let mut app = AppService::new(config);
    app.start(wifi.state(), &mut sink);
    app.ensure_connected(&mut wifi, &mut hw, &mut clock, &mut sink);

    let mut transport = HttpTransport::new();
    let ticks_per_poll = (LINK_POLL_INTERVAL_MS / CONTROL_TICK_MS).max(1);
    let mut tick_count: u32 = 0;

    info!("System ready. Entering control loop.");

    loop {
        tick_count = tick_count.wrapping_add(1);

        // Periodic link status poll (not event-driven).
        if tick_count % ticks_per_poll == 0 {
            wifi.poll();
        }
        if wifi.state() == ConnectivityState::Disconnected {
            app.ensure_connected(&mut wifi, &mut hw, &mut clock, &mut sink);
        }

        let now_ms = clock.now_ms();
        match app.tick(
            now_ms,
            &mut hw,
            &mut wifi,
            &mut transport,
            &mut nvs,
            &mut clock,
            &mut sink,
        ) {
            TickOutcome::RestartRequested => {
                info!("Factory reset done — restarting into provisioning");
                restart();
            }
            TickOutcome::Dispatched(result) => {
                info!("Alarm handled: {}", result);
            }
            TickOutcome::Idle => {}
        }

        watchdog.feed();
        clock.sleep_ms(CONTROL_TICK_MS);
    }
}

/// Run the access point + portal until a valid submission is persisted,
/// then return (the caller restarts). Blocks indefinitely; the device has
/// no other purpose while unprovisioned.
fn run_provisioning(
    wifi: &mut WifiAdapter,
    nvs: &mut NvsAdapter,
    clock: &mut EspClock,
    hw: &mut HardwareAdapter,
    sink: &mut LogEventSink,
    current: &panicbutton::config::AlarmConfig,
) {
    use panicbutton::app::ports::LedPort;
    use panicbutton::config::RECONNECT_BLINK_MS;

    if let Err(e) = wifi.start_access_point() {
        log::error!("provisioning AP failed ({}) — restarting", e);
        restart();
    }

    let mut portal = PortalAdapter::new();
    if let Err(e) = portal.start(current) {
        log::error!("portal failed ({}) — restarting", e);
        restart();
    }
    sink.emit(&AppEvent::ProvisioningStarted);

    let mut lit = false;
    loop {
        if let Some(form) = portal.take_submission() {
            let saved = store::save(nvs, &form.config)
                .and_then(|()| store::save_credentials(nvs, &form.ssid, &form.passphrase));
            match saved {
                Ok(()) => {
                    sink.emit(&AppEvent::ConfigSaved);
                    portal.stop();
                    feedback::run(&BLINK_RESET_CONFIRM, hw, clock);
                    return;
                }
                Err(e) => {
                    // Leave the portal up so the user can retry.
                    log::error!("failed to persist provisioning ({})", e);
                }
            }
        }

        // Slow blink tells the user the portal is waiting.
        lit = !lit;
        hw.set_lit(lit);
        clock.sleep_ms(RECONNECT_BLINK_MS);
    }
}

fn restart() -> ! {
    // SAFETY: esp_restart performs a clean software reset and never returns.
    unsafe {
        esp_idf_svc::sys::esp_restart();
    }
    unreachable!()
}
