//! Long-press factory reset: storage wipe and re-provisioning hand-off.

use panicbutton::adapters::wifi::WifiAdapter;
use panicbutton::app::events::AppEvent;
use panicbutton::app::ports::{ClockPort, ConnectivityPort, StoragePort};
use panicbutton::app::service::{AppService, TickOutcome};
use panicbutton::config::{AlarmConfig, CONTROL_TICK_MS, clamp_str};
use panicbutton::store::{self, REGION_SIZE, STORE_KEY, STORE_NAMESPACE};

use crate::mock_hw::{EventSpy, FakeClock, MockHardware, MockStorage, MockTransport, timeline};

fn provisioned_storage() -> MockStorage {
    let mut storage = MockStorage::new();
    let cfg = AlarmConfig {
        server_address: clamp_str("10.0.0.42"),
        server_port: 8080,
        user_id: clamp_str("operator"),
        password: clamp_str("hunter22"),
        alarm_port_suffix: clamp_str("17"),
    };
    store::save(&mut storage, &cfg).unwrap();
    store::save_credentials(&mut storage, "HomeWiFi", "password1").unwrap();
    storage
}

#[test]
fn six_second_hold_wipes_storage_and_requests_restart() {
    let now = timeline();
    let mut storage = provisioned_storage();
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials("HomeWiFi", "password1").unwrap();
    wifi.connect().unwrap();

    let mut app = AppService::new(store::load(&storage));
    let mut hw = MockHardware::new(now.clone());
    let mut clock = FakeClock::new(now);
    let mut transport = MockTransport::replying(200);
    let mut sink = EventSpy::new();

    let mut outcome = TickOutcome::Idle;
    let ticks = 6000 / u64::from(CONTROL_TICK_MS);
    for _ in 0..ticks {
        hw.set_pressed(true);
        let now_ms = clock.now_ms();
        let o = app.tick(
            now_ms,
            &mut hw,
            &mut wifi,
            &mut transport,
            &mut storage,
            &mut clock,
            &mut sink,
        );
        if o != TickOutcome::Idle {
            outcome = o;
            break;
        }
        clock.sleep_ms(CONTROL_TICK_MS);
    }

    assert_eq!(outcome, TickOutcome::RestartRequested);

    // Region is all zero bytes.
    let mut region = [0xAAu8; REGION_SIZE];
    let n = storage.read(STORE_NAMESPACE, STORE_KEY, &mut region).unwrap();
    assert_eq!(n, REGION_SIZE);
    assert!(region.iter().all(|&b| b == 0));

    // Credentials gone, WiFi back to unprovisioned, no alarm fired.
    assert!(store::load_credentials(&storage).is_none());
    assert!(!wifi.has_credentials());
    assert_eq!(
        wifi.state(),
        panicbutton::app::ports::ConnectivityState::Unprovisioned
    );
    assert!(transport.sent.is_empty(), "reset gesture must not fire the alarm");

    assert!(sink.events.contains(&AppEvent::FactoryReset));
    assert!(
        !sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::AlarmDispatched(_)))
    );
}

#[test]
fn next_boot_after_reset_loads_defaults() {
    let mut storage = provisioned_storage();
    store::erase(&mut storage).unwrap();
    store::erase_credentials(&mut storage).unwrap();

    // What main() does on the next boot.
    assert_eq!(store::load(&storage), AlarmConfig::default());
    assert!(store::load_credentials(&storage).is_none());
}

#[test]
fn release_before_hold_threshold_fires_alarm_instead() {
    let now = timeline();
    let mut storage = provisioned_storage();
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials("HomeWiFi", "password1").unwrap();
    wifi.connect().unwrap();

    let mut app = AppService::new(store::load(&storage));
    let mut hw = MockHardware::new(now.clone());
    let mut clock = FakeClock::new(now);
    let mut transport = MockTransport::replying(200);
    let mut sink = EventSpy::new();

    let mut outcomes = Vec::new();
    // 4.9 s hold, then release — just under the reset threshold.
    let press_ticks = 4900 / u64::from(CONTROL_TICK_MS);
    let release_ticks = 200 / u64::from(CONTROL_TICK_MS);
    for (level, ticks) in [(true, press_ticks), (false, release_ticks)] {
        for _ in 0..ticks {
            hw.set_pressed(level);
            let now_ms = clock.now_ms();
            let o = app.tick(
                now_ms,
                &mut hw,
                &mut wifi,
                &mut transport,
                &mut storage,
                &mut clock,
                &mut sink,
            );
            if o != TickOutcome::Idle {
                outcomes.push(o);
            }
            clock.sleep_ms(CONTROL_TICK_MS);
        }
    }

    assert_eq!(
        outcomes,
        vec![TickOutcome::Dispatched(
            panicbutton::dispatch::DispatchResult::Success
        )]
    );
    // Storage untouched.
    assert!(storage.exists(STORE_NAMESPACE, STORE_KEY));
    assert!(store::load_credentials(&storage).is_some());
}
